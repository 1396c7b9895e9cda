fn main() {
    indent_pipeline::cli::run();
}
