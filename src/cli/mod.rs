//! Command-line interface for the indentation pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::holes::HoleMap;
use crate::core::parser::parse_raw;
use crate::core::table::{MeasurementTable, DEFAULT_FEATURES};
use crate::core::{grid, writers};
use crate::processors::clustering::{self, DistanceMetric, LinkageMethod};
use crate::processors::convert;
use crate::visualization;

#[derive(Parser)]
#[command(name = "indent-pipeline")]
#[command(about = "Nanoindentation grid-scan processing pipeline", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw export and report its structure
    Inspect {
        /// Raw export file
        file: PathBuf,
        /// Sort rows by (Y, X) while parsing
        #[arg(long)]
        sort_x_y: bool,
    },

    /// Convert raw exports to CSV
    Convert {
        /// Input raw file or directory
        input_path: PathBuf,
        /// Output CSV file or directory
        output_path: PathBuf,
        /// Process entire directory tree (batch mode)
        #[arg(long)]
        batch: bool,
        /// Limit number of files to process
        #[arg(long)]
        limit: Option<usize>,
        /// Sort rows by (Y, X) while parsing
        #[arg(long)]
        sort_x_y: bool,
    },

    /// Cluster grid points into phases with hierarchical linkage
    Cluster {
        /// Raw export file
        file: PathBuf,
        /// Linkage method: single, complete, average, weighted, centroid,
        /// median, or ward
        #[arg(long)]
        method: Option<String>,
        /// Distance metric: euclidean, manhattan, chebyshev, or cosine
        #[arg(long)]
        metric: Option<String>,
        /// Number of clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,
        /// Comma-separated feature columns (defaults to the physical
        /// properties)
        #[arg(long)]
        features: Option<String>,
        /// Skip column standardization
        #[arg(long)]
        no_normalize: bool,
        /// Output PNG path (defaults to FILE with a _clusters.png suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write per-point labels to this CSV
        #[arg(long)]
        labels_csv: Option<PathBuf>,
        /// Sort rows by (Y, X) while parsing
        #[arg(long)]
        sort_x_y: bool,
    },

    /// Cluster grid points around chosen seed points
    Seeded {
        /// Raw export file
        file: PathBuf,
        /// Seed grid point as x,y (repeat for each seed)
        #[arg(long = "seed", required = true)]
        seeds: Vec<String>,
        /// Comma-separated feature columns (defaults to the physical
        /// properties)
        #[arg(long)]
        features: Option<String>,
        /// Skip column standardization
        #[arg(long)]
        no_normalize: bool,
        /// Maximum centroid-reassignment iterations
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Output PNG path (defaults to FILE with a _seeded.png suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sort rows by (Y, X) while parsing
        #[arg(long)]
        sort_x_y: bool,
    },

    /// Render one measurement column as a heat map PNG
    Visualize {
        /// Raw export file
        file: PathBuf,
        /// Column to render (defaults to the indentation hardness)
        #[arg(long)]
        column: Option<String>,
        /// Output PNG path (defaults to FILE with a .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sort rows by (Y, X) while parsing
        #[arg(long)]
        sort_x_y: bool,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(String, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.len() > 39 {
            format!("{}...", &value[..36])
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

fn item(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Inspect { file, sort_x_y } => {
            cmd_inspect(&file, sort_x_y, &config);
        }
        Commands::Convert {
            input_path,
            output_path,
            batch,
            limit,
            sort_x_y,
        } => {
            cmd_convert(&input_path, &output_path, batch, limit, sort_x_y, &config);
        }
        Commands::Cluster {
            file,
            method,
            metric,
            clusters,
            features,
            no_normalize,
            output,
            labels_csv,
            sort_x_y,
        } => {
            cmd_cluster(
                &file,
                method.as_deref(),
                metric.as_deref(),
                clusters,
                features.as_deref(),
                no_normalize,
                output,
                labels_csv,
                sort_x_y,
                &config,
            );
        }
        Commands::Seeded {
            file,
            seeds,
            features,
            no_normalize,
            max_iterations,
            output,
            sort_x_y,
        } => {
            cmd_seeded(
                &file,
                &seeds,
                features.as_deref(),
                no_normalize,
                max_iterations,
                output,
                sort_x_y,
                &config,
            );
        }
        Commands::Visualize {
            file,
            column,
            output,
            sort_x_y,
        } => {
            cmd_visualize(&file, column.as_deref(), output, sort_x_y, &config);
        }
    }
}

/// Parse a raw export, exiting the process on failure.
fn load_table(file: &Path, sort_x_y: bool, config: &PipelineConfig) -> MeasurementTable {
    let mut parser_config = config.parser.clone();
    parser_config.sort_x_y = parser_config.sort_x_y || sort_x_y;

    match parse_raw(file, Some(&parser_config)) {
        Ok(table) => table,
        Err(e) => {
            error!("Parser error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Comma-separated feature list, falling back to the default properties.
fn feature_set(arg: Option<&str>) -> HashSet<String> {
    match arg {
        Some(list) => list
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        None => DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Parse an "x,y" grid coordinate.
fn parse_seed_point(text: &str) -> Option<(usize, usize)> {
    let (x, y) = text.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Default output path: the input file with `suffix` appended to its stem.
fn default_output(file: &Path, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("{}{}", stem, suffix))
}

fn cmd_inspect(file: &Path, sort_x_y: bool, config: &PipelineConfig) {
    let start = Instant::now();

    let spinner = create_spinner("Parsing raw export...");
    let table = load_table(file, sort_x_y, config);
    spinner.finish_and_clear();

    let holes: Vec<usize> = table
        .has_holes()
        .iter()
        .enumerate()
        .filter(|(_, &hole)| hole)
        .map(|(i, _)| i)
        .collect();

    // Parsed tables are always square.
    let width = grid::image_width(table.row_count()).unwrap_or(0);

    print_summary(
        "Inspect Complete",
        &[
            item("File", file.display().to_string()),
            item("Report name", table.name()),
            item("Rows", table.row_count()),
            item("Grid", format!("{}x{}", width, width)),
            item("Columns", table.column_count()),
            item("Hole rows", holes.len()),
            item("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    println!("Columns: {}", table.column_names().join(", "));
    if !holes.is_empty() {
        let rows: Vec<String> = holes.iter().map(|i| i.to_string()).collect();
        println!(
            "Warning: holes in rows {}. Clustering will skip these rows.",
            rows.join(", ")
        );
    }
}

fn cmd_convert(
    input_path: &Path,
    output_path: &Path,
    batch: bool,
    limit: Option<usize>,
    sort_x_y: bool,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let mut parser_config = config.parser.clone();
    parser_config.sort_x_y = parser_config.sort_x_y || sort_x_y;

    if batch {
        println!("Converting raw exports in batch mode...");
        println!("Input directory: {}", input_path.display());
        println!("Output directory: {}", output_path.display());

        if let Some(lim) = limit {
            println!("Processing limit: {} files", lim);
        }

        match convert::convert_batch(input_path, output_path, Some(&parser_config), limit) {
            Ok((converted, failed)) => {
                print_summary(
                    "Batch Conversion Complete",
                    &[
                        item("Input directory", input_path.display().to_string()),
                        item("Output directory", output_path.display().to_string()),
                        item("Files converted", converted),
                        item("Files failed", failed),
                        item("Duration", format!("{:.2?}", start.elapsed())),
                    ],
                );
            }
            Err(e) => {
                error!("Batch conversion failed: {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("Converting single file...");
        println!("Input: {}", input_path.display());
        println!("Output: {}", output_path.display());

        let spinner = create_spinner("Converting raw export to CSV...");

        match convert::convert_single_file(input_path, output_path, Some(&parser_config)) {
            Ok(rows) => {
                spinner.finish_and_clear();

                print_summary(
                    "Conversion Complete",
                    &[
                        item("Input file", input_path.display().to_string()),
                        item("Output file", output_path.display().to_string()),
                        item("Rows converted", rows),
                        item("Duration", format!("{:.2?}", start.elapsed())),
                    ],
                );
            }
            Err(e) => {
                spinner.finish_and_clear();
                error!("Conversion failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_cluster(
    file: &Path,
    method: Option<&str>,
    metric: Option<&str>,
    clusters: Option<usize>,
    features: Option<&str>,
    no_normalize: bool,
    output: Option<PathBuf>,
    labels_csv: Option<PathBuf>,
    sort_x_y: bool,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    // Resolve clustering parameters with CLI overrides
    let method: LinkageMethod = match method {
        Some(text) => match text.parse() {
            Ok(method) => method,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => config.hierarchical.method,
    };
    let metric: DistanceMetric = match metric {
        Some(text) => match text.parse() {
            Ok(metric) => metric,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None if method.requires_euclidean() => DistanceMetric::Euclidean,
        None => config.hierarchical.metric,
    };
    if method.requires_euclidean() && metric != DistanceMetric::Euclidean {
        error!("{} linkage requires the euclidean metric", method);
        std::process::exit(1);
    }
    let cluster_count = clusters.unwrap_or(config.hierarchical.cluster_count);

    let table = load_table(file, sort_x_y, config);
    let features = feature_set(features);

    let spinner = create_spinner("Clustering grid points...");

    let matrix = match clustering::prepare_matrix(&table, &features, !no_normalize) {
        Ok(matrix) => matrix,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Failed to prepare feature matrix: {}", e);
            std::process::exit(1);
        }
    };

    if cluster_count == 0 || cluster_count > matrix.len() {
        spinner.finish_and_clear();
        error!(
            "Cluster count {} outside 1..={} complete rows",
            cluster_count,
            matrix.len()
        );
        std::process::exit(1);
    }

    let labels = clustering::hierarchical_clustering(&matrix, method, metric, cluster_count);

    spinner.finish_and_clear();

    let map = HoleMap::build(&table);
    finish_clustering_run(
        file,
        &table,
        &map,
        &labels,
        output.unwrap_or_else(|| default_output(file, "_clusters.png")),
        labels_csv,
        config,
        &[
            item("Method", method),
            item("Metric", metric),
            item("Clusters", cluster_count),
        ],
        "Hierarchical Clustering Complete",
        start,
    );
}

#[allow(clippy::too_many_arguments)]
fn cmd_seeded(
    file: &Path,
    seeds: &[String],
    features: Option<&str>,
    no_normalize: bool,
    max_iterations: Option<usize>,
    output: Option<PathBuf>,
    sort_x_y: bool,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let table = load_table(file, sort_x_y, config);
    let features = feature_set(features);
    let max_iterations = max_iterations.unwrap_or(config.seeded.max_iterations);

    let matrix = match clustering::prepare_matrix(&table, &features, !no_normalize) {
        Ok(matrix) => matrix,
        Err(e) => {
            error!("Failed to prepare feature matrix: {}", e);
            std::process::exit(1);
        }
    };

    // Resolve seed grid points to rows of the prepared matrix.
    let map = HoleMap::build(&table);
    let mut seed_vectors = Vec::with_capacity(seeds.len());
    for text in seeds {
        let (x, y) = match parse_seed_point(text) {
            Some(point) => point,
            None => {
                error!("Invalid seed point '{}': expected x,y", text);
                std::process::exit(1);
            }
        };
        let row = match clustering::grid_point_row_index(&table, x, y) {
            Some(row) => row,
            None => {
                error!("Seed point {},{} is outside the grid", x, y);
                std::process::exit(1);
            }
        };
        let compact = match map.compact_index(row) {
            Some(compact) => compact,
            None => {
                error!("Seed point {},{} is a hole and cannot seed a cluster", x, y);
                std::process::exit(1);
            }
        };
        seed_vectors.push(matrix[compact].clone());
    }

    let spinner = create_spinner("Partitioning grid points...");
    let labels = clustering::seeded_partition(&matrix, &seed_vectors, max_iterations);
    spinner.finish_and_clear();

    finish_clustering_run(
        file,
        &table,
        &map,
        &labels,
        output.unwrap_or_else(|| default_output(file, "_seeded.png")),
        None,
        config,
        &[
            item("Seeds", seeds.join(" ")),
            item("Max iterations", max_iterations),
        ],
        "Seeded Partition Complete",
        start,
    );
}

/// Shared tail of both clustering commands: scatter, render, summarize.
#[allow(clippy::too_many_arguments)]
fn finish_clustering_run(
    file: &Path,
    table: &MeasurementTable,
    map: &HoleMap,
    labels: &[usize],
    output: PathBuf,
    labels_csv: Option<PathBuf>,
    config: &PipelineConfig,
    parameters: &[(String, String)],
    title: &str,
    start: Instant,
) {
    let compact: Vec<i32> = labels.iter().map(|&l| l as i32).collect();
    let filled = match map.scatter(&compact, -1) {
        Ok(filled) => filled,
        Err(e) => {
            error!("Failed to scatter cluster labels: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = visualization::render_clusters(
        &output,
        &filled,
        config.render.hole_fill,
        config.render.cell_size,
    ) {
        error!("Failed to render cluster map: {}", e);
        std::process::exit(1);
    }

    if let Some(csv_path) = &labels_csv {
        if let Err(e) = writers::write_labels_csv(csv_path, table, &filled) {
            error!("Failed to write labels CSV: {}", e);
            std::process::exit(1);
        }
        info!("Labels CSV -> {}", csv_path.display());
    }

    let mut items = vec![
        item("Input file", file.display().to_string()),
        item("Output PNG", output.display().to_string()),
        item("Points clustered", labels.len()),
        item("Hole rows skipped", map.source_rows() - map.compact_len()),
    ];
    items.extend_from_slice(parameters);
    for summary in clustering::cluster_summary(table, labels, map) {
        items.push(item(
            &format!("Cluster {}", summary.label),
            format!("{} points", summary.point_count),
        ));
    }
    items.push(item("Duration", format!("{:.2?}", start.elapsed())));

    print_summary(title, &items);
}

fn cmd_visualize(
    file: &Path,
    column: Option<&str>,
    output: Option<PathBuf>,
    sort_x_y: bool,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let table = load_table(file, sort_x_y, config);
    let column_name = column.unwrap_or(DEFAULT_FEATURES[0]);

    let values = match table.column(column_name) {
        Some(values) => values,
        None => {
            error!(
                "No '{}' column; available: {}",
                column_name,
                table.column_names().join(", ")
            );
            std::process::exit(1);
        }
    };

    let output_path = output.unwrap_or_else(|| {
        let mut path = file.to_path_buf();
        path.set_extension("png");
        path
    });

    let spinner = create_spinner("Rendering field...");
    let result = visualization::render_field(
        &output_path,
        values,
        config.render.hole_fill,
        config.render.cell_size,
    );
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            print_summary(
                "Visualization Complete",
                &[
                    item("Input file", file.display().to_string()),
                    item("Column", column_name),
                    item("Output PNG", output_path.display().to_string()),
                    item("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            error!("Visualization failed: {}", e);
            std::process::exit(1);
        }
    }
}
