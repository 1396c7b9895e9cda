//! Raw-export to CSV conversion, single file or whole directory trees.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ParserConfig;
use crate::core::parser::parse_raw;
use crate::core::writers::write_table_csv;

/// Subdirectory suffix for per-point indentation curve dumps; those files
/// are not grid exports and are skipped by batch conversion.
const CURVES_SUFFIX: &str = "_curves";

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input path does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no raw files found in {0}")]
    NoFilesFound(PathBuf),
}

/// Convert a single raw export to CSV.
///
/// # Arguments
///
/// * `input` - Path to the raw `.txt` export
/// * `output` - Path of the CSV file to write (parent directories created)
/// * `config` - Parser configuration (uses defaults if None)
///
/// # Returns
///
/// The number of rows written.
pub fn convert_single_file(
    input: &Path,
    output: &Path,
    config: Option<&ParserConfig>,
) -> Result<usize> {
    if !input.exists() {
        return Err(ConvertError::MissingInput(input.to_path_buf()).into());
    }

    let table = parse_raw(input, config)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    write_table_csv(output, &table)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("Saved {} rows to {}", table.row_count(), output.display());

    Ok(table.row_count())
}

/// Find raw exports under a directory, recursively.
///
/// Matches `.txt` files case-insensitively and skips files whose immediate
/// parent directory name ends with `_curves`. Results are sorted for
/// deterministic batch order.
pub fn find_raw_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .filter(|path| {
            !path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(CURVES_SUFFIX))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    files
}

/// Batch convert a directory tree of raw exports to CSV.
///
/// The relative structure of `input_dir` is mirrored under `output_dir`,
/// with each file's extension replaced by `.csv`. Files are converted in
/// parallel; a file that fails to parse is logged and counted, but does not
/// stop the batch.
///
/// # Arguments
///
/// * `input_dir` - Directory tree containing raw `.txt` exports
/// * `output_dir` - Root of the mirrored CSV tree
/// * `config` - Parser configuration (uses defaults if None)
/// * `limit` - Maximum number of files to process (None for all)
///
/// # Returns
///
/// Tuple of (converted, failed) file counts.
pub fn convert_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: Option<&ParserConfig>,
    limit: Option<usize>,
) -> Result<(usize, usize)> {
    if !input_dir.is_dir() {
        return Err(ConvertError::NotADirectory(input_dir.to_path_buf()).into());
    }

    let files = find_raw_files(input_dir);
    if files.is_empty() {
        return Err(ConvertError::NoFilesFound(input_dir.to_path_buf()).into());
    }

    let tasks: Vec<(PathBuf, PathBuf)> = files
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .filter_map(|input| {
            let relative = input.strip_prefix(input_dir).ok()?.to_path_buf();
            let output = output_dir.join(relative).with_extension("csv");
            Some((input, output))
        })
        .collect();

    let results: Vec<bool> = tasks
        .par_iter()
        .map(|(input, output)| match convert_single_file(input, output, config) {
            Ok(rows) => {
                log::info!(
                    "{} -> {} ({} rows)",
                    input.display(),
                    output.display(),
                    rows
                );
                true
            }
            Err(e) => {
                log::error!("Failed to convert {}: {:#}", input.display(), e);
                false
            }
        })
        .collect();

    let converted = results.iter().filter(|&&ok| ok).count();
    Ok((converted, results.len() - converted))
}
