//! CSV output for parsed measurement tables.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::table::{is_hole, MeasurementTable, COLUMN_X, COLUMN_Y};

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A column required for the output is missing from the table.
    #[error("table has no '{name}' column")]
    MissingColumn { name: String },

    /// Mismatched array lengths.
    #[error("length mismatch: table has {rows} rows, labels has {labels} elements")]
    LengthMismatch { rows: usize, labels: usize },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write a measurement table to CSV.
///
/// The header row carries the column names in table order; holes serialize
/// as empty fields so they survive a round trip without being mistaken for
/// numeric values.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `table` - Parsed table to write
///
/// # Errors
///
/// Returns an error if directories or the file cannot be created, or a
/// record fails to serialize.
pub fn write_table_csv(path: &Path, table: &MeasurementTable) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let path_str = path.display().to_string();

    writer
        .write_record(table.column_names())
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for i in 0..table.row_count() {
        let record: Vec<String> = table
            .row(i)
            .into_iter()
            .map(|value| {
                if is_hole(value) {
                    String::new()
                } else {
                    value.to_string()
                }
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    writer.flush().map_err(|e| WriteError::CsvError {
        path: path_str,
        source: e.into(),
    })?;

    Ok(())
}

/// Write per-point cluster labels to CSV alongside their grid coordinates.
///
/// Creates a CSV with header `X [mm],Y [mm],label`. `labels` must cover the
/// full grid (one entry per table row, scattered through a hole map);
/// negative labels mark holes and serialize as empty fields.
///
/// # Errors
///
/// Returns an error if the label array length does not match the table, a
/// coordinate column is missing, or the file cannot be written.
pub fn write_labels_csv(path: &Path, table: &MeasurementTable, labels: &[i32]) -> Result<()> {
    if labels.len() != table.row_count() {
        return Err(WriteError::LengthMismatch {
            rows: table.row_count(),
            labels: labels.len(),
        });
    }

    let column = |name: &str| {
        table.column(name).ok_or_else(|| WriteError::MissingColumn {
            name: name.to_string(),
        })
    };
    let x = column(COLUMN_X)?;
    let y = column(COLUMN_Y)?;

    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let path_str = path.display().to_string();

    writer
        .write_record([COLUMN_X, COLUMN_Y, "label"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for i in 0..table.row_count() {
        let label = if labels[i] < 0 {
            String::new()
        } else {
            labels[i].to_string()
        };
        writer
            .write_record(&[x[i].to_string(), y[i].to_string(), label])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    writer.flush().map_err(|e| WriteError::CsvError {
        path: path_str,
        source: e.into(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_table() -> MeasurementTable {
        let mut table = MeasurementTable::new("test");
        table.push_column("X [mm]", vec![0.0, 0.5]);
        table.push_column("HIT (O&P) [MPa]", vec![120.5, f64::NAN]);
        table
    }

    #[test]
    fn test_write_table_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");

        write_table_csv(&path, &create_test_table()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "X [mm],HIT (O&P) [MPa]");
        assert_eq!(lines[1], "0,120.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_holes_serialize_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");

        write_table_csv(&path, &create_test_table()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[2], "0.5,");
    }

    fn create_grid_table() -> MeasurementTable {
        let mut table = MeasurementTable::new("grid");
        table.push_column(COLUMN_X, vec![0.0, 1.0, 0.0, 1.0]);
        table.push_column(COLUMN_Y, vec![0.0, 0.0, 1.0, 1.0]);
        table
    }

    #[test]
    fn test_write_labels_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        // -1 marks a hole position.
        write_labels_csv(&path, &create_grid_table(), &[1, 2, -1, 1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "X [mm],Y [mm],label");
        assert_eq!(lines[1], "0,0,1");
        assert_eq!(lines[3], "0,1,");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_write_labels_csv_length_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        let result = write_labels_csv(&path, &create_grid_table(), &[1, 2]);

        match result {
            Err(WriteError::LengthMismatch { rows, labels }) => {
                assert_eq!(rows, 4);
                assert_eq!(labels, 2);
            }
            _ => panic!("expected LengthMismatch error"),
        }
    }

    #[test]
    fn test_write_labels_csv_missing_coordinates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        let mut table = MeasurementTable::new("bare");
        table.push_column("v", vec![1.0]);

        assert!(matches!(
            write_labels_csv(&path, &table, &[1]),
            Err(WriteError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("table.csv");

        write_table_csv(&path, &create_test_table()).unwrap();

        assert!(path.exists());
    }
}
