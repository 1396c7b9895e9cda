//! Parser for the raw nanoindenter text export.
//!
//! The instrument exports one tab-separated text file per grid scan. After a
//! fixed three-line header and a free-text report name, the file is a series
//! of *sections*, one per physical property. A section starts with a header
//! line carrying the property name, optionally followed by bracketed unit
//! lines appended to the name, and then one `Data : N` observation line per
//! grid point. A displayed value of `--.--` marks a failed reading and is
//! recorded as a hole, never as a number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::config::ParserConfig;

use super::grid;
use super::table::{MeasurementTable, REQUIRED_COLUMNS};

/// Displayed value marking a failed instrument reading.
const HOLE_SENTINEL: &str = "--.--";

/// The fixed header lines every raw export starts with.
const HEADER_SENTINEL: [&str; 3] = ["", "New Report", "----------"];

/// Errors that can occur while parsing a raw export.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file header is not valid")]
    InvalidHeader,

    #[error("input data doesn't contain required columns: {0}")]
    MissingColumns(String),

    #[error("input data is not a square grid ({rows} rows)")]
    NotSquare { rows: usize },

    #[error("malformed observation index '{field}' on line {line}")]
    InvalidIndex { field: String, line: usize },

    #[error("malformed numeric value '{value}' on line {line}")]
    InvalidValue { value: String, line: usize },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// One property section being accumulated.
///
/// Observations land at their 1-based source index; positions never written
/// stay holes.
struct Section {
    name: String,
    values: Vec<f64>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    /// Records observation `index` (1-based). Intermediate gaps fill with holes.
    fn record(&mut self, index: usize, value: f64) {
        if index > self.values.len() {
            self.values.resize(index, f64::NAN);
        }
        self.values[index - 1] = value;
    }

    /// Flushes the section into the table.
    ///
    /// A section that produced no numeric value at all (zero observations, or
    /// only holes) yields no column.
    fn flush(self, table: &mut MeasurementTable) {
        if self.values.iter().any(|v| !v.is_nan()) {
            table.push_column(self.name, self.values);
        }
    }
}

/// Parse a raw nanoindenter export from a file path.
///
/// # Arguments
///
/// * `path` - Path to the raw `.txt` export
/// * `config` - Parser configuration (uses defaults if None)
///
/// # Errors
///
/// Returns a [`FormatError`] describing the first structural defect found;
/// no partial table is ever returned.
pub fn parse_raw<P: AsRef<Path>>(path: P, config: Option<&ParserConfig>) -> Result<MeasurementTable> {
    let path = path.as_ref();
    log::info!("Parsing {}", path.display());

    let file = File::open(path)?;
    parse_raw_reader(BufReader::new(file), config)
}

/// Parse a raw nanoindenter export from any buffered reader.
///
/// This is the same parser as [`parse_raw`] for in-memory sources (e.g. an
/// uploaded file). The reader is fully consumed within this call.
pub fn parse_raw_reader<R: BufRead>(
    reader: R,
    config: Option<&ParserConfig>,
) -> Result<MeasurementTable> {
    let default_config = ParserConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut lines = reader.lines();

    // Fixed three-line header sentinel.
    for expected in HEADER_SENTINEL {
        let line = lines.next().ok_or(FormatError::InvalidHeader)??;
        if line.trim() != expected {
            return Err(FormatError::InvalidHeader);
        }
    }

    // Free-text report name.
    let name = lines
        .next()
        .ok_or(FormatError::InvalidHeader)??
        .trim()
        .to_string();

    let mut table = MeasurementTable::new(name);
    let mut section: Option<Section> = None;

    for (line_i, line) in lines.enumerate() {
        let line = line?;
        // 1-based position in the file, past header and name lines.
        let line_no = line_i + 5;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            // Blank-line noise between sections.
            continue;
        }

        let first = fields[0];
        if !first.is_empty() && !first.starts_with('[') {
            // Section header: flush the previous section, start a new one.
            if let Some(done) = section.take() {
                done.flush(&mut table);
            }
            section = Some(Section::new(first));
        } else if !first.is_empty() {
            // Bracketed unit line: append to the pending column name.
            if let Some(current) = section.as_mut() {
                current.name.push(' ');
                current.name.push_str(first);
            }
        }

        if !fields[1].starts_with("Data") {
            // Per-section statistics trailing the observations.
            continue;
        }

        // Observation indices are 1-based in the source.
        let index: usize = fields[1]
            .split(" : ")
            .nth(1)
            .and_then(|s| s.trim().parse().ok())
            .filter(|&i| i > 0)
            .ok_or_else(|| FormatError::InvalidIndex {
                field: fields[1].to_string(),
                line: line_no,
            })?;

        let raw_value = fields[2].trim();
        let value = if raw_value == HOLE_SENTINEL {
            f64::NAN
        } else {
            raw_value
                .replace(',', ".")
                .parse()
                .map_err(|_| FormatError::InvalidValue {
                    value: raw_value.to_string(),
                    line: line_no,
                })?
        };

        if let Some(current) = section.as_mut() {
            current.record(index, value);
        }
    }

    // The stream ended inside the last section.
    if let Some(done) = section.take() {
        done.flush(&mut table);
    }

    // Every required column must be present; report all misses at once.
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| table.column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(FormatError::MissingColumns(missing.join(", ")));
    }

    if config.sort_x_y {
        table.sort_by_y_x();
    }

    // The grid must reshape into a square image downstream.
    let rows = table.row_count();
    if grid::image_width(rows).is_err() {
        return Err(FormatError::NotSquare { rows });
    }

    Ok(table)
}
