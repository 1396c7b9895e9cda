//! Hole-aware index mapping between the full grid and its complete rows.
//!
//! Clustering must only see rows where every measurement succeeded, but the
//! results have to land back on the original spatial grid for display. A
//! [`HoleMap`] records the order-preserving bijection between the two index
//! spaces: *compact* indices (0..k over hole-free rows) and *original* row
//! indices (0..n over the full table).

use thiserror::Error;

use super::table::MeasurementTable;

/// Errors that can occur when applying a hole map.
#[derive(Error, Debug)]
pub enum HoleMapError {
    /// `scatter` was given a value array that does not match the map's
    /// compact domain.
    #[error("length mismatch: map covers {expected} hole-free rows, got {actual} values")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Result type for hole map operations.
pub type Result<T> = std::result::Result<T, HoleMapError>;

/// Order-preserving map from compact (hole-free) indices to original row
/// indices of one table.
///
/// A map is only valid for the table it was built from; rebuild it whenever
/// a new table is loaded.
#[derive(Debug, Clone)]
pub struct HoleMap {
    /// Original row index for each compact index; strictly increasing.
    to_original: Vec<usize>,
    /// Row count of the source table, so trailing hole rows still scatter
    /// to a full-length array.
    source_rows: usize,
}

impl HoleMap {
    /// Builds the map for a table by scanning rows in order and assigning
    /// the next compact index to every row without holes.
    pub fn build(table: &MeasurementTable) -> Self {
        let to_original = (0..table.row_count())
            .filter(|&i| !table.row_has_hole(i))
            .collect();

        Self {
            to_original,
            source_rows: table.row_count(),
        }
    }

    /// Returns the number of hole-free rows (the compact domain size).
    #[inline]
    pub fn compact_len(&self) -> usize {
        self.to_original.len()
    }

    /// Returns the row count of the source table.
    #[inline]
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    /// Returns the original row index for a compact index, if in range.
    #[inline]
    pub fn original_index(&self, compact: usize) -> Option<usize> {
        self.to_original.get(compact).copied()
    }

    /// Returns the compact index of an original row, if that row is
    /// hole-free. The map is strictly increasing, so this is a binary
    /// search.
    pub fn compact_index(&self, original: usize) -> Option<usize> {
        self.to_original.binary_search(&original).ok()
    }

    /// Returns the (compact, original) index pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.to_original.iter().copied().enumerate()
    }

    /// Scatters per-compact-row values back onto the full grid.
    ///
    /// Position `original_index` receives `values[compact_index]` for every
    /// mapped pair; all other positions receive `fill`. The element type is
    /// generic so cluster labels and per-row colors scatter the same way;
    /// the fill value is always chosen by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`HoleMapError::LengthMismatch`] if `values` does not cover
    /// the compact domain exactly.
    pub fn scatter<T: Clone>(&self, values: &[T], fill: T) -> Result<Vec<T>> {
        if values.len() != self.to_original.len() {
            return Err(HoleMapError::LengthMismatch {
                expected: self.to_original.len(),
                actual: values.len(),
            });
        }

        let mut output = vec![fill; self.source_rows];
        for (compact, original) in self.pairs() {
            output[original] = values[compact].clone();
        }
        Ok(output)
    }
}

/// Returns the sub-table of rows without holes, preserving original row
/// order and all columns.
///
/// Equivalent to applying [`HoleMap::build`] and materializing full rows
/// instead of indices. Idempotent: the output has no holes to filter.
pub fn filter_holes(table: &MeasurementTable) -> MeasurementTable {
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&i| !table.row_has_hole(i))
        .collect();
    table.take_rows(&keep)
}
