//! Square-grid geometry for reshaping flat per-point arrays into images.

use thiserror::Error;

/// Errors that can occur in grid geometry operations.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("{count} points do not form a square grid")]
    NotSquare { count: usize },
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Returns the width (= height) of the square image for `row_count` points.
///
/// The parser already rejects non-square inputs, but this stays safe as a
/// standalone utility and fails on its own for non-square counts.
pub fn image_width(row_count: usize) -> Result<usize> {
    let width = (row_count as f64).sqrt().round() as usize;
    if width * width != row_count {
        return Err(GridError::NotSquare { count: row_count });
    }
    Ok(width)
}

/// Reshapes a flat per-point array into a row-major (width × width) grid.
///
/// No reordering happens: the column index varies fastest, matching the
/// (Y, X) row order of a sorted scan. The element type is generic so scalar
/// fields and per-cell color triplets reshape the same way.
pub fn reshape<T: Clone>(flat: &[T]) -> Result<Vec<Vec<T>>> {
    let width = image_width(flat.len())?;
    if width == 0 {
        return Ok(Vec::new());
    }
    Ok(flat.chunks(width).map(|row| row.to_vec()).collect())
}
