//! Grid image rendering for measurement fields and cluster maps.
//!
//! Scalar fields and cluster labels come out of the core as flat arrays in
//! grid order; this module paints them as square cell images (PNG) using the
//! plotters bitmap backend. Hole cells are painted with a caller-supplied
//! fill color, since the preferred convention varies between reports.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::grid;
use crate::core::table::is_hole;

/// Errors that can occur during rendering.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("nothing to render: empty grid")]
    EmptyGrid,

    #[error("{count} cells do not form a square grid")]
    NotSquare { count: usize },

    #[error("plotting error: {0}")]
    PlottingError(String),
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Color palette for cluster maps.
const CLUSTER_COLORS: &[(u8, u8, u8)] = &[
    (228, 26, 28),   // Red
    (55, 126, 184),  // Blue
    (77, 175, 74),   // Green
    (152, 78, 163),  // Purple
    (255, 127, 0),   // Orange
    (255, 255, 51),  // Yellow
    (166, 86, 40),   // Brown
    (247, 129, 191), // Pink
    (153, 153, 153), // Gray
    (0, 206, 209),   // Turquoise
];

/// Perceptually uniform ramp anchors for scalar fields (viridis).
const FIELD_RAMP: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
];

/// Maps a normalized value in [0, 1] onto the scalar-field color ramp.
fn ramp_color(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (FIELD_RAMP.len() - 1) as f64;
    let low = scaled.floor() as usize;
    let high = (low + 1).min(FIELD_RAMP.len() - 1);
    let frac = scaled - low as f64;

    let (r0, g0, b0) = FIELD_RAMP[low];
    let (r1, g1, b1) = FIELD_RAMP[high];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    (lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Paints one RGB color per grid cell into a PNG.
fn draw_cells(
    output_path: &Path,
    colors: &[(u8, u8, u8)],
    width: usize,
    cell_size: u32,
) -> Result<()> {
    let side = width as u32 * cell_size;
    let root = BitMapBackend::new(output_path, (side, side)).into_drawing_area();

    for (i, &(r, g, b)) in colors.iter().enumerate() {
        let x = (i % width) as i32 * cell_size as i32;
        let y = (i / width) as i32 * cell_size as i32;
        let cell = Rectangle::new(
            [(x, y), (x + cell_size as i32, y + cell_size as i32)],
            RGBColor(r, g, b).filled(),
        );
        root.draw(&cell)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Render one scalar field as a square heat map PNG.
///
/// Finite values are min-max normalized onto the field color ramp; hole
/// cells are painted with `hole_fill`. Cells come in the same row-major
/// order that [`crate::core::grid::reshape`] uses.
///
/// # Arguments
///
/// * `output_path` - Path of the PNG to write
/// * `values` - Flat per-cell values in grid order (length must be square)
/// * `hole_fill` - RGB color for hole cells
/// * `cell_size` - Edge length of one cell in pixels
pub fn render_field(
    output_path: &Path,
    values: &[f64],
    hole_fill: [u8; 3],
    cell_size: u32,
) -> Result<()> {
    if values.is_empty() {
        return Err(VisualizationError::EmptyGrid);
    }
    let width = grid::image_width(values.len()).map_err(|_| VisualizationError::NotSquare {
        count: values.len(),
    })?;

    let finite: Vec<f64> = values.iter().copied().filter(|v| !is_hole(*v)).collect();
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let colors: Vec<(u8, u8, u8)> = values
        .iter()
        .map(|&v| {
            if is_hole(v) {
                (hole_fill[0], hole_fill[1], hole_fill[2])
            } else if span > 0.0 {
                ramp_color((v - min) / span)
            } else {
                // Constant field: paint mid-ramp.
                ramp_color(0.5)
            }
        })
        .collect();

    draw_cells(output_path, &colors, width, cell_size)
}

/// Render a cluster map as a square PNG.
///
/// Each non-negative label takes a palette color (cycling past ten
/// clusters); negative labels mark holes and are painted with `hole_fill`.
/// Scatter cluster labels through [`crate::core::HoleMap::scatter`] with a
/// negative fill to produce the expected input.
pub fn render_clusters(
    output_path: &Path,
    labels: &[i32],
    hole_fill: [u8; 3],
    cell_size: u32,
) -> Result<()> {
    if labels.is_empty() {
        return Err(VisualizationError::EmptyGrid);
    }
    let width = grid::image_width(labels.len()).map_err(|_| VisualizationError::NotSquare {
        count: labels.len(),
    })?;

    let colors: Vec<(u8, u8, u8)> = labels
        .iter()
        .map(|&label| {
            if label < 0 {
                (hole_fill[0], hole_fill[1], hole_fill[2])
            } else {
                CLUSTER_COLORS[label as usize % CLUSTER_COLORS.len()]
            }
        })
        .collect();

    draw_cells(output_path, &colors, width, cell_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ramp_color_endpoints() {
        assert_eq!(ramp_color(0.0), FIELD_RAMP[0]);
        assert_eq!(ramp_color(1.0), FIELD_RAMP[FIELD_RAMP.len() - 1]);
        // Out-of-range values clamp.
        assert_eq!(ramp_color(-3.0), FIELD_RAMP[0]);
        assert_eq!(ramp_color(7.0), FIELD_RAMP[FIELD_RAMP.len() - 1]);
    }

    #[test]
    fn test_render_field_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.png");
        let values = vec![1.0, 2.0, f64::NAN, 4.0];

        render_field(&path, &values, [0, 0, 0], 8).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_field_constant_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.png");

        render_field(&path, &[5.0, 5.0, 5.0, 5.0], [255, 255, 255], 4).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_field_rejects_non_square() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");

        let result = render_field(&path, &[1.0, 2.0, 3.0], [0, 0, 0], 8);
        assert!(matches!(
            result,
            Err(VisualizationError::NotSquare { count: 3 })
        ));
    }

    #[test]
    fn test_render_clusters_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.png");
        // -1 marks a hole cell.
        let labels = vec![1, 1, -1, 2];

        render_clusters(&path, &labels, [0, 0, 0], 8).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_empty_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        assert!(matches!(
            render_field(&path, &[], [0, 0, 0], 8),
            Err(VisualizationError::EmptyGrid)
        ));
        assert!(matches!(
            render_clusters(&path, &[], [0, 0, 0], 8),
            Err(VisualizationError::EmptyGrid)
        ));
    }
}
