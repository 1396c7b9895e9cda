//! Phase clustering over complete grid rows.
//!
//! This module turns a measurement table into a feature matrix (hole-free,
//! optionally standardized) and partitions it two ways:
//! - agglomerative hierarchical clustering with the classic Lance-Williams
//!   linkage updates, cut into a fixed number of flat clusters
//! - a seeded k-means partition initialized exactly at caller-chosen points
//!
//! Both algorithms are deterministic given identical inputs: no random
//! initialization, ties broken towards the lowest index. Results are compact
//! label arrays meant to be scattered back onto the grid with
//! [`crate::core::HoleMap::scatter`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grid;
use crate::core::holes::{filter_holes, HoleMap};
use crate::core::table::MeasurementTable;

/// Errors that can occur while preparing data for clustering.
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("unknown feature columns: {0}")]
    UnknownFeatures(String),

    #[error("no complete rows left after hole filtering")]
    EmptyMatrix,
}

/// Result type for clustering preparation.
pub type Result<T> = std::result::Result<T, ClusteringError>;

/// Linkage method for agglomerative hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    Single,
    Complete,
    Average,
    Weighted,
    Centroid,
    Median,
    Ward,
}

impl LinkageMethod {
    /// Methods whose cluster distances are only meaningful in Euclidean
    /// geometry. Callers must pair these with [`DistanceMetric::Euclidean`].
    pub fn requires_euclidean(self) -> bool {
        matches!(self, Self::Centroid | Self::Median | Self::Ward)
    }

    /// Whether the Lance-Williams recurrence for this method operates on
    /// squared distances.
    fn squared_space(self) -> bool {
        self.requires_euclidean()
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
            Self::Weighted => "weighted",
            Self::Centroid => "centroid",
            Self::Median => "median",
            Self::Ward => "ward",
        };
        f.write_str(name)
    }
}

impl FromStr for LinkageMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "complete" => Ok(Self::Complete),
            "average" => Ok(Self::Average),
            "weighted" => Ok(Self::Weighted),
            "centroid" => Ok(Self::Centroid),
            "median" => Ok(Self::Median),
            "ward" => Ok(Self::Ward),
            other => Err(format!("unknown linkage method '{}'", other)),
        }
    }
}

/// Distance metric between observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    Chebyshev,
    Cosine,
}

impl DistanceMetric {
    /// Distance between two equal-length vectors.
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "vectors must have equal dimension");
        match self {
            Self::Euclidean => squared_euclidean(a, b).sqrt(),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Self::Chebyshev => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            Self::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                let denom = norm_a * norm_b;
                if denom > 0.0 {
                    1.0 - dot / denom
                } else {
                    // Zero vectors compare as identical.
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
            Self::Cosine => "cosine",
        };
        f.write_str(name)
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Self::Euclidean),
            "manhattan" | "cityblock" => Ok(Self::Manhattan),
            "chebyshev" => Ok(Self::Chebyshev),
            "cosine" => Ok(Self::Cosine),
            other => Err(format!("unknown distance metric '{}'", other)),
        }
    }
}

#[inline]
fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Build the feature matrix for clustering.
///
/// Rows with holes in *any* column are dropped (via hole filtering of the
/// whole table, so the matrix rows align with [`HoleMap`] compact indices),
/// then the requested feature columns are projected in *table column order*,
/// a fixed ordering independent of set iteration. With `normalize`, each
/// column is standardized (mean 0, sample standard deviation 1); a
/// zero-variance column standardizes to all zeros instead of propagating a
/// division by zero.
///
/// # Arguments
///
/// * `table` - Source table (may contain holes)
/// * `features` - Names of the columns to cluster on
/// * `normalize` - Column-standardize the projected values
///
/// # Errors
///
/// Fails if a requested feature is not a table column, or no complete rows
/// remain.
pub fn prepare_matrix(
    table: &MeasurementTable,
    features: &HashSet<String>,
    normalize: bool,
) -> Result<Vec<Vec<f64>>> {
    let mut missing: Vec<&str> = features
        .iter()
        .map(|name| name.as_str())
        .filter(|name| table.column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(ClusteringError::UnknownFeatures(missing.join(", ")));
    }

    let filtered = filter_holes(table);
    if filtered.row_count() == 0 {
        return Err(ClusteringError::EmptyMatrix);
    }

    // Projection order is the table's own column order restricted to the
    // requested set.
    let selected: Vec<&[f64]> = filtered
        .column_names()
        .iter()
        .filter(|name| features.contains(*name))
        .filter_map(|name| filtered.column(name))
        .collect();

    let rows = filtered.row_count();
    let mut matrix: Vec<Vec<f64>> = (0..rows)
        .map(|i| selected.iter().map(|column| column[i]).collect())
        .collect();

    if normalize {
        for col in 0..selected.len() {
            let mean = selected[col].iter().sum::<f64>() / rows as f64;
            let std = if rows > 1 {
                let var = selected[col]
                    .iter()
                    .map(|v| {
                        let d = v - mean;
                        d * d
                    })
                    .sum::<f64>()
                    / (rows - 1) as f64;
                var.sqrt()
            } else {
                0.0
            };

            for row in matrix.iter_mut() {
                row[col] = if std > 0.0 { (row[col] - mean) / std } else { 0.0 };
            }
        }
    }

    Ok(matrix)
}

/// Agglomerative hierarchical clustering cut into flat clusters.
///
/// Starts from singleton clusters, repeatedly merges the closest active
/// pair under the chosen linkage method (cluster-to-cluster distances
/// maintained with the Lance-Williams recurrence; the Euclidean-only
/// methods operate on squared distances), and stops when `cluster_count`
/// clusters remain. Flat labels are `1..=cluster_count`, assigned in order
/// of each cluster's first row; that assignment order is an
/// implementation-defined deterministic tie-break, not a semantic guarantee.
///
/// # Arguments
///
/// * `matrix` - Feature matrix from [`prepare_matrix`]
/// * `method` - Linkage method
/// * `metric` - Distance metric; must be Euclidean for centroid/median/ward
/// * `cluster_count` - Number of flat clusters to produce
///
/// # Returns
///
/// One label per matrix row, in `1..=cluster_count`.
///
/// # Panics
///
/// Panics on caller contract violations: an empty matrix, a cluster count
/// outside `1..=rows`, or a non-Euclidean metric paired with a method that
/// requires Euclidean geometry (asserted rather than silently overridden,
/// so configuration errors surface early).
///
/// # Performance
///
/// O(n³) over the full pairwise distance matrix; grid scans are a few
/// hundred points, so simplicity wins over a nearest-neighbor-chain scheme.
pub fn hierarchical_clustering(
    matrix: &[Vec<f64>],
    method: LinkageMethod,
    metric: DistanceMetric,
    cluster_count: usize,
) -> Vec<usize> {
    let n = matrix.len();
    assert!(n > 0, "cannot cluster an empty matrix");
    assert!(
        (1..=n).contains(&cluster_count),
        "cluster count {} outside 1..={}",
        cluster_count,
        n
    );
    assert!(
        !method.requires_euclidean() || metric == DistanceMetric::Euclidean,
        "{} linkage requires the euclidean metric, got {}",
        method,
        metric
    );

    let squared = method.squared_space();

    // Pairwise distance matrix; the Euclidean-only methods run their
    // recurrence on squared distances.
    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = if squared {
                squared_euclidean(&matrix[i], &matrix[j])
            } else {
                metric.distance(&matrix[i], &matrix[j])
            };
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut active: Vec<bool> = vec![true; n];
    let mut sizes: Vec<f64> = vec![1.0; n];
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    for _ in 0..n - cluster_count {
        // Closest active pair; ties go to the lowest index pair.
        let mut best = (0, 0);
        let mut best_dist = f64::INFINITY;
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if active[j] && dist[i][j] < best_dist {
                    best_dist = dist[i][j];
                    best = (i, j);
                }
            }
        }

        let (a, b) = best;
        let (na, nb) = (sizes[a], sizes[b]);
        let dab = dist[a][b];

        // Lance-Williams update of every remaining cluster's distance to
        // the merged cluster, stored in slot `a`.
        for k in 0..n {
            if !active[k] || k == a || k == b {
                continue;
            }
            let (dka, dkb) = (dist[k][a], dist[k][b]);
            let nk = sizes[k];

            let updated = match method {
                LinkageMethod::Single => dka.min(dkb),
                LinkageMethod::Complete => dka.max(dkb),
                LinkageMethod::Average => (na * dka + nb * dkb) / (na + nb),
                LinkageMethod::Weighted => 0.5 * (dka + dkb),
                LinkageMethod::Centroid => {
                    (na * dka + nb * dkb) / (na + nb) - na * nb * dab / ((na + nb) * (na + nb))
                }
                LinkageMethod::Median => 0.5 * dka + 0.5 * dkb - 0.25 * dab,
                LinkageMethod::Ward => {
                    ((na + nk) * dka + (nb + nk) * dkb - nk * dab) / (na + nb + nk)
                }
            };
            dist[k][a] = updated;
            dist[a][k] = updated;
        }

        sizes[a] += sizes[b];
        let absorbed = std::mem::take(&mut members[b]);
        members[a].extend(absorbed);
        active[b] = false;
    }

    // Flat labels 1..=cluster_count in order of first row occurrence.
    let mut cluster_of_row = vec![0usize; n];
    for (slot, rows) in members.iter().enumerate() {
        if active[slot] {
            for &row in rows {
                cluster_of_row[row] = slot;
            }
        }
    }

    let mut label_of_slot = vec![0usize; n];
    let mut next_label = 0usize;
    let mut labels = Vec::with_capacity(n);
    for row in 0..n {
        let slot = cluster_of_row[row];
        if label_of_slot[slot] == 0 {
            next_label += 1;
            label_of_slot[slot] = next_label;
        }
        labels.push(label_of_slot[slot]);
    }

    labels
}

/// Seeded k-means partition.
///
/// Lloyd iteration initialized *exactly* at the given seed vectors, which
/// need not be rows of the matrix; only the feature dimensionality must
/// match. Each row is assigned to the nearest centroid (Euclidean, ties to
/// the lowest seed index); centroids are then recomputed as member means,
/// with an empty cluster keeping its previous centroid. Iteration stops
/// when assignments no longer change, or after `max_iterations`.
///
/// Labels are `0..seeds.len()-1` in seed order: label *i* is the cluster
/// that grew out of seed *i*.
///
/// # Panics
///
/// Panics on caller contract violations: no seeds, an empty matrix, or a
/// seed whose dimensionality differs from the matrix.
pub fn seeded_partition(
    matrix: &[Vec<f64>],
    seeds: &[Vec<f64>],
    max_iterations: usize,
) -> Vec<usize> {
    assert!(!seeds.is_empty(), "at least one seed point is required");
    assert!(!matrix.is_empty(), "cannot partition an empty matrix");
    let dim = matrix[0].len();
    assert!(
        seeds.iter().all(|s| s.len() == dim),
        "seed dimensionality must match the feature matrix ({} features)",
        dim
    );

    let mut centroids: Vec<Vec<f64>> = seeds.to_vec();
    let mut assignments = vec![0usize; matrix.len()];

    for _ in 0..max_iterations {
        // Assignment step.
        let mut changed = false;
        for (row, point) in matrix.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_euclidean(point, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            if assignments[row] != best {
                assignments[row] = best;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        // Update step: mean of members; empty clusters keep their centroid.
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let mut count = 0usize;
            let mut sums = vec![0.0f64; dim];
            for (row, point) in matrix.iter().enumerate() {
                if assignments[row] == c {
                    count += 1;
                    for (s, v) in sums.iter_mut().zip(point) {
                        *s += v;
                    }
                }
            }
            if count > 0 {
                for (dst, s) in centroid.iter_mut().zip(&sums) {
                    *dst = s / count as f64;
                }
            }
        }
    }

    assignments
}

/// Resolve an (x, y) image coordinate to its table row index.
///
/// Row order matches the row-major reshape used for display: the row is
/// `x + y * width`. Returns None when the coordinate falls outside the grid
/// or the table is not square (the latter cannot happen for parsed tables).
pub fn grid_point_row_index(table: &MeasurementTable, x: usize, y: usize) -> Option<usize> {
    let width = grid::image_width(table.row_count()).ok()?;
    if x >= width || y >= width {
        return None;
    }
    Some(x + y * width)
}

/// Per-column descriptive statistics of one cluster.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Descriptive summary of one cluster over the source table.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    /// Cluster label as produced by the clustering run.
    pub label: usize,
    /// Number of grid points in the cluster.
    pub point_count: usize,
    /// Statistics per table column, in table order.
    pub columns: Vec<ColumnStats>,
}

/// Summarize clustering output per cluster, over all table columns.
///
/// `labels` is the compact assignment (one label per hole-free row, aligned
/// with `map`); statistics are computed from the original table rows each
/// compact index maps back to. Clusters come out sorted by label.
pub fn cluster_summary(
    table: &MeasurementTable,
    labels: &[usize],
    map: &HoleMap,
) -> Vec<ClusterSummary> {
    let mut unique: Vec<usize> = labels.to_vec();
    unique.sort_unstable();
    unique.dedup();

    unique
        .into_iter()
        .map(|label| {
            let rows: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == label)
                .filter_map(|(compact, _)| map.original_index(compact))
                .collect();

            let columns = table
                .column_names()
                .iter()
                .filter_map(|name| table.column(name).map(|column| (name, column)))
                .map(|(name, column)| {
                    // Compact rows are hole-free by construction.
                    let values: Vec<f64> = rows.iter().map(|&i| column[i]).collect();
                    let count = values.len() as f64;
                    let mean = values.iter().sum::<f64>() / count;
                    let std = if values.len() > 1 {
                        (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
                            / (count - 1.0))
                            .sqrt()
                    } else {
                        0.0
                    };
                    ColumnStats {
                        name: name.clone(),
                        mean,
                        std,
                        min: values.iter().copied().fold(f64::INFINITY, f64::min),
                        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    }
                })
                .collect();

            ClusterSummary {
                label,
                point_count: rows.len(),
                columns,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn two_blob_matrix() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_prepare_matrix_projects_in_table_order() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", vec![1.0, 2.0]);
        table.push_column("b", vec![3.0, 4.0]);
        table.push_column("c", vec![5.0, 6.0]);

        // The request set lists columns out of order; projection follows the
        // table: a, then c.
        let matrix = prepare_matrix(&table, &feature_set(&["c", "a"]), false).unwrap();
        assert_eq!(matrix, vec![vec![1.0, 5.0], vec![2.0, 6.0]]);
    }

    #[test]
    fn test_prepare_matrix_drops_hole_rows() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", vec![1.0, f64::NAN, 3.0]);
        table.push_column("b", vec![4.0, 5.0, 6.0]);

        // Row 1 is dropped even though "b", the only requested feature, has
        // no hole there.
        let matrix = prepare_matrix(&table, &feature_set(&["b"]), false).unwrap();
        assert_eq!(matrix, vec![vec![4.0], vec![6.0]]);
    }

    #[test]
    fn test_prepare_matrix_unknown_features() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", vec![1.0]);

        match prepare_matrix(&table, &feature_set(&["z", "b"]), false) {
            Err(ClusteringError::UnknownFeatures(names)) => assert_eq!(names, "b, z"),
            other => panic!("expected UnknownFeatures, got {:?}", other),
        }
    }

    #[test]
    fn test_prepare_matrix_normalizes() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", vec![1.0, 2.0, 3.0]);
        table.push_column("flat", vec![5.0, 5.0, 5.0]);

        let matrix = prepare_matrix(&table, &feature_set(&["a", "flat"]), true).unwrap();

        // Sample standard deviation of 1, 2, 3 is 1.
        assert!((matrix[0][0] + 1.0).abs() < 1e-12);
        assert!(matrix[1][0].abs() < 1e-12);
        assert!((matrix[2][0] - 1.0).abs() < 1e-12);
        // Zero-variance column standardizes to zeros, not NaN.
        assert!(matrix.iter().all(|row| row[1] == 0.0));
    }

    #[test]
    fn test_hierarchical_separates_blobs() {
        for method in [
            LinkageMethod::Single,
            LinkageMethod::Complete,
            LinkageMethod::Average,
            LinkageMethod::Weighted,
            LinkageMethod::Ward,
        ] {
            let metric = DistanceMetric::Euclidean;
            let labels = hierarchical_clustering(&two_blob_matrix(), method, metric, 2);

            assert_eq!(labels.len(), 6);
            assert_eq!(labels[0], 1, "{} first blob should take label 1", method);
            assert!(labels[..3].iter().all(|&l| l == 1));
            assert!(labels[3..].iter().all(|&l| l == 2));
        }
    }

    #[test]
    fn test_hierarchical_labels_cover_range() {
        let labels =
            hierarchical_clustering(&two_blob_matrix(), LinkageMethod::Ward, DistanceMetric::Euclidean, 3);
        let unique: HashSet<usize> = labels.iter().copied().collect();
        assert_eq!(unique, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_hierarchical_single_cluster() {
        let labels = hierarchical_clustering(
            &two_blob_matrix(),
            LinkageMethod::Average,
            DistanceMetric::Manhattan,
            1,
        );
        assert!(labels.iter().all(|&l| l == 1));
    }

    #[test]
    #[should_panic(expected = "requires the euclidean metric")]
    fn test_hierarchical_rejects_non_euclidean_ward() {
        hierarchical_clustering(
            &two_blob_matrix(),
            LinkageMethod::Ward,
            DistanceMetric::Manhattan,
            2,
        );
    }

    #[test]
    fn test_seeded_partition_converges_on_seed_rows() {
        let matrix = two_blob_matrix();
        // Seeds equal to actual data rows: each seed row must end up in its
        // own seed's cluster.
        let seeds = vec![matrix[0].clone(), matrix[3].clone()];

        let labels = seeded_partition(&matrix, &seeds, 2000);

        assert_eq!(labels[0], 0);
        assert_eq!(labels[3], 1);
        assert!(labels[..3].iter().all(|&l| l == 0));
        assert!(labels[3..].iter().all(|&l| l == 1));
    }

    #[test]
    fn test_seeded_partition_labels_in_seed_order() {
        let matrix = two_blob_matrix();
        // Swapped seeds swap the labels.
        let seeds = vec![matrix[3].clone(), matrix[0].clone()];

        let labels = seeded_partition(&matrix, &seeds, 2000);
        assert!(labels[..3].iter().all(|&l| l == 1));
        assert!(labels[3..].iter().all(|&l| l == 0));
    }

    #[test]
    fn test_seeded_partition_is_deterministic() {
        let matrix = two_blob_matrix();
        let seeds = vec![vec![1.0, 1.0], vec![9.0, 9.0]];

        let first = seeded_partition(&matrix, &seeds, 2000);
        let second = seeded_partition(&matrix, &seeds, 2000);
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "seed dimensionality")]
    fn test_seeded_partition_rejects_bad_seed_dim() {
        seeded_partition(&two_blob_matrix(), &[vec![0.0, 0.0, 0.0]], 10);
    }

    #[test]
    fn test_distance_metrics() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];

        assert!((DistanceMetric::Euclidean.distance(&a, &b) - 5.0).abs() < 1e-12);
        assert!((DistanceMetric::Manhattan.distance(&a, &b) - 7.0).abs() < 1e-12);
        assert!((DistanceMetric::Chebyshev.distance(&a, &b) - 4.0).abs() < 1e-12);

        let c = [1.0, 0.0];
        let d = [0.0, 1.0];
        assert!((DistanceMetric::Cosine.distance(&c, &d) - 1.0).abs() < 1e-12);
        assert!(DistanceMetric::Cosine.distance(&c, &c).abs() < 1e-12);
    }

    #[test]
    fn test_method_and_metric_parsing() {
        assert_eq!("ward".parse::<LinkageMethod>().unwrap(), LinkageMethod::Ward);
        assert_eq!(
            "cityblock".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Manhattan
        );
        assert!("nope".parse::<LinkageMethod>().is_err());
        assert!("nope".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_grid_point_row_index() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", (0..9).map(|i| i as f64).collect());

        assert_eq!(grid_point_row_index(&table, 0, 0), Some(0));
        assert_eq!(grid_point_row_index(&table, 2, 1), Some(5));
        assert_eq!(grid_point_row_index(&table, 3, 0), None);
    }

    #[test]
    fn test_cluster_summary() {
        let mut table = MeasurementTable::new("t");
        table.push_column("a", vec![1.0, f64::NAN, 3.0, 5.0]);
        let map = HoleMap::build(&table);

        // Compact rows 0..3 map to original rows 0, 2, 3.
        let labels = vec![1usize, 1, 2];
        let summary = cluster_summary(&table, &labels, &map);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].label, 1);
        assert_eq!(summary[0].point_count, 2);
        assert!((summary[0].columns[0].mean - 2.0).abs() < 1e-12);
        assert_eq!(summary[1].point_count, 1);
        assert_eq!(summary[1].columns[0].min, 5.0);
        assert_eq!(summary[1].columns[0].std, 0.0);
    }
}
