//! Data processing modules.

pub mod clustering;
pub mod convert;

// Re-export key types for convenience
pub use clustering::{
    cluster_summary, grid_point_row_index, hierarchical_clustering, prepare_matrix,
    seeded_partition, ClusteringError, ClusterSummary, DistanceMetric, LinkageMethod,
};
pub use convert::{convert_batch, convert_single_file, find_raw_files, ConvertError};
