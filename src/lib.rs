//! Nanoindentation grid-scan processing pipeline.
//!
//! This crate provides tools for:
//! - Parsing raw nanoindenter text exports into validated square-grid tables
//! - Hole-aware index mapping between the full grid and its complete rows
//! - Phase clustering (hierarchical linkage and seeded k-means partition)
//! - Rendering measurement fields and cluster maps as PNG images
//! - Batch conversion of raw exports to CSV
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashSet;
//! use indent_pipeline::core::{parse_raw, HoleMap};
//! use indent_pipeline::processors::clustering::{
//!     hierarchical_clustering, prepare_matrix, DistanceMetric, LinkageMethod,
//! };
//!
//! let table = parse_raw("scan.txt", None).unwrap();
//! let features: HashSet<String> =
//!     indent_pipeline::core::DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect();
//! let matrix = prepare_matrix(&table, &features, true).unwrap();
//! let labels = hierarchical_clustering(&matrix, LinkageMethod::Ward, DistanceMetric::Euclidean, 3);
//! let filled = HoleMap::build(&table).scatter(&labels, 0).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{HierarchicalConfig, ParserConfig, PipelineConfig, RenderConfig, SeededConfig};
pub use core::{HoleMap, MeasurementTable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
