//! Configuration types for the indentation pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processors::clustering::{DistanceMetric, LinkageMethod};

/// Configuration for the raw-export parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Stable-sort rows by (Y, X) before the square check. Off by default;
    /// most exports already arrive in scan order.
    #[serde(default)]
    pub sort_x_y: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { sort_x_y: false }
    }
}

/// Configuration for hierarchical clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchicalConfig {
    /// Linkage method used to merge clusters
    #[serde(default = "default_linkage_method")]
    pub method: LinkageMethod,

    /// Distance metric between observations
    #[serde(default = "default_distance_metric")]
    pub metric: DistanceMetric,

    /// Number of flat clusters to cut the tree into
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,
}

fn default_linkage_method() -> LinkageMethod {
    LinkageMethod::Ward
}

fn default_distance_metric() -> DistanceMetric {
    DistanceMetric::Euclidean
}

fn default_cluster_count() -> usize {
    3
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            method: default_linkage_method(),
            metric: default_distance_metric(),
            cluster_count: default_cluster_count(),
        }
    }
}

/// Configuration for seeded partition clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededConfig {
    /// Maximum centroid-reassignment iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_max_iterations() -> usize {
    2000
}

impl Default for SeededConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// Configuration for grid rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Edge length of one grid cell in pixels
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,

    /// RGB color painted over hole cells
    #[serde(default = "default_hole_fill")]
    pub hole_fill: [u8; 3],
}

fn default_cell_size() -> u32 {
    32
}

fn default_hole_fill() -> [u8; 3] {
    [0, 0, 0]
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            hole_fill: default_hole_fill(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub hierarchical: HierarchicalConfig,

    #[serde(default)]
    pub seeded: SeededConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
