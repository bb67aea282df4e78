//! Configuration management for Quarry.
//!
//! Provides the session-scoped planner configuration: which partition pruning
//! strategy to use, the session time zone, and optimizer iteration limits.

use std::path::Path;

use common_error::QuarryResult;
use serde::{Deserialize, Serialize};

/// Global Quarry planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Optimizer driver configuration.
    pub optimizer: OptimizerSettings,
    /// Partition pruning configuration.
    pub partition_pruning: PartitionPruningConfig,
}

impl QuarryConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> QuarryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> QuarryResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Optimizer driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Maximum number of fixpoint iterations.
    pub max_iterations: usize,
    /// Record before/after plans for every rule that fires.
    pub enable_trace: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            enable_trace: false,
        }
    }
}

/// Partition pruning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionPruningConfig {
    /// Push partition predicates down to the catalog's filtered listing.
    ///
    /// When disabled, every partition is listed and the predicates are
    /// evaluated locally.
    pub catalog_side_pruning: bool,
    /// Session time zone used to interpret temporal partition values.
    pub session_time_zone: String,
}

impl Default for PartitionPruningConfig {
    fn default() -> Self {
        Self {
            catalog_side_pruning: true,
            session_time_zone: "UTC".to_string(),
        }
    }
}

impl PartitionPruningConfig {
    /// Select catalog-side or client-side pruning.
    #[must_use]
    pub fn with_catalog_side_pruning(mut self, enabled: bool) -> Self {
        self.catalog_side_pruning = enabled;
        self
    }

    /// Set the session time zone identifier.
    #[must_use]
    pub fn with_session_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.session_time_zone = time_zone.into();
        self
    }
}
