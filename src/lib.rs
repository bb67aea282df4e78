//! Quarry - partition pruning for partitioned-table query plans
//!
//! Quarry rewrites logical plans so that scans of partitioned tables read
//! only the partitions their filters can match, and refreshes the table size
//! statistic the cost-based optimizer sees.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_error as error;
pub use quarry_catalog as catalog;
pub use quarry_core as core;
pub use quarry_logical as logical;
pub use quarry_optimizer as optimizer;

/// Quarry version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
