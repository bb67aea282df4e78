//! Partition catalog interface for Quarry.
//!
//! The planner reaches partition metadata only through [`PartitionCatalog`].
//! [`InMemoryCatalog`] is a complete implementation backed by process memory,
//! used by tests and embedded deployments.

mod catalog;
mod memory;
mod pushdown;

pub use catalog::PartitionCatalog;
pub use memory::InMemoryCatalog;
pub use pushdown::is_pushdown_supported;
