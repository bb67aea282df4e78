//! Core data model for Quarry.
//!
//! This crate provides the fundamental types shared by the planner:
//! - `Value` and `DataType` for the type system
//! - `Schema` for table column information
//! - `SessionTimeZone` for interpreting temporal partition values
//! - `TableHandle` and `CatalogPartition` for partitioned-table metadata

pub mod schema;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use schema::{ColumnInfo, Schema};
pub use table::{
    CatalogPartition, DEFAULT_PARTITION_NAME, RAW_DATA_SIZE, TOTAL_SIZE, TableHandle, TableIdent,
    TableStatistics,
};
pub use types::{DataType, Row, SessionTimeZone, Value};
