//! Schema system for Quarry.
//!
//! Tables expose an ordered list of typed columns. Column lookup is
//! case-insensitive.

mod schema_impl;

pub use schema_impl::{ColumnInfo, Schema};
