//! Type system for Quarry values.
//!
//! This module defines the `Value` enum for runtime values, `DataType` for
//! type information, `Row` for named tuples of values, and the session time
//! zone used when temporal strings are turned into values.

mod data_type;
mod row;
mod time_zone;
mod value;

pub use data_type::DataType;
pub use row::Row;
pub use time_zone::SessionTimeZone;
pub use value::Value;
