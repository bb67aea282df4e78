//! Data type definitions for Quarry schemas.

use serde::{Deserialize, Serialize};

/// Data type for schema columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Null type (unknown or absent).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Date (days since epoch).
    Date,
    /// Timestamp with nanosecond precision, normalized to UTC.
    Timestamp,
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Check if this type is a temporal type.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Timestamp | Self::Date)
    }

    /// Get the display name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Date => "Date",
            Self::Timestamp => "Timestamp",
        }
    }

    /// Check if this type can be coerced to another type.
    pub fn can_coerce_to(&self, target: &Self) -> bool {
        self == target || matches!((self, target), (Self::Null, _) | (Self::Int64, Self::Float64))
    }

    /// Get the common supertype of two types.
    pub fn common_supertype(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(self.clone());
        }

        match (self, other) {
            (Self::Null, t) | (t, Self::Null) => Some(t.clone()),
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Some(Self::Float64),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coercion() {
        assert!(DataType::Int64.can_coerce_to(&DataType::Float64));
        assert!(DataType::Null.can_coerce_to(&DataType::String));
        assert!(!DataType::String.can_coerce_to(&DataType::Int64));
    }

    #[test]
    fn test_common_supertype() {
        assert_eq!(
            DataType::Int64.common_supertype(&DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(
            DataType::Null.common_supertype(&DataType::Date),
            Some(DataType::Date)
        );
        assert_eq!(DataType::String.common_supertype(&DataType::Bool), None);
    }
}
