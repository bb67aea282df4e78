//! Limit operator for row limiting.

use serde::{Deserialize, Serialize};

/// Limit operator - limits number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOp {
    /// Maximum number of rows.
    pub limit: usize,
    /// Optional offset for pagination.
    pub offset: Option<usize>,
}

impl LimitOp {
    /// Create a new limit operation.
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            offset: None,
        }
    }

    /// Add an offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl std::fmt::Display for LimitOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "Limit({}, offset={offset})", self.limit),
            None => write!(f, "Limit({})", self.limit),
        }
    }
}
