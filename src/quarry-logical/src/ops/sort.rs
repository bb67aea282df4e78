//! Sort operator.

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// Sort key specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    /// Expression to sort by.
    pub expr: LogicalExpr,
    /// Sort direction (ascending if true).
    pub ascending: bool,
    /// Nulls first (if true, NULLs come before non-NULLs).
    pub nulls_first: bool,
}

impl SortKey {
    /// Create a new ascending sort key.
    pub const fn asc(expr: LogicalExpr) -> Self {
        Self {
            expr,
            ascending: true,
            nulls_first: false,
        }
    }

    /// Create a new descending sort key.
    pub const fn desc(expr: LogicalExpr) -> Self {
        Self {
            expr,
            ascending: false,
            nulls_first: true,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };
        let nulls = if self.nulls_first {
            "NULLS FIRST"
        } else {
            "NULLS LAST"
        };
        write!(f, "{} {dir} {nulls}", self.expr)
    }
}

/// Sort operator - row ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOp {
    /// Sort keys in order of precedence.
    pub keys: Vec<SortKey>,
}

impl SortOp {
    /// Create a new sort operation.
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Create a single-key ascending sort.
    pub fn asc(expr: LogicalExpr) -> Self {
        Self::new(vec![SortKey::asc(expr)])
    }

    /// Create a single-key descending sort.
    pub fn desc(expr: LogicalExpr) -> Self {
        Self::new(vec![SortKey::desc(expr)])
    }
}

impl std::fmt::Display for SortOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self
            .keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Sort({keys})")
    }
}
