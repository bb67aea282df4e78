//! Filter operator for predicate-based filtering.

use serde::{Deserialize, Serialize};

use crate::expr::{LogicalExpr, split_conjunction};

/// Filter operator - predicate-based row filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOp {
    /// Filter predicate (must evaluate to bool).
    pub predicate: LogicalExpr,
}

impl FilterOp {
    /// Create a new filter operation.
    pub const fn new(predicate: LogicalExpr) -> Self {
        Self { predicate }
    }

    /// Top-level AND conjuncts of the predicate.
    pub fn conjuncts(&self) -> Vec<&LogicalExpr> {
        split_conjunction(&self.predicate)
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.predicate)
    }
}
