//! Union operator.

use serde::{Deserialize, Serialize};

/// Union operator - multiset union of two inputs with compatible schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct UnionOp {
    /// Whether to remove duplicates (UNION vs UNION ALL).
    pub distinct: bool,
}

impl UnionOp {
    /// Create a UNION ALL (preserves duplicates).
    pub const fn all() -> Self {
        Self { distinct: false }
    }

    /// Create a UNION DISTINCT (removes duplicates).
    pub const fn distinct() -> Self {
        Self { distinct: true }
    }
}

impl std::fmt::Display for UnionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.distinct {
            write!(f, "Union(DISTINCT)")
        } else {
            write!(f, "Union(ALL)")
        }
    }
}
