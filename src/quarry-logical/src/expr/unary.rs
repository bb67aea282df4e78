//! Unary operators for logical expressions.

use serde::{Deserialize, Serialize};

/// Unary operators for logical expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT
    Not,
    /// Arithmetic negation (-)
    Neg,
    /// NULL check (IS NULL)
    IsNull,
    /// NOT NULL check (IS NOT NULL)
    IsNotNull,
}

impl UnaryOp {
    /// Get the operator name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Neg => "-",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
