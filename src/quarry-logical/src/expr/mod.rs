//! Logical expression module.

mod binary;
mod eval;
mod expression;
mod func;
mod unary;
mod utils;

pub use binary::BinaryOp;
pub use eval::{evaluate, evaluate_predicate};
pub use expression::LogicalExpr;
pub use func::{Determinism, FuncExpr, builtin};
pub use unary::UnaryOp;
pub use utils::{conjunction, normalize_columns, split_conjunction};

use quarry_core::Value;

/// Create a column reference expression.
pub fn col(name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::column(name)
}

/// Create a qualified column reference expression.
pub fn qualified_col(qualifier: impl Into<String>, name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::qualified_column(qualifier, name)
}

/// Create a literal expression.
pub fn lit(value: impl Into<Value>) -> LogicalExpr {
    LogicalExpr::literal(value)
}
