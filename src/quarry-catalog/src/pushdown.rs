//! Predicate shapes a catalog can evaluate without reading data.

use quarry_core::TableHandle;
use quarry_logical::{LogicalExpr, UnaryOp};

/// Whether `predicate` only uses forms supported by catalog push-down.
///
/// Supported: a partition column compared with a literal, `IN` lists and
/// `BETWEEN` over literals, `IS [NOT] NULL`, and `AND`/`OR`/`NOT` of those.
pub fn is_pushdown_supported(predicate: &LogicalExpr, table: &TableHandle) -> bool {
    let is_partition_column = |e: &LogicalExpr| match e {
        LogicalExpr::Column(name) => table.is_partition_column(name),
        _ => false,
    };

    match predicate {
        LogicalExpr::Binary { left, op, right } if op.is_logical() => {
            is_pushdown_supported(left, table) && is_pushdown_supported(right, table)
        }
        LogicalExpr::Binary { left, op, right } if op.is_comparison() => {
            (is_partition_column(left) && right.is_literal())
                || (left.is_literal() && is_partition_column(right))
        }
        LogicalExpr::Unary {
            op: UnaryOp::Not,
            expr,
        } => is_pushdown_supported(expr, table),
        LogicalExpr::Unary {
            op: UnaryOp::IsNull | UnaryOp::IsNotNull,
            expr,
        } => is_partition_column(expr),
        LogicalExpr::InList { expr, list, .. } => {
            is_partition_column(expr) && list.iter().all(LogicalExpr::is_literal)
        }
        LogicalExpr::Between {
            expr, low, high, ..
        } => is_partition_column(expr) && low.is_literal() && high.is_literal(),
        _ => false,
    }
}
