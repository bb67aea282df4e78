//! Expression utilities shared by planner rules.

use quarry_core::Schema;

use super::{BinaryOp, LogicalExpr};

/// Split a predicate into its top-level AND conjuncts.
pub fn split_conjunction(expr: &LogicalExpr) -> Vec<&LogicalExpr> {
    let mut conjuncts = Vec::new();
    collect_conjuncts(expr, &mut conjuncts);
    conjuncts
}

fn collect_conjuncts<'a>(expr: &'a LogicalExpr, out: &mut Vec<&'a LogicalExpr>) {
    match expr {
        LogicalExpr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        other => out.push(other),
    }
}

/// Combine predicates with AND, left-deep. Returns `None` for an empty input.
pub fn conjunction(exprs: impl IntoIterator<Item = LogicalExpr>) -> Option<LogicalExpr> {
    exprs.into_iter().reduce(LogicalExpr::and)
}

/// Rewrite column references that resolve against `schema` to the schema's
/// spelling of the column name.
///
/// Qualified references are resolved only when the qualifier matches one of
/// `qualifiers` (case-insensitively); the qualifier is then dropped.
pub fn normalize_columns(expr: LogicalExpr, schema: &Schema, qualifiers: &[&str]) -> LogicalExpr {
    expr.rewrite_columns(&|qualifier, name| {
        let qualifier_known =
            qualifier.is_none_or(|q| qualifiers.iter().any(|known| known.eq_ignore_ascii_case(q)));
        if !qualifier_known {
            return None;
        }
        schema
            .find_column(name)
            .map(|column| LogicalExpr::Column(column.name.clone()))
    })
}
