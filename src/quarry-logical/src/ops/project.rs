//! Project operator: column selection and computation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// Project operator - column selection and computation.
///
/// Computed columns introduce new names through aliases. A projection never
/// changes cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOp {
    /// Expressions to project (column refs or computed expressions).
    pub expressions: Vec<LogicalExpr>,
}

impl ProjectOp {
    /// Create a new projection with column names.
    pub fn columns(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            expressions: names.into_iter().map(|n| LogicalExpr::column(n)).collect(),
        }
    }

    /// Create a new projection with expressions.
    pub const fn new(expressions: Vec<LogicalExpr>) -> Self {
        Self { expressions }
    }

    /// Add an expression to the projection.
    #[must_use]
    pub fn with_expr(mut self, expr: LogicalExpr) -> Self {
        self.expressions.push(expr);
        self
    }

    /// Get the output column names.
    pub fn output_names(&self) -> Vec<String> {
        self.expressions
            .iter()
            .map(LogicalExpr::output_name)
            .collect()
    }

    /// Check if this projection includes a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.expressions
            .iter()
            .any(|e| matches!(e, LogicalExpr::Wildcard))
    }

    /// Whether every projected expression is deterministic.
    pub fn is_deterministic(&self) -> bool {
        self.expressions.iter().all(LogicalExpr::is_deterministic)
    }

    /// Aliased expressions as `(alias, underlying expression)` pairs.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &LogicalExpr)> {
        self.expressions.iter().filter_map(|e| match e {
            LogicalExpr::Alias { expr, alias } => Some((alias.as_str(), expr.as_ref())),
            _ => None,
        })
    }

    /// Get all column references from projection expressions.
    pub fn column_refs(&self) -> HashSet<String> {
        self.expressions
            .iter()
            .flat_map(LogicalExpr::column_refs)
            .collect()
    }
}

impl std::fmt::Display for ProjectOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Project({})", self.output_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    #[test]
    fn test_project_columns() {
        let project = ProjectOp::columns(["amount", "year"]);
        assert_eq!(project.output_names(), vec!["amount", "year"]);
        assert_eq!(project.to_string(), "Project(amount, year)");
    }

    #[test]
    fn test_aliases_and_determinism() {
        let project = ProjectOp::columns(["amount"])
            .with_expr(col("year").alias("y"))
            .with_expr(LogicalExpr::function("rand", vec![]).alias("r"));

        let aliases: Vec<_> = project.aliases().map(|(name, _)| name).collect();
        assert_eq!(aliases, vec!["y", "r"]);
        assert!(!project.is_deterministic());
        assert!(project.column_refs().contains("year"));
    }
}
