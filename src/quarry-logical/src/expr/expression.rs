//! Logical expression system.
//!
//! Expressions are the predicates and projections carried by logical
//! operators. The partition pruning rule relies on three analyses defined
//! here: referenced columns, determinism, and subquery containment.

use std::collections::HashSet;

use quarry_core::{DataType, Value};
use serde::{Deserialize, Serialize};

use super::{BinaryOp, FuncExpr, UnaryOp};
use crate::LogicalPlan;

/// A logical expression in the Quarry planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalExpr {
    /// A literal constant value.
    Literal(Value),

    /// A column reference (unqualified).
    Column(String),

    /// A qualified column reference (table_or_alias.column).
    QualifiedColumn {
        /// Table name or alias.
        qualifier: String,
        /// Column name.
        name: String,
    },

    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Self>,
    },

    /// A unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Self>,
    },

    /// A function call.
    Function(FuncExpr),

    /// A type cast.
    Cast {
        /// Expression to convert.
        expr: Box<Self>,
        /// Target type.
        data_type: DataType,
    },

    /// An IN list expression.
    InList {
        /// Expression to check.
        expr: Box<Self>,
        /// List of values.
        list: Vec<Self>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// A BETWEEN expression.
    Between {
        /// Expression to check.
        expr: Box<Self>,
        /// Lower bound.
        low: Box<Self>,
        /// Upper bound.
        high: Box<Self>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// An aliased expression.
    Alias {
        /// Original expression.
        expr: Box<Self>,
        /// Alias name.
        alias: String,
    },

    /// A wildcard (*) for all input columns.
    Wildcard,

    /// A scalar subquery.
    Subquery(Box<LogicalPlan>),

    /// An EXISTS subquery.
    Exists {
        /// The subquery.
        subquery: Box<LogicalPlan>,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },

    /// An `expr IN (subquery)` predicate.
    InSubquery {
        /// Expression to check.
        expr: Box<Self>,
        /// The subquery producing candidate values.
        subquery: Box<LogicalPlan>,
        /// Whether this is NOT IN.
        negated: bool,
    },
}

impl LogicalExpr {
    // ========== Constructors ==========

    /// Create a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a column reference.
    ///
    /// A dotted name (`t.year`) becomes a qualified reference.
    pub fn column(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.split_once('.') {
            Some((qualifier, column)) => Self::qualified_column(qualifier, column),
            None => Self::Column(name),
        }
    }

    /// Create a qualified column reference.
    pub fn qualified_column(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::QualifiedColumn {
            qualifier: qualifier.into(),
            name: name.into(),
        }
    }

    /// Create a binary expression.
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression.
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Create a function call expression.
    pub fn function(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function(FuncExpr::new(name, args))
    }

    /// Create a scalar subquery expression.
    pub fn scalar_subquery(plan: LogicalPlan) -> Self {
        Self::Subquery(Box::new(plan))
    }

    /// Create an EXISTS expression.
    pub fn exists(plan: LogicalPlan) -> Self {
        Self::Exists {
            subquery: Box::new(plan),
            negated: false,
        }
    }

    // ========== Convenience builders ==========

    /// Create an aliased expression.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self::Alias {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }

    /// Create a CAST expression.
    #[must_use]
    pub fn cast(self, data_type: DataType) -> Self {
        Self::Cast {
            expr: Box::new(self),
            data_type,
        }
    }

    /// Create an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Create an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Create a NOT expression.
    #[must_use]
    pub fn logical_not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Create an equality expression.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Create an inequality expression.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Create a less than expression.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Create a less than or equal expression.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    /// Create a greater than expression.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Create a greater than or equal expression.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    /// Create an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    /// Create an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self)
    }

    /// Create an addition expression.
    #[must_use]
    pub fn add_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Create a multiplication expression.
    #[must_use]
    pub fn mul_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Multiply, other)
    }

    /// Create an IN list expression.
    #[must_use]
    pub fn in_list(self, list: Vec<Self>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list,
            negated: false,
        }
    }

    /// Create a NOT IN list expression.
    #[must_use]
    pub fn not_in_list(self, list: Vec<Self>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list,
            negated: true,
        }
    }

    /// Create a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    /// Create an `IN (subquery)` expression.
    #[must_use]
    pub fn in_subquery(self, plan: LogicalPlan) -> Self {
        Self::InSubquery {
            expr: Box::new(self),
            subquery: Box::new(plan),
            negated: false,
        }
    }

    // ========== Analysis methods ==========

    /// Get all column references in this expression.
    ///
    /// Qualified references are reported as `qualifier.name`. Columns inside
    /// subqueries belong to the subquery's scope and are not reported.
    pub fn column_refs(&self) -> HashSet<String> {
        let mut refs = HashSet::new();
        self.collect_column_refs(&mut refs);
        refs
    }

    fn collect_column_refs(&self, refs: &mut HashSet<String>) {
        match self {
            Self::Column(name) => {
                refs.insert(name.clone());
            }
            Self::QualifiedColumn { qualifier, name } => {
                refs.insert(format!("{qualifier}.{name}"));
            }
            Self::Binary { left, right, .. } => {
                left.collect_column_refs(refs);
                right.collect_column_refs(refs);
            }
            Self::Unary { expr, .. }
            | Self::Cast { expr, .. }
            | Self::Alias { expr, .. }
            | Self::InSubquery { expr, .. } => {
                expr.collect_column_refs(refs);
            }
            Self::Function(func) => {
                for arg in &func.args {
                    arg.collect_column_refs(refs);
                }
            }
            Self::InList { expr, list, .. } => {
                expr.collect_column_refs(refs);
                for item in list {
                    item.collect_column_refs(refs);
                }
            }
            Self::Between {
                expr, low, high, ..
            } => {
                expr.collect_column_refs(refs);
                low.collect_column_refs(refs);
                high.collect_column_refs(refs);
            }
            Self::Subquery(_) | Self::Exists { .. } | Self::Literal(_) | Self::Wildcard => {}
        }
    }

    /// Check if this expression is deterministic.
    ///
    /// Subquery expressions are treated as non-deterministic.
    pub fn is_deterministic(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Column(_) | Self::QualifiedColumn { .. } | Self::Wildcard => {
                true
            }

            Self::Binary { left, right, .. } => left.is_deterministic() && right.is_deterministic(),

            Self::Unary { expr, .. } | Self::Cast { expr, .. } | Self::Alias { expr, .. } => {
                expr.is_deterministic()
            }

            Self::Function(func) => {
                func.is_deterministic() && func.args.iter().all(Self::is_deterministic)
            }

            Self::InList { expr, list, .. } => {
                expr.is_deterministic() && list.iter().all(Self::is_deterministic)
            }

            Self::Between {
                expr, low, high, ..
            } => expr.is_deterministic() && low.is_deterministic() && high.is_deterministic(),

            Self::Subquery(_) | Self::Exists { .. } | Self::InSubquery { .. } => false,
        }
    }

    /// Check if this expression contains a nested query anywhere in its tree.
    pub fn contains_subquery(&self) -> bool {
        match self {
            Self::Subquery(_) | Self::Exists { .. } | Self::InSubquery { .. } => true,
            Self::Literal(_) | Self::Column(_) | Self::QualifiedColumn { .. } | Self::Wildcard => {
                false
            }
            Self::Binary { left, right, .. } => {
                left.contains_subquery() || right.contains_subquery()
            }
            Self::Unary { expr, .. } | Self::Cast { expr, .. } | Self::Alias { expr, .. } => {
                expr.contains_subquery()
            }
            Self::Function(func) => func.args.iter().any(Self::contains_subquery),
            Self::InList { expr, list, .. } => {
                expr.contains_subquery() || list.iter().any(Self::contains_subquery)
            }
            Self::Between {
                expr, low, high, ..
            } => expr.contains_subquery() || low.contains_subquery() || high.contains_subquery(),
        }
    }

    /// Check if this expression is a simple column reference.
    pub const fn is_column(&self) -> bool {
        matches!(self, Self::Column(_) | Self::QualifiedColumn { .. })
    }

    /// Check if this expression is a literal.
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Try to evaluate as a constant if possible.
    pub const fn try_as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// Get the output name for this expression.
    pub fn output_name(&self) -> String {
        match self {
            Self::Column(name) | Self::QualifiedColumn { name, .. } => name.clone(),
            Self::Alias { alias, .. } => alias.clone(),
            Self::Function(func) => func.name.clone(),
            Self::Literal(v) => format!("{v:?}"),
            Self::Binary { op, .. } => op.symbol().to_string(),
            Self::Unary { op, .. } => op.name().to_string(),
            Self::Wildcard => "*".to_string(),
            _ => "expr".to_string(),
        }
    }

    /// Strip any number of outer aliases.
    pub fn unalias(&self) -> &Self {
        match self {
            Self::Alias { expr, .. } => expr.unalias(),
            other => other,
        }
    }

    /// Rebuild the expression bottom-up, replacing column references.
    ///
    /// `f` receives the optional qualifier and the column name of every
    /// column reference outside subqueries and returns its replacement, or
    /// `None` to keep the reference.
    #[must_use]
    pub fn rewrite_columns<F>(self, f: &F) -> Self
    where
        F: Fn(Option<&str>, &str) -> Option<Self>,
    {
        let rewrite = |e: Box<Self>| Box::new(e.rewrite_columns(f));
        match self {
            Self::Column(ref name) => f(None, name).unwrap_or(self),
            Self::QualifiedColumn {
                ref qualifier,
                ref name,
            } => f(Some(qualifier), name).unwrap_or(self),
            Self::Binary { left, op, right } => Self::Binary {
                left: rewrite(left),
                op,
                right: rewrite(right),
            },
            Self::Unary { op, expr } => Self::Unary {
                op,
                expr: rewrite(expr),
            },
            Self::Function(func) => Self::Function(FuncExpr {
                args: func
                    .args
                    .into_iter()
                    .map(|a| a.rewrite_columns(f))
                    .collect(),
                ..func
            }),
            Self::Cast { expr, data_type } => Self::Cast {
                expr: rewrite(expr),
                data_type,
            },
            Self::InList {
                expr,
                list,
                negated,
            } => Self::InList {
                expr: rewrite(expr),
                list: list.into_iter().map(|e| e.rewrite_columns(f)).collect(),
                negated,
            },
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => Self::Between {
                expr: rewrite(expr),
                low: rewrite(low),
                high: rewrite(high),
                negated,
            },
            Self::Alias { expr, alias } => Self::Alias {
                expr: rewrite(expr),
                alias,
            },
            Self::InSubquery {
                expr,
                subquery,
                negated,
            } => Self::InSubquery {
                expr: rewrite(expr),
                subquery,
                negated,
            },
            other @ (Self::Literal(_) | Self::Wildcard | Self::Subquery(_) | Self::Exists { .. }) => {
                other
            }
        }
    }
}

impl std::fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v:?}"),
            Self::Column(name) => write!(f, "{name}"),
            Self::QualifiedColumn { qualifier, name } => write!(f, "{qualifier}.{name}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, expr } => {
                if matches!(op, UnaryOp::Not | UnaryOp::Neg) {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{expr} {op}")
                }
            }
            Self::Function(func) => write!(f, "{func}"),
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::InList {
                expr,
                list,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                let items = list
                    .iter()
                    .map(std::string::ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{expr}{not} IN ({items})")
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{expr}{not} BETWEEN {low} AND {high}")
            }
            Self::Alias { expr, alias } => write!(f, "{expr} AS {alias}"),
            Self::Wildcard => write!(f, "*"),
            Self::Subquery(_) => write!(f, "(subquery)"),
            Self::Exists { negated, .. } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{not}EXISTS (subquery)")
            }
            Self::InSubquery { expr, negated, .. } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{expr}{not} IN (subquery)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlanBuilder, ScanOp};
    use quarry_core::{ColumnInfo, Schema, TableHandle, TableIdent};

    fn subquery_plan() -> LogicalPlan {
        let table = TableHandle::new(
            TableIdent::new("sales", "calendar"),
            Schema::with_columns(vec![ColumnInfo::new("year", DataType::Int64)]),
        );
        PlanBuilder::scan(ScanOp::new(table)).build()
    }

    #[test]
    fn test_literal_creation() {
        let expr = LogicalExpr::literal(42i64);
        assert!(expr.is_literal());
        assert_eq!(expr.try_as_literal(), Some(&Value::Int64(42)));
    }

    #[test]
    fn test_dotted_column_is_qualified() {
        let expr = LogicalExpr::column("o.year");
        assert_eq!(expr, LogicalExpr::qualified_column("o", "year"));
        assert_eq!(expr.output_name(), "year");
    }

    #[test]
    fn test_column_refs_collection() {
        let expr = LogicalExpr::column("a")
            .add_expr(LogicalExpr::column("t.b"))
            .mul_expr(LogicalExpr::column("c"));

        let refs = expr.column_refs();
        assert_eq!(refs.len(), 3);
        assert!(refs.contains("a"));
        assert!(refs.contains("t.b"));
        assert!(refs.contains("c"));
    }

    #[test]
    fn test_literal_has_no_refs() {
        assert!(LogicalExpr::literal(true).column_refs().is_empty());
    }

    #[test]
    fn test_determinism() {
        let deterministic = LogicalExpr::column("x").add_expr(LogicalExpr::literal(1i64));
        assert!(deterministic.is_deterministic());

        let random = LogicalExpr::column("x").gt(LogicalExpr::function("rand", vec![]));
        assert!(!random.is_deterministic());
    }

    #[test]
    fn test_subquery_detection() {
        let nested = LogicalExpr::column("year")
            .in_subquery(subquery_plan())
            .or(LogicalExpr::column("year").eq(LogicalExpr::literal(2020i64)));

        assert!(nested.contains_subquery());
        assert!(!nested.is_deterministic());
        assert!(nested.column_refs().contains("year"));

        let exists = LogicalExpr::exists(subquery_plan()).logical_not();
        assert!(exists.contains_subquery());
        assert!(exists.column_refs().is_empty());
    }

    #[test]
    fn test_rewrite_columns() {
        let expr = LogicalExpr::column("o.YEAR")
            .eq(LogicalExpr::literal(2020i64))
            .and(LogicalExpr::column("month").in_list(vec![LogicalExpr::literal(3i64)]));

        let rewritten = expr.rewrite_columns(&|qualifier, name| {
            (qualifier == Some("o")).then(|| LogicalExpr::column(name.to_ascii_lowercase()))
        });

        assert_eq!(
            rewritten.to_string(),
            "((year = Int64(2020)) AND month IN (Int64(3)))"
        );
    }

    #[test]
    fn test_display() {
        let expr = LogicalExpr::column("age").gt_eq(LogicalExpr::literal(18i64));
        assert_eq!(expr.to_string(), "(age >= Int64(18))");

        let expr = LogicalExpr::column("name").is_null();
        assert_eq!(expr.to_string(), "name IS NULL");

        let expr = LogicalExpr::column("day").between(
            LogicalExpr::literal(1i64),
            LogicalExpr::literal(7i64),
        );
        assert_eq!(expr.to_string(), "day BETWEEN Int64(1) AND Int64(7)");
    }
}
