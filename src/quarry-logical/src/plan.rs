//! Logical plan structure for Quarry.
//!
//! A `LogicalPlan` is a tree of logical operators that represents a query.

use common_error::QuarryResult;
use quarry_core::Schema;
use serde::{Deserialize, Serialize};

use crate::ops::{FilterOp, LimitOp, LogicalOp, ProjectOp, ScanOp, SortOp, UnionOp};

/// A logical plan representing a query.
///
/// Rewrites never mutate a plan in place: every transformation consumes the
/// plan and returns a rebuilt one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    /// The root operator of the plan.
    pub root: LogicalOp,

    /// The output schema of this plan (optional until resolution).
    pub schema: Option<Schema>,
}

/// Outcome of visiting one node during a rewrite.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRewrite {
    /// The node was replaced by a new operator.
    Replaced(LogicalOp),
    /// The node is returned as it was.
    Unchanged(LogicalOp),
}

impl LogicalPlan {
    /// Create a new logical plan with the given root operator.
    pub const fn new(root: LogicalOp) -> Self {
        Self { root, schema: None }
    }

    /// Create a logical plan with a schema.
    pub const fn with_schema(root: LogicalOp, schema: Schema) -> Self {
        Self {
            root,
            schema: Some(schema),
        }
    }

    /// Get a reference to the root operator.
    pub const fn root(&self) -> &LogicalOp {
        &self.root
    }

    /// Get the output schema if available.
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        let mut output = String::from("Logical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }

    /// Count the number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        fn count(op: &LogicalOp) -> usize {
            1 + op.inputs().into_iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Get the maximum depth of the plan tree.
    pub fn depth(&self) -> usize {
        fn max_depth(op: &LogicalOp) -> usize {
            1 + op.inputs().into_iter().map(max_depth).max().unwrap_or(0)
        }
        max_depth(&self.root)
    }

    /// Check if the plan contains an operator matching `predicate`.
    pub fn contains_op<F>(&self, predicate: F) -> bool
    where
        F: Fn(&LogicalOp) -> bool,
    {
        fn check<F>(op: &LogicalOp, predicate: &F) -> bool
        where
            F: Fn(&LogicalOp) -> bool,
        {
            predicate(op) || op.inputs().into_iter().any(|i| check(i, predicate))
        }
        check(&self.root, &predicate)
    }

    /// All scans in the plan, in pre-order.
    pub fn scans(&self) -> Vec<&ScanOp> {
        fn collect<'a>(op: &'a LogicalOp, out: &mut Vec<&'a ScanOp>) {
            if let LogicalOp::Scan(scan) = op {
                out.push(scan);
            }
            for input in op.inputs() {
                collect(input, out);
            }
        }
        let mut scans = Vec::new();
        collect(&self.root, &mut scans);
        scans
    }

    /// Transform the plan by applying a function to each operator (bottom-up).
    #[must_use]
    pub fn transform<F>(self, f: F) -> Self
    where
        F: Fn(LogicalOp) -> LogicalOp,
    {
        fn transform_op<F>(op: LogicalOp, f: &F) -> LogicalOp
        where
            F: Fn(LogicalOp) -> LogicalOp,
        {
            f(op.map_children(|child| transform_op(child, f)))
        }

        Self {
            root: transform_op(self.root, &f),
            schema: self.schema,
        }
    }

    /// Rewrite the plan top-down with a fallible visitor.
    ///
    /// `f` sees each node before its children. The children of the node it
    /// returns, replaced or not, are visited next. The flag is `true` when
    /// any node was replaced. The first error aborts the rewrite.
    pub fn try_rewrite_down<F>(self, mut f: F) -> QuarryResult<(Self, bool)>
    where
        F: FnMut(LogicalOp) -> QuarryResult<NodeRewrite>,
    {
        fn rewrite_op<F>(op: LogicalOp, f: &mut F, changed: &mut bool) -> QuarryResult<LogicalOp>
        where
            F: FnMut(LogicalOp) -> QuarryResult<NodeRewrite>,
        {
            let op = match f(op)? {
                NodeRewrite::Replaced(op) => {
                    *changed = true;
                    op
                }
                NodeRewrite::Unchanged(op) => op,
            };
            op.try_map_children(|child| rewrite_op(child, f, changed))
        }

        let mut changed = false;
        let root = rewrite_op(self.root, &mut f, &mut changed)?;
        Ok((
            Self {
                root,
                schema: self.schema,
            },
            changed,
        ))
    }
}

impl std::fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl From<LogicalOp> for LogicalPlan {
    fn from(op: LogicalOp) -> Self {
        Self::new(op)
    }
}

/// Builder for constructing logical plans fluently.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    op: LogicalOp,
}

impl PlanBuilder {
    /// Start building from a scan.
    pub const fn scan(scan: ScanOp) -> Self {
        Self {
            op: LogicalOp::scan(scan),
        }
    }

    /// Start building from an existing operator.
    pub const fn from_op(op: LogicalOp) -> Self {
        Self { op }
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(self, filter: FilterOp) -> Self {
        Self {
            op: LogicalOp::filter(self.op, filter),
        }
    }

    /// Add a project.
    #[must_use]
    pub fn project(self, project: ProjectOp) -> Self {
        Self {
            op: LogicalOp::project(self.op, project),
        }
    }

    /// Add a limit.
    #[must_use]
    pub fn limit(self, limit: LimitOp) -> Self {
        Self {
            op: LogicalOp::limit(self.op, limit),
        }
    }

    /// Add a sort.
    #[must_use]
    pub fn sort(self, sort: SortOp) -> Self {
        Self {
            op: LogicalOp::sort(self.op, sort),
        }
    }

    /// Union with another plan's root.
    #[must_use]
    pub fn union(self, other: LogicalOp, union: UnionOp) -> Self {
        Self {
            op: LogicalOp::union(self.op, other, union),
        }
    }

    /// Build the final plan.
    pub fn build(self) -> LogicalPlan {
        LogicalPlan::new(self.op)
    }

    /// Build with a schema.
    pub fn build_with_schema(self, schema: Schema) -> LogicalPlan {
        LogicalPlan::with_schema(self.op, schema)
    }
}
