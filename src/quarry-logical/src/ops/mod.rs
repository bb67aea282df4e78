//! Logical operators.

mod filter;
mod limit;
mod project;
mod scan;
mod sort;
mod union;

pub use filter::FilterOp;
pub use limit::LimitOp;
pub use project::ProjectOp;
pub use scan::{PruningState, ScanOp};
pub use sort::{SortKey, SortOp};
pub use union::UnionOp;

use serde::{Deserialize, Serialize};

/// A node of the logical plan tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Table scan (leaf).
    Scan(ScanOp),

    /// Row filter.
    Filter {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Filter specification.
        filter: FilterOp,
    },

    /// Projection.
    Project {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Projection specification.
        project: ProjectOp,
    },

    /// Row limit.
    Limit {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Limit specification.
        limit: LimitOp,
    },

    /// Ordering.
    Sort {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Sort specification.
        sort: SortOp,
    },

    /// Union of two inputs.
    Union {
        /// Left input.
        left: Box<LogicalOp>,
        /// Right input.
        right: Box<LogicalOp>,
        /// Union specification.
        union: UnionOp,
    },

    /// Empty relation (leaf).
    Empty,
}

impl LogicalOp {
    /// Create a scan node.
    pub const fn scan(scan: ScanOp) -> Self {
        Self::Scan(scan)
    }

    /// Create a filter node over `input`.
    pub fn filter(input: Self, filter: FilterOp) -> Self {
        Self::Filter {
            input: Box::new(input),
            filter,
        }
    }

    /// Create a project node over `input`.
    pub fn project(input: Self, project: ProjectOp) -> Self {
        Self::Project {
            input: Box::new(input),
            project,
        }
    }

    /// Create a limit node over `input`.
    pub fn limit(input: Self, limit: LimitOp) -> Self {
        Self::Limit {
            input: Box::new(input),
            limit,
        }
    }

    /// Create a sort node over `input`.
    pub fn sort(input: Self, sort: SortOp) -> Self {
        Self::Sort {
            input: Box::new(input),
            sort,
        }
    }

    /// Create a union node.
    pub fn union(left: Self, right: Self, union: UnionOp) -> Self {
        Self::Union {
            left: Box::new(left),
            right: Box::new(right),
            union,
        }
    }

    /// Direct inputs of this operator.
    pub fn inputs(&self) -> Vec<&Self> {
        match self {
            Self::Scan(_) | Self::Empty => Vec::new(),
            Self::Filter { input, .. }
            | Self::Project { input, .. }
            | Self::Limit { input, .. }
            | Self::Sort { input, .. } => vec![input.as_ref()],
            Self::Union { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Number of direct inputs.
    pub fn input_count(&self) -> usize {
        self.inputs().len()
    }

    /// Operator name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "Scan",
            Self::Filter { .. } => "Filter",
            Self::Project { .. } => "Project",
            Self::Limit { .. } => "Limit",
            Self::Sort { .. } => "Sort",
            Self::Union { .. } => "Union",
            Self::Empty => "Empty",
        }
    }

    /// Tree-formatted explanation rooted at this operator.
    pub fn explain(&self, indent: usize) -> String {
        let mut result = format!("{}{}", "  ".repeat(indent), self.explain_self());
        for input in self.inputs() {
            result.push('\n');
            result.push_str(&input.explain(indent + 1));
        }
        result
    }

    fn explain_self(&self) -> String {
        match self {
            Self::Scan(scan) => scan.to_string(),
            Self::Filter { filter, .. } => filter.to_string(),
            Self::Project { project, .. } => project.to_string(),
            Self::Limit { limit, .. } => limit.to_string(),
            Self::Sort { sort, .. } => sort.to_string(),
            Self::Union { union, .. } => union.to_string(),
            Self::Empty => "Empty".to_string(),
        }
    }

    /// Rebuild this operator with `f` applied to each direct input.
    #[must_use]
    pub fn map_children<F>(self, mut f: F) -> Self
    where
        F: FnMut(Self) -> Self,
    {
        let result: Result<Self, std::convert::Infallible> =
            self.try_map_children(|child| Ok(f(child)));
        match result {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }

    /// Rebuild this operator with fallible `f` applied to each direct input.
    pub fn try_map_children<F, E>(self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(Self) -> Result<Self, E>,
    {
        Ok(match self {
            leaf @ (Self::Scan(_) | Self::Empty) => leaf,
            Self::Filter { input, filter } => Self::Filter {
                input: Box::new(f(*input)?),
                filter,
            },
            Self::Project { input, project } => Self::Project {
                input: Box::new(f(*input)?),
                project,
            },
            Self::Limit { input, limit } => Self::Limit {
                input: Box::new(f(*input)?),
                limit,
            },
            Self::Sort { input, sort } => Self::Sort {
                input: Box::new(f(*input)?),
                sort,
            },
            Self::Union { left, right, union } => Self::Union {
                left: Box::new(f(*left)?),
                right: Box::new(f(*right)?),
                union,
            },
        })
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.explain(0))
    }
}
