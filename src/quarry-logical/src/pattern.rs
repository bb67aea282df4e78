//! Matching of project/filter chains over a single scan.
//!
//! A chain such as `Project(Filter(Project(Filter(Scan))))` is collapsed into
//! one set of output expressions and one list of filter conjuncts, both
//! expressed over the scan's columns. Aliases introduced by inner projections
//! are substituted into the expressions above them.

use std::collections::HashMap;

use crate::expr::{LogicalExpr, conjunction, split_conjunction};
use crate::ops::{FilterOp, LogicalOp, ProjectOp, ScanOp};

/// A project/filter chain ending in a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOperation<'a> {
    /// Output expressions of the outermost projection, over scan columns.
    /// `None` when the chain contains no projection.
    pub projections: Option<Vec<LogicalExpr>>,
    /// Filter conjuncts from every filter in the chain, over scan columns.
    pub filters: Vec<LogicalExpr>,
    /// The scan at the bottom of the chain.
    pub scan: &'a ScanOp,
}

impl<'a> ScanOperation<'a> {
    /// Match `op` as a chain of projections and filters over a scan.
    ///
    /// Returns `None` when the chain reaches any other operator, or when a
    /// projection is non-deterministic (filters cannot be moved below it).
    pub fn match_op(op: &'a LogicalOp) -> Option<Self> {
        collect(op).map(|(chain, _)| chain)
    }

    /// Rebuild the chain over `scan` as `Project(Filter(scan))`.
    ///
    /// The filter carries all collected conjuncts; it is omitted when there
    /// are none, as is the projection when the chain had none.
    pub fn rebuild(&self, scan: ScanOp) -> LogicalOp {
        let mut op = LogicalOp::scan(scan);
        if let Some(predicate) = conjunction(self.filters.iter().cloned()) {
            op = LogicalOp::filter(op, FilterOp::new(predicate));
        }
        if let Some(projections) = &self.projections {
            op = LogicalOp::project(op, ProjectOp::new(projections.clone()));
        }
        op
    }
}

type Aliases = HashMap<String, LogicalExpr>;

fn collect(op: &LogicalOp) -> Option<(ScanOperation<'_>, Aliases)> {
    match op {
        LogicalOp::Scan(scan) => Some((
            ScanOperation {
                projections: None,
                filters: Vec::new(),
                scan,
            },
            Aliases::new(),
        )),

        LogicalOp::Project { input, project } => {
            if !project.is_deterministic() {
                return None;
            }
            let (mut chain, aliases) = collect(input)?;
            let substituted: Vec<_> = project
                .expressions
                .iter()
                .map(|e| substitute_keeping_name(e, &aliases))
                .collect();
            let next_aliases = substituted
                .iter()
                .filter_map(|e| match e {
                    LogicalExpr::Alias { expr, alias } => {
                        Some((alias.to_ascii_lowercase(), expr.as_ref().clone()))
                    }
                    _ => None,
                })
                .collect();
            chain.projections = Some(substituted);
            Some((chain, next_aliases))
        }

        LogicalOp::Filter { input, filter } => {
            let (mut chain, aliases) = collect(input)?;
            chain.filters.extend(
                split_conjunction(&filter.predicate)
                    .into_iter()
                    .map(|c| substitute(c.clone(), &aliases)),
            );
            Some((chain, aliases))
        }

        _ => None,
    }
}

/// Substitute aliases in a projection item without changing its output name.
fn substitute_keeping_name(expr: &LogicalExpr, aliases: &Aliases) -> LogicalExpr {
    let substituted = substitute(expr.clone(), aliases);
    let name = expr.output_name();
    match substituted {
        LogicalExpr::Alias { .. } => substituted,
        other if other.output_name() != name => other.alias(name),
        other => other,
    }
}

/// Replace unqualified references to aliases with their definitions.
fn substitute(expr: LogicalExpr, aliases: &Aliases) -> LogicalExpr {
    if aliases.is_empty() {
        return expr;
    }
    expr.rewrite_columns(&|qualifier, name| match qualifier {
        None => aliases.get(&name.to_ascii_lowercase()).cloned(),
        Some(_) => None,
    })
}
