//! Partition pruning.
//!
//! Restricts scans of partitioned tables to the partitions that can satisfy
//! the filters above them, and refreshes the table's size statistic to match.
//!
//! # Example
//!
//! ```text
//! Before:                                 After:
//!   Project(revenue)                        Project(revenue)
//!     Filter(year = 2020 AND revenue > 100)   Filter(year = 2020 AND revenue > 100)
//!       Scan(sales.orders, unpruned)            Scan(sales.orders, pruned=2 [...])
//! ```
//!
//! The filter is always kept: a catalog may return more partitions than the
//! predicates select, and data predicates still need evaluating.

mod classifier;
mod pruner;
mod statistics;

use std::sync::Arc;

use common_config::PartitionPruningConfig;
use common_error::{QuarryError, QuarryResult};
use log::debug;
use quarry_catalog::PartitionCatalog;
use quarry_core::SessionTimeZone;
use quarry_logical::{LogicalOp, LogicalPlan, NodeRewrite, ScanOperation};

pub use classifier::{PartitionPredicateSet, PredicateClassifier};
pub use pruner::{CatalogSidePruning, ClientSidePruning, PruningStrategy};
pub use statistics::{partition_size_hint, refresh_size, refresh_statistics};

use super::rule::{OptimizationRule, Transformed};

/// Rule that prunes partitions of filtered scans.
///
/// A project/filter chain over a scan is rewritten when the chain has at
/// least one filter, the table is partitioned, the scan has not been pruned
/// yet, and some filter conjunct references only partition columns.
pub struct PrunePartitions {
    catalog: Arc<dyn PartitionCatalog>,
    strategy: Box<dyn PruningStrategy>,
    time_zone: SessionTimeZone,
}

impl PrunePartitions {
    /// Create the rule from configuration.
    ///
    /// Fails with `InvalidParameter` when the session time zone is invalid.
    pub fn new(
        catalog: Arc<dyn PartitionCatalog>,
        config: &PartitionPruningConfig,
    ) -> QuarryResult<Self> {
        let time_zone: SessionTimeZone = config.session_time_zone.parse()?;
        let strategy: Box<dyn PruningStrategy> = if config.catalog_side_pruning {
            Box::new(CatalogSidePruning)
        } else {
            Box::new(ClientSidePruning)
        };
        Ok(Self {
            catalog,
            strategy,
            time_zone,
        })
    }

    /// Replace the pruning strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn PruningStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// The active strategy's name.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// The session time zone used for temporal partition values.
    pub const fn time_zone(&self) -> &SessionTimeZone {
        &self.time_zone
    }

    fn prune_node(&self, op: LogicalOp) -> QuarryResult<NodeRewrite> {
        let rewritten = match ScanOperation::match_op(&op) {
            Some(chain) => self.prune_chain(&chain)?,
            None => None,
        };
        Ok(match rewritten {
            Some(new_op) => NodeRewrite::Replaced(new_op),
            None => NodeRewrite::Unchanged(op),
        })
    }

    /// The rebuilt chain, or `None` when the chain is not eligible.
    fn prune_chain(&self, chain: &ScanOperation<'_>) -> QuarryResult<Option<LogicalOp>> {
        let scan = chain.scan;
        let ident = &scan.table.ident;

        if chain.filters.is_empty() {
            return Ok(None);
        }
        if !scan.table.is_partitioned() {
            debug!("Skipping {ident}: table is not partitioned");
            return Ok(None);
        }
        if scan.is_pruned() {
            debug!("Skipping {ident}: scan already pruned");
            return Ok(None);
        }

        let predicates = PredicateClassifier::new(scan).classify(&chain.filters);
        if predicates.is_empty() {
            debug!("Skipping {ident}: no partition predicates");
            return Ok(None);
        }

        debug!(
            "Pruning {ident} with {} strategy on {} predicates",
            self.strategy.name(),
            predicates.len()
        );
        let partitions = self
            .strategy
            .prune(
                self.catalog.as_ref(),
                &scan.table,
                &predicates,
                &self.time_zone,
            )
            .map_err(|e| {
                QuarryError::planning_failed(format!("partition pruning failed for {ident}"), e)
            })?;
        debug!("{ident}: {} partitions survive pruning", partitions.len());

        let table = refresh_statistics(&scan.table, &partitions);
        let pruned = scan.clone().into_pruned(table, partitions)?;
        Ok(Some(chain.rebuild(pruned)))
    }
}

impl std::fmt::Debug for PrunePartitions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrunePartitions")
            .field("strategy", &self.strategy)
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}

impl OptimizationRule for PrunePartitions {
    fn name(&self) -> &'static str {
        "PrunePartitions"
    }

    fn description(&self) -> &'static str {
        "Restrict partitioned-table scans to partitions matching partition-only filters"
    }

    fn apply(&self, plan: LogicalPlan) -> QuarryResult<Transformed> {
        let (plan, changed) = plan.try_rewrite_down(|op| self.prune_node(op))?;
        Ok(if changed {
            Transformed::yes(plan)
        } else {
            Transformed::no(plan)
        })
    }
}
