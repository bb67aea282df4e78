//! Query optimizer for Quarry logical plans.
//!
//! Provides the rule framework, the fixpoint driver, and the partition
//! pruning rule.

mod rules;

pub use rules::partition_pruning::{
    CatalogSidePruning, ClientSidePruning, PartitionPredicateSet, PredicateClassifier,
    PruningStrategy, partition_size_hint, refresh_size, refresh_statistics,
};
pub use rules::{
    OptimizationRule, OptimizedPlan, Optimizer, OptimizerConfig, PrunePartitions, RuleTrace,
    Transformed,
};

use std::sync::Arc;

use common_config::QuarryConfig;
use common_error::QuarryResult;
use quarry_catalog::PartitionCatalog;
use quarry_logical::LogicalPlan;

/// Build the default optimizer for `config`.
pub fn default_optimizer(
    catalog: Arc<dyn PartitionCatalog>,
    config: &QuarryConfig,
) -> QuarryResult<Optimizer> {
    let prune = PrunePartitions::new(catalog, &config.partition_pruning)?;
    Ok(Optimizer::with_config(
        vec![Box::new(prune)],
        OptimizerConfig::from(&config.optimizer),
    ))
}

/// Optimize a logical plan with the default optimizer.
pub fn optimize(
    plan: LogicalPlan,
    catalog: Arc<dyn PartitionCatalog>,
    config: &QuarryConfig,
) -> QuarryResult<OptimizedPlan> {
    default_optimizer(catalog, config)?.optimize(plan)
}
