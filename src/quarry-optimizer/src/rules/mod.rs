//! Optimization rules for Quarry query plans.
//!
//! A rewrite is legal only if it preserves the rows the plan produces,
//! including three-valued NULL behaviour, and never reorders volatile
//! expressions.

mod optimizer;
pub mod partition_pruning;
mod rule;

pub use optimizer::{Optimizer, OptimizerConfig};
pub use partition_pruning::PrunePartitions;
pub use rule::{OptimizationRule, OptimizedPlan, RuleTrace, Transformed};
