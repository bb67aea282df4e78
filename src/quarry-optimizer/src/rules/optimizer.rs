//! The optimizer driver.
//!
//! Rules are applied in a fixed-point iteration until no rule changes the
//! plan or a maximum number of iterations is reached.

use common_config::OptimizerSettings;
use common_error::QuarryResult;
use log::debug;
use quarry_logical::LogicalPlan;

use super::rule::{OptimizationRule, OptimizedPlan, RuleTrace};

/// Configuration for the optimizer.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Maximum number of iterations before stopping.
    pub max_iterations: usize,
    /// Whether to enable detailed tracing.
    pub enable_trace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::from(&OptimizerSettings::default())
    }
}

impl From<&OptimizerSettings> for OptimizerConfig {
    fn from(settings: &OptimizerSettings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            enable_trace: settings.enable_trace,
        }
    }
}

impl OptimizerConfig {
    /// Create a new config with the given max iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Enable or disable tracing.
    #[must_use]
    pub const fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }
}

/// Applies an ordered list of rules to logical plans.
///
/// The caller decides rule order. Rules run until a fixpoint, so the
/// rewrite terminates as long as every rule stops reporting changes once it
/// has fired.
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizationRule>>,
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create a new optimizer with the given rules.
    pub fn new(rules: Vec<Box<dyn OptimizationRule>>) -> Self {
        Self {
            rules,
            config: OptimizerConfig::default(),
        }
    }

    /// Create a new optimizer with custom config.
    pub const fn with_config(
        rules: Vec<Box<dyn OptimizationRule>>,
        config: OptimizerConfig,
    ) -> Self {
        Self { rules, config }
    }

    /// Add a rule to the optimizer.
    pub fn add_rule<R: OptimizationRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Names of the configured rules, in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Optimize a logical plan, iterating until a fixpoint.
    pub fn optimize(&self, plan: LogicalPlan) -> QuarryResult<OptimizedPlan> {
        let mut current_plan = plan;
        let mut iterations = 0;
        let mut rules_applied = 0;
        let mut trace = Vec::new();

        loop {
            if iterations >= self.config.max_iterations {
                debug!(
                    "Optimizer reached max iterations ({}), stopping",
                    self.config.max_iterations
                );
                break;
            }

            iterations += 1;
            let (next_plan, changed) =
                self.run_pass(current_plan, iterations, &mut rules_applied, &mut trace)?;
            current_plan = next_plan;

            if !changed {
                debug!("No changes in iteration {iterations}, reached fixpoint");
                break;
            }
        }

        Ok(OptimizedPlan {
            plan: current_plan,
            iterations,
            rules_applied,
            trace,
        })
    }

    /// Optimize with a single pass (no fixpoint iteration).
    pub fn optimize_once(&self, plan: LogicalPlan) -> QuarryResult<OptimizedPlan> {
        let mut rules_applied = 0;
        let mut trace = Vec::new();
        let (plan, _) = self.run_pass(plan, 1, &mut rules_applied, &mut trace)?;

        Ok(OptimizedPlan {
            plan,
            iterations: 1,
            rules_applied,
            trace,
        })
    }

    /// Apply every rule once. The flag reports whether any rule changed the plan.
    fn run_pass(
        &self,
        plan: LogicalPlan,
        iteration: usize,
        rules_applied: &mut usize,
        trace: &mut Vec<RuleTrace>,
    ) -> QuarryResult<(LogicalPlan, bool)> {
        let mut current_plan = plan;
        let mut changed_this_pass = false;

        for rule in &self.rules {
            let before = self.config.enable_trace.then(|| current_plan.explain());
            let result = rule.apply(current_plan)?;

            if result.changed {
                changed_this_pass = true;
                *rules_applied += 1;
                debug!("Rule '{}' applied in iteration {iteration}", rule.name());

                if let Some(before) = before {
                    trace.push(RuleTrace::new(
                        rule.name(),
                        before,
                        result.plan.explain(),
                        true,
                    ));
                }
            }

            current_plan = result.plan;
        }

        Ok((current_plan, changed_this_pass))
    }
}
