//! Optimization rule trait and framework.
//!
//! This module defines the core abstraction for optimization rules and the
//! result types produced when applying them to logical plans.

use common_error::QuarryResult;
use quarry_logical::LogicalPlan;

/// A single optimization rule that can transform a logical plan.
///
/// A rewrite must preserve the rows and column values the plan produces,
/// including NULL semantics, and must not move non-deterministic
/// expressions. Rules are applied repeatedly by the [`Optimizer`] until no
/// rule reports a change, so every rule must be idempotent once it has fired.
///
/// [`Optimizer`]: super::Optimizer
pub trait OptimizationRule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Apply this rule to the plan, returning a potentially transformed plan.
    fn apply(&self, plan: LogicalPlan) -> QuarryResult<Transformed>;
}

/// The result of applying an optimization rule.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The (potentially transformed) plan.
    pub plan: LogicalPlan,
    /// Whether the plan was actually changed.
    pub changed: bool,
}

impl Transformed {
    /// The plan was changed.
    pub const fn yes(plan: LogicalPlan) -> Self {
        Self {
            plan,
            changed: true,
        }
    }

    /// The plan was left as it was.
    pub const fn no(plan: LogicalPlan) -> Self {
        Self {
            plan,
            changed: false,
        }
    }
}

impl From<LogicalPlan> for Transformed {
    fn from(plan: LogicalPlan) -> Self {
        Self::no(plan)
    }
}

/// A trace entry for a single rule application.
#[derive(Debug, Clone)]
pub struct RuleTrace {
    /// The name of the rule that was applied.
    pub rule_name: String,
    /// The plan before the rule was applied (as explain string).
    pub before: String,
    /// The plan after the rule was applied (as explain string).
    pub after: String,
    /// Whether the rule actually changed the plan.
    pub changed: bool,
}

impl RuleTrace {
    /// Create a new trace entry.
    pub fn new(
        rule_name: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
        changed: bool,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            before: before.into(),
            after: after.into(),
            changed,
        }
    }
}

/// The result of optimization with optional trace information.
#[derive(Debug, Clone)]
pub struct OptimizedPlan {
    /// The final optimized plan.
    pub plan: LogicalPlan,
    /// Number of optimization iterations performed.
    pub iterations: usize,
    /// Number of rule applications that changed the plan.
    pub rules_applied: usize,
    /// Detailed trace of rule applications (if tracing was enabled).
    pub trace: Vec<RuleTrace>,
}

impl OptimizedPlan {
    /// Wrap a plan no rule has touched.
    pub const fn new(plan: LogicalPlan) -> Self {
        Self {
            plan,
            iterations: 0,
            rules_applied: 0,
            trace: Vec::new(),
        }
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = format!(
            "Optimization completed in {} iterations, {} rules applied\n",
            self.iterations, self.rules_applied
        );

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
            return output;
        }

        for (i, entry) in self.trace.iter().filter(|t| t.changed).enumerate() {
            output.push_str(&format!(
                "\n--- Rule {} applied: {} ---\n",
                i + 1,
                entry.rule_name
            ));
            output.push_str("Before:\n");
            output.push_str(&entry.before);
            output.push_str("\nAfter:\n");
            output.push_str(&entry.after);
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use quarry_logical::LogicalOp;

    use super::*;

    #[test]
    fn test_transformed() {
        let plan = LogicalPlan::new(LogicalOp::Empty);

        assert!(!Transformed::no(plan.clone()).changed);
        assert!(!Transformed::from(plan.clone()).changed);
        assert!(Transformed::yes(plan).changed);
    }

    #[test]
    fn test_format_trace() {
        let mut result = OptimizedPlan::new(LogicalPlan::new(LogicalOp::Empty));
        assert!(result.format_trace().contains("no trace available"));

        result.iterations = 2;
        result.rules_applied = 1;
        result.trace.push(RuleTrace::new("PrunePartitions", "old", "new", true));
        let text = result.format_trace();
        assert!(text.starts_with("Optimization completed in 2 iterations, 1 rules applied"));
        assert!(text.contains("--- Rule 1 applied: PrunePartitions ---"));
        assert!(text.contains("Before:\nold\nAfter:\nnew"));
    }
}
