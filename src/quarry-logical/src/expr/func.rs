//! Function expressions.

use serde::{Deserialize, Serialize};

use super::LogicalExpr;

/// Whether repeated evaluation on the same input yields the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Determinism {
    /// Same inputs, same output.
    Deterministic,
    /// Output may differ between evaluations (random, uuid, ...).
    NonDeterministic,
}

/// Built-in function names.
pub mod builtin {
    /// Lower-case a string.
    pub const LOWER: &str = "lower";
    /// Upper-case a string.
    pub const UPPER: &str = "upper";
    /// Character length of a string.
    pub const LENGTH: &str = "length";
    /// First non-null argument.
    pub const COALESCE: &str = "coalesce";
    /// Random double in `[0, 1)`.
    pub const RAND: &str = "rand";
    /// Random UUID string.
    pub const UUID: &str = "uuid";

    /// Functions whose result is not a function of their arguments.
    pub(crate) const NON_DETERMINISTIC: [&str; 3] = [RAND, "random", UUID];
}

/// Function call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncExpr {
    /// Function name (lower case).
    pub name: String,
    /// Function arguments.
    pub args: Vec<LogicalExpr>,
    /// Determinism of the function itself, independent of its arguments.
    pub determinism: Determinism,
}

impl FuncExpr {
    /// Create a new function call.
    ///
    /// Determinism is inferred from the built-in function table.
    pub fn new(name: impl Into<String>, args: Vec<LogicalExpr>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let determinism = if builtin::NON_DETERMINISTIC.contains(&name.as_str()) {
            Determinism::NonDeterministic
        } else {
            Determinism::Deterministic
        };
        Self {
            name,
            args,
            determinism,
        }
    }

    /// Override the inferred determinism (for user-defined functions).
    #[must_use]
    pub const fn with_determinism(mut self, determinism: Determinism) -> Self {
        self.determinism = determinism;
        self
    }

    /// Whether the function itself is deterministic.
    pub fn is_deterministic(&self) -> bool {
        self.determinism == Determinism::Deterministic
    }
}

impl std::fmt::Display for FuncExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({args})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism_inference() {
        assert!(FuncExpr::new("LOWER", vec![]).is_deterministic());
        assert!(!FuncExpr::new("rand", vec![]).is_deterministic());
        assert!(
            !FuncExpr::new("my_udf", vec![])
                .with_determinism(Determinism::NonDeterministic)
                .is_deterministic()
        );
    }
}
