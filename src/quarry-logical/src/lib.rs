//! Logical planning layer for Quarry.
//!
//! This crate provides:
//! - `LogicalExpr`: predicate and projection expressions, with a scalar
//!   evaluator over single rows
//! - `LogicalOp`: the operator tree (scan, filter, project, limit, sort, union)
//! - `LogicalPlan` and `PlanBuilder`: plan construction and rewriting
//! - `ScanOperation`: project/filter chains collapsed onto their scan

pub mod expr;
pub mod ops;
mod pattern;
mod plan;

pub use expr::{
    BinaryOp, Determinism, FuncExpr, LogicalExpr, UnaryOp, builtin, col, conjunction, evaluate,
    evaluate_predicate, lit, normalize_columns, qualified_col, split_conjunction,
};
pub use ops::{
    FilterOp, LimitOp, LogicalOp, ProjectOp, PruningState, ScanOp, SortKey, SortOp, UnionOp,
};
pub use pattern::ScanOperation;
pub use plan::{LogicalPlan, NodeRewrite, PlanBuilder};
