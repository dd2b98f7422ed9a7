//! Comparison operator evaluation for Condition branches and Update-Variable
//! filters.

pub mod operators;

pub use operators::{evaluate, ComparisonOperator};
