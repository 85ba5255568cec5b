#![forbid(unsafe_code)]

//! Collaborator surfaces consumed by the index selector.
//!
//! The parser, evaluator, type checker and catalog live outside the selection
//! engine proper. This module defines the shapes the engine depends on and
//! small reference implementations of each.

/// Read-only table, column and index descriptors.
pub mod catalog;

/// Typed scalar values and their order-preserving key encoding.
pub mod datum;

/// Constant folding and column type compatibility.
pub mod eval;

/// Filter and projection expression trees.
pub mod expr;

pub use catalog::{ColumnDescriptor, IndexDescriptor, TableDescriptor};
pub use datum::{encode_table_key, ColumnType, Datum};
pub use eval::{convert, ConstEvaluator, ConvertError, DefaultEvaluator, EvalError};
pub use expr::{BinaryOp, ComparisonOp, Expr};
