#![forbid(unsafe_code)]
//! Identifier newtypes and the crate-wide error type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog identifier of a table.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub struct TableId(pub u32);

/// Catalog identifier of an index, unique within its table.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub struct IndexId(pub u32);

/// Catalog identifier of a column, unique within its table.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub struct ColumnId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ColumnId {
    fn from(value: u32) -> Self {
        ColumnId(value)
    }
}

impl From<ColumnId> for u32 {
    fn from(value: ColumnId) -> Self {
        value.0
    }
}

/// Errors surfaced while building a scan or loading planner inputs.
///
/// Nothing in the selection pipeline itself returns these: unanalyzable
/// predicates are skipped and non-covering indexes are priced out.
#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    /// Explicit index hint names no index on the table.
    #[error("index '{index}' not found on table '{table}'")]
    UnknownIndex {
        /// Table the hint was resolved against.
        table: String,
        /// Index name supplied by the query.
        index: String,
    },
    /// Column name does not resolve against the table.
    #[error("column '{column}' not found on table '{table}'")]
    UnknownColumn {
        /// Table the name was resolved against.
        table: String,
        /// Column name supplied by the caller.
        column: String,
    },
    /// Malformed descriptor or option value.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// Planning request could not be decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PlanError>;
