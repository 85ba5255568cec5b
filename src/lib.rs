//! Keyscope: predicate-driven, cost-based index selection for table scans.
//!
//! Given a scan with a filter, the planner derives per-column ranges from the
//! filter, ranks every candidate index by coverage and cost, and commits the
//! winner together with the tightest `[start, end)` key span that still
//! contains every row the filter can match.

#![warn(missing_docs)]

pub mod primitives;
pub mod query;
pub mod sql;
pub mod types;

pub use query::{
    select_index, select_index_explained, IndexSelector, KeySpan, PlannerOptions, Scan,
    SelectionExplain,
};
pub use types::{PlanError, Result};
