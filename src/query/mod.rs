#![forbid(unsafe_code)]

//! Predicate-driven, cost-based index selection.
//!
//! A planning call runs analyze → evaluate → select: the filter is reduced to
//! per-column ranges, every candidate index is checked for coverage and
//! priced, and the cheapest one is committed to the scan together with the
//! `[start, end)` key span that contains every row the filter can match.

/// Filter tree walk producing column ranges.
pub mod analyze;

/// Column id to range mapping built per call.
pub mod bounds;

/// Coverage, bound extraction and pricing of one index.
pub mod candidate;

/// Text and JSON renderings of a decision.
pub mod explain;

/// Index key layout and span construction.
pub mod keys;

/// Injected diagnostics sink.
pub mod observer;

/// Cost model and planner options.
pub mod options;

/// Lower/upper bound algebra.
pub mod range;

/// JSON planning requests.
pub mod request;

/// Scan node handed to the executor.
pub mod scan;

/// Candidate ranking and commit.
pub mod select;

pub use analyze::{PredicateAnalyzer, SkipReason};
pub use bounds::ColumnBounds;
pub use candidate::IndexCandidate;
pub use explain::{CandidateReport, SelectionExplain};
pub use keys::{encode_index_key, index_key_prefix, make_end_key, make_start_key, KeySpan};
pub use observer::{CounterObserver, NoopObserver, ObserverSnapshot, PlanObserver, TracingObserver};
pub use options::{CostModel, PlannerOptions};
pub use range::{Bound, BoundOp, ColumnRange, Side};
pub use request::PlanRequest;
pub use scan::Scan;
pub use select::{select_index, select_index_explained, IndexSelector};
