#![forbid(unsafe_code)]

//! Injected diagnostics sink for index selection.
//!
//! The planner reports every derived or skipped bound and every ranked
//! candidate to a [`PlanObserver`]. [`NoopObserver`] is the default,
//! [`TracingObserver`] forwards events as `tracing` debug events, and
//! [`CounterObserver`] keeps atomic counts for tests and tooling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::query::analyze::SkipReason;
use crate::query::explain::CandidateReport;
use crate::sql::catalog::ColumnDescriptor;
use crate::sql::datum::Datum;
use crate::sql::expr::ComparisonOp;

/// Receives planner events as they happen.
///
/// Implementations are handed to the planner through
/// [`PlannerOptions`](crate::query::PlannerOptions); the planner never consults
/// global logging state on its own.
pub trait PlanObserver: Send + Sync {
    /// Records a comparison that produced a bound on `column`.
    ///
    /// `op` is already normalized so that the column is the left operand.
    fn bound_derived(&self, column: &ColumnDescriptor, op: ComparisonOp, value: &Datum);

    /// Records a comparison that produced no bound.
    fn bound_skipped(&self, reason: &SkipReason);

    /// Records a candidate at its position after ranking; rank 0 is committed.
    fn candidate_ranked(&self, rank: usize, report: &CandidateReport);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PlanObserver for NoopObserver {
    fn bound_derived(&self, _column: &ColumnDescriptor, _op: ComparisonOp, _value: &Datum) {}
    fn bound_skipped(&self, _reason: &SkipReason) {}
    fn candidate_ranked(&self, _rank: usize, _report: &CandidateReport) {}
}

/// Forwards events to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn bound_derived(&self, column: &ColumnDescriptor, op: ComparisonOp, value: &Datum) {
        debug!(
            column = %column.name,
            op = op.as_str(),
            value = %value,
            "planner.bound_derived"
        );
    }

    fn bound_skipped(&self, reason: &SkipReason) {
        debug!(reason = %reason, "planner.bound_skipped");
    }

    fn candidate_ranked(&self, rank: usize, report: &CandidateReport) {
        debug!(
            rank,
            index = %report.index,
            covering = report.covering,
            start_bounds = report.start_bounds,
            end_bounds = report.end_bounds,
            cost = report.cost,
            "planner.candidate_ranked"
        );
    }
}

/// Counts events with atomic counters.
#[derive(Debug, Default)]
pub struct CounterObserver {
    /// Comparisons that produced a bound.
    pub bounds_derived: AtomicU64,
    /// Comparisons that produced no bound.
    pub bounds_skipped: AtomicU64,
    /// Candidates ranked.
    pub candidates_ranked: AtomicU64,
    /// Ranked candidates that were not covering.
    pub non_covering: AtomicU64,
}

/// Point-in-time copy of a [`CounterObserver`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserverSnapshot {
    /// Comparisons that produced a bound.
    pub bounds_derived: u64,
    /// Comparisons that produced no bound.
    pub bounds_skipped: u64,
    /// Candidates ranked.
    pub candidates_ranked: u64,
    /// Ranked candidates that were not covering.
    pub non_covering: u64,
}

impl CounterObserver {
    /// Reads all counters.
    pub fn snapshot(&self) -> ObserverSnapshot {
        ObserverSnapshot {
            bounds_derived: self.bounds_derived.load(Ordering::Relaxed),
            bounds_skipped: self.bounds_skipped.load(Ordering::Relaxed),
            candidates_ranked: self.candidates_ranked.load(Ordering::Relaxed),
            non_covering: self.non_covering.load(Ordering::Relaxed),
        }
    }
}

impl PlanObserver for CounterObserver {
    fn bound_derived(&self, _column: &ColumnDescriptor, _op: ComparisonOp, _value: &Datum) {
        self.bounds_derived.fetch_add(1, Ordering::Relaxed);
    }

    fn bound_skipped(&self, _reason: &SkipReason) {
        self.bounds_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn candidate_ranked(&self, _rank: usize, report: &CandidateReport) {
        self.candidates_ranked.fetch_add(1, Ordering::Relaxed);
        if !report.covering {
            self.non_covering.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Returns the default observer, a [`NoopObserver`].
pub fn default_observer() -> Arc<dyn PlanObserver> {
    Arc::new(NoopObserver)
}
