#![forbid(unsafe_code)]

//! Planner configuration: cost heuristics and injected capabilities.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::query::observer::{default_observer, PlanObserver, TracingObserver};
use crate::sql::eval::{ConstEvaluator, DefaultEvaluator};
use crate::types::{PlanError, Result};

/// Heuristic constants used to price index candidates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Multiplier applied when a candidate has no usable bound at all.
    pub unconstrained_penalty: f64,
    /// Numerator factor of the `width / bounds` ratio for constrained scans.
    pub width_factor: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            unconstrained_penalty: 1000.0,
            width_factor: 2.0,
        }
    }
}

impl CostModel {
    /// Rejects factors that would break the ranking order.
    ///
    /// Both factors must be finite and positive, and the penalty must exceed
    /// `width_factor`, the cost multiplier of a single-column index with one
    /// bound. An unconstrained scan then always costs more than a constrained
    /// scan of the same single-column index.
    pub fn validate(&self) -> Result<()> {
        if !self.unconstrained_penalty.is_finite() || self.unconstrained_penalty <= 0.0 {
            return Err(PlanError::Invalid(
                "unconstrained_penalty must be finite and positive",
            ));
        }
        if !self.width_factor.is_finite() || self.width_factor <= 0.0 {
            return Err(PlanError::Invalid("width_factor must be finite and positive"));
        }
        if self.unconstrained_penalty <= self.width_factor {
            return Err(PlanError::Invalid(
                "unconstrained_penalty must exceed width_factor",
            ));
        }
        Ok(())
    }

    /// Prices a covering candidate.
    ///
    /// `base` is the per-row key count of the index, `width` its key column
    /// count and `bounds` the number of start plus end bounds it consumed.
    pub fn cost(&self, base: usize, width: usize, bounds: usize) -> f64 {
        let base = base as f64;
        if bounds == 0 {
            base * self.unconstrained_penalty
        } else {
            base * (self.width_factor * width as f64) / bounds as f64
        }
    }
}

/// Options shared by every planning call of an
/// [`IndexSelector`](crate::query::IndexSelector).
#[derive(Clone)]
pub struct PlannerOptions {
    /// Candidate pricing.
    pub cost: CostModel,
    /// Sink for planner diagnostics.
    pub observer: Arc<dyn PlanObserver>,
    /// Folds constant operands of comparisons.
    pub evaluator: Arc<dyn ConstEvaluator + Send + Sync>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            cost: CostModel::default(),
            observer: default_observer(),
            evaluator: Arc::new(DefaultEvaluator),
        }
    }
}

impl fmt::Debug for PlannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerOptions")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PlannerOptions {
    /// Default options with events forwarded to `tracing`.
    pub fn traced() -> Self {
        Self::default().with_observer(Arc::new(TracingObserver))
    }

    /// Replaces the cost model.
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    /// Replaces the observer.
    pub fn with_observer(mut self, observer: Arc<dyn PlanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replaces the constant evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ConstEvaluator + Send + Sync>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Checks every option value.
    pub fn validate(&self) -> Result<()> {
        self.cost.validate()
    }
}
