#![forbid(unsafe_code)]

//! Range constraint algebra over single-column bounds.
//!
//! Bounds are compared by their order-preserving key encodings so that the
//! algebra agrees with physical index order.

use std::cmp::Ordering;
use std::fmt;

use crate::sql::datum::Datum;
use crate::sql::expr::ComparisonOp;

/// Which end of a column range a bound constrains.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// Lower end; operators `>=` and `>`.
    Lower,
    /// Upper end; operators `<=` and `<`.
    Upper,
}

/// Operator attached to a bound.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BoundOp {
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `<`
    Lt,
}

impl BoundOp {
    /// The side this operator belongs to.
    pub fn side(self) -> Side {
        match self {
            BoundOp::Ge | BoundOp::Gt => Side::Lower,
            BoundOp::Le | BoundOp::Lt => Side::Upper,
        }
    }

    /// Returns true for `>` and `<`.
    pub fn is_strict(self) -> bool {
        matches!(self, BoundOp::Gt | BoundOp::Lt)
    }

    /// SQL spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BoundOp::Ge => ">=",
            BoundOp::Gt => ">",
            BoundOp::Le => "<=",
            BoundOp::Lt => "<",
        }
    }
}

impl From<BoundOp> for ComparisonOp {
    fn from(op: BoundOp) -> Self {
        match op {
            BoundOp::Ge => ComparisonOp::Ge,
            BoundOp::Gt => ComparisonOp::Gt,
            BoundOp::Le => ComparisonOp::Le,
            BoundOp::Lt => ComparisonOp::Lt,
        }
    }
}

/// One end of a value interval.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    /// Boundary value.
    pub datum: Datum,
    /// Boundary operator.
    pub op: BoundOp,
}

impl Bound {
    /// Creates a bound.
    pub fn new(datum: Datum, op: BoundOp) -> Self {
        Self { datum, op }
    }

    /// Returns true for `>=` and `<=`.
    pub fn is_inclusive(&self) -> bool {
        !self.op.is_strict()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.datum)
    }
}

/// Lower and upper bound for one column; a missing side is unconstrained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnRange {
    /// Lower bound (`>=` or `>`).
    pub lower: Option<Bound>,
    /// Upper bound (`<=` or `<`).
    pub upper: Option<Bound>,
}

impl ColumnRange {
    /// Narrows the `side` end of the range by `bound`.
    pub fn intersect(&mut self, side: Side, bound: Bound) {
        intersect(self.slot(side), bound, side);
    }

    /// Widens the `side` end of the range to admit `bound`.
    pub fn union(&mut self, side: Side, bound: Bound) {
        union(self.slot(side), bound, side);
    }

    /// Returns the bound on `side`, if any.
    pub fn get(&self, side: Side) -> Option<&Bound> {
        match side {
            Side::Lower => self.lower.as_ref(),
            Side::Upper => self.upper.as_ref(),
        }
    }

    /// Returns true when neither side is constrained.
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Returns true when no value can satisfy both sides.
    pub fn is_contradictory(&self) -> bool {
        let (Some(lower), Some(upper)) = (&self.lower, &self.upper) else {
            return false;
        };
        match lower.datum.key_cmp(&upper.datum) {
            Ordering::Greater => true,
            Ordering::Equal => lower.op.is_strict() || upper.op.is_strict(),
            Ordering::Less => false,
        }
    }

    fn slot(&mut self, side: Side) -> &mut Option<Bound> {
        match side {
            Side::Lower => &mut self.lower,
            Side::Upper => &mut self.upper,
        }
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => write!(f, "{lower} AND {upper}"),
            (Some(bound), None) | (None, Some(bound)) => write!(f, "{bound}"),
            (None, None) => f.write_str("unbounded"),
        }
    }
}

/// Replaces `existing` with `candidate` when the candidate is tighter.
///
/// Lower bounds keep the larger value, upper bounds the smaller one. On equal
/// values the strict operator wins.
pub fn intersect(existing: &mut Option<Bound>, candidate: Bound, side: Side) {
    assert_side(&candidate, side);
    let Some(current) = existing else {
        *existing = Some(candidate);
        return;
    };
    let tighter = match side {
        Side::Lower => Ordering::Greater,
        Side::Upper => Ordering::Less,
    };
    match candidate.datum.key_cmp(&current.datum) {
        Ordering::Equal => {
            if candidate.op.is_strict() {
                current.op = candidate.op;
            }
        }
        ord if ord == tighter => *current = candidate,
        _ => {}
    }
}

/// Replaces `existing` with `candidate` when the candidate is looser.
///
/// Lower bounds keep the smaller value, upper bounds the larger one. On equal
/// values the inclusive operator wins.
pub fn union(existing: &mut Option<Bound>, candidate: Bound, side: Side) {
    assert_side(&candidate, side);
    let Some(current) = existing else {
        *existing = Some(candidate);
        return;
    };
    let looser = match side {
        Side::Lower => Ordering::Less,
        Side::Upper => Ordering::Greater,
    };
    match candidate.datum.key_cmp(&current.datum) {
        Ordering::Equal => {
            if !candidate.op.is_strict() {
                current.op = candidate.op;
            }
        }
        ord if ord == looser => *current = candidate,
        _ => {}
    }
}

/// Aborts on a bound whose operator belongs to the other side. Reaching this
/// is a bug in the caller, never a property of the query.
fn assert_side(bound: &Bound, side: Side) {
    if bound.op.side() != side {
        panic!(
            "internal error: unexpected {} op {} for {:?} bound",
            match side {
                Side::Lower => "start",
                Side::Upper => "end",
            },
            bound.op.as_str(),
            side
        );
    }
}
