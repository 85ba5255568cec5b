#![forbid(unsafe_code)]

//! Predicate analysis: derives per-column ranges from a filter tree.
//!
//! Analysis never fails. Fragments that cannot be turned into a bound are
//! skipped and reported to the observer; the executor re-checks every row
//! against the full predicate, so a wider range is always safe.

use std::fmt;

use crate::query::bounds::ColumnBounds;
use crate::query::observer::PlanObserver;
use crate::query::range::{Bound, BoundOp, Side};
use crate::sql::catalog::TableDescriptor;
use crate::sql::datum::Datum;
use crate::sql::eval::{convert, ConstEvaluator, ConvertError, EvalError};
use crate::sql::expr::{ComparisonOp, Expr};
use crate::types::ColumnId;

/// Why a comparison contributed no bound.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// Operator outside `=`, `<`, `<=`, `>`, `>=`.
    UnsupportedOperator(ComparisonOp),
    /// Neither operand is a bare column reference.
    NoColumnOperand,
    /// The operand opposite the column references a column.
    NonConstantOperand,
    /// The column is not part of the scanned table.
    UnknownColumn(ColumnId),
    /// The constant operand failed to evaluate.
    Evaluation(EvalError),
    /// The constant's type does not fit the column.
    TypeMismatch(ConvertError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedOperator(op) => write!(f, "unsupported operator {op}"),
            SkipReason::NoColumnOperand => f.write_str("no column operand"),
            SkipReason::NonConstantOperand => f.write_str("operand is not constant"),
            SkipReason::UnknownColumn(id) => write!(f, "unknown column id {id}"),
            SkipReason::Evaluation(err) => write!(f, "evaluation failed: {err}"),
            SkipReason::TypeMismatch(err) => write!(f, "{err}"),
        }
    }
}

/// Walks filter expressions for one table.
pub struct PredicateAnalyzer<'a> {
    table: &'a TableDescriptor,
    evaluator: &'a dyn ConstEvaluator,
    observer: &'a dyn PlanObserver,
}

impl<'a> PredicateAnalyzer<'a> {
    /// Creates an analyzer over `table`.
    pub fn new(
        table: &'a TableDescriptor,
        evaluator: &'a dyn ConstEvaluator,
        observer: &'a dyn PlanObserver,
    ) -> Self {
        Self {
            table,
            evaluator,
            observer,
        }
    }

    /// Derives the column ranges implied by `filter`.
    ///
    /// `AND` tightens ranges in place. `OR` analyzes both sides apart and keeps
    /// only columns bounded on both, each widened to cover either side; the
    /// result then tightens the enclosing ranges. `BETWEEN` is rewritten to a
    /// pair of comparisons first. `NOT` and other nodes add nothing.
    ///
    /// A comparison yields bounds when one operand is a column of the table
    /// and the other folds to a constant that converts to the column type.
    /// Anything else is reported to the observer as a [`SkipReason`].
    ///
    /// # Parameters
    /// * `filter` - Boolean filter over this analyzer's table.
    ///
    /// The returned ranges always contain every row satisfying `filter`.
    pub fn analyze(&self, filter: &Expr) -> ColumnBounds {
        let mut bounds = ColumnBounds::new();
        self.analyze_into(filter, &mut bounds);
        bounds
    }

    fn analyze_into(&self, expr: &Expr, bounds: &mut ColumnBounds) {
        match expr {
            Expr::And { left, right } => {
                self.analyze_into(left, bounds);
                self.analyze_into(right, bounds);
            }
            Expr::Or { left, right } => {
                let merged = ColumnBounds::union_of(self.analyze(left), self.analyze(right));
                bounds.intersect_with(merged);
            }
            Expr::Paren { expr } => self.analyze_into(expr, bounds),
            Expr::Comparison { op, left, right } => {
                self.analyze_comparison(*op, left, right, bounds)
            }
            Expr::Range {
                not,
                expr,
                from,
                to,
            } => {
                let rewritten = if *not {
                    Expr::or(
                        Expr::lt((**expr).clone(), (**from).clone()),
                        Expr::gt((**expr).clone(), (**to).clone()),
                    )
                } else {
                    Expr::and(
                        Expr::ge((**expr).clone(), (**from).clone()),
                        Expr::le((**expr).clone(), (**to).clone()),
                    )
                };
                self.analyze_into(&rewritten, bounds);
            }
            Expr::Not { .. }
            | Expr::Column { .. }
            | Expr::Literal { .. }
            | Expr::Binary { .. }
            | Expr::Neg { .. }
            | Expr::Tuple { .. }
            | Expr::Func { .. } => {}
        }
    }

    fn analyze_comparison(
        &self,
        op: ComparisonOp,
        left: &Expr,
        right: &Expr,
        bounds: &mut ColumnBounds,
    ) {
        let (column_id, constant, op) = match (left, right) {
            (Expr::Column { id, .. }, other) => (*id, other, op),
            (other, Expr::Column { id, .. }) => (*id, other, op.commute()),
            _ => {
                self.observer.bound_skipped(&SkipReason::NoColumnOperand);
                return;
            }
        };
        let Some(bound_ops) = bound_ops(op) else {
            self.observer.bound_skipped(&SkipReason::UnsupportedOperator(op));
            return;
        };
        if !constant.is_const() {
            self.observer.bound_skipped(&SkipReason::NonConstantOperand);
            return;
        }
        let Some(column) = self.table.column_by_id(column_id) else {
            self.observer.bound_skipped(&SkipReason::UnknownColumn(column_id));
            return;
        };
        let datum = match self.evaluator.evaluate(constant) {
            Ok(datum) => datum,
            Err(err) => {
                self.observer.bound_skipped(&SkipReason::Evaluation(err));
                return;
            }
        };
        let exact = datum.clone();
        let datum = match convert(column, datum) {
            Ok(datum) => datum,
            Err(err) => {
                self.observer.bound_skipped(&SkipReason::TypeMismatch(err));
                return;
            }
        };

        self.observer.bound_derived(column, op, &datum);
        let range = bounds.range_mut(column_id);
        for &bound_op in bound_ops {
            range.intersect(bound_op.side(), outward_bound(&exact, &datum, bound_op));
        }
    }
}

/// Bound on the converted constant, loosened when widening an integer to
/// FLOAT rounded it.
///
/// Integers past 2^53 may round to a float on the wrong side of the exact
/// value. The bound then moves to the nearest float at or beyond the integer
/// on its own side and becomes inclusive, so no matching row falls outside.
fn outward_bound(exact: &Datum, converted: &Datum, op: BoundOp) -> Bound {
    let (Datum::Int(v), Datum::Float(f)) = (exact, converted) else {
        return Bound::new(converted.clone(), op);
    };
    let (v, rounded) = (i128::from(*v), *f as i128);
    if rounded == v {
        return Bound::new(converted.clone(), op);
    }
    match op.side() {
        Side::Lower if rounded <= v => Bound::new(Datum::Float(*f), BoundOp::Ge),
        Side::Lower => Bound::new(Datum::Float(step_float(*f, false)), BoundOp::Ge),
        Side::Upper if rounded >= v => Bound::new(Datum::Float(*f), BoundOp::Le),
        Side::Upper => Bound::new(Datum::Float(step_float(*f, true)), BoundOp::Le),
    }
}

/// Adjacent float towards +inf (`up`) or -inf. Only called on finite values
/// far from zero.
fn step_float(f: f64, up: bool) -> f64 {
    let bits = f.to_bits();
    if (f > 0.0) == up {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Bounds contributed by a comparison with the column on the left.
fn bound_ops(op: ComparisonOp) -> Option<&'static [BoundOp]> {
    match op {
        ComparisonOp::Eq => Some(&[BoundOp::Ge, BoundOp::Le]),
        ComparisonOp::Ge => Some(&[BoundOp::Ge]),
        ComparisonOp::Gt => Some(&[BoundOp::Gt]),
        ComparisonOp::Le => Some(&[BoundOp::Le]),
        ComparisonOp::Lt => Some(&[BoundOp::Lt]),
        ComparisonOp::Ne
        | ComparisonOp::Like
        | ComparisonOp::NotLike
        | ComparisonOp::In
        | ComparisonOp::NotIn => None,
    }
}
