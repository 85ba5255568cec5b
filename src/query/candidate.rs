#![forbid(unsafe_code)]

//! Per-index coverage check, bound extraction and pricing.
//!
//! Every index of the scanned table becomes one [`IndexCandidate`]. A
//! candidate that cannot supply every projected and filtered column is priced
//! at `f64::MAX` so it only wins when nothing else exists. Covering candidates
//! take the leading run of bounds their key columns admit and are priced by
//! [`CostModel::cost`]; more bound columns make a scan cheaper.

use std::collections::BTreeSet;

use crate::query::bounds::ColumnBounds;
use crate::query::explain::CandidateReport;
use crate::query::keys::{index_key_prefix, make_end_key, make_start_key, KeySpan};
use crate::query::options::CostModel;
use crate::query::range::{Bound, Side};
use crate::sql::catalog::{IndexDescriptor, TableDescriptor};
use crate::types::ColumnId;

/// One index under consideration for a scan.
#[derive(Clone, Debug)]
pub struct IndexCandidate<'a> {
    table: &'a TableDescriptor,
    index: &'a IndexDescriptor,
    start: Vec<Bound>,
    end: Vec<Bound>,
    covering: bool,
    cost: f64,
}

impl<'a> IndexCandidate<'a> {
    /// Creates an unevaluated candidate.
    pub fn new(table: &'a TableDescriptor, index: &'a IndexDescriptor) -> Self {
        Self {
            table,
            index,
            start: Vec::new(),
            end: Vec::new(),
            covering: false,
            cost: f64::MAX,
        }
    }

    /// Checks coverage, extracts bounds and prices the candidate.
    ///
    /// Start and end bounds are taken along the index columns in declared
    /// order. Each list stops at the first column without a bound on its side
    /// and right after the first strict bound, since a composite key can only
    /// be narrowed past a fixed or inclusive component.
    ///
    /// # Parameters
    /// * `columns` - Column ids the scan reads, from its projection and filter.
    /// * `bounds` - Column ranges derived from the filter.
    /// * `model` - Pricing factors.
    ///
    /// Non-covering candidates keep empty bound lists and cost `f64::MAX`.
    pub fn evaluate(
        &mut self,
        columns: &BTreeSet<ColumnId>,
        bounds: &ColumnBounds,
        model: &CostModel,
    ) {
        self.covering = self.covers(columns);
        if !self.covering {
            self.start.clear();
            self.end.clear();
            self.cost = f64::MAX;
            return;
        }
        self.start = leading_bounds(&self.index.column_ids, bounds, Side::Lower);
        self.end = leading_bounds(&self.index.column_ids, bounds, Side::Upper);
        self.cost = model.cost(
            self.base_cost(),
            self.index.column_ids.len(),
            self.start.len() + self.end.len(),
        );
    }

    /// Returns true if every column in `columns` can be read from the index.
    ///
    /// Non-unique secondary keys carry the primary key as a suffix, so primary
    /// key columns count as present for them.
    pub fn covers(&self, columns: &BTreeSet<ColumnId>) -> bool {
        if self.is_primary() {
            return true;
        }
        columns.iter().all(|id| {
            self.index.contains_column_id(*id)
                || (!self.index.unique && self.table.primary_index.contains_column_id(*id))
        })
    }

    /// Keys read per row: one per stored column plus a sentinel for the
    /// primary index, one per key column for a secondary index.
    fn base_cost(&self) -> usize {
        if self.is_primary() {
            (1 + self.table.columns.len()).saturating_sub(self.index.column_ids.len())
        } else {
            self.index.column_ids.len()
        }
    }

    /// The candidate index.
    pub fn index(&self) -> &'a IndexDescriptor {
        self.index
    }

    /// Returns true for the table's primary index.
    pub fn is_primary(&self) -> bool {
        self.table.is_primary(self.index)
    }

    /// Returns true once [`evaluate`](Self::evaluate) found the index covering.
    pub fn is_covering(&self) -> bool {
        self.covering
    }

    /// Consumed lower bounds in index column order.
    pub fn start(&self) -> &[Bound] {
        &self.start
    }

    /// Consumed upper bounds in index column order.
    pub fn end(&self) -> &[Bound] {
        &self.end
    }

    /// Estimated cost; lower is better.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The `[start, end)` keys this candidate would scan.
    pub fn span(&self) -> KeySpan {
        let prefix = index_key_prefix(self.table.id, self.index.id);
        KeySpan::new(
            make_start_key(prefix.clone(), &self.start),
            make_end_key(prefix, &self.end),
        )
    }

    /// Summary used by observers and explain output.
    pub fn report(&self) -> CandidateReport {
        let span = self.span();
        CandidateReport {
            index: self.index.name.clone(),
            index_id: self.index.id,
            primary: self.is_primary(),
            covering: self.covering,
            start_bounds: self.start.len(),
            end_bounds: self.end.len(),
            cost: self.cost,
            start_key: hex::encode(span.start),
            end_key: hex::encode(span.end),
        }
    }
}

/// Collects `side` bounds along the index columns. Stops at the first column
/// without one, and right after the first strict bound.
fn leading_bounds(columns: &[ColumnId], bounds: &ColumnBounds, side: Side) -> Vec<Bound> {
    let mut out = Vec::new();
    for id in columns {
        let Some(bound) = bounds.get(*id).and_then(|range| range.get(side)) else {
            break;
        };
        out.push(bound.clone());
        if bound.op.is_strict() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::range::BoundOp;
    use crate::sql::catalog::ColumnDescriptor;
    use crate::sql::datum::{ColumnType, Datum};
    use crate::types::{IndexId, TableId};

    const A: ColumnId = ColumnId(1);
    const B: ColumnId = ColumnId(2);
    const C: ColumnId = ColumnId(3);

    fn table() -> TableDescriptor {
        TableDescriptor::new(
            TableId(51),
            "t",
            vec![
                ColumnDescriptor::new(A, "a", ColumnType::Int),
                ColumnDescriptor::new(B, "b", ColumnType::Int),
                ColumnDescriptor::new(C, "c", ColumnType::Int),
            ],
            IndexDescriptor::new(IndexId(1), "primary", vec![A]).unique(),
        )
        .with_index(IndexDescriptor::new(IndexId(2), "idx_bc", vec![B, C]))
        .with_index(IndexDescriptor::new(IndexId(3), "uniq_b", vec![B]).unique())
    }

    fn set(ids: &[ColumnId]) -> BTreeSet<ColumnId> {
        ids.iter().copied().collect()
    }

    fn bounds(entries: &[(ColumnId, Side, i64, BoundOp)]) -> ColumnBounds {
        let mut table = ColumnBounds::new();
        for (id, side, v, op) in entries {
            table
                .range_mut(*id)
                .intersect(*side, Bound::new(Datum::Int(*v), *op));
        }
        table
    }

    #[test]
    fn primary_always_covers() {
        let t = table();
        let candidate = IndexCandidate::new(&t, &t.primary_index);
        assert!(candidate.covers(&set(&[A, B, C])));
    }

    #[test]
    fn non_unique_secondary_borrows_primary_key() {
        let t = table();
        let candidate = IndexCandidate::new(&t, &t.indexes[0]);
        assert!(candidate.covers(&set(&[A, B, C])));
    }

    #[test]
    fn unique_secondary_does_not_borrow_primary_key() {
        let t = table();
        let candidate = IndexCandidate::new(&t, &t.indexes[1]);
        assert!(candidate.covers(&set(&[B])));
        assert!(!candidate.covers(&set(&[A, B])));
    }

    #[test]
    fn non_covering_candidate_is_priced_out() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.indexes[1]);
        let b = bounds(&[(B, Side::Lower, 1, BoundOp::Ge)]);
        candidate.evaluate(&set(&[A, B]), &b, &CostModel::default());
        assert!(!candidate.is_covering());
        assert_eq!(candidate.cost(), f64::MAX);
        assert!(candidate.start().is_empty());
    }

    #[test]
    fn extraction_continues_past_inclusive_bounds() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.indexes[0]);
        let b = bounds(&[
            (B, Side::Lower, 1, BoundOp::Ge),
            (B, Side::Upper, 1, BoundOp::Le),
            (C, Side::Lower, 3, BoundOp::Gt),
        ]);
        candidate.evaluate(&set(&[B, C]), &b, &CostModel::default());
        assert_eq!(candidate.start().len(), 2);
        assert_eq!(candidate.end().len(), 1);
        // base 2, width 2, three bounds
        assert!((candidate.cost() - 2.0 * 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn extraction_stops_after_strict_bound() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.indexes[0]);
        let b = bounds(&[
            (B, Side::Lower, 1, BoundOp::Gt),
            (C, Side::Lower, 3, BoundOp::Ge),
        ]);
        candidate.evaluate(&set(&[B]), &b, &CostModel::default());
        assert_eq!(candidate.start().len(), 1);
        assert_eq!(candidate.start()[0].op, BoundOp::Gt);
        assert!(candidate.end().is_empty());
    }

    #[test]
    fn extraction_stops_at_gap() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.indexes[0]);
        let b = bounds(&[(C, Side::Lower, 3, BoundOp::Ge)]);
        candidate.evaluate(&set(&[C]), &b, &CostModel::default());
        assert!(candidate.start().is_empty());
        assert_eq!(candidate.cost(), 2.0 * 1000.0);
    }

    #[test]
    fn primary_base_cost_counts_stored_columns() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.primary_index);
        candidate.evaluate(&set(&[A]), &ColumnBounds::new(), &CostModel::default());
        assert_eq!(candidate.cost(), 3.0 * 1000.0);
    }

    #[test]
    fn report_renders_hex_keys() {
        let t = table();
        let mut candidate = IndexCandidate::new(&t, &t.primary_index);
        candidate.evaluate(&set(&[A]), &ColumnBounds::new(), &CostModel::default());
        let report = candidate.report();
        assert_eq!(report.start_key, "0000003300000001");
        assert_eq!(report.end_key, "0000003300000002");
        assert!(report.primary);
    }
}
