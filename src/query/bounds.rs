#![forbid(unsafe_code)]

//! Per-call mapping from column to derived range.

use std::collections::btree_map::{self, BTreeMap};

use crate::query::range::{ColumnRange, Side};
use crate::types::ColumnId;

/// Column ranges derived from one filter.
///
/// Built fresh for every planning call and owned by it. Iteration follows
/// column id order so that diagnostics are reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnBounds {
    ranges: BTreeMap<ColumnId, ColumnRange>,
}

impl ColumnBounds {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the range recorded for `column`.
    pub fn get(&self, column: ColumnId) -> Option<&ColumnRange> {
        self.ranges.get(&column)
    }

    /// Number of constrained columns.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true when no column is constrained.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over `(column, range)` pairs in column id order.
    pub fn iter(&self) -> btree_map::Iter<'_, ColumnId, ColumnRange> {
        self.ranges.iter()
    }

    /// Returns the range for `column`, inserting an unbounded one if absent.
    pub(crate) fn range_mut(&mut self, column: ColumnId) -> &mut ColumnRange {
        self.ranges.entry(column).or_default()
    }

    /// Narrows this table by every bound in `other`.
    pub(crate) fn intersect_with(&mut self, other: ColumnBounds) {
        for (column, range) in other.ranges {
            let target = self.range_mut(column);
            if let Some(lower) = range.lower {
                target.intersect(Side::Lower, lower);
            }
            if let Some(upper) = range.upper {
                target.intersect(Side::Upper, upper);
            }
        }
    }

    /// Merges the tables of two disjuncts.
    ///
    /// Only columns bounded on both sides of the OR survive, and each end
    /// survives only when both disjuncts constrain it.
    pub(crate) fn union_of(left: ColumnBounds, mut right: ColumnBounds) -> ColumnBounds {
        let mut merged = BTreeMap::new();
        for (column, left_range) in left.ranges {
            let Some(right_range) = right.ranges.remove(&column) else {
                continue;
            };
            let mut range = ColumnRange::default();
            if let (Some(l), Some(r)) = (left_range.lower, right_range.lower) {
                range.union(Side::Lower, l);
                range.union(Side::Lower, r);
            }
            if let (Some(l), Some(r)) = (left_range.upper, right_range.upper) {
                range.union(Side::Upper, l);
                range.union(Side::Upper, r);
            }
            if !range.is_unbounded() {
                merged.insert(column, range);
            }
        }
        ColumnBounds { ranges: merged }
    }
}

impl<'a> IntoIterator for &'a ColumnBounds {
    type Item = (&'a ColumnId, &'a ColumnRange);
    type IntoIter = btree_map::Iter<'a, ColumnId, ColumnRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
