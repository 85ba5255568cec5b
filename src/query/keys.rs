#![forbid(unsafe_code)]

//! Index key layout and scan boundary construction.
//!
//! Every index key starts with `table id ‖ index id` (both big-endian), then
//! carries the order-preserving encodings of the index columns. Keys of
//! non-unique secondary indexes end with the primary-key columns the index
//! does not already hold.

use std::collections::BTreeMap;
use std::fmt;

use crate::primitives::bytes::{key, ord};
use crate::query::range::{Bound, BoundOp};
use crate::sql::catalog::{IndexDescriptor, TableDescriptor};
use crate::sql::datum::{encode_table_key, Datum};
use crate::types::{ColumnId, IndexId, TableId};

/// Half-open key interval `[start, end)`.
///
/// An empty `end` has no upper limit. It only arises for indexes whose key
/// prefix is all `0xff`, where no finite key sorts after every entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySpan {
    /// First key included in the scan.
    pub start: Vec<u8>,
    /// First key past the scan, or empty when unbounded.
    pub end: Vec<u8>,
}

impl KeySpan {
    /// Creates a span.
    pub fn new(start: Vec<u8>, end: Vec<u8>) -> Self {
        Self { start, end }
    }

    /// Span covering every key that starts with `prefix`.
    pub fn prefix(prefix: Vec<u8>) -> Self {
        let end = key::prefix_end(&prefix);
        Self { start: prefix, end }
    }

    /// Returns true when `key` lies in `[start, end)`.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.start.as_slice() <= key && (self.is_unbounded() || key < self.end.as_slice())
    }

    /// Returns true when the span runs to the end of the keyspace.
    pub fn is_unbounded(&self) -> bool {
        self.end.is_empty()
    }

    /// Returns true when no key can lie in the span.
    pub fn is_empty(&self) -> bool {
        !self.is_unbounded() && self.start >= self.end
    }
}

impl fmt::Display for KeySpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            return write!(f, "[{}, inf)", hex::encode(&self.start));
        }
        write!(
            f,
            "[{}, {})",
            hex::encode(&self.start),
            hex::encode(&self.end)
        )
    }
}

/// Key prefix shared by every entry of one index.
pub fn index_key_prefix(table: TableId, index: IndexId) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(8);
    ord::put_u32_be(&mut prefix, table.0);
    ord::put_u32_be(&mut prefix, index.0);
    prefix
}

/// Builds the inclusive start key from the consumed lower bounds.
///
/// Bounds are appended in index column order, each as the order-preserving
/// encoding of its datum. An inclusive `>=` bound lets the next column
/// continue the key; a strict `>` bound ends it and the key is advanced to its
/// immediate successor, which skips every entry equal to the bounded prefix.
///
/// # Parameters
/// * `prefix` - The index key prefix from [`index_key_prefix`].
/// * `start` - Lower bounds the candidate consumed, leading column first.
///
/// An empty `start` yields `prefix` itself, the first key of the index.
pub fn make_start_key(prefix: Vec<u8>, start: &[Bound]) -> Vec<u8> {
    let mut key = prefix;
    for bound in start {
        key = encode_table_key(key, &bound.datum);
        if bound.op == BoundOp::Gt {
            return key::next(&key);
        }
    }
    key
}

/// Builds the exclusive end key from the consumed upper bounds.
///
/// Bounds are appended in index column order like [`make_start_key`]. A
/// strict `<` bound ends the key as is, since every matching entry sorts below
/// it. When the list runs out on inclusive bounds, or is empty, the
/// accumulated key is advanced past every key it prefixes with
/// [`key::prefix_end`].
///
/// # Parameters
/// * `prefix` - The index key prefix from [`index_key_prefix`].
/// * `end` - Upper bounds the candidate consumed, leading column first.
///
/// Returns an empty key when the accumulated key has no finite prefix end;
/// [`KeySpan`] reads that as unbounded.
pub fn make_end_key(prefix: Vec<u8>, end: &[Bound]) -> Vec<u8> {
    let mut key = prefix;
    for bound in end {
        key = encode_table_key(key, &bound.datum);
        if bound.op == BoundOp::Lt {
            return key;
        }
    }
    key::prefix_end(&key)
}

/// Physical key of `row` in `index`. Missing columns encode as NULL.
pub fn encode_index_key(
    table: &TableDescriptor,
    index: &IndexDescriptor,
    row: &BTreeMap<ColumnId, Datum>,
) -> Vec<u8> {
    let mut key = index_key_prefix(table.id, index.id);
    let value = |id: &ColumnId| row.get(id).unwrap_or(&Datum::Null);
    for id in &index.column_ids {
        key = encode_table_key(key, value(id));
    }
    if !table.is_primary(index) && !index.unique {
        for id in &table.primary_index.column_ids {
            if !index.contains_column_id(*id) {
                key = encode_table_key(key, value(id));
            }
        }
    }
    key
}
