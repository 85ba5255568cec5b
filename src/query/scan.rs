#![forbid(unsafe_code)]

//! Table scan node: planner input and executor handoff.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use crate::query::keys::{index_key_prefix, KeySpan};
use crate::sql::catalog::{IndexDescriptor, TableDescriptor};
use crate::sql::expr::Expr;
use crate::types::{ColumnId, IndexId, PlanError, Result};

/// A scan over one table, optionally filtered.
///
/// Until an index is selected the scan reads the whole primary index.
#[derive(Clone, Debug, Default)]
pub struct Scan {
    table: Option<Arc<TableDescriptor>>,
    index: Option<IndexId>,
    hinted: bool,
    filter: Option<Expr>,
    columns: BTreeSet<ColumnId>,
    span: KeySpan,
}

impl Scan {
    /// Scan over the full primary index of `table`.
    pub fn new(table: Arc<TableDescriptor>) -> Self {
        let index = table.primary_index.id;
        let span = KeySpan::prefix(index_key_prefix(table.id, index));
        Self {
            table: Some(table),
            index: Some(index),
            hinted: false,
            filter: None,
            columns: BTreeSet::new(),
            span,
        }
    }

    /// Scan with no table, e.g. `SELECT 1`. Index selection leaves it alone.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Restricts candidates to the index named `name`.
    pub fn with_index_hint(mut self, name: &str) -> Result<Self> {
        let table = self
            .table
            .as_ref()
            .ok_or(PlanError::Invalid("index hint on a scan without a table"))?;
        let index = table
            .find_index_by_name(name)
            .ok_or_else(|| PlanError::UnknownIndex {
                table: table.name.clone(),
                index: name.to_owned(),
            })?;
        trace!(table = %table.name, index = %index.name, "scan.index_hint");
        self.span = KeySpan::prefix(index_key_prefix(table.id, index.id));
        self.index = Some(index.id);
        self.hinted = true;
        Ok(self)
    }

    /// Sets the filter and records the columns it reads.
    pub fn with_filter(mut self, filter: Expr) -> Self {
        filter.collect_columns(&mut self.columns);
        self.filter = Some(filter);
        self
    }

    /// Records the columns read by projection expressions.
    pub fn with_targets<'e>(mut self, targets: impl IntoIterator<Item = &'e Expr>) -> Self {
        for target in targets {
            target.collect_columns(&mut self.columns);
        }
        self
    }

    /// Scanned table, if any.
    pub fn table(&self) -> Option<&Arc<TableDescriptor>> {
        self.table.as_ref()
    }

    /// Filter expression, if any.
    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    /// Every column read by the filter and projection.
    pub fn columns(&self) -> &BTreeSet<ColumnId> {
        &self.columns
    }

    /// Returns true if an index hint restricted the candidates.
    pub fn is_hinted(&self) -> bool {
        self.hinted
    }

    /// Index to scan; `None` for a detached scan.
    pub fn index_id(&self) -> Option<IndexId> {
        self.index
    }

    /// Descriptor of the index to scan.
    pub fn index(&self) -> Option<&IndexDescriptor> {
        let table = self.table.as_ref()?;
        table.index_by_id(self.index?)
    }

    /// Returns true when the scan reads a secondary index.
    pub fn is_secondary_index(&self) -> bool {
        match (&self.table, self.index) {
            (Some(table), Some(index)) => index != table.primary_index.id,
            _ => false,
        }
    }

    /// Key range to read.
    pub fn span(&self) -> &KeySpan {
        &self.span
    }

    pub(crate) fn commit(&mut self, index: IndexId, span: KeySpan) {
        self.index = Some(index);
        self.span = span;
    }
}
