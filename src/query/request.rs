#![forbid(unsafe_code)]

//! Self-contained planning request, as read by the CLI.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::query::options::CostModel;
use crate::query::scan::Scan;
use crate::sql::catalog::TableDescriptor;
use crate::sql::expr::Expr;
use crate::types::Result;

/// A table, its query shape and optional cost overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Scanned table and its indexes.
    pub table: TableDescriptor,
    /// Explicit index hint.
    #[serde(default)]
    pub index: Option<String>,
    /// Projected column names.
    #[serde(default)]
    pub targets: Vec<String>,
    /// WHERE clause.
    #[serde(default)]
    pub filter: Option<Expr>,
    /// Cost model override.
    #[serde(default)]
    pub cost: Option<CostModel>,
}

impl PlanRequest {
    /// Parses a request from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validates the table and builds the scan the request describes.
    pub fn to_scan(&self) -> Result<Scan> {
        self.table.validate()?;
        let targets = self
            .targets
            .iter()
            .map(|name| self.table.column_ref(name))
            .collect::<Result<Vec<_>>>()?;
        let mut scan = Scan::new(Arc::new(self.table.clone())).with_targets(&targets);
        if let Some(index) = &self.index {
            scan = scan.with_index_hint(index)?;
        }
        if let Some(filter) = &self.filter {
            scan = scan.with_filter(filter.clone());
        }
        Ok(scan)
    }
}
