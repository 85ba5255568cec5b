//! Read-only table and index descriptors consumed by the planner.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sql::datum::ColumnType;
use crate::sql::expr::Expr;
use crate::types::{ColumnId, IndexId, PlanError, Result, TableId};

/// Column metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Identifier unique within the table.
    pub id: ColumnId,
    /// Column name.
    pub name: String,
    /// Declared type.
    pub ty: ColumnType,
    /// Whether the column admits NULL.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Creates a non-nullable column.
    pub fn new(id: ColumnId, name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    /// Marks the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Index metadata: ordered key columns plus the uniqueness flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Identifier unique within the table.
    pub id: IndexId,
    /// Index name.
    pub name: String,
    /// Whether key values are unique without a primary-key suffix.
    #[serde(default)]
    pub unique: bool,
    /// Key columns in index order.
    pub column_ids: Vec<ColumnId>,
}

impl IndexDescriptor {
    /// Creates a non-unique index over `column_ids`.
    pub fn new(id: IndexId, name: impl Into<String>, column_ids: Vec<ColumnId>) -> Self {
        Self {
            id,
            name: name.into(),
            unique: false,
            column_ids,
        }
    }

    /// Marks the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Returns true if `id` is one of the key columns.
    pub fn contains_column_id(&self, id: ColumnId) -> bool {
        self.column_ids.contains(&id)
    }
}

/// Table metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table identifier.
    pub id: TableId,
    /// Table name.
    pub name: String,
    /// All stored columns.
    pub columns: Vec<ColumnDescriptor>,
    /// Primary index; its key columns form the primary key.
    pub primary_index: IndexDescriptor,
    /// Secondary indexes in declaration order.
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    /// Creates a table with the given columns and primary index.
    pub fn new(
        id: TableId,
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        primary_index: IndexDescriptor,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            columns,
            primary_index,
            indexes: Vec::new(),
        }
    }

    /// Appends a secondary index.
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up a column by identifier.
    pub fn column_by_id(&self, id: ColumnId) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Looks up a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Builds a column reference expression for `name`.
    pub fn column_ref(&self, name: &str) -> Result<Expr> {
        self.column_by_name(name)
            .map(|c| Expr::column(c.id, c.name.clone()))
            .ok_or_else(|| PlanError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_owned(),
            })
    }

    /// Finds an index (primary or secondary) by name.
    pub fn find_index_by_name(&self, name: &str) -> Option<&IndexDescriptor> {
        std::iter::once(&self.primary_index)
            .chain(self.indexes.iter())
            .find(|index| index.name == name)
    }

    /// Finds an index (primary or secondary) by identifier.
    pub fn index_by_id(&self, id: IndexId) -> Option<&IndexDescriptor> {
        std::iter::once(&self.primary_index)
            .chain(self.indexes.iter())
            .find(|index| index.id == id)
    }

    /// Returns true if `index` is this table's primary index.
    pub fn is_primary(&self, index: &IndexDescriptor) -> bool {
        index.id == self.primary_index.id
    }

    /// Checks identifier uniqueness and index column references.
    pub fn validate(&self) -> Result<()> {
        let mut column_ids = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !column_ids.insert(column.id) {
                return Err(PlanError::Invalid("duplicate column id"));
            }
        }
        if self.primary_index.column_ids.is_empty() {
            return Err(PlanError::Invalid("primary index has no columns"));
        }
        let mut index_ids = HashSet::with_capacity(self.indexes.len() + 1);
        for index in std::iter::once(&self.primary_index).chain(self.indexes.iter()) {
            if !index_ids.insert(index.id) {
                return Err(PlanError::Invalid("duplicate index id"));
            }
            if index.column_ids.is_empty() {
                return Err(PlanError::Invalid("index has no columns"));
            }
            if index.column_ids.iter().any(|id| !column_ids.contains(id)) {
                return Err(PlanError::Invalid("index references unknown column"));
            }
        }
        Ok(())
    }
}
