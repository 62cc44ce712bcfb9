//! Schema model: tables, columns, indexes and the rowset handles used by expressions.
//!
//! # Example
//!
//! ```rust
//! use empiredb::table::{Table, TableColumn};
//! use empiredb::types::DataType;
//!
//! let mut employees = Table::new("EMPLOYEES");
//! let id = employees.add_column(TableColumn::new("EMPLOYEE_ID", DataType::AutoInc, 4).required());
//! let name = employees.add_column(TableColumn::new("LAST_NAME", DataType::Varchar, 40).required());
//! employees.set_primary_key(&["EMPLOYEE_ID"]).unwrap();
//!
//! assert_eq!(id.column_name(), "EMPLOYEE_ID");
//! assert_eq!(name.table_name(), "EMPLOYEES");
//! assert_eq!(employees.primary_key(), ["EMPLOYEE_ID"]);
//! ```

use crate::error::{DbError, DbResult};
use crate::types::{DataType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Whether a rowset is a base table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSetKind {
    Table,
    View,
}

/// Identity of a table or view as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSetMeta {
    pub name: String,
    pub alias: Option<String>,
    pub kind: RowSetKind,
}

impl RowSetMeta {
    /// Qualifier used for fully qualified column names.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Key identifying this rowset inside one command.
    pub(crate) fn key(&self) -> String {
        format!("{}|{}", self.name.to_ascii_uppercase(), self.qualifier().to_ascii_uppercase())
    }
}

/// Column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub data_type: DataType,
    /// Length for text types, byte size for integers, precision for decimals.
    pub size: u32,
    pub scale: u32,
    pub required: bool,
    pub read_only: bool,
    pub default_value: Option<Value>,
    /// Sequence feeding an `AutoInc` column.
    pub sequence: Option<String>,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, data_type: DataType, size: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            size,
            scale: 0,
            required: false,
            read_only: false,
            default_value: None,
            sequence: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.sequence = Some(name.into());
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.data_type == DataType::AutoInc
    }
}

/// Cheap clonable handle to a column of a rowset, used to build expressions.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    rowset: Arc<RowSetMeta>,
    column: Arc<TableColumn>,
}

impl ColumnRef {
    pub fn new(rowset: Arc<RowSetMeta>, column: Arc<TableColumn>) -> Self {
        Self { rowset, column }
    }

    pub fn rowset(&self) -> &Arc<RowSetMeta> {
        &self.rowset
    }

    pub fn column(&self) -> &TableColumn {
        &self.column
    }

    pub fn table_name(&self) -> &str {
        &self.rowset.name
    }

    pub fn column_name(&self) -> &str {
        &self.column.name
    }

    pub fn data_type(&self) -> DataType {
        self.column.data_type
    }

    /// Same rowset instance and column name.
    pub fn same_column(&self, other: &ColumnRef) -> bool {
        self.rowset.key() == other.rowset.key()
            && self.column.name.eq_ignore_ascii_case(&other.column.name)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.rowset.qualifier(), self.column.name)
    }
}

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Standard,
    Unique,
    PrimaryKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, kind: IndexKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A database table.
#[derive(Debug, Clone)]
pub struct Table {
    meta: Arc<RowSetMeta>,
    columns: Vec<Arc<TableColumn>>,
    primary_key: Vec<String>,
    indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), None)
    }

    /// A table referenced through an alias (required for self joins).
    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::build(name.into(), Some(alias.into()))
    }

    fn build(name: String, alias: Option<String>) -> Self {
        Self {
            meta: Arc::new(RowSetMeta {
                name,
                alias,
                kind: RowSetKind::Table,
            }),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.meta.alias.as_deref()
    }

    pub fn rowset(&self) -> &Arc<RowSetMeta> {
        &self.meta
    }

    /// Add a column and return a handle to it.
    pub fn add_column(&mut self, column: TableColumn) -> ColumnRef {
        let column = Arc::new(column);
        self.columns.push(Arc::clone(&column));
        ColumnRef::new(Arc::clone(&self.meta), column)
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> + '_ {
        self.columns
            .iter()
            .map(|c| ColumnRef::new(Arc::clone(&self.meta), Arc::clone(c)))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column lookup by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| ColumnRef::new(Arc::clone(&self.meta), Arc::clone(c)))
    }

    /// Column lookup that fails with [`DbError::ObjectNotFound`].
    pub fn col(&self, name: &str) -> DbResult<ColumnRef> {
        self.column(name)
            .ok_or_else(|| DbError::ObjectNotFound(format!("column {}.{name}", self.name())))
    }

    pub fn set_primary_key(&mut self, columns: &[&str]) -> DbResult<()> {
        let mut key = Vec::with_capacity(columns.len());
        for name in columns {
            key.push(self.col(name)?.column_name().to_string());
        }
        self.primary_key = key;
        Ok(())
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn primary_key_columns(&self) -> Vec<ColumnRef> {
        self.primary_key.iter().filter_map(|n| self.column(n)).collect()
    }

    pub fn add_index(&mut self, index: Index) -> DbResult<()> {
        for name in &index.columns {
            self.col(name)?;
        }
        if self.indexes.iter().any(|i| i.name.eq_ignore_ascii_case(&index.name)) {
            return Err(DbError::invalid_argument(format!(
                "duplicate index {} on {}",
                index.name,
                self.name()
            )));
        }
        self.indexes.push(index);
        Ok(())
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// The column fed by an auto-increment value, if any.
    pub fn auto_increment_column(&self) -> Option<ColumnRef> {
        self.columns().find(|c| c.column().is_auto_increment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> Table {
        let mut t = Table::new("EMPLOYEES");
        t.add_column(TableColumn::new("ID", DataType::AutoInc, 4).required());
        t.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
        t
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let t = employees();
        assert_eq!(t.column("name").unwrap().column_name(), "NAME");
        assert!(matches!(t.col("MISSING"), Err(DbError::ObjectNotFound(_))));
    }

    #[test]
    fn primary_key_requires_existing_columns() {
        let mut t = employees();
        assert!(t.set_primary_key(&["NOPE"]).is_err());
        t.set_primary_key(&["id"]).unwrap();
        assert_eq!(t.primary_key(), ["ID"]);
    }

    #[test]
    fn alias_is_the_qualifier() {
        let t = Table::with_alias("EMPLOYEES", "E");
        assert_eq!(t.rowset().qualifier(), "E");
        assert_eq!(Table::new("EMPLOYEES").rowset().qualifier(), "EMPLOYEES");
    }

    #[test]
    fn same_column_compares_rowset_and_name() {
        let t = employees();
        let mut other = Table::with_alias("EMPLOYEES", "BOSS");
        let a = t.column("ID").unwrap();
        let b = t.column("id").unwrap();
        assert!(a.same_column(&b));
        let c = other.add_column(TableColumn::new("ID", DataType::AutoInc, 4));
        assert!(!a.same_column(&c));
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let mut t = employees();
        t.add_index(Index::new("IDX_NAME", IndexKind::Standard, ["NAME"])).unwrap();
        assert!(t.add_index(Index::new("idx_name", IndexKind::Unique, ["NAME"])).is_err());
        assert!(t.add_index(Index::new("IDX_X", IndexKind::Unique, ["X"])).is_err());
    }
}
