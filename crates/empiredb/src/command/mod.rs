//! Commands: mutable builders for SELECT, INSERT, UPDATE and DELETE.
//!
//! A [`Command`] accumulates select, where, group, order and set state and
//! renders it in dialect order. FROM and JOIN clauses are derived from the
//! rowsets its expressions reference.
//!
//! # Example
//!
//! ```rust
//! use empiredb::command::Command;
//! use empiredb::expr::SqlExpr;
//! use empiredb::table::{Table, TableColumn};
//! use empiredb::types::DataType;
//!
//! let mut employees = Table::new("EMPLOYEES");
//! let id = employees.add_column(TableColumn::new("ID", DataType::Integer, 4));
//! let name = employees.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
//!
//! let mut cmd = Command::new(empiredb::dbms::postgres());
//! cmd.select([&id, &name]).and_where(name.like("A%")).order_by(name.asc());
//! let stmt = cmd.build_select().unwrap();
//! assert_eq!(stmt.sql, "SELECT ID, NAME FROM EMPLOYEES WHERE NAME LIKE $1 ORDER BY NAME");
//! ```

mod combined;
mod dml;
mod select;
mod validate;

pub use combined::{CombineOp, CombinedCommand};

use crate::builder::SqlBuilder;
use crate::config::ParamMode;
use crate::dbms::DbmsHandler;
use crate::expr::{CmdParam, ColumnExpr, CompareExpr, IntoExpr, SqlExpr};
use crate::table::{ColumnRef, RowSetMeta};
use crate::types::{DataType, Value};
use std::sync::Arc;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Inner => " INNER JOIN ",
            Self::Left => " LEFT JOIN ",
            Self::Right => " RIGHT JOIN ",
        }
    }
}

/// A join of one rowset into the command.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    /// The joined rowset.
    pub rowset: Arc<RowSetMeta>,
    pub on: CompareExpr,
}

/// ORDER BY item.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub expr: ColumnExpr,
    pub desc: bool,
}

impl OrderBy {
    pub fn asc(expr: ColumnExpr) -> Self {
        Self { expr, desc: false }
    }

    pub fn desc(expr: ColumnExpr) -> Self {
        Self { expr, desc: true }
    }
}

/// `column = value` item of an INSERT or UPDATE.
#[derive(Debug, Clone)]
pub struct SetExpr {
    pub column: ColumnRef,
    pub value: ColumnExpr,
}

/// Mutable statement builder bound to a dialect.
#[derive(Debug, Clone)]
pub struct Command {
    dbms: Arc<dyn DbmsHandler>,
    mode: ParamMode,
    schema: Option<String>,
    distinct: bool,
    select: Vec<ColumnExpr>,
    joins: Vec<Join>,
    wheres: Vec<CompareExpr>,
    group_by: Vec<ColumnExpr>,
    having: Vec<CompareExpr>,
    order_by: Vec<OrderBy>,
    set: Vec<SetExpr>,
    limit: Option<u64>,
    skip: u64,
    params: Vec<CmdParam>,
    allow_all_rows: bool,
}

impl Command {
    pub fn new(dbms: Arc<dyn DbmsHandler>) -> Self {
        Self {
            dbms,
            mode: ParamMode::Prepared,
            schema: None,
            distinct: false,
            select: Vec::new(),
            joins: Vec::new(),
            wheres: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            set: Vec::new(),
            limit: None,
            skip: 0,
            params: Vec::new(),
            allow_all_rows: false,
        }
    }

    pub fn dbms(&self) -> &Arc<dyn DbmsHandler> {
        &self.dbms
    }

    pub fn param_mode(&mut self, mode: ParamMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Schema prefixed to every table reference.
    pub fn schema(&mut self, schema: Option<String>) -> &mut Self {
        self.schema = schema;
        self
    }

    // ==================== SELECT ====================

    /// Append expressions to the select list.
    pub fn select<I, T>(&mut self, exprs: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.select.extend(exprs.into_iter().map(IntoExpr::into_expr));
        self
    }

    pub fn select_expr(&mut self, expr: impl IntoExpr) -> &mut Self {
        self.select.push(expr.into_expr());
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn select_list(&self) -> &[ColumnExpr] {
        &self.select
    }

    pub fn clear_select(&mut self) -> &mut Self {
        self.select.clear();
        self.distinct = false;
        self
    }

    pub(crate) fn select_data_type(&self) -> DataType {
        self.select.first().map_or(DataType::Unknown, ColumnExpr::data_type)
    }

    // ==================== JOIN ====================

    /// Join the rowset of `right` on `left = right`.
    pub fn join(&mut self, left: &ColumnRef, right: &ColumnRef, kind: JoinKind) -> &mut Self {
        self.joins.push(Join {
            kind,
            rowset: Arc::clone(right.rowset()),
            on: left.eq(right),
        });
        self
    }

    /// Join with an additional condition ANDed to `left = right`.
    pub fn join_with(
        &mut self,
        left: &ColumnRef,
        right: &ColumnRef,
        kind: JoinKind,
        extra: CompareExpr,
    ) -> &mut Self {
        self.joins.push(Join {
            kind,
            rowset: Arc::clone(right.rowset()),
            on: left.eq(right).and(extra),
        });
        self
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    // ==================== WHERE / HAVING ====================

    /// Add a constraint. A constraint on the same column with the same
    /// operator replaces the earlier one.
    pub fn and_where(&mut self, constraint: CompareExpr) -> &mut Self {
        replace_or_push(&mut self.wheres, constraint);
        self
    }

    /// Remove all constraints on `column`.
    pub fn remove_where(&mut self, column: &ColumnRef) -> &mut Self {
        self.wheres.retain(|c| match c {
            CompareExpr::Compare { left, .. } => {
                !left.column_ref().is_some_and(|c| c.same_column(column))
            }
            _ => true,
        });
        self
    }

    pub fn clear_where(&mut self) -> &mut Self {
        self.wheres.clear();
        self
    }

    pub fn where_list(&self) -> &[CompareExpr] {
        &self.wheres
    }

    pub fn having(&mut self, constraint: CompareExpr) -> &mut Self {
        replace_or_push(&mut self.having, constraint);
        self
    }

    /// Permit UPDATE and DELETE without a WHERE clause.
    pub fn allow_all_rows(&mut self) -> &mut Self {
        self.allow_all_rows = true;
        self
    }

    // ==================== GROUP / ORDER ====================

    pub fn group_by<I, T>(&mut self, exprs: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.group_by.extend(exprs.into_iter().map(IntoExpr::into_expr));
        self
    }

    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.order_by.push(order);
        self
    }

    pub fn clear_order_by(&mut self) -> &mut Self {
        self.order_by.clear();
        self
    }

    // ==================== LIMIT / SKIP ====================

    pub fn limit_rows(&mut self, rows: u64) -> &mut Self {
        self.limit = Some(rows);
        self
    }

    pub fn skip_rows(&mut self, rows: u64) -> &mut Self {
        self.skip = rows;
        self
    }

    pub fn clear_limit(&mut self) -> &mut Self {
        self.limit = None;
        self.skip = 0;
        self
    }

    // ==================== SET / PARAMS ====================

    /// Assign a value for INSERT/UPDATE; a later assignment to the same column wins.
    pub fn set(&mut self, column: &ColumnRef, value: impl IntoExpr) -> &mut Self {
        let value = value.into_expr().typed_as(column.data_type());
        match self.set.iter_mut().find(|s| s.column.same_column(column)) {
            Some(existing) => existing.value = value,
            None => self.set.push(SetExpr {
                column: column.clone(),
                value,
            }),
        }
        self
    }

    pub fn set_list(&self) -> &[SetExpr] {
        &self.set
    }

    pub fn clear_set(&mut self) -> &mut Self {
        self.set.clear();
        self
    }

    /// Create a parameter owned by this command. Its value may be changed
    /// through the returned handle before the next build.
    pub fn add_param(&mut self, value: impl Into<Value>, data_type: DataType) -> CmdParam {
        let param = CmdParam::new(value, data_type);
        self.params.push(param.clone());
        param
    }

    pub fn params(&self) -> &[CmdParam] {
        &self.params
    }

    pub fn clear(&mut self) {
        let dbms = Arc::clone(&self.dbms);
        let mode = self.mode;
        let schema = self.schema.take();
        *self = Self::new(dbms);
        self.mode = mode;
        self.schema = schema;
    }

    pub(crate) fn builder(&self) -> SqlBuilder {
        SqlBuilder::new(Arc::clone(&self.dbms), self.mode).with_schema(self.schema.clone())
    }
}

fn replace_or_push(list: &mut Vec<CompareExpr>, constraint: CompareExpr) {
    if let Some(key) = constraint.replace_key()
        && let Some(existing) = list
            .iter_mut()
            .find(|c| c.replace_key().as_ref() == Some(&key))
    {
        *existing = constraint;
        return;
    }
    list.push(constraint);
}

#[cfg(test)]
mod tests;
