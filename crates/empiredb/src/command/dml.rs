//! INSERT, UPDATE and DELETE rendering.

use super::Command;
use super::select::append_where_list;
use crate::builder::Statement;
use crate::error::{DbError, DbResult};
use crate::expr::SqlContext;
use crate::table::{RowSetMeta, Table};
use std::sync::Arc;

impl Command {
    /// `INSERT INTO T (cols) VALUES (values)` from the set list.
    pub fn build_insert(&self) -> DbResult<Statement> {
        self.check_set_list("INSERT")?;
        let target = self.set_target()?;
        let mut b = self.builder();
        b.push_str("INSERT INTO ");
        b.push_table_name(&target.name);
        b.push_str(" (");
        for (i, set) in self.set.iter().enumerate() {
            if i > 0 {
                b.push_str(", ");
            }
            b.push_name(set.column.column_name());
        }
        b.push_str(") VALUES (");
        for (i, set) in self.set.iter().enumerate() {
            if i > 0 {
                b.push_str(", ");
            }
            set.value
                .append_sql(&mut b, SqlContext::DEFAULT | SqlContext::NOPARENTHESES)?;
        }
        b.push(')');
        Ok(b.finish())
    }

    /// `UPDATE T SET col = value, ... WHERE ...`
    pub fn build_update(&self) -> DbResult<Statement> {
        self.check_set_list("UPDATE")?;
        self.check_where_present("UPDATE")?;
        let target = self.set_target()?;
        self.check_single_rowset(&target, "UPDATE")?;
        let mut b = self.builder();
        b.qualify = false;
        b.push_str("UPDATE ");
        b.push_table_name(&target.name);
        b.push_str(" SET ");
        for (i, set) in self.set.iter().enumerate() {
            if i > 0 {
                b.push_str(", ");
            }
            b.push_name(set.column.column_name());
            b.push_str(" = ");
            set.value
                .append_sql(&mut b, SqlContext::DEFAULT | SqlContext::NOPARENTHESES)?;
        }
        append_where_list(&mut b, " WHERE ", &self.wheres, true)?;
        Ok(b.finish())
    }

    /// `DELETE FROM T WHERE ...`
    pub fn build_delete(&self, table: &Table) -> DbResult<Statement> {
        self.check_where_present("DELETE")?;
        self.check_single_rowset(table.rowset(), "DELETE")?;
        let mut b = self.builder();
        b.qualify = false;
        b.push_str("DELETE FROM ");
        b.push_table_name(table.name());
        append_where_list(&mut b, " WHERE ", &self.wheres, true)?;
        Ok(b.finish())
    }

    /// The one table all set-list columns belong to.
    fn set_target(&self) -> DbResult<Arc<RowSetMeta>> {
        let mut target: Option<&Arc<RowSetMeta>> = None;
        for set in &self.set {
            let rowset = set.column.rowset();
            match target {
                None => target = Some(rowset),
                Some(t) if t.key() == rowset.key() => {}
                Some(t) => {
                    return Err(DbError::invalid_expression(format!(
                        "set list mixes columns of {} and {}",
                        t.name, rowset.name
                    )));
                }
            }
        }
        target
            .cloned()
            .ok_or_else(|| DbError::invalid_expression("set list is empty"))
    }

    /// Constraints of a single-table statement may only reference that table.
    fn check_single_rowset(&self, target: &RowSetMeta, statement: &str) -> DbResult<()> {
        let mut rowsets = Vec::new();
        for c in &self.wheres {
            c.collect_rowsets(&mut rowsets);
        }
        for set in &self.set {
            set.value.collect_rowsets(&mut rowsets);
        }
        if let Some(other) = rowsets.iter().find(|r| r.key() != target.key()) {
            return Err(DbError::invalid_expression(format!(
                "{statement} of {} references {}; use a subquery instead",
                target.name, other.name
            )));
        }
        Ok(())
    }
}
