//! Build-time checks that reject statements the database would refuse or
//! that would touch more rows than asked for.

use super::Command;
use crate::builder::SqlBuilder;
use crate::error::{DbError, DbResult};
use crate::expr::{ColumnExpr, SqlContext};
use std::collections::HashSet;

impl Command {
    /// Select list present and every plain column covered by GROUP BY when
    /// the command aggregates.
    pub(crate) fn check_select(&self, b: &SqlBuilder) -> DbResult<()> {
        if self.select.is_empty() {
            return Err(DbError::invalid_expression("select list is empty"));
        }
        let aggregates = self.select.iter().any(ColumnExpr::is_aggregate);
        if !aggregates && self.group_by.is_empty() {
            return Ok(());
        }
        let mut grouped = HashSet::with_capacity(self.group_by.len());
        for expr in &self.group_by {
            grouped.insert(group_key(b, expr)?);
        }
        for expr in &self.select {
            if expr.is_aggregate() || is_constant(expr) {
                continue;
            }
            let key = group_key(b, expr)?;
            if !grouped.contains(&key) {
                return Err(DbError::invalid_expression(format!(
                    "select column {key} is neither aggregated nor part of GROUP BY"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_set_list(&self, statement: &str) -> DbResult<()> {
        if self.set.is_empty() {
            return Err(DbError::invalid_expression(format!(
                "{statement} without any column values"
            )));
        }
        Ok(())
    }

    pub(crate) fn check_where_present(&self, statement: &str) -> DbResult<()> {
        if self.wheres.is_empty() && !self.allow_all_rows {
            return Err(DbError::invalid_expression(format!(
                "{statement} without WHERE affects all rows; call allow_all_rows() to permit it"
            )));
        }
        Ok(())
    }
}

fn group_key(b: &SqlBuilder, expr: &ColumnExpr) -> DbResult<String> {
    let expr = expr.unaliased();
    b.render_key(|scratch| expr.append_sql(scratch, SqlContext::DEFAULT))
}

/// Expressions that reference no rowset need no grouping.
fn is_constant(expr: &ColumnExpr) -> bool {
    let mut rowsets = Vec::new();
    expr.collect_rowsets(&mut rowsets);
    rowsets.is_empty()
}
