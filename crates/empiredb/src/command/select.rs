//! SELECT rendering and row window placement.

use super::{Command, OrderBy};
use crate::builder::{SqlBuilder, Statement};
use crate::dbms::{DbmsFeature, Pagination};
use crate::error::{DbError, DbResult};
use crate::expr::{CompareExpr, SqlContext, add_rowset};
use crate::phrase::Phrase;
use crate::table::RowSetMeta;
use std::sync::Arc;

/// Split of a requested row window into the part rendered into SQL and the
/// part applied while iterating the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RowWindow {
    pub native_limit: Option<u64>,
    pub native_skip: u64,
    pub manual_skip: u64,
    pub max_rows: Option<u64>,
}

impl RowWindow {
    pub fn is_manual(&self) -> bool {
        self.manual_skip > 0 || self.max_rows.is_some()
    }
}

impl Command {
    /// Render the command as a SELECT statement.
    pub fn build_select(&self) -> DbResult<Statement> {
        let window = self.row_window();
        let mut b = self.builder();
        self.append_select_window(&mut b, window)?;
        let mut stmt = b.finish();
        stmt.skip_rows = window.manual_skip;
        stmt.max_rows = window.max_rows;
        Ok(stmt)
    }

    /// Append this command as a nested SELECT (subquery, EXISTS, IN).
    ///
    /// Nested selects cannot carry an iterate-and-discard window.
    pub(crate) fn append_select(&self, b: &mut SqlBuilder) -> DbResult<()> {
        let window = self.row_window();
        if window.is_manual() {
            return Err(DbError::invalid_expression(format!(
                "nested select needs a row window that {} cannot express",
                self.dbms.name()
            )));
        }
        let saved = (b.qualify, b.in_where, b.aggregate_depth);
        b.in_where = false;
        b.aggregate_depth = 0;
        let result = self.append_select_window(b, window);
        (b.qualify, b.in_where, b.aggregate_depth) = saved;
        result
    }

    pub(crate) fn row_window(&self) -> RowWindow {
        let pagination = self.dbms.pagination();
        let can_limit =
            pagination != Pagination::None && self.dbms.is_supported(DbmsFeature::QueryLimitRows);
        let can_skip = matches!(pagination, Pagination::LimitOffset | Pagination::OffsetFetch)
            && self.dbms.is_supported(DbmsFeature::QuerySkipRows);

        let (native_skip, manual_skip) = if self.skip > 0 && can_skip {
            (self.skip, 0)
        } else {
            (0, self.skip)
        };
        // rows discarded by hand must still be fetched
        let native_limit = if can_limit {
            self.limit.map(|n| n.saturating_add(manual_skip))
        } else {
            None
        };
        let max_rows = if native_limit.is_none() || manual_skip > 0 {
            self.limit
        } else {
            None
        };
        RowWindow {
            native_limit,
            native_skip,
            manual_skip,
            max_rows,
        }
    }

    /// Rowsets referenced outside joins, in order of first reference, and
    /// the joined rowsets.
    pub(crate) fn from_rowsets(&self) -> (Vec<Arc<RowSetMeta>>, Vec<Arc<RowSetMeta>>) {
        let mut all = Vec::new();
        for expr in &self.select {
            expr.collect_rowsets(&mut all);
        }
        for c in &self.wheres {
            c.collect_rowsets(&mut all);
        }
        for expr in &self.group_by {
            expr.collect_rowsets(&mut all);
        }
        for c in &self.having {
            c.collect_rowsets(&mut all);
        }
        for o in &self.order_by {
            o.expr.collect_rowsets(&mut all);
        }
        for join in &self.joins {
            join.on.collect_rowsets(&mut all);
        }
        let mut joined = Vec::new();
        for join in &self.joins {
            add_rowset(&mut joined, &join.rowset);
        }
        let from = all
            .into_iter()
            .filter(|r| !joined.iter().any(|j| j.key() == r.key()))
            .collect();
        (from, joined)
    }

    fn append_select_window(&self, b: &mut SqlBuilder, window: RowWindow) -> DbResult<()> {
        let (from, joined) = self.from_rowsets();
        b.qualify = b.qualify || from.len() + joined.len() > 1;
        self.check_select(b)?;

        let rownum = self.dbms.pagination() == Pagination::RowNum && window.native_limit.is_some();
        if rownum {
            b.push_str("SELECT * FROM (");
        }

        b.push_str("SELECT ");
        if self.distinct {
            b.push_str("DISTINCT ");
        }
        if self.dbms.pagination() == Pagination::Top
            && let Some(n) = window.native_limit
        {
            b.push_str(&format!("TOP {n} "));
        }
        for (i, expr) in self.select.iter().enumerate() {
            if i > 0 {
                b.push_str(", ");
            }
            expr.append_sql(b, SqlContext::DEFAULT | SqlContext::ALIAS)?;
        }

        self.append_from(b, &from)?;
        append_where_list(b, " WHERE ", &self.wheres, true)?;

        if !self.group_by.is_empty() {
            b.push_str(" GROUP BY ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.push_str(", ");
                }
                expr.append_sql(b, SqlContext::DEFAULT)?;
            }
        }
        append_where_list(b, " HAVING ", &self.having, false)?;
        append_order_by(b, &self.order_by, SqlContext::DEFAULT)?;

        match self.dbms.pagination() {
            Pagination::LimitOffset => {
                match (window.native_limit, window.native_skip) {
                    (Some(n), _) => b.push_str(&format!(" LIMIT {n}")),
                    (None, skip) if skip > 0 => {
                        if let Some(all) = self.dbms.limit_for_skip_only() {
                            b.push_str(" LIMIT ");
                            b.push_str(all);
                        }
                    }
                    _ => {}
                }
                if window.native_skip > 0 {
                    b.push_str(&format!(" OFFSET {}", window.native_skip));
                }
            }
            Pagination::OffsetFetch => {
                if window.native_skip > 0 {
                    b.push_str(&format!(" OFFSET {} ROWS", window.native_skip));
                }
                if let Some(n) = window.native_limit {
                    let first = if window.native_skip > 0 { "NEXT" } else { "FIRST" };
                    b.push_str(&format!(" FETCH {first} {n} ROWS ONLY"));
                }
            }
            Pagination::RowNum => {
                if let Some(n) = window.native_limit {
                    b.push_str(&format!(") WHERE ROWNUM <= {n}"));
                }
            }
            Pagination::Top | Pagination::None => {}
        }
        Ok(())
    }

    fn append_from(&self, b: &mut SqlBuilder, from: &[Arc<RowSetMeta>]) -> DbResult<()> {
        if from.is_empty() {
            if !self.joins.is_empty() {
                return Err(DbError::invalid_expression(
                    "joins require at least one rowset outside the joins",
                ));
            }
            if let Some(pseudo) = self.dbms.phrase(Phrase::SQL_PSEUDO_TABLE) {
                b.push_str(" FROM ");
                b.push_str(pseudo);
            }
            return Ok(());
        }
        b.push_str(" FROM ");
        for (i, rowset) in from.iter().enumerate() {
            if i > 0 {
                b.push_str(", ");
            }
            b.push_rowset(rowset);
        }
        for join in &self.joins {
            b.push_str(join.kind.sql());
            b.push_rowset(&join.rowset);
            b.push_str(" ON ");
            let in_where = std::mem::replace(&mut b.in_where, true);
            let result = join.on.append_sql(b, SqlContext::DEFAULT | SqlContext::NOPARENTHESES);
            b.in_where = in_where;
            result?;
        }
        Ok(())
    }
}

/// Append constraints joined with AND. A single constraint needs no parentheses.
pub(crate) fn append_where_list(
    b: &mut SqlBuilder,
    keyword: &str,
    list: &[CompareExpr],
    in_where: bool,
) -> DbResult<()> {
    if list.is_empty() {
        return Ok(());
    }
    b.push_str(keyword);
    let mut ctx = SqlContext::DEFAULT;
    if list.len() == 1 {
        ctx |= SqlContext::NOPARENTHESES;
    }
    let saved = std::mem::replace(&mut b.in_where, in_where);
    let mut result = Ok(());
    for (i, constraint) in list.iter().enumerate() {
        if i > 0 {
            b.push_str(" AND ");
        }
        result = constraint.append_sql(b, ctx);
        if result.is_err() {
            break;
        }
    }
    b.in_where = saved;
    result
}

pub(crate) fn append_order_by(
    b: &mut SqlBuilder,
    order_by: &[OrderBy],
    ctx: SqlContext,
) -> DbResult<()> {
    if order_by.is_empty() {
        return Ok(());
    }
    b.push_str(" ORDER BY ");
    for (i, order) in order_by.iter().enumerate() {
        if i > 0 {
            b.push_str(", ");
        }
        order.expr.append_sql(b, ctx)?;
        if order.desc {
            b.push_str(" DESC");
        }
    }
    Ok(())
}
