//! Statement execution on a [`Database`]: logging, error context and the
//! iterate-and-discard row window.

use crate::builder::Statement;
use crate::client::DbConnection;
use crate::command::Command;
use crate::config::truncate_sql;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::row::{FromValue, Row};
use crate::types::Value;
use std::time::Instant;

/// Kind of statement, recorded in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Update,
    Batch,
}

impl Database {
    fn log_statement(&self, query_type: QueryType, sql: &str, param_count: usize) {
        tracing::debug!(
            target: "empiredb.sql",
            query_type = ?query_type,
            param_count,
            sql = %truncate_sql(sql, self.config().max_sql_log_len),
        );
    }

    fn log_failure(&self, err: &DbError) {
        if let DbError::QueryFailed { sql, code, message, .. } = err {
            tracing::debug!(
                target: "empiredb.sql",
                code = code.as_deref().unwrap_or("-"),
                message = %message,
                sql = %truncate_sql(sql, self.config().max_sql_log_len),
                "statement failed",
            );
        }
    }

    /// Run a SELECT statement. A manual skip/limit carried by the statement is
    /// applied to the returned rows without reordering them.
    pub async fn query_statement<C>(&self, conn: &C, stmt: &Statement) -> DbResult<Vec<Row>>
    where
        C: DbConnection + ?Sized,
    {
        self.log_statement(QueryType::Select, &stmt.sql, stmt.params.len());
        let started = Instant::now();
        let rows = conn.query(&stmt.sql, &stmt.params).await.inspect_err(|e| self.log_failure(e))?;
        tracing::trace!(
            target: "empiredb.sql",
            rows = rows.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "query finished",
        );
        Ok(apply_window(rows, stmt.skip_rows, stmt.max_rows))
    }

    /// Build and run a select command.
    pub async fn query_rows<C>(&self, conn: &C, cmd: &Command) -> DbResult<Vec<Row>>
    where
        C: DbConnection + ?Sized,
    {
        let stmt = cmd.build_select()?;
        self.query_statement(conn, &stmt).await
    }

    /// First column of the first row.
    pub async fn query_single_value<C>(&self, conn: &C, cmd: &Command) -> DbResult<Value>
    where
        C: DbConnection + ?Sized,
    {
        let stmt = cmd.build_select()?;
        let rows = self.query_statement(conn, &stmt).await?;
        rows.into_iter()
            .next()
            .and_then(|r| r.into_values().into_iter().next())
            .ok_or_else(|| DbError::not_found(format!("no row for: {}", stmt.sql)))
    }

    pub async fn query_single<C, T>(&self, conn: &C, cmd: &Command) -> DbResult<T>
    where
        C: DbConnection + ?Sized,
        T: FromValue,
    {
        let value = self.query_single_value(conn, cmd).await?;
        T::from_value(&value)
    }

    /// Run an INSERT, UPDATE, DELETE or DDL statement.
    pub async fn execute_update<C>(&self, conn: &C, stmt: &Statement) -> DbResult<u64>
    where
        C: DbConnection + ?Sized,
    {
        self.log_statement(QueryType::Update, &stmt.sql, stmt.params.len());
        conn.execute(&stmt.sql, &stmt.params)
            .await
            .inspect_err(|e| self.log_failure(e))
    }

    /// Run one statement once per parameter set.
    pub async fn execute_batch<C>(
        &self,
        conn: &C,
        sql: &str,
        batch: &[Vec<Value>],
    ) -> DbResult<Vec<u64>>
    where
        C: DbConnection + ?Sized,
    {
        self.log_statement(QueryType::Batch, sql, batch.len());
        conn.execute_batch(sql, batch)
            .await
            .inspect_err(|e| self.log_failure(e))
    }
}

/// Discard `skip` rows and keep at most `max` of the rest.
pub fn apply_window(rows: Vec<Row>, skip: u64, max: Option<u64>) -> Vec<Row> {
    if skip == 0 && max.is_none() {
        return rows;
    }
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let max = max.map_or(usize::MAX, |m| usize::try_from(m).unwrap_or(usize::MAX));
    rows.into_iter().skip(skip).take(max).collect()
}
