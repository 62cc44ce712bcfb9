//! Connection abstraction used by the executor, sequences and scripts.

use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::types::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio_postgres::types::{ToSql, Type};
use uuid::Uuid;

/// A live database connection.
///
/// Implemented for `tokio_postgres::Client` and `tokio_postgres::Transaction`.
/// Errors carry the statement text (see [`DbError::QueryFailed`]).
#[async_trait::async_trait]
pub trait DbConnection: Send + Sync {
    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64>;

    /// Execute one statement once per parameter set.
    async fn execute_batch(&self, sql: &str, batch: &[Vec<Value>]) -> DbResult<Vec<u64>> {
        let mut counts = Vec::with_capacity(batch.len());
        for params in batch {
            counts.push(self.execute(sql, params).await?);
        }
        Ok(counts)
    }

    /// Execute an INSERT and return the value generated for `key_column`.
    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[Value],
        key_column: &str,
    ) -> DbResult<Value> {
        let _ = (sql, params, key_column);
        Err(DbError::not_supported("generated keys", "this connection"))
    }
}

fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn pg_error(sql: &str, params: &[Value], err: tokio_postgres::Error) -> DbError {
    let code = err.code().map(|c| c.code().to_string());
    let message = match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => err.to_string(),
    };
    DbError::query_failed(sql, params.iter().map(|p| format!("{p:?}")).collect(), code, message)
}

/// Convert a driver row into a [`Row`], decoding by column type.
pub fn from_pg_row(row: &tokio_postgres::Row, columns: &Arc<[String]>) -> DbResult<Row> {
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let value = decode_pg(row, i, column.type_())
            .map_err(|e| DbError::decode(column.name(), e.to_string()))?;
        values.push(value);
    }
    Ok(Row::new(Arc::clone(columns), values))
}

fn decode_pg(row: &tokio_postgres::Row, i: usize, ty: &Type) -> Result<Value, tokio_postgres::Error> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(i)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(i)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(i)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(i)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(i)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(i)?.into(),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(i)?.into(),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(i)?.into(),
        Type::TIME => row.try_get::<_, Option<NaiveTime>>(i)?.into(),
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(i)?.into(),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(i)?
            .map(|dt| dt.naive_utc())
            .into(),
        Type::UUID => row.try_get::<_, Option<Uuid>>(i)?.into(),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(i)?.into(),
        _ => row.try_get::<_, Option<String>>(i)?.into(),
    };
    Ok(value)
}

fn column_names(rows: &[tokio_postgres::Row]) -> Arc<[String]> {
    rows.first()
        .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_else(|| Arc::from(Vec::new()))
}

fn convert_rows(rows: &[tokio_postgres::Row]) -> DbResult<Vec<Row>> {
    let columns = column_names(rows);
    rows.iter().map(|r| from_pg_row(r, &columns)).collect()
}

macro_rules! impl_pg_connection {
    ($t:ty) => {
        #[async_trait::async_trait]
        impl DbConnection for $t {
            async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
                let rows = <$t>::query(self, sql, &param_refs(params))
                    .await
                    .map_err(|e| pg_error(sql, params, e))?;
                convert_rows(&rows)
            }

            async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
                <$t>::execute(self, sql, &param_refs(params))
                    .await
                    .map_err(|e| pg_error(sql, params, e))
            }

            async fn execute_batch(&self, sql: &str, batch: &[Vec<Value>]) -> DbResult<Vec<u64>> {
                let stmt = <$t>::prepare(self, sql)
                    .await
                    .map_err(|e| pg_error(sql, &[], e))?;
                let mut counts = Vec::with_capacity(batch.len());
                for params in batch {
                    let count = <$t>::execute(self, &stmt, &param_refs(params))
                        .await
                        .map_err(|e| pg_error(sql, params, e))?;
                    counts.push(count);
                }
                Ok(counts)
            }

            async fn execute_returning_key(
                &self,
                sql: &str,
                params: &[Value],
                key_column: &str,
            ) -> DbResult<Value> {
                let sql = format!("{sql} RETURNING {key_column}");
                let rows = <$t>::query(self, sql.as_str(), &param_refs(params))
                    .await
                    .map_err(|e| pg_error(&sql, params, e))?;
                let row = rows
                    .first()
                    .ok_or_else(|| DbError::not_found("INSERT returned no generated key"))?;
                let ty = row
                    .columns()
                    .first()
                    .map(|c| c.type_().clone())
                    .ok_or_else(|| DbError::not_found("INSERT returned no generated key"))?;
                decode_pg(row, 0, &ty).map_err(|e| DbError::decode(key_column, e.to_string()))
            }
        }
    };
}

impl_pg_connection!(tokio_postgres::Client);
impl_pg_connection!(tokio_postgres::Transaction<'_>);
