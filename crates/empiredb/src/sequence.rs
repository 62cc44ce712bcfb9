//! Next-value generation for auto-increment columns: native sequences where
//! the dialect has them, otherwise a table-backed counter updated with
//! compare-and-swap.

use crate::client::DbConnection;
use crate::config::SequenceConfig;
use crate::database::Database;
use crate::dbms::DbmsFeature;
use crate::error::{DbError, DbResult};
use crate::expr::SqlExpr;
use crate::row::FromValue;
use crate::table::{ColumnRef, Table, TableColumn};
use crate::types::{DataType, Value};
use chrono::Utc;

/// The counter table described by a [`SequenceConfig`].
#[derive(Debug, Clone)]
pub struct SequenceTable {
    table: Table,
    name: ColumnRef,
    value: ColumnRef,
    time: ColumnRef,
}

impl SequenceTable {
    pub fn new(config: &SequenceConfig) -> DbResult<Self> {
        let mut table = Table::new(config.table.clone());
        let name =
            table.add_column(TableColumn::new(config.name_column.clone(), DataType::Varchar, 40).required());
        let value =
            table.add_column(TableColumn::new(config.value_column.clone(), DataType::Integer, 8).required());
        let time = table
            .add_column(TableColumn::new(config.timestamp_column.clone(), DataType::DateTime, 0).required());
        // a lost insert race surfaces as a unique violation on the key
        table.set_primary_key(&[config.name_column.as_str()])?;
        Ok(Self {
            table,
            name,
            value,
            time,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// Sequence name used for an auto-increment column: the explicit name, or
/// `{TABLE}_{COLUMN}_SEQ`.
pub fn sequence_name(column: &ColumnRef) -> String {
    column
        .column()
        .sequence
        .clone()
        .unwrap_or_else(|| format!("{}_{}_SEQ", column.table_name(), column.column_name()))
}

enum Attempt {
    Got(i64),
    Lost,
}

impl Database {
    /// Whether next values come from native sequence objects.
    pub fn uses_native_sequences(&self) -> bool {
        self.config().native_sequences && self.dbms().is_supported(DbmsFeature::Sequences)
    }

    /// Next value for an auto-increment column.
    pub async fn next_value_for<C>(&self, conn: &C, column: &ColumnRef) -> DbResult<i64>
    where
        C: DbConnection + ?Sized,
    {
        if !column.column().is_auto_increment() {
            return Err(DbError::invalid_argument(format!(
                "{column} is not an auto-increment column"
            )));
        }
        self.next_sequence_value(conn, &sequence_name(column)).await
    }

    /// Next value of `sequence`.
    ///
    /// Emulated sequences retry a conditional update up to
    /// `SequenceConfig::max_attempts` times; two callers never receive the
    /// same value.
    pub async fn next_sequence_value<C>(&self, conn: &C, sequence: &str) -> DbResult<i64>
    where
        C: DbConnection + ?Sized,
    {
        if self.uses_native_sequences() {
            let qualified = match self.schema() {
                Some(schema) => format!("{schema}.{sequence}"),
                None => sequence.to_string(),
            };
            let sql = self.dbms().next_sequence_value_sql(&qualified)?;
            let stmt = crate::builder::Statement::new(sql);
            let rows = self.query_statement(conn, &stmt).await?;
            let value = rows
                .first()
                .and_then(|r| r.values().first())
                .ok_or_else(|| DbError::not_found(format!("sequence {sequence} returned no value")))?;
            return i64::from_value(value);
        }

        let config = &self.config().sequences;
        let seq = SequenceTable::new(config)?;
        for attempt in 1..=config.max_attempts {
            match self.try_next_value(conn, &seq, sequence).await? {
                Attempt::Got(value) => {
                    tracing::trace!(target: "empiredb.sequence", sequence, value, attempt, "sequence value");
                    return Ok(value);
                }
                Attempt::Lost if attempt >= config.warn_after => {
                    tracing::warn!(
                        target: "empiredb.sequence",
                        sequence,
                        attempt,
                        max_attempts = config.max_attempts,
                        "sequence update lost to a concurrent caller, retrying",
                    );
                }
                Attempt::Lost => {
                    tracing::debug!(target: "empiredb.sequence", sequence, attempt, "retrying sequence update");
                }
            }
        }
        tracing::error!(
            target: "empiredb.sequence",
            sequence,
            attempts = config.max_attempts,
            "giving up on contended sequence",
        );
        Err(DbError::SequenceContention {
            sequence: sequence.to_string(),
            attempts: config.max_attempts,
        })
    }

    async fn try_next_value<C>(&self, conn: &C, seq: &SequenceTable, sequence: &str) -> DbResult<Attempt>
    where
        C: DbConnection + ?Sized,
    {
        let mut select = self.command();
        select
            .select([&seq.value, &seq.time])
            .and_where(seq.name.eq(sequence));
        let rows = self.query_rows(conn, &select).await?;
        let now = Value::DateTime(Utc::now().naive_utc());

        let Some(row) = rows.first() else {
            let min_value = self.config().sequences.min_value;
            let mut insert = self.command();
            insert
                .set(&seq.name, sequence)
                .set(&seq.value, min_value)
                .set(&seq.time, now);
            let stmt = insert.build_insert()?;
            return match self.execute_update(conn, &stmt).await {
                Ok(_) => Ok(Attempt::Got(min_value)),
                Err(err) if err.is_unique_violation() => Ok(Attempt::Lost),
                Err(err) => Err(err),
            };
        };

        let current: i64 = row.get_at(0)?;
        let stamp = row.values().get(1).cloned().unwrap_or(Value::Null);
        let next = current
            .checked_add(1)
            .ok_or_else(|| DbError::invalid_argument(format!("sequence {sequence} is exhausted at {current}")))?;

        let mut update = self.command();
        update
            .set(&seq.value, next)
            .set(&seq.time, now)
            .and_where(seq.name.eq(sequence))
            .and_where(seq.value.eq(current))
            .and_where(seq.time.eq(stamp));
        let stmt = update.build_update()?;
        match self.execute_update(conn, &stmt).await? {
            0 => Ok(Attempt::Lost),
            _ => Ok(Attempt::Got(next)),
        }
    }
}
