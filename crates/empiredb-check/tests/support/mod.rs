//! Connection double answering `information_schema` queries from fixed rows.

#![allow(dead_code)]

use empiredb::{DbConnection, DbResult, Row, Value};
use std::sync::{Arc, Mutex};

/// Rows for each metadata query, keyed by the view it reads.
#[derive(Default)]
pub struct Catalog {
    pub tables: Vec<Row>,
    pub columns: Vec<Row>,
    pub primary_keys: Vec<Row>,
    pub foreign_keys: Vec<Row>,
}

pub struct CatalogConnection {
    catalog: Catalog,
    params: Mutex<Vec<Vec<Value>>>,
}

impl CatalogConnection {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            params: Mutex::new(Vec::new()),
        }
    }

    pub fn params(&self) -> Vec<Vec<Value>> {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DbConnection for CatalogConnection {
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.params.lock().unwrap().push(params.to_vec());
        let rows = if sql.contains("referential_constraints") {
            &self.catalog.foreign_keys
        } else if sql.contains("PRIMARY KEY") {
            &self.catalog.primary_keys
        } else if sql.contains("information_schema.columns") {
            &self.catalog.columns
        } else {
            &self.catalog.tables
        };
        Ok(rows.clone())
    }

    async fn execute(&self, _sql: &str, _params: &[Value]) -> DbResult<u64> {
        Ok(0)
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn int(n: Option<i64>) -> Value {
    n.map_or(Value::Null, Value::Int)
}

fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> Vec<Row> {
    let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
    data.into_iter()
        .map(|values| Row::new(Arc::clone(&columns), values))
        .collect()
}

pub fn tables(entries: &[(&str, &str)]) -> Vec<Row> {
    rows(
        &["table_name", "table_type"],
        entries.iter().map(|(n, t)| vec![text(n), text(t)]).collect(),
    )
}

/// `(table, column, type, char_length, precision, scale, nullable, default)`
pub type ColumnSpec<'a> = (
    &'a str,
    &'a str,
    &'a str,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    bool,
    Option<&'a str>,
);

pub fn columns(entries: &[ColumnSpec<'_>]) -> Vec<Row> {
    rows(
        &[
            "table_name",
            "column_name",
            "data_type",
            "char_length",
            "numeric_precision",
            "numeric_scale",
            "is_nullable",
            "column_default",
        ],
        entries
            .iter()
            .map(|(t, c, ty, len, prec, scale, nullable, default)| {
                vec![
                    text(t),
                    text(c),
                    text(ty),
                    int(*len),
                    int(*prec),
                    int(*scale),
                    text(if *nullable { "YES" } else { "NO" }),
                    default.map_or(Value::Null, text),
                ]
            })
            .collect(),
    )
}

pub fn primary_keys(entries: &[(&str, &str)]) -> Vec<Row> {
    rows(
        &["table_name", "column_name"],
        entries.iter().map(|(t, c)| vec![text(t), text(c)]).collect(),
    )
}

/// `(constraint, table, column, target_table, target_column, delete_rule)`
pub fn foreign_keys(entries: &[(&str, &str, &str, &str, &str, &str)]) -> Vec<Row> {
    rows(
        &[
            "constraint_name",
            "table_name",
            "column_name",
            "target_table",
            "target_column",
            "delete_rule",
        ],
        entries
            .iter()
            .map(|(n, t, c, tt, tc, rule)| vec![text(n), text(t), text(c), text(tt), text(tc), text(rule)])
            .collect(),
    )
}
