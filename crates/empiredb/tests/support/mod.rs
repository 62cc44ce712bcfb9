//! In-memory connection double shared by the integration tests.

#![allow(dead_code)]

use empiredb::{DbConnection, DbResult, Row, Value};
use std::sync::{Arc, Mutex};

/// What the scripted handler answers for one statement.
pub enum Reply {
    Rows(Vec<Row>),
    Count(u64),
}

type Handler = Box<dyn Fn(&str, &[Value]) -> DbResult<Reply> + Send + Sync>;

/// A connection whose answers come from a closure. Every call is recorded.
///
/// With `yielding()`, each call gives up control once after computing its
/// answer, so callers joined on one task interleave between statements.
pub struct MockConnection {
    handler: Handler,
    yielding: bool,
    log: Mutex<Vec<(String, Vec<Value>)>>,
    batches: Mutex<Vec<(String, usize)>>,
}

impl MockConnection {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[Value]) -> DbResult<Reply> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            yielding: false,
            log: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// A connection answering every query with `rows`; updates report at least one row.
    pub fn returning(rows: Vec<Row>) -> Self {
        Self::new(move |_, _| Ok(Reply::Rows(rows.clone())))
    }

    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> Vec<(String, usize)> {
        self.batches.lock().unwrap().clone()
    }

    async fn call(&self, sql: &str, params: &[Value]) -> DbResult<Reply> {
        self.log.lock().unwrap().push((sql.to_string(), params.to_vec()));
        let reply = (self.handler)(sql, params);
        if self.yielding {
            tokio::task::yield_now().await;
        }
        reply
    }
}

#[async_trait::async_trait]
impl DbConnection for MockConnection {
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        match self.call(sql, params).await? {
            Reply::Rows(rows) => Ok(rows),
            Reply::Count(_) => Ok(Vec::new()),
        }
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        match self.call(sql, params).await? {
            Reply::Rows(rows) => Ok(rows.len().max(1) as u64),
            Reply::Count(n) => Ok(n),
        }
    }

    async fn execute_batch(&self, sql: &str, batch: &[Vec<Value>]) -> DbResult<Vec<u64>> {
        self.batches.lock().unwrap().push((sql.to_string(), batch.len()));
        let mut counts = Vec::with_capacity(batch.len());
        for params in batch {
            counts.push(self.execute(sql, params).await?);
        }
        Ok(counts)
    }
}

/// Rows with the given column names.
pub fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> Vec<Row> {
    let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
    data.into_iter()
        .map(|values| Row::new(Arc::clone(&columns), values))
        .collect()
}

/// One-column integer rows `1..=n`.
pub fn numbered(n: i64) -> Vec<Row> {
    rows(&["N"], (1..=n).map(|i| vec![Value::Int(i)]).collect())
}
