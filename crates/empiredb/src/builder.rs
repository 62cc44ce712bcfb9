//! SQL text buffer shared by all expression nodes during one build pass.

use crate::config::ParamMode;
use crate::dbms::DbmsHandler;
use crate::error::DbResult;
use crate::ident::QuoteCache;
use crate::table::RowSetMeta;
use crate::types::{DataType, Value};
use std::fmt;
use std::sync::Arc;

/// A rendered statement ready for execution.
///
/// `skip_rows` / `max_rows` carry the part of a row window the dialect could
/// not express natively; the executor applies them while iterating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    pub skip_rows: u64,
    pub max_rows: Option<u64>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            ..Self::default()
        }
    }

    /// Parameters rendered for logs and error context.
    pub fn param_strings(&self) -> Vec<String> {
        self.params.iter().map(|p| format!("{p:?}")).collect()
    }

    /// Whether rows must be skipped or capped during iteration.
    pub fn needs_manual_window(&self) -> bool {
        self.skip_rows > 0 || self.max_rows.is_some()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Accumulates SQL text and parameters for one statement.
///
/// Holds the dialect, the parameter mode and the quote cache of the pass.
/// Expression nodes append themselves through [`ColumnExpr::append_sql`](crate::expr::ColumnExpr::append_sql).
#[derive(Debug)]
pub struct SqlBuilder {
    dbms: Arc<dyn DbmsHandler>,
    sql: String,
    params: Vec<Value>,
    mode: ParamMode,
    schema: Option<String>,
    quotes: QuoteCache,
    /// Qualify column names with their rowset.
    pub(crate) qualify: bool,
    /// Rendering a WHERE clause; aggregates are rejected.
    pub(crate) in_where: bool,
    /// Nesting depth of aggregate functions being rendered.
    pub(crate) aggregate_depth: u32,
}

impl SqlBuilder {
    pub fn new(dbms: Arc<dyn DbmsHandler>, mode: ParamMode) -> Self {
        Self {
            dbms,
            sql: String::with_capacity(256),
            params: Vec::new(),
            mode,
            schema: None,
            quotes: QuoteCache::new(),
            qualify: false,
            in_where: false,
            aggregate_depth: 0,
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    pub fn dbms(&self) -> &dyn DbmsHandler {
        self.dbms.as_ref()
    }

    pub fn dbms_arc(&self) -> &Arc<dyn DbmsHandler> {
        &self.dbms
    }

    pub fn mode(&self) -> ParamMode {
        self.mode
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Append an identifier, quoted when the dialect requires it.
    pub fn push_name(&mut self, name: &str) {
        self.quotes.append_name(self.dbms.as_ref(), &mut self.sql, name);
    }

    /// Append a table name without alias: `[schema.]NAME`.
    pub fn push_table_name(&mut self, name: &str) {
        if let Some(schema) = &self.schema {
            self.quotes.append_name(self.dbms.as_ref(), &mut self.sql, schema);
            self.sql.push('.');
        }
        self.quotes.append_name(self.dbms.as_ref(), &mut self.sql, name);
    }

    /// Append a table reference: `[schema.]NAME[ ALIAS]`.
    pub fn push_rowset(&mut self, rowset: &RowSetMeta) {
        self.push_table_name(&rowset.name);
        if let Some(alias) = &rowset.alias {
            self.sql.push(' ');
            self.quotes.append_name(self.dbms.as_ref(), &mut self.sql, alias);
        }
    }

    /// Append a literal of `data_type`.
    pub fn push_literal(&mut self, value: &Value, data_type: DataType) -> DbResult<()> {
        let text = self.dbms.format_value(value, data_type)?;
        self.sql.push_str(&text);
        Ok(())
    }

    /// Append a positional placeholder bound to `value`.
    pub fn push_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dbms.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Append a value: placeholder in prepared mode, literal otherwise or when `inline`.
    pub fn push_value(&mut self, value: &Value, data_type: DataType, inline: bool) -> DbResult<()> {
        if inline || self.mode == ParamMode::Literal {
            return self.push_literal(value, data_type);
        }
        let value = value.coerce(data_type)?;
        self.push_param(value);
        Ok(())
    }

    /// Render `f` into a scratch builder sharing this pass's dialect and mode
    /// and return the text. Parameters are formatted inline.
    pub(crate) fn render_key(
        &self,
        f: impl FnOnce(&mut SqlBuilder) -> DbResult<()>,
    ) -> DbResult<String> {
        let mut scratch = SqlBuilder::new(Arc::clone(&self.dbms), ParamMode::Literal)
            .with_schema(self.schema.clone());
        scratch.qualify = self.qualify;
        f(&mut scratch)?;
        Ok(scratch.sql)
    }

    pub fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
            skip_rows: 0,
            max_rows: None,
        }
    }
}
