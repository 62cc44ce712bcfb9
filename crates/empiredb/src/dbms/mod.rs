//! Database dialect handlers.
//!
//! A [`DbmsHandler`] is the per-vendor strategy consulted by the renderer:
//! phrase templates, identifier quoting, feature flags, literal formatting,
//! type conversion, DDL type names, pagination placement and native
//! sequence access. Every method has a generic (ANSI) default so a dialect
//! only overrides what differs.

mod generic;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use generic::GenericDbms;
pub use h2::H2Dbms;
pub use mysql::MySqlDbms;
pub use oracle::OracleDbms;
pub use postgres::PostgresDbms;
pub use sqlite::SqliteDbms;
pub use sqlserver::SqlServerDbms;

use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::{DataType, Value};
use std::fmt;
use std::sync::Arc;

/// Optional capabilities a dialect may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbmsFeature {
    /// `CREATE SCHEMA` is available.
    CreateSchema,
    /// Native sequence objects.
    Sequences,
    /// Row limiting in SELECT.
    QueryLimitRows,
    /// Row skipping in SELECT.
    QuerySkipRows,
    /// Batched execution of one statement with many parameter sets.
    Batch,
    /// Retrieval of generated identity values after insert.
    GeneratedKeys,
    /// `DEFAULT` clauses in column definitions.
    DdlColumnDefault,
}

/// Where and how a dialect places row limit/skip clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// No native pagination; limit and skip are applied while iterating.
    None,
    /// `... LIMIT n OFFSET m`
    LimitOffset,
    /// `... OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
    /// `SELECT TOP n ...` (limit only).
    Top,
    /// Wrapping select filtered by `ROWNUM`.
    RowNum,
}

/// ANSI reserved words used by the generic dialect.
pub const ANSI_KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK",
    "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT",
    "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT",
    "LIKE", "NOT", "NULL", "OF", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES",
    "RIGHT", "ROW", "ROWS", "SELECT", "SESSION_USER", "SET", "SOME", "TABLE", "THEN", "TO",
    "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "VIEW", "WHEN", "WHERE",
    "WITH",
];

/// Per-vendor SQL rendering strategy.
pub trait DbmsHandler: fmt::Debug + Send + Sync {
    /// Short dialect name as accepted by [`dbms_by_name`].
    fn name(&self) -> &'static str;

    /// Phrase template for this dialect; `None` when the phrase is unsupported.
    fn phrase(&self, phrase: Phrase) -> Option<&'static str> {
        phrase::generic_phrase(phrase)
    }

    /// Phrase template, or [`DbError::NotSupported`].
    fn require_phrase(&self, phrase: Phrase) -> DbResult<&'static str> {
        self.phrase(phrase)
            .ok_or_else(|| DbError::not_supported(phrase.name(), self.name()))
    }

    fn is_supported(&self, feature: DbmsFeature) -> bool {
        matches!(feature, DbmsFeature::DdlColumnDefault)
    }

    /// Reserved words that force identifier quoting.
    fn reserved_keywords(&self) -> &'static [&'static str] {
        ANSI_KEYWORDS
    }

    /// Positional parameter placeholder for the 1-based `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    fn pagination(&self) -> Pagination {
        Pagination::None
    }

    /// Row count to put in `LIMIT` when only a skip was requested, for
    /// dialects that do not accept a bare `OFFSET`.
    fn limit_for_skip_only(&self) -> Option<&'static str> {
        None
    }

    /// Whether members of UNION/INTERSECT/EXCEPT are wrapped in parentheses.
    fn parenthesize_combined(&self) -> bool {
        true
    }

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        out.push_str(&s.replace('\'', "''"));
        out.push('\'');
        out
    }

    /// Binary literal.
    fn format_bytes(&self, bytes: &[u8]) -> DbResult<String> {
        Ok(format!("X'{}'", hex(bytes)))
    }

    /// Format `value` as an SQL literal of `data_type` (coercing first).
    fn format_value(&self, value: &Value, data_type: DataType) -> DbResult<String> {
        format_value_with(self, value, data_type)
    }

    /// Cast target type name used by the generic conversion template.
    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        default_cast_type(self, to)
    }

    /// Conversion template: `?` is the converted expression, `{0}` the optional format.
    fn convert_phrase(
        &self,
        to: DataType,
        from: DataType,
        format: Option<&str>,
    ) -> DbResult<String> {
        let _ = from;
        if format.is_some() {
            return Err(DbError::not_supported(
                format!("convert to {to} with format"),
                self.name(),
            ));
        }
        Ok(format!("CAST(? AS {})", self.cast_type(to)?))
    }

    /// Column type used in CREATE/ALTER TABLE.
    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        generic_ddl_type(self.name(), column)
    }

    /// Query returning the next value of a native sequence.
    fn next_sequence_value_sql(&self, sequence: &str) -> DbResult<String> {
        let _ = sequence;
        Err(DbError::not_supported("sequences", self.name()))
    }

    /// Statement dropping a foreign key constraint.
    fn drop_foreign_key_sql(&self, table: &str, constraint: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT {constraint}")
    }

    /// Statement changing the definition of an existing column.
    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        Ok(format!("ALTER TABLE {table} ALTER COLUMN {}", column.to_sql()))
    }
}

/// A rendered column definition used by DDL statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Quoted column name.
    pub name: String,
    pub ddl_type: String,
    /// Rendered default literal.
    pub default: Option<String>,
    pub required: bool,
}

impl ColumnDef {
    /// `NAME TYPE [DEFAULT x] [NOT NULL]`
    pub fn to_sql(&self) -> String {
        let mut out = format!("{} {}", self.name, self.ddl_type);
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        if self.required {
            out.push_str(" NOT NULL");
        }
        out
    }
}

/// ANSI cast target names.
pub fn default_cast_type<D: DbmsHandler + ?Sized>(dbms: &D, to: DataType) -> DbResult<&'static str> {
    let t = match to {
        DataType::Integer | DataType::AutoInc => "INTEGER",
        DataType::Varchar | DataType::Char | DataType::Clob => "VARCHAR(4000)",
        DataType::Decimal => "DECIMAL",
        DataType::Float => "DOUBLE PRECISION",
        DataType::Date => "DATE",
        DataType::Time => "TIME",
        DataType::DateTime | DataType::Timestamp => "TIMESTAMP",
        DataType::Bool => "BOOLEAN",
        DataType::UniqueId => "CHAR(36)",
        DataType::Blob | DataType::Unknown => {
            return Err(DbError::not_supported(format!("convert to {to}"), dbms.name()));
        }
    };
    Ok(t)
}

impl fmt::Display for dyn DbmsHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared literal formatting used by [`DbmsHandler::format_value`].
pub fn format_value_with<D: DbmsHandler + ?Sized>(
    dbms: &D,
    value: &Value,
    data_type: DataType,
) -> DbResult<String> {
    let value = value.coerce(data_type)?;
    let text = match &value {
        Value::Null => dbms.require_phrase(Phrase::SQL_NULL)?.to_string(),
        Value::Bool(true) => dbms.require_phrase(Phrase::SQL_BOOLEAN_TRUE)?.to_string(),
        Value::Bool(false) => dbms.require_phrase(Phrase::SQL_BOOLEAN_FALSE)?.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(DbError::invalid_argument(format!(
                    "non-finite float {v} has no SQL literal"
                )));
            }
            v.to_string()
        }
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => dbms.quote_string(s),
        Value::Uuid(u) => dbms.quote_string(&u.to_string()),
        Value::Bytes(b) => dbms.format_bytes(b)?,
        Value::Date(d) => {
            let pattern = dbms.require_phrase(Phrase::SQL_DATE_PATTERN)?;
            let template = dbms.require_phrase(Phrase::SQL_DATE_TEMPLATE)?;
            phrase::fill_template(template, &[&d.format(pattern).to_string()])?
        }
        Value::Time(t) => {
            let pattern = dbms.require_phrase(Phrase::SQL_TIME_PATTERN)?;
            let template = dbms.require_phrase(Phrase::SQL_TIME_TEMPLATE)?;
            phrase::fill_template(template, &[&t.format(pattern).to_string()])?
        }
        Value::DateTime(dt) => {
            let (pattern, template) = if data_type == DataType::Timestamp {
                (Phrase::SQL_TIMESTAMP_PATTERN, Phrase::SQL_TIMESTAMP_TEMPLATE)
            } else {
                (Phrase::SQL_DATETIME_PATTERN, Phrase::SQL_DATETIME_TEMPLATE)
            };
            let pattern = dbms.require_phrase(pattern)?;
            let template = dbms.require_phrase(template)?;
            phrase::fill_template(template, &[&dt.format(pattern).to_string()])?
        }
    };
    Ok(text)
}

/// ANSI column type names.
pub fn generic_ddl_type(dbms: &str, column: &TableColumn) -> DbResult<String> {
    let t = match column.data_type {
        DataType::Integer | DataType::AutoInc => integer_type(column.size).to_string(),
        DataType::Varchar => format!("VARCHAR({})", text_size(column)?),
        DataType::Char => format!("CHAR({})", text_size(column)?),
        DataType::Clob => "CLOB".to_string(),
        DataType::Blob => "BLOB".to_string(),
        DataType::Bool => "BOOLEAN".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time => "TIME".to_string(),
        DataType::DateTime | DataType::Timestamp => "TIMESTAMP".to_string(),
        DataType::Decimal => decimal_type("DECIMAL", column),
        DataType::Float => "DOUBLE PRECISION".to_string(),
        DataType::UniqueId => "CHAR(36)".to_string(),
        DataType::Unknown => {
            return Err(DbError::not_supported(
                format!("column type of {}", column.name),
                dbms,
            ));
        }
    };
    Ok(t)
}

/// Integer type by byte size: 2 → SMALLINT, 8 → BIGINT, otherwise INTEGER.
pub(crate) fn integer_type(size: u32) -> &'static str {
    match size {
        1 | 2 => "SMALLINT",
        8 => "BIGINT",
        _ => "INTEGER",
    }
}

pub(crate) fn text_size(column: &TableColumn) -> DbResult<u32> {
    if column.size == 0 {
        return Err(DbError::invalid_argument(format!(
            "column {} of type {} requires a size",
            column.name, column.data_type
        )));
    }
    Ok(column.size)
}

pub(crate) fn decimal_type(name: &str, column: &TableColumn) -> String {
    if column.size == 0 {
        name.to_string()
    } else {
        format!("{name}({},{})", column.size, column.scale)
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn generic() -> Arc<dyn DbmsHandler> {
    Arc::new(GenericDbms)
}

pub fn postgres() -> Arc<dyn DbmsHandler> {
    Arc::new(PostgresDbms)
}

pub fn mysql() -> Arc<dyn DbmsHandler> {
    Arc::new(MySqlDbms)
}

pub fn oracle() -> Arc<dyn DbmsHandler> {
    Arc::new(OracleDbms)
}

pub fn sqlserver() -> Arc<dyn DbmsHandler> {
    Arc::new(SqlServerDbms)
}

pub fn h2() -> Arc<dyn DbmsHandler> {
    Arc::new(H2Dbms)
}

pub fn sqlite() -> Arc<dyn DbmsHandler> {
    Arc::new(SqliteDbms)
}

/// Names accepted by [`dbms_by_name`].
pub const DBMS_NAMES: &[&str] = &["generic", "postgres", "mysql", "oracle", "sqlserver", "h2", "sqlite"];

/// Look up a dialect handler by name (case-insensitive, common aliases accepted).
pub fn dbms_by_name(name: &str) -> DbResult<Arc<dyn DbmsHandler>> {
    let dbms = match name.trim().to_ascii_lowercase().as_str() {
        "generic" | "ansi" => generic(),
        "postgres" | "postgresql" | "pg" => postgres(),
        "mysql" | "mariadb" => mysql(),
        "oracle" => oracle(),
        "sqlserver" | "mssql" => sqlserver(),
        "h2" => h2(),
        "sqlite" => sqlite(),
        other => {
            return Err(DbError::Config(format!(
                "unknown dialect '{other}' (expected one of: {})",
                DBMS_NAMES.join(", ")
            )));
        }
    };
    Ok(dbms)
}

#[cfg(test)]
mod tests;
