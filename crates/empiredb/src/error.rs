//! Error types for empiredb

use thiserror::Error;

/// Result type alias for empiredb operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for SQL generation and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// A phrase or capability is not available for the database dialect
    #[error("Feature '{feature}' is not supported by {dbms}")]
    NotSupported { feature: String, dbms: String },

    /// The expression tree cannot be rendered (missing operand, aggregate misuse, ...)
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Statement execution failed in the driver
    #[error("Query failed: {message} [sql: {sql}]")]
    QueryFailed {
        sql: String,
        params: Vec<String>,
        code: Option<String>,
        message: String,
    },

    /// Sequence emulation gave up after the configured number of attempts
    #[error("Sequence '{sequence}' is contended: no value obtained after {attempts} attempts")]
    SequenceContention { sequence: String, attempts: u32 },

    /// A schema object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Invalid argument passed to a builder or value conversion
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query returned no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Create a not-supported error for a dialect
    pub fn not_supported(feature: impl Into<String>, dbms: impl Into<String>) -> Self {
        Self::NotSupported {
            feature: feature.into(),
            dbms: dbms.into(),
        }
    }

    /// Create an invalid expression error
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap a driver failure together with the statement that caused it.
    pub fn query_failed(
        sql: impl Into<String>,
        params: Vec<String>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueryFailed {
            sql: sql.into(),
            params,
            code,
            message: message.into(),
        }
    }

    /// Check if this is a not supported error
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a unique constraint violation reported by the driver
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::QueryFailed { code: Some(code), .. } if code == "23505")
    }

    /// The SQL text attached to an execution failure
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::QueryFailed { sql, .. } => Some(sql),
            _ => None,
        }
    }
}
