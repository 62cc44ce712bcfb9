//! Database configuration.

use serde::{Deserialize, Serialize};

/// How values are emitted into generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamMode {
    /// Values become positional placeholders with a separate parameter list.
    #[default]
    Prepared,
    /// Values are formatted as SQL literals inside the statement text.
    Literal,
}

/// Settings for the table-backed sequence emulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Counter table name.
    pub table: String,
    pub name_column: String,
    pub value_column: String,
    pub timestamp_column: String,
    /// Value handed out first for a sequence that has no row yet.
    pub min_value: i64,
    /// Attempts before giving up with `SequenceContention`.
    pub max_attempts: u32,
    /// Failed attempts after which each retry is logged at WARN.
    pub warn_after: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            table: "EMPIREDB_SEQUENCES".to_string(),
            name_column: "SEQNAME".to_string(),
            value_column: "SEQVALUE".to_string(),
            timestamp_column: "SEQTIME".to_string(),
            min_value: 1,
            max_attempts: 25,
            warn_after: 5,
        }
    }
}

impl SequenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn min_value(mut self, value: i64) -> Self {
        self.min_value = value;
        self
    }

    /// Set the retry cap (at least one attempt is always made).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn warn_after(mut self, attempts: u32) -> Self {
        self.warn_after = attempts;
        self
    }
}

/// Configuration for a [`Database`](crate::database::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Schema prefixed to table names in generated SQL.
    pub schema: Option<String>,
    pub param_mode: ParamMode,
    /// Use native sequences when the dialect supports them.
    pub native_sequences: bool,
    pub sequences: SequenceConfig,
    /// Maximum SQL length written to logs; longer statements are truncated.
    pub max_sql_log_len: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            schema: None,
            param_mode: ParamMode::Prepared,
            native_sequences: true,
            sequences: SequenceConfig::default(),
            max_sql_log_len: 2000,
        }
    }
}

impl DatabaseConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn param_mode(mut self, mode: ParamMode) -> Self {
        self.param_mode = mode;
        self
    }

    /// Force table-backed sequence emulation even where native sequences exist.
    pub fn emulate_sequences(mut self) -> Self {
        self.native_sequences = false;
        self
    }

    pub fn sequences(mut self, config: SequenceConfig) -> Self {
        self.sequences = config;
        self
    }

    pub fn max_sql_log_len(mut self, len: usize) -> Self {
        self.max_sql_log_len = len;
        self
    }
}

/// Shorten `sql` to at most `max` bytes on a char boundary for logging.
pub(crate) fn truncate_sql(sql: &str, max: usize) -> std::borrow::Cow<'_, str> {
    if sql.len() <= max {
        return std::borrow::Cow::Borrowed(sql);
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!("{}... ({} bytes)", &sql[..end], sql.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DatabaseConfig::new();
        assert_eq!(cfg.param_mode, ParamMode::Prepared);
        assert_eq!(cfg.sequences.max_attempts, 25);
        assert_eq!(cfg.sequences.warn_after, 5);
        assert!(cfg.native_sequences);
    }

    #[test]
    fn builder_chain() {
        let cfg = DatabaseConfig::new()
            .schema("hr")
            .param_mode(ParamMode::Literal)
            .emulate_sequences()
            .sequences(SequenceConfig::new().max_attempts(0));
        assert_eq!(cfg.schema.as_deref(), Some("hr"));
        assert!(!cfg.native_sequences);
        assert_eq!(cfg.sequences.max_attempts, 1);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql("SELECT 1", 100), "SELECT 1");
        let t = truncate_sql("SELECT 'äää'", 9);
        assert!(t.starts_with("SELECT '"));
        assert_eq!(t, "SELECT '... (15 bytes)");
    }
}
