use super::{ColumnDef, DbmsFeature, DbmsHandler, Pagination, integer_type};
use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

const KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHANGE", "CHECK",
    "COLUMN", "CONDITION", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DELETE", "DESC", "DESCRIBE", "DISTINCT", "DIV",
    "DROP", "ELSE", "EXISTS", "EXPLAIN", "FALSE", "FOR", "FORCE", "FOREIGN", "FROM", "GROUP",
    "GROUPS", "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTERVAL", "INTO", "IS", "JOIN", "KEY",
    "KEYS", "LEFT", "LIKE", "LIMIT", "LOCK", "MATCH", "MOD", "NOT", "NULL", "ON", "OPTION", "OR",
    "ORDER", "OUTER", "PRIMARY", "RANGE", "RANK", "READ", "REFERENCES", "REGEXP", "RENAME",
    "REPLACE", "RIGHT", "ROW", "ROWS", "SCHEMA", "SELECT", "SET", "SHOW", "TABLE", "THEN", "TO",
    "TRUE", "UNION", "UNIQUE", "UPDATE", "USAGE", "USE", "USING", "VALUES", "WHEN", "WHERE",
    "WITH", "WRITE",
];

/// MySQL / MariaDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDbms;

impl DbmsHandler for MySqlDbms {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_QUOTES_OPEN | Phrase::SQL_QUOTES_CLOSE => "`",
            // `||` is logical OR unless PIPES_AS_CONCAT is set
            Phrase::SQL_CONCAT_EXPR => return None,
            Phrase::SQL_FUNC_CONCAT => "concat(?)",
            Phrase::SQL_PSEUDO_TABLE => "DUAL",
            Phrase::SQL_DATE_TEMPLATE
            | Phrase::SQL_TIME_TEMPLATE
            | Phrase::SQL_DATETIME_TEMPLATE
            | Phrase::SQL_TIMESTAMP_TEMPLATE => "'{0}'",
            Phrase::SQL_FUNC_STRINDEX => "locate({0}, ?)",
            Phrase::SQL_FUNC_STRINDEXFROM => "locate({0}, ?, {1:INTEGER})",
            Phrase::SQL_FUNC_LENGTH => "char_length(?)",
            Phrase::SQL_FUNC_TRUNC => "truncate(?, {0:INTEGER})",
            Phrase::SQL_FUNC_FORMAT => "format(?, {0:INTEGER})",
            Phrase::SQL_FUNC_DAY => "day(?)",
            Phrase::SQL_FUNC_MONTH => "month(?)",
            Phrase::SQL_FUNC_YEAR => "year(?)",
            Phrase::SQL_FUNC_STRAGG => "group_concat(? separator {0})",
            _ => return phrase::generic_phrase(p),
        };
        Some(t)
    }

    fn is_supported(&self, feature: DbmsFeature) -> bool {
        matches!(
            feature,
            DbmsFeature::CreateSchema
                | DbmsFeature::QueryLimitRows
                | DbmsFeature::QuerySkipRows
                | DbmsFeature::Batch
                | DbmsFeature::GeneratedKeys
                | DbmsFeature::DdlColumnDefault
        )
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn pagination(&self) -> Pagination {
        Pagination::LimitOffset
    }

    fn limit_for_skip_only(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }

    fn quote_string(&self, s: &str) -> String {
        let escaped = s.replace('\\', "\\\\").replace('\'', "''");
        format!("'{escaped}'")
    }

    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        let t = match to {
            DataType::Integer | DataType::AutoInc | DataType::Bool => "SIGNED",
            DataType::Varchar | DataType::Char | DataType::Clob | DataType::UniqueId => "CHAR",
            DataType::Decimal => "DECIMAL(65,30)",
            DataType::Float => "DOUBLE",
            DataType::DateTime | DataType::Timestamp => "DATETIME",
            other => return super::default_cast_type(self, other),
        };
        Ok(t)
    }

    fn convert_phrase(
        &self,
        to: DataType,
        from: DataType,
        format: Option<&str>,
    ) -> DbResult<String> {
        match format {
            Some(_) if to.is_text() && from.is_date() => Ok("date_format(?, {0})".to_string()),
            Some(_) if to.is_date() && from.is_text() => Ok("str_to_date(?, {0})".to_string()),
            Some(_) => Err(DbError::not_supported(
                format!("convert to {to} with format"),
                self.name(),
            )),
            None => Ok(format!("CAST(? AS {})", self.cast_type(to)?)),
        }
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::AutoInc if column.sequence.is_none() => {
                format!("{} AUTO_INCREMENT", integer_type(column.size))
            }
            DataType::Clob => "LONGTEXT".to_string(),
            DataType::Blob => "LONGBLOB".to_string(),
            DataType::Bool => "TINYINT(1)".to_string(),
            DataType::DateTime => "DATETIME".to_string(),
            DataType::Timestamp => "TIMESTAMP(3)".to_string(),
            DataType::Float => "DOUBLE".to_string(),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn drop_foreign_key_sql(&self, table: &str, constraint: &str) -> String {
        format!("ALTER TABLE {table} DROP FOREIGN KEY {constraint}")
    }

    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        Ok(format!("ALTER TABLE {table} MODIFY {}", column.to_sql()))
    }
}
