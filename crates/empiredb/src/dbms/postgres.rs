use super::{ColumnDef, DbmsFeature, DbmsHandler, Pagination, integer_type};
use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

const KEYWORDS: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC", "BOTH", "CASE",
    "CAST", "CHECK", "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT_CATALOG",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "FALSE", "FETCH",
    "FOR", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INITIALLY", "INTERSECT", "INTO",
    "LATERAL", "LEADING", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NOT", "NULL", "OFFSET", "ON",
    "ONLY", "OR", "ORDER", "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "SELECT",
    "SESSION_USER", "SOME", "SYMMETRIC", "TABLE", "THEN", "TO", "TRAILING", "TRUE", "UNION",
    "UNIQUE", "USER", "USING", "VARIADIC", "WHEN", "WHERE", "WINDOW", "WITH",
];

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDbms;

impl DbmsHandler for PostgresDbms {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_FUNC_ROUND => "round(?::numeric, {0:INTEGER})",
            Phrase::SQL_FUNC_TRUNC => "trunc(?::numeric, {0:INTEGER})",
            Phrase::SQL_FUNC_FORMAT => "to_char(?, {0})",
            Phrase::SQL_FUNC_STRAGG => "string_agg(?, {0})",
            Phrase::SQL_FUNC_STRINDEX => "strpos(?, {0})",
            Phrase::SQL_TIMESTAMP_PATTERN => "%Y-%m-%d %H:%M:%S%.6f",
            _ => return phrase::generic_phrase(p),
        };
        Some(t)
    }

    fn is_supported(&self, feature: DbmsFeature) -> bool {
        matches!(
            feature,
            DbmsFeature::CreateSchema
                | DbmsFeature::Sequences
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

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn pagination(&self) -> Pagination {
        Pagination::LimitOffset
    }

    fn format_bytes(&self, bytes: &[u8]) -> DbResult<String> {
        Ok(format!("'\\x{}'::bytea", super::hex(bytes)))
    }

    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        let t = match to {
            DataType::Varchar | DataType::Char | DataType::Clob => "TEXT",
            DataType::UniqueId => "UUID",
            DataType::Blob => "BYTEA",
            DataType::Integer | DataType::AutoInc => "BIGINT",
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
        match (to, format) {
            (DataType::Varchar | DataType::Char | DataType::Clob, Some(_)) => {
                Ok("to_char(?, {0})".to_string())
            }
            (DataType::Date, Some(_)) if from.is_text() => Ok("to_date(?, {0})".to_string()),
            (DataType::DateTime | DataType::Timestamp, Some(_)) if from.is_text() => {
                Ok("to_timestamp(?, {0})".to_string())
            }
            (_, Some(_)) => Err(DbError::not_supported(
                format!("convert to {to} with format"),
                self.name(),
            )),
            (_, None) => Ok(format!("CAST(? AS {})", self.cast_type(to)?)),
        }
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::AutoInc if column.sequence.is_none() => {
                if column.size == 8 { "BIGSERIAL" } else { "SERIAL" }.to_string()
            }
            DataType::AutoInc => integer_type(column.size).to_string(),
            DataType::Clob => "TEXT".to_string(),
            DataType::Blob => "BYTEA".to_string(),
            DataType::UniqueId => "UUID".to_string(),
            DataType::Decimal => super::decimal_type("NUMERIC", column),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn next_sequence_value_sql(&self, sequence: &str) -> DbResult<String> {
        Ok(format!("SELECT nextval('{sequence}')"))
    }

    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        let name = &column.name;
        let mut sql = format!("ALTER TABLE {table} ALTER COLUMN {name} TYPE {}", column.ddl_type);
        match &column.default {
            Some(default) => sql.push_str(&format!(", ALTER COLUMN {name} SET DEFAULT {default}")),
            None => sql.push_str(&format!(", ALTER COLUMN {name} DROP DEFAULT")),
        }
        let nullability = if column.required { "SET NOT NULL" } else { "DROP NOT NULL" };
        sql.push_str(&format!(", ALTER COLUMN {name} {nullability}"));
        Ok(sql)
    }
}
