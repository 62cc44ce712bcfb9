use super::{ColumnDef, DbmsFeature, DbmsHandler, Pagination, integer_type};
use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

const KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BACKUP", "BEGIN", "BETWEEN", "BREAK",
    "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT", "CLOSE", "CLUSTERED",
    "COALESCE", "COLUMN", "COMMIT", "COMPUTE", "CONSTRAINT", "CONTAINS", "CONTINUE", "CONVERT",
    "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "CURRENT_USER", "CURSOR", "DATABASE", "DEALLOCATE", "DECLARE", "DEFAULT", "DELETE", "DENY",
    "DESC", "DISTINCT", "DROP", "ELSE", "END", "ESCAPE", "EXCEPT", "EXEC", "EXECUTE", "EXISTS",
    "EXIT", "FETCH", "FILE", "FOR", "FOREIGN", "FROM", "FULL", "FUNCTION", "GOTO", "GRANT",
    "GROUP", "HAVING", "IDENTITY", "IF", "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO",
    "IS", "JOIN", "KEY", "KILL", "LEFT", "LIKE", "MERGE", "NOT", "NULL", "OF", "OFF", "ON", "OPEN",
    "OPTION", "OR", "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT", "PLAN", "PRIMARY", "PRINT",
    "PROC", "PROCEDURE", "PUBLIC", "READ", "REFERENCES", "RETURN", "REVERT", "REVOKE", "RIGHT",
    "ROLLBACK", "ROWCOUNT", "RULE", "SAVE", "SCHEMA", "SELECT", "SESSION_USER", "SET", "SOME",
    "TABLE", "THEN", "TO", "TOP", "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE", "UNION", "UNIQUE",
    "UPDATE", "USE", "USER", "VALUES", "VIEW", "WHEN", "WHERE", "WHILE", "WITH",
];

/// Microsoft SQL Server dialect.
///
/// Row limiting uses `TOP`; skipping rows is left to iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDbms;

impl DbmsHandler for SqlServerDbms {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_QUOTES_OPEN => "[",
            Phrase::SQL_QUOTES_CLOSE => "]",
            Phrase::SQL_CONCAT_EXPR => " + ",
            Phrase::SQL_BOOLEAN_TRUE => "1",
            Phrase::SQL_BOOLEAN_FALSE => "0",
            Phrase::SQL_CURRENT_DATE => "convert(date, getdate())",
            Phrase::SQL_CURRENT_TIME => "convert(time, getdate())",
            Phrase::SQL_CURRENT_TIMESTAMP => "getdate()",
            Phrase::SQL_DATE_PATTERN => "%Y/%m/%d",
            Phrase::SQL_DATE_TEMPLATE => "convert(date, '{0}', 111)",
            Phrase::SQL_TIME_TEMPLATE => "convert(time, '{0}', 108)",
            Phrase::SQL_DATETIME_TEMPLATE => "convert(datetime, '{0}', 120)",
            Phrase::SQL_TIMESTAMP_TEMPLATE => "convert(datetime2, '{0}', 121)",
            Phrase::SQL_FUNC_SUBSTRING => "substring(?, {0:INTEGER}, 4000)",
            Phrase::SQL_FUNC_LENGTH => "len(?)",
            Phrase::SQL_FUNC_STRINDEX => "charindex({0}, ?)",
            Phrase::SQL_FUNC_STRINDEXFROM => "charindex({0}, ?, {1:INTEGER})",
            Phrase::SQL_FUNC_MODULO => "(? % {0})",
            Phrase::SQL_FUNC_TRUNC => "round(?, {0:INTEGER}, 1)",
            Phrase::SQL_FUNC_FORMAT => "format(?, {0})",
            Phrase::SQL_FUNC_DAY => "day(?)",
            Phrase::SQL_FUNC_MONTH => "month(?)",
            Phrase::SQL_FUNC_YEAR => "year(?)",
            Phrase::SQL_FUNC_STRAGG => "string_agg(?, {0})",
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
                | DbmsFeature::Batch
                | DbmsFeature::GeneratedKeys
                | DbmsFeature::DdlColumnDefault
        )
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn pagination(&self) -> Pagination {
        Pagination::Top
    }

    fn format_bytes(&self, bytes: &[u8]) -> DbResult<String> {
        Ok(format!("0x{}", super::hex(bytes)))
    }

    fn quote_string(&self, s: &str) -> String {
        format!("N'{}'", s.replace('\'', "''"))
    }

    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        let t = match to {
            DataType::Integer | DataType::AutoInc => "BIGINT",
            DataType::Varchar | DataType::Char | DataType::Clob => "NVARCHAR(4000)",
            DataType::Float => "FLOAT",
            DataType::DateTime | DataType::Timestamp => "DATETIME2",
            DataType::Bool => "BIT",
            DataType::UniqueId => "UNIQUEIDENTIFIER",
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
        let _ = from;
        match format {
            Some(_) if to.is_text() => Ok("format(?, {0})".to_string()),
            Some(_) => Err(DbError::not_supported(
                format!("convert to {to} with format"),
                self.name(),
            )),
            None => Ok(format!("convert({}, ?)", self.cast_type(to)?)),
        }
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::AutoInc if column.sequence.is_none() => {
                format!("{} IDENTITY(1, 1)", integer_type(column.size))
            }
            DataType::Varchar => format!("NVARCHAR({})", super::text_size(column)?),
            DataType::Char => format!("NCHAR({})", super::text_size(column)?),
            DataType::Clob => "NVARCHAR(MAX)".to_string(),
            DataType::Blob => "VARBINARY(MAX)".to_string(),
            DataType::Bool => "BIT".to_string(),
            DataType::DateTime => "DATETIME".to_string(),
            DataType::Timestamp => "DATETIME2".to_string(),
            DataType::Float => "FLOAT".to_string(),
            DataType::UniqueId => "UNIQUEIDENTIFIER".to_string(),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn next_sequence_value_sql(&self, sequence: &str) -> DbResult<String> {
        Ok(format!("SELECT NEXT VALUE FOR {sequence}"))
    }

    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        // defaults are named constraints in SQL Server and cannot be changed inline
        let def = ColumnDef {
            default: None,
            ..column.clone()
        };
        Ok(format!("ALTER TABLE {table} ALTER COLUMN {}", def.to_sql()))
    }
}
