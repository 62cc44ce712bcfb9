use super::{ColumnDef, DbmsFeature, DbmsHandler, Pagination};
use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDbms;

impl DbmsHandler for SqliteDbms {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_BOOLEAN_TRUE => "1",
            Phrase::SQL_BOOLEAN_FALSE => "0",
            Phrase::SQL_DATE_TEMPLATE
            | Phrase::SQL_TIME_TEMPLATE
            | Phrase::SQL_DATETIME_TEMPLATE
            | Phrase::SQL_TIMESTAMP_TEMPLATE => "'{0}'",
            Phrase::SQL_FUNC_SUBSTRING => "substr(?, {0:INTEGER})",
            Phrase::SQL_FUNC_SUBSTRINGEX => "substr(?, {0:INTEGER}, {1:INTEGER})",
            Phrase::SQL_FUNC_STRINDEX => "instr(?, {0})",
            Phrase::SQL_FUNC_MODULO => "(? % {0})",
            Phrase::SQL_FUNC_DAY => "cast(strftime('%d', ?) as integer)",
            Phrase::SQL_FUNC_MONTH => "cast(strftime('%m', ?) as integer)",
            Phrase::SQL_FUNC_YEAR => "cast(strftime('%Y', ?) as integer)",
            Phrase::SQL_FUNC_STRAGG => "group_concat(?, {0})",
            Phrase::SQL_FUNC_REVERSE
            | Phrase::SQL_FUNC_TRUNC
            | Phrase::SQL_FUNC_CEILING
            | Phrase::SQL_FUNC_FLOOR => return None,
            _ => return phrase::generic_phrase(p),
        };
        Some(t)
    }

    fn is_supported(&self, feature: DbmsFeature) -> bool {
        matches!(
            feature,
            DbmsFeature::QueryLimitRows
                | DbmsFeature::QuerySkipRows
                | DbmsFeature::Batch
                | DbmsFeature::GeneratedKeys
                | DbmsFeature::DdlColumnDefault
        )
    }

    fn pagination(&self) -> Pagination {
        Pagination::LimitOffset
    }

    fn limit_for_skip_only(&self) -> Option<&'static str> {
        Some("-1")
    }

    fn parenthesize_combined(&self) -> bool {
        false
    }

    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        let t = match to {
            DataType::Integer | DataType::AutoInc | DataType::Bool => "INTEGER",
            DataType::Float => "REAL",
            DataType::Decimal => "NUMERIC",
            DataType::Blob => "BLOB",
            DataType::Unknown => return super::default_cast_type(self, to),
            _ => "TEXT",
        };
        Ok(t)
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::Integer | DataType::AutoInc => "INTEGER".to_string(),
            DataType::Clob => "TEXT".to_string(),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        let _ = table;
        Err(DbError::not_supported(
            format!("alter column {}", column.name),
            self.name(),
        ))
    }
}
