use super::{ColumnDef, DbmsFeature, DbmsHandler, Pagination};
use crate::error::{DbError, DbResult};
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

const KEYWORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUDIT", "BETWEEN", "BY", "CHAR",
    "CHECK", "CLUSTER", "COLUMN", "COMMENT", "COMPRESS", "CONNECT", "CREATE", "CURRENT", "DATE",
    "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "EXCLUSIVE", "EXISTS",
    "FILE", "FLOAT", "FOR", "FROM", "GRANT", "GROUP", "HAVING", "IDENTIFIED", "IMMEDIATE", "IN",
    "INCREMENT", "INDEX", "INITIAL", "INSERT", "INTEGER", "INTERSECT", "INTO", "IS", "LEVEL",
    "LIKE", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MODE", "MODIFY", "NOAUDIT", "NOCOMPRESS",
    "NOT", "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "ON", "ONLINE", "OPTION", "OR", "ORDER",
    "PCTFREE", "PRIOR", "PUBLIC", "RAW", "RENAME", "RESOURCE", "REVOKE", "ROW", "ROWID", "ROWNUM",
    "ROWS", "SELECT", "SESSION", "SET", "SHARE", "SIZE", "SMALLINT", "START", "SYNONYM",
    "SYSDATE", "TABLE", "THEN", "TO", "TRIGGER", "UID", "UNION", "UNIQUE", "UPDATE", "USER",
    "VALIDATE", "VALUES", "VARCHAR", "VARCHAR2", "VIEW", "WHENEVER", "WHERE", "WITH",
];

/// Oracle dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDbms;

impl DbmsHandler for OracleDbms {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_PSEUDO_TABLE => "DUAL",
            Phrase::SQL_BOOLEAN_TRUE => "1",
            Phrase::SQL_BOOLEAN_FALSE => "0",
            Phrase::SQL_CURRENT_DATE => "TRUNC(sysdate)",
            Phrase::SQL_CURRENT_TIME => "sysdate",
            Phrase::SQL_CURRENT_TIMESTAMP => "systimestamp",
            Phrase::SQL_DATE_TEMPLATE => "TO_DATE('{0}', 'YYYY-MM-DD')",
            Phrase::SQL_TIME_TEMPLATE => "TO_DATE('{0}', 'HH24:MI:SS')",
            Phrase::SQL_DATETIME_TEMPLATE => "TO_DATE('{0}', 'YYYY-MM-DD HH24:MI:SS')",
            Phrase::SQL_TIMESTAMP_TEMPLATE => "TO_TIMESTAMP('{0}', 'YYYY-MM-DD HH24:MI:SS.FF')",
            Phrase::SQL_FUNC_SUBSTRING => "substr(?, {0:INTEGER})",
            Phrase::SQL_FUNC_SUBSTRINGEX => "substr(?, {0:INTEGER}, {1:INTEGER})",
            Phrase::SQL_FUNC_STRINDEX => "instr(?, {0})",
            Phrase::SQL_FUNC_STRINDEXFROM => "instr(?, {0}, {1:INTEGER})",
            Phrase::SQL_FUNC_CEILING => "ceil(?)",
            Phrase::SQL_FUNC_FORMAT => "TO_CHAR(?, {0})",
            Phrase::SQL_FUNC_STRAGG => "listagg(?, {0}) WITHIN GROUP (ORDER BY NULL)",
            Phrase::SQL_FUNC_DECODE => "decode(?{0})",
            Phrase::SQL_FUNC_DECODE_SEP => "",
            Phrase::SQL_FUNC_DECODE_PART => ", {0}, {1}",
            Phrase::SQL_FUNC_DECODE_ELSE => ", {0}",
            _ => return phrase::generic_phrase(p),
        };
        Some(t)
    }

    fn is_supported(&self, feature: DbmsFeature) -> bool {
        matches!(
            feature,
            DbmsFeature::Sequences
                | DbmsFeature::QueryLimitRows
                | DbmsFeature::Batch
                | DbmsFeature::DdlColumnDefault
        )
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn pagination(&self) -> Pagination {
        Pagination::RowNum
    }

    fn format_bytes(&self, bytes: &[u8]) -> DbResult<String> {
        Ok(format!("HEXTORAW('{}')", super::hex(bytes)))
    }

    fn cast_type(&self, to: DataType) -> DbResult<&'static str> {
        let t = match to {
            DataType::Integer | DataType::AutoInc => "NUMBER(19)",
            DataType::Varchar | DataType::Char | DataType::Clob | DataType::UniqueId => {
                "VARCHAR2(4000)"
            }
            DataType::Decimal => "NUMBER",
            DataType::Float => "BINARY_DOUBLE",
            DataType::Bool => "NUMBER(1)",
            DataType::DateTime | DataType::Time => "DATE",
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
            Some(_) if to.is_text() => Ok("TO_CHAR(?, {0})".to_string()),
            Some(_) if to.is_date() && from.is_text() => Ok("TO_DATE(?, {0})".to_string()),
            Some(_) if to.is_numeric() && from.is_text() => Ok("TO_NUMBER(?, {0})".to_string()),
            Some(_) => Err(DbError::not_supported(
                format!("convert to {to} with format"),
                self.name(),
            )),
            None if to.is_text() => Ok("TO_CHAR(?)".to_string()),
            None => Ok(format!("CAST(? AS {})", self.cast_type(to)?)),
        }
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::AutoInc if column.sequence.is_none() => {
                "NUMBER(19) GENERATED BY DEFAULT AS IDENTITY".to_string()
            }
            DataType::Integer | DataType::AutoInc => match column.size {
                1 | 2 => "NUMBER(5)".to_string(),
                8 => "NUMBER(19)".to_string(),
                _ => "NUMBER(10)".to_string(),
            },
            DataType::Varchar => format!("VARCHAR2({} CHAR)", super::text_size(column)?),
            DataType::Char => format!("CHAR({} CHAR)", super::text_size(column)?),
            DataType::Bool => "NUMBER(1)".to_string(),
            DataType::Time | DataType::DateTime => "DATE".to_string(),
            DataType::Decimal => super::decimal_type("NUMBER", column),
            DataType::Float => "BINARY_DOUBLE".to_string(),
            DataType::UniqueId => "RAW(16)".to_string(),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn next_sequence_value_sql(&self, sequence: &str) -> DbResult<String> {
        Ok(format!("SELECT {sequence}.NEXTVAL FROM DUAL"))
    }

    fn alter_column_sql(&self, table: &str, column: &ColumnDef) -> DbResult<String> {
        Ok(format!("ALTER TABLE {table} MODIFY {}", column.to_sql()))
    }
}
