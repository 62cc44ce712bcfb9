use super::{DbmsFeature, DbmsHandler, Pagination, integer_type};
use crate::error::DbResult;
use crate::phrase::{self, Phrase};
use crate::table::TableColumn;
use crate::types::DataType;

/// H2 database dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dbms;

impl DbmsHandler for H2Dbms {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn phrase(&self, p: Phrase) -> Option<&'static str> {
        let t = match p {
            Phrase::SQL_PSEUDO_TABLE => "DUAL",
            Phrase::SQL_FUNC_STRINDEX => "locate({0}, ?)",
            Phrase::SQL_FUNC_STRINDEXFROM => "locate({0}, ?, {1:INTEGER})",
            Phrase::SQL_FUNC_FORMAT => "formatdatetime(?, {0})",
            Phrase::SQL_FUNC_STRAGG => "listagg(?, {0})",
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

    fn pagination(&self) -> Pagination {
        Pagination::OffsetFetch
    }

    fn ddl_type(&self, column: &TableColumn) -> DbResult<String> {
        let t = match column.data_type {
            DataType::AutoInc if column.sequence.is_none() => {
                format!("{} AUTO_INCREMENT", integer_type(column.size))
            }
            DataType::UniqueId => "UUID".to_string(),
            _ => return super::generic_ddl_type(self.name(), column),
        };
        Ok(t)
    }

    fn next_sequence_value_sql(&self, sequence: &str) -> DbResult<String> {
        Ok(format!("SELECT NEXT VALUE FOR {sequence}"))
    }
}
