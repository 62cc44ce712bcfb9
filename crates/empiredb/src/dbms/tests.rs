//! Cross-dialect tests for phrase tables, quoting and literal formatting.

use super::*;
use crate::ident::QuoteCache;
use crate::phrase::PhraseTemplate;
use chrono::NaiveDate;

fn all_dialects() -> Vec<Arc<dyn DbmsHandler>> {
    DBMS_NAMES
        .iter()
        .map(|name| dbms_by_name(name).unwrap())
        .collect()
}

#[test]
fn every_supported_phrase_honors_its_contract() {
    for dbms in all_dialects() {
        for phrase in Phrase::ALL {
            if phrase.is_pattern() {
                continue;
            }
            let Some(template) = dbms.phrase(phrase) else {
                continue;
            };
            let parsed = PhraseTemplate::parse(template).unwrap();
            let c = phrase.contract();
            assert_eq!(parsed.has_operand(), c.operand, "{} {phrase}", dbms.name());
            assert_eq!(parsed.arg_count(), c.args, "{} {phrase}", dbms.name());
            if c.args > 0 {
                assert_eq!(parsed.max_arg_index(), Some(c.args - 1), "{} {phrase}", dbms.name());
            }
        }
    }
}

#[test]
fn substringex_has_exactly_two_args_everywhere() {
    for dbms in all_dialects() {
        let template = dbms.require_phrase(Phrase::SQL_FUNC_SUBSTRINGEX).unwrap();
        assert_eq!(PhraseTemplate::parse(template).unwrap().arg_count(), 2, "{}", dbms.name());
    }
}

#[test]
fn unsupported_phrase_is_reported() {
    let err = generic().require_phrase(Phrase::SQL_FUNC_STRAGG).unwrap_err();
    assert!(err.is_not_supported());
    assert!(err.to_string().contains("SQL_FUNC_STRAGG"));
    assert!(err.to_string().contains("generic"));

    assert!(postgres().phrase(Phrase::SQL_FUNC_STRAGG).is_some());
    assert!(sqlite().phrase(Phrase::SQL_FUNC_REVERSE).is_none());
}

#[test]
fn reserved_keyword_quoting_per_dialect() {
    for dbms in all_dialects() {
        let mut cache = QuoteCache::new();
        assert!(cache.needs_quotes(dbms.as_ref(), "order"), "{}", dbms.name());
        assert!(!cache.needs_quotes(dbms.as_ref(), "customer_id"), "{}", dbms.name());
    }
}

#[test]
fn lookup_by_name_accepts_aliases() {
    assert_eq!(dbms_by_name("PostgreSQL").unwrap().name(), "postgres");
    assert_eq!(dbms_by_name("mssql").unwrap().name(), "sqlserver");
    assert_eq!(dbms_by_name(" mariadb ").unwrap().name(), "mysql");
    let err = dbms_by_name("db2").unwrap_err();
    assert!(matches!(err, DbError::Config(_)));
}

#[test]
fn placeholders() {
    assert_eq!(postgres().placeholder(3), "$3");
    assert_eq!(mysql().placeholder(3), "?");
}

#[test]
fn string_literals_are_escaped() {
    let v = Value::from("O'Brien");
    assert_eq!(generic().format_value(&v, DataType::Varchar).unwrap(), "'O''Brien'");
    assert_eq!(sqlserver().format_value(&v, DataType::Varchar).unwrap(), "N'O''Brien'");
    let v = Value::from("a\\b");
    assert_eq!(mysql().format_value(&v, DataType::Varchar).unwrap(), "'a\\\\b'");
}

#[test]
fn date_literals_use_dialect_templates() {
    let d = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    assert_eq!(generic().format_value(&d, DataType::Date).unwrap(), "DATE '2024-03-09'");
    assert_eq!(mysql().format_value(&d, DataType::Date).unwrap(), "'2024-03-09'");
    assert_eq!(
        oracle().format_value(&d, DataType::Date).unwrap(),
        "TO_DATE('2024-03-09', 'YYYY-MM-DD')"
    );
    assert_eq!(
        sqlserver().format_value(&d, DataType::Date).unwrap(),
        "convert(date, '2024/03/09', 111)"
    );
}

#[test]
fn boolean_and_null_literals() {
    assert_eq!(generic().format_value(&Value::Bool(true), DataType::Bool).unwrap(), "TRUE");
    assert_eq!(oracle().format_value(&Value::Bool(true), DataType::Bool).unwrap(), "1");
    assert_eq!(sqlite().format_value(&Value::Bool(false), DataType::Bool).unwrap(), "0");
    assert_eq!(generic().format_value(&Value::Null, DataType::Integer).unwrap(), "null");
}

#[test]
fn literal_coerces_to_requested_type() {
    let v = Value::from("42");
    assert_eq!(generic().format_value(&v, DataType::Integer).unwrap(), "42");
    assert!(generic().format_value(&Value::from("abc"), DataType::Integer).is_err());
}

#[test]
fn binary_literals() {
    let v = Value::Bytes(vec![0xde, 0xad]);
    assert_eq!(generic().format_value(&v, DataType::Blob).unwrap(), "X'DEAD'");
    assert_eq!(postgres().format_value(&v, DataType::Blob).unwrap(), "'\\xDEAD'::bytea");
    assert_eq!(sqlserver().format_value(&v, DataType::Blob).unwrap(), "0xDEAD");
}

#[test]
fn native_sequence_queries() {
    assert_eq!(
        postgres().next_sequence_value_sql("EMP_SEQ").unwrap(),
        "SELECT nextval('EMP_SEQ')"
    );
    assert_eq!(
        oracle().next_sequence_value_sql("EMP_SEQ").unwrap(),
        "SELECT EMP_SEQ.NEXTVAL FROM DUAL"
    );
    assert!(mysql().next_sequence_value_sql("EMP_SEQ").unwrap_err().is_not_supported());
}

#[test]
fn sequence_support_matches_native_query() {
    for dbms in all_dialects() {
        assert_eq!(
            dbms.is_supported(DbmsFeature::Sequences),
            dbms.next_sequence_value_sql("S").is_ok(),
            "{}",
            dbms.name()
        );
    }
}

#[test]
fn pagination_styles() {
    assert_eq!(generic().pagination(), Pagination::None);
    assert_eq!(postgres().pagination(), Pagination::LimitOffset);
    assert_eq!(sqlserver().pagination(), Pagination::Top);
    assert_eq!(oracle().pagination(), Pagination::RowNum);
    assert!(!sqlserver().is_supported(DbmsFeature::QuerySkipRows));
}

#[test]
fn ddl_types() {
    let col = TableColumn::new("NAME", DataType::Varchar, 40);
    assert_eq!(generic().ddl_type(&col).unwrap(), "VARCHAR(40)");
    assert_eq!(oracle().ddl_type(&col).unwrap(), "VARCHAR2(40 CHAR)");
    assert_eq!(sqlserver().ddl_type(&col).unwrap(), "NVARCHAR(40)");

    let id = TableColumn::new("ID", DataType::AutoInc, 4);
    assert_eq!(postgres().ddl_type(&id).unwrap(), "SERIAL");
    assert_eq!(mysql().ddl_type(&id).unwrap(), "INTEGER AUTO_INCREMENT");

    let missing_size = TableColumn::new("CODE", DataType::Char, 0);
    assert!(generic().ddl_type(&missing_size).is_err());
}

#[test]
fn conversion_templates() {
    assert_eq!(
        generic().convert_phrase(DataType::Varchar, DataType::Integer, None).unwrap(),
        "CAST(? AS VARCHAR(4000))"
    );
    assert!(
        generic()
            .convert_phrase(DataType::Varchar, DataType::Date, Some("YYYY"))
            .unwrap_err()
            .is_not_supported()
    );
    assert_eq!(
        sqlserver().convert_phrase(DataType::Integer, DataType::Varchar, None).unwrap(),
        "convert(BIGINT, ?)"
    );
}

#[test]
fn alter_column_statements() {
    let def = ColumnDef {
        name: "NAME".into(),
        ddl_type: "VARCHAR(80)".into(),
        default: None,
        required: true,
    };
    assert_eq!(
        mysql().alter_column_sql("T", &def).unwrap(),
        "ALTER TABLE T MODIFY NAME VARCHAR(80) NOT NULL"
    );
    assert!(sqlite().alter_column_sql("T", &def).unwrap_err().is_not_supported());
}
