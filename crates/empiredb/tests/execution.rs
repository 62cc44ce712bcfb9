mod support;

use empiredb::prelude::*;
use empiredb::{DdlGenerator, SqlScript, Statement, dbms};
use support::{MockConnection, Reply, numbered};

fn numbers_table() -> (Table, ColumnRef) {
    let mut t = Table::new("NUMBERS");
    let n = t.add_column(TableColumn::new("N", DataType::Integer, 4).required());
    (t, n)
}

fn values(rows: &[empiredb::Row]) -> Vec<i64> {
    rows.iter().map(|r| r.get::<i64>("N").unwrap()).collect()
}

#[tokio::test]
async fn skip_without_native_support_discards_rows_in_order() {
    let db = Database::new("x", dbms::generic());
    let (_, n) = numbers_table();
    let conn = MockConnection::returning(numbered(10));

    let mut cmd = db.command();
    cmd.select([&n]).order_by(OrderBy::asc(n.to_expr())).skip_rows(3).limit_rows(4);
    let rows = db.query_rows(&conn, &cmd).await.unwrap();

    assert_eq!(values(&rows), [4, 5, 6, 7]);
    assert_eq!(conn.statements(), ["SELECT N FROM NUMBERS ORDER BY N"]);
}

#[tokio::test]
async fn top_dialect_fetches_skip_plus_limit() {
    let db = Database::new("x", dbms::sqlserver());
    let (_, n) = numbers_table();
    // the server honours TOP 4
    let conn = MockConnection::returning(numbered(4));

    let mut cmd = db.command();
    cmd.select([&n]).skip_rows(2).limit_rows(2);
    let rows = db.query_rows(&conn, &cmd).await.unwrap();

    assert_eq!(values(&rows), [3, 4]);
    assert_eq!(conn.statements(), ["SELECT TOP 4 N FROM NUMBERS"]);
}

#[tokio::test]
async fn native_window_passes_rows_through() {
    let db = Database::new("x", dbms::postgres());
    let (_, n) = numbers_table();
    let conn = MockConnection::returning(numbered(2));

    let mut cmd = db.command();
    cmd.select([&n]).skip_rows(5).limit_rows(2);
    let rows = db.query_rows(&conn, &cmd).await.unwrap();

    assert_eq!(values(&rows), [1, 2]);
    assert_eq!(conn.statements(), ["SELECT N FROM NUMBERS LIMIT 2 OFFSET 5"]);
}

#[tokio::test]
async fn failures_carry_the_statement() {
    let db = Database::new("x", dbms::postgres());
    let (_, n) = numbers_table();
    let conn = MockConnection::new(|sql, params| {
        Err(DbError::query_failed(
            sql,
            params.iter().map(|p| p.to_string()).collect(),
            Some("42P01".into()),
            "relation \"numbers\" does not exist",
        ))
    });

    let mut cmd = db.command();
    cmd.select([&n]).and_where(n.eq(3));
    let err = db.query_rows(&conn, &cmd).await.unwrap_err();

    assert_eq!(err.sql(), Some("SELECT N FROM NUMBERS WHERE N = $1"));
    match err {
        DbError::QueryFailed { params, code, .. } => {
            assert_eq!(params, ["3"]);
            assert_eq!(code.as_deref(), Some("42P01"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn single_value_requires_a_row() {
    let db = Database::new("x", dbms::postgres());
    let (_, n) = numbers_table();
    let mut cmd = db.command();
    cmd.select_expr(n.max());

    let empty = MockConnection::returning(Vec::new());
    assert!(db.query_single_value(&empty, &cmd).await.unwrap_err().is_not_found());

    let conn = MockConnection::returning(numbered(1));
    let max: i64 = db.query_single(&conn, &cmd).await.unwrap();
    assert_eq!(max, 1);
}

#[tokio::test]
async fn script_batches_identical_statements() {
    let db = Database::new("x", dbms::postgres());
    let (_, n) = numbers_table();
    let mut script = SqlScript::new();
    for i in 1..=3 {
        let mut cmd = db.command();
        cmd.set(&n, i);
        script.add_statement(cmd.build_insert().unwrap());
    }
    script.add_stmt("DELETE FROM NUMBERS WHERE N > 2");

    let conn = MockConnection::new(|_, _| Ok(Reply::Count(1)));
    script.execute_batch(&db, &conn).await.unwrap();
    assert_eq!(conn.batch_calls(), [("INSERT INTO NUMBERS (N) VALUES ($1)".to_string(), 3)]);
    assert_eq!(conn.statements().len(), 4);

    // generic has no batch support: one call per statement
    let generic = Database::new("x", dbms::generic());
    let conn = MockConnection::new(|_, _| Ok(Reply::Count(1)));
    script.execute_batch(&generic, &conn).await.unwrap();
    assert!(conn.batch_calls().is_empty());
    assert_eq!(conn.statements().len(), 4);
}

#[tokio::test]
async fn ddl_script_runs_in_order() {
    let mut db = Database::new("x", dbms::h2());
    let (t, _) = numbers_table();
    db.add_table(t).unwrap();
    let script = DdlGenerator::new(&db).create_database().unwrap();

    let conn = MockConnection::new(|_, _| Ok(Reply::Count(0)));
    script.execute(&db, &conn).await.unwrap();
    let executed = conn.statements();
    assert_eq!(executed, script.sql().collect::<Vec<_>>());
    assert!(executed[0].starts_with("CREATE TABLE NUMBERS"));
}

#[tokio::test]
async fn statements_run_as_given() {
    let db = Database::new("x", dbms::postgres());
    let conn = MockConnection::new(|_, _| Ok(Reply::Count(5)));
    let stmt = Statement::with_params("UPDATE NUMBERS SET N = N + $1", vec![Value::Int(1)]);
    assert_eq!(db.execute_update(&conn, &stmt).await.unwrap(), 5);
    assert_eq!(conn.calls()[0].1, [Value::Int(1)]);
}
