use super::*;
use crate::dbms;
use crate::error::DbError;
use crate::table::{Table, TableColumn};

struct Model {
    employees: Table,
    departments: Table,
    id: ColumnRef,
    name: ColumnRef,
    dept_id: ColumnRef,
    salary: ColumnRef,
    dept_pk: ColumnRef,
    dept_name: ColumnRef,
}

fn model() -> Model {
    let mut employees = Table::new("EMPLOYEES");
    let id = employees.add_column(TableColumn::new("ID", DataType::AutoInc, 4).required());
    let name = employees.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
    let dept_id = employees.add_column(TableColumn::new("DEPT_ID", DataType::Integer, 4));
    let salary =
        employees.add_column(TableColumn::new("SALARY", DataType::Decimal, 10).scale(2));
    let mut departments = Table::new("DEPARTMENTS");
    let dept_pk = departments.add_column(TableColumn::new("ID", DataType::Integer, 4));
    let dept_name = departments.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
    Model {
        employees,
        departments,
        id,
        name,
        dept_id,
        salary,
        dept_pk,
        dept_name,
    }
}

fn invalid(result: crate::error::DbResult<crate::builder::Statement>) -> bool {
    matches!(result, Err(DbError::InvalidExpression(_)))
}

// ==================== SELECT ====================

#[test]
fn select_with_prepared_where() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([&m.id, &m.name]).and_where(m.name.eq("Smith"));
    let stmt = cmd.build_select().unwrap();
    assert_eq!(stmt.sql, "SELECT ID, NAME FROM EMPLOYEES WHERE NAME = $1");
    assert_eq!(stmt.params, vec![Value::from("Smith")]);
    assert!(!stmt.needs_manual_window());
}

#[test]
fn literal_mode_inlines_values() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.param_mode(ParamMode::Literal)
        .select([&m.id])
        .and_where(m.name.eq("O'Brien"));
    let stmt = cmd.build_select().unwrap();
    assert_eq!(stmt.sql, "SELECT ID FROM EMPLOYEES WHERE NAME = 'O''Brien'");
    assert!(stmt.params.is_empty());
}

#[test]
fn join_qualifies_columns() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([m.name.to_expr(), m.dept_name.alias("DEPT")])
        .join(&m.dept_id, &m.dept_pk, JoinKind::Inner)
        .order_by(m.dept_name.asc())
        .order_by(m.name.desc());
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT EMPLOYEES.NAME, DEPARTMENTS.NAME AS DEPT FROM EMPLOYEES \
         INNER JOIN DEPARTMENTS ON EMPLOYEES.DEPT_ID = DEPARTMENTS.ID \
         ORDER BY DEPARTMENTS.NAME, EMPLOYEES.NAME DESC"
    );
}

#[test]
fn join_with_extra_condition() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([&m.name]).join_with(
        &m.dept_id,
        &m.dept_pk,
        JoinKind::Left,
        m.dept_name.not_eq("Archive"),
    );
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT EMPLOYEES.NAME FROM EMPLOYEES LEFT JOIN DEPARTMENTS \
         ON EMPLOYEES.DEPT_ID = DEPARTMENTS.ID AND DEPARTMENTS.NAME <> $1"
    );
    assert_eq!(stmt.params, vec![Value::from("Archive")]);
}

#[test]
fn unrelated_rowsets_are_listed_in_from() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select([&m.name, &m.dept_name]);
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT EMPLOYEES.NAME, DEPARTMENTS.NAME FROM EMPLOYEES, DEPARTMENTS"
    );
}

#[test]
fn where_constraint_on_same_column_and_operator_is_replaced() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([&m.id])
        .and_where(m.name.eq("A"))
        .and_where(m.name.like("S%"))
        .and_where(m.name.eq("B"));
    assert_eq!(cmd.where_list().len(), 2);
    let stmt = cmd.build_select().unwrap();
    assert_eq!(stmt.sql, "SELECT ID FROM EMPLOYEES WHERE NAME = $1 AND NAME LIKE $2");
    assert_eq!(stmt.params, vec![Value::from("B"), Value::from("S%")]);

    cmd.remove_where(&m.name);
    assert!(cmd.where_list().is_empty());
}

#[test]
fn or_groups_are_parenthesized_between_constraints() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.param_mode(ParamMode::Literal)
        .select([&m.id])
        .and_where(m.id.eq(1).or(m.id.eq(2)));
    assert_eq!(
        cmd.build_select().unwrap().sql,
        "SELECT ID FROM EMPLOYEES WHERE ID = 1 OR ID = 2"
    );
    cmd.and_where(m.name.is(Value::Null));
    assert_eq!(
        cmd.build_select().unwrap().sql,
        "SELECT ID FROM EMPLOYEES WHERE (ID = 1 OR ID = 2) AND NAME IS NULL"
    );
}

#[test]
fn select_without_rowset_uses_pseudo_table() {
    let mut cmd = Command::new(dbms::oracle());
    cmd.select_expr(ColumnExpr::raw("1", DataType::Integer));
    assert_eq!(cmd.build_select().unwrap().sql, "SELECT 1 FROM DUAL");

    let mut cmd = Command::new(dbms::postgres());
    cmd.select_expr(ColumnExpr::raw("1", DataType::Integer));
    assert_eq!(cmd.build_select().unwrap().sql, "SELECT 1");
}

#[test]
fn schema_prefixes_tables() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.schema(Some("hr".into())).select([&m.id]);
    assert_eq!(cmd.build_select().unwrap().sql, "SELECT ID FROM hr.EMPLOYEES");
}

#[test]
fn empty_select_is_rejected() {
    let cmd = Command::new(dbms::postgres());
    assert!(invalid(cmd.build_select()));
}

// ==================== AGGREGATES ====================

#[test]
fn group_by_with_having() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select([m.dept_id.to_expr(), ColumnExpr::count_all()])
        .group_by([&m.dept_id])
        .having(ColumnExpr::count_all().greater(5));
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT DEPT_ID, count(*) FROM EMPLOYEES GROUP BY DEPT_ID HAVING count(*) > ?"
    );
    assert_eq!(stmt.params, vec![Value::Int(5)]);
}

#[test]
fn aliased_column_matches_its_group_by() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select([m.dept_id.alias("DEPT"), m.salary.sum()])
        .group_by([&m.dept_id]);
    assert_eq!(
        cmd.build_select().unwrap().sql,
        "SELECT DEPT_ID AS DEPT, sum(SALARY) FROM EMPLOYEES GROUP BY DEPT_ID"
    );
}

#[test]
fn ungrouped_column_is_rejected() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select([m.name.to_expr(), m.salary.sum()]);
    assert!(invalid(cmd.build_select()));

    cmd.group_by([&m.name]);
    assert!(cmd.build_select().is_ok());
}

#[test]
fn same_named_column_of_joined_table_is_not_grouped() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([&m.name, &m.dept_name])
        .join(&m.dept_id, &m.dept_pk, JoinKind::Inner)
        .group_by([&m.name]);
    assert!(invalid(cmd.build_select()));

    cmd.group_by([&m.dept_name]);
    let stmt = cmd.build_select().unwrap();
    assert!(stmt.sql.ends_with("GROUP BY EMPLOYEES.NAME, DEPARTMENTS.NAME"));
}

#[test]
fn aggregate_in_where_is_rejected() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select([&m.dept_id]).and_where(m.salary.sum().greater(100));
    assert!(invalid(cmd.build_select()));
}

#[test]
fn nested_aggregate_is_rejected() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.select_expr(m.salary.sum().max());
    assert!(invalid(cmd.build_select()));
}

// ==================== SUBQUERIES ====================

#[test]
fn in_subquery_shares_the_parameter_list() {
    let m = model();
    let mut sub = Command::new(dbms::postgres());
    sub.select([&m.dept_pk]).and_where(m.dept_name.eq("Sales"));
    let mut cmd = Command::new(dbms::postgres());
    cmd.select([&m.name])
        .and_where(m.id.greater(10))
        .and_where(m.dept_id.in_query(sub));
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT NAME FROM EMPLOYEES WHERE ID > $1 AND DEPT_ID IN \
         (SELECT ID FROM DEPARTMENTS WHERE NAME = $2)"
    );
    assert_eq!(stmt.params, vec![Value::Int(10), Value::from("Sales")]);
}

#[test]
fn exists_subquery_may_aggregate() {
    let m = model();
    let mut sub = Command::new(dbms::generic());
    sub.select_expr(m.dept_pk.max());
    let mut cmd = Command::new(dbms::generic());
    cmd.select([&m.name]).and_where(CompareExpr::exists(sub));
    assert_eq!(
        cmd.build_select().unwrap().sql,
        "SELECT NAME FROM EMPLOYEES WHERE EXISTS (SELECT max(ID) FROM DEPARTMENTS)"
    );
}

#[test]
fn subquery_cannot_use_manual_window() {
    let m = model();
    let mut sub = Command::new(dbms::generic());
    sub.select([&m.dept_pk]).limit_rows(1);
    let mut cmd = Command::new(dbms::generic());
    cmd.select([&m.name]).and_where(m.dept_id.in_query(sub));
    assert!(invalid(cmd.build_select()));
}

// ==================== PAGINATION ====================

fn paged(dbms: Arc<dyn DbmsHandler>, limit: Option<u64>, skip: u64) -> crate::builder::Statement {
    let m = model();
    let mut cmd = Command::new(dbms);
    cmd.select([&m.id]).skip_rows(skip);
    if let Some(limit) = limit {
        cmd.limit_rows(limit);
    }
    cmd.build_select().unwrap()
}

#[test]
fn limit_offset_dialects() {
    let stmt = paged(dbms::postgres(), Some(10), 20);
    assert_eq!(stmt.sql, "SELECT ID FROM EMPLOYEES LIMIT 10 OFFSET 20");
    assert!(!stmt.needs_manual_window());

    assert_eq!(paged(dbms::postgres(), None, 5).sql, "SELECT ID FROM EMPLOYEES OFFSET 5");
    assert_eq!(
        paged(dbms::mysql(), None, 5).sql,
        "SELECT ID FROM EMPLOYEES LIMIT 18446744073709551615 OFFSET 5"
    );
    assert_eq!(
        paged(dbms::sqlite(), None, 5).sql,
        "SELECT ID FROM EMPLOYEES LIMIT -1 OFFSET 5"
    );
}

#[test]
fn offset_fetch_dialect() {
    assert_eq!(
        paged(dbms::h2(), Some(10), 20).sql,
        "SELECT ID FROM EMPLOYEES OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    assert_eq!(
        paged(dbms::h2(), Some(10), 0).sql,
        "SELECT ID FROM EMPLOYEES FETCH FIRST 10 ROWS ONLY"
    );
}

#[test]
fn top_fetches_skipped_rows_and_discards_them() {
    let stmt = paged(dbms::sqlserver(), Some(10), 20);
    assert_eq!(stmt.sql, "SELECT TOP 30 ID FROM EMPLOYEES");
    assert_eq!(stmt.skip_rows, 20);
    assert_eq!(stmt.max_rows, Some(10));

    let stmt = paged(dbms::sqlserver(), Some(10), 0);
    assert_eq!(stmt.sql, "SELECT TOP 10 ID FROM EMPLOYEES");
    assert!(!stmt.needs_manual_window());

    let m = model();
    let mut cmd = Command::new(dbms::sqlserver());
    cmd.select([&m.name]).distinct().limit_rows(5);
    assert_eq!(cmd.build_select().unwrap().sql, "SELECT DISTINCT TOP 5 NAME FROM EMPLOYEES");
}

#[test]
fn rownum_wraps_the_select() {
    let m = model();
    let mut cmd = Command::new(dbms::oracle());
    cmd.select([&m.id]).order_by(m.id.asc()).limit_rows(10).skip_rows(20);
    let stmt = cmd.build_select().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM (SELECT ID FROM EMPLOYEES ORDER BY ID) WHERE ROWNUM <= 30"
    );
    assert_eq!((stmt.skip_rows, stmt.max_rows), (20, Some(10)));
}

#[test]
fn generic_dialect_applies_the_whole_window_manually() {
    let stmt = paged(dbms::generic(), Some(10), 20);
    assert_eq!(stmt.sql, "SELECT ID FROM EMPLOYEES");
    assert_eq!((stmt.skip_rows, stmt.max_rows), (20, Some(10)));

    let stmt = paged(dbms::generic(), None, 3);
    assert_eq!((stmt.skip_rows, stmt.max_rows), (3, None));
}

// ==================== PARAMS ====================

#[test]
fn command_param_value_changes_between_builds() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    let p = cmd.add_param(10, DataType::Integer);
    cmd.select([&m.name]).and_where(m.id.eq(&p));
    assert_eq!(cmd.build_select().unwrap().params, vec![Value::Int(10)]);
    p.set(20);
    assert_eq!(cmd.build_select().unwrap().params, vec![Value::Int(20)]);
    assert_eq!(cmd.params().len(), 1);
}

#[test]
fn clear_keeps_dialect_settings() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.param_mode(ParamMode::Literal)
        .select([&m.id])
        .and_where(m.id.eq(1));
    cmd.clear();
    assert!(cmd.select_list().is_empty());
    cmd.select([&m.id]).and_where(m.id.eq(2));
    assert_eq!(cmd.build_select().unwrap().sql, "SELECT ID FROM EMPLOYEES WHERE ID = 2");
}

// ==================== DML ====================

#[test]
fn insert_uses_set_list() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.set(&m.name, "Smith").set(&m.dept_id, 3).set(&m.name, "Jones");
    let stmt = cmd.build_insert().unwrap();
    assert_eq!(stmt.sql, "INSERT INTO EMPLOYEES (NAME, DEPT_ID) VALUES ($1, $2)");
    assert_eq!(stmt.params, vec![Value::from("Jones"), Value::Int(3)]);
}

#[test]
fn insert_without_values_is_rejected() {
    let cmd = Command::new(dbms::postgres());
    assert!(invalid(cmd.build_insert()));
}

#[test]
fn insert_across_tables_is_rejected() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.set(&m.name, "Smith").set(&m.dept_name, "Sales");
    assert!(invalid(cmd.build_insert()));
}

#[test]
fn update_with_calculation() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.set(&m.salary, m.salary.multiply_with(2)).and_where(m.id.eq(7));
    let stmt = cmd.build_update().unwrap();
    assert_eq!(stmt.sql, "UPDATE EMPLOYEES SET SALARY = SALARY * $1 WHERE ID = $2");
    assert_eq!(stmt.params, vec![Value::Int(2), Value::Int(7)]);
}

#[test]
fn update_without_where_needs_permission() {
    let m = model();
    let mut cmd = Command::new(dbms::generic());
    cmd.param_mode(ParamMode::Literal).set(&m.dept_id, 1);
    assert!(invalid(cmd.build_update()));
    cmd.allow_all_rows();
    assert_eq!(cmd.build_update().unwrap().sql, "UPDATE EMPLOYEES SET DEPT_ID = 1");
}

#[test]
fn update_referencing_other_table_is_rejected() {
    let m = model();
    let mut cmd = Command::new(dbms::postgres());
    cmd.set(&m.name, "x").and_where(m.dept_name.eq("Sales"));
    assert!(invalid(cmd.build_update()));
}

#[test]
fn delete_ignores_table_alias() {
    let mut t = Table::with_alias("EMPLOYEES", "E");
    let id = t.add_column(TableColumn::new("ID", DataType::Integer, 4));
    let mut cmd = Command::new(dbms::postgres());
    cmd.and_where(id.eq(5));
    let stmt = cmd.build_delete(&t).unwrap();
    assert_eq!(stmt.sql, "DELETE FROM EMPLOYEES WHERE ID = $1");

    let everything = Command::new(dbms::postgres());
    assert!(invalid(everything.build_delete(&t)));
}

#[test]
fn model_tables_are_reachable() {
    let m = model();
    assert_eq!(m.employees.column_count(), 4);
    assert_eq!(m.departments.name(), "DEPARTMENTS");
}

// ==================== COMBINED ====================

#[test]
fn union_with_order_by() {
    let m = model();
    let mut a = Command::new(dbms::postgres());
    a.select([&m.name]);
    let mut b = Command::new(dbms::postgres());
    b.select([&m.dept_name]).and_where(m.dept_pk.greater(1));
    let stmt = CombinedCommand::union(a, b)
        .order_by(m.name.asc())
        .build()
        .unwrap();
    assert_eq!(
        stmt.sql,
        "(SELECT NAME FROM EMPLOYEES) UNION (SELECT NAME FROM DEPARTMENTS WHERE ID > $1) ORDER BY NAME"
    );
    assert_eq!(stmt.params, vec![Value::Int(1)]);
}

#[test]
fn sqlite_members_are_not_parenthesized() {
    let m = model();
    let mut a = Command::new(dbms::sqlite());
    a.select([&m.name]);
    let mut b = Command::new(dbms::sqlite());
    b.select([&m.dept_name]);
    let stmt = CombinedCommand::except(a, b).build().unwrap();
    assert_eq!(stmt.sql, "SELECT NAME FROM EMPLOYEES EXCEPT SELECT NAME FROM DEPARTMENTS");
}

#[test]
fn combined_column_counts_must_match() {
    let m = model();
    let mut a = Command::new(dbms::postgres());
    a.select([&m.name, &m.id]);
    let mut b = Command::new(dbms::postgres());
    b.select([&m.dept_name]);
    assert!(invalid(CombinedCommand::union_all(a, b).build()));
}
