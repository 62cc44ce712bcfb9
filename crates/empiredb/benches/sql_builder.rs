use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use empiredb::prelude::*;
use empiredb::{dbms, ParamMode};

/// A table with `n` integer columns `C0..Cn`.
fn wide_table(n: usize) -> (Table, Vec<ColumnRef>) {
    let mut t = Table::new("T");
    let cols = (0..n)
        .map(|i| t.add_column(TableColumn::new(format!("C{i}"), DataType::Integer, 4)))
        .collect();
    (t, cols)
}

/// SELECT C0, C1, ... FROM T WHERE C0 = $1 AND C1 = $2 ...
fn build_command(cols: &[ColumnRef], mode: ParamMode) -> Command {
    let mut cmd = Command::new(dbms::postgres());
    cmd.param_mode(mode).select(cols);
    for (i, col) in cols.iter().enumerate() {
        cmd.and_where(col.eq(i as i64));
    }
    cmd
}

fn bench_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_select");

    for n in [1, 5, 10, 50, 100] {
        let (_, cols) = wide_table(n);
        let cmd = build_command(&cols, ParamMode::Prepared);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cmd, |b, cmd| {
            b.iter(|| black_box(cmd.build_select()));
        });
    }

    group.finish();
}

fn bench_build_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_literal");

    for n in [1, 10, 100] {
        let (_, cols) = wide_table(n);
        let cmd = build_command(&cols, ParamMode::Literal);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cmd, |b, cmd| {
            b.iter(|| black_box(cmd.build_select()));
        });
    }

    group.finish();
}

fn bench_join_and_functions(c: &mut Criterion) {
    let mut departments = Table::new("DEPARTMENTS");
    let dep_id = departments.add_column(TableColumn::new("ID", DataType::Integer, 4));
    let dep_name = departments.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
    let mut employees = Table::new("EMPLOYEES");
    let emp_dep = employees.add_column(TableColumn::new("DEP_ID", DataType::Integer, 4));
    let emp_name = employees.add_column(TableColumn::new("NAME", DataType::Varchar, 40));

    let mut cmd = Command::new(dbms::postgres());
    cmd.select_expr(emp_name.upper().alias("UNAME"))
        .select_expr(dep_name.substring(3))
        .join(&emp_dep, &dep_id, JoinKind::Inner)
        .and_where(emp_name.like("A%"))
        .order_by(OrderBy::asc(dep_name.to_expr()))
        .limit_rows(20);

    c.bench_function("sql_builder/join_and_functions", |b| {
        b.iter(|| black_box(cmd.build_select()));
    });
}

criterion_group!(
    benches,
    bench_build_select,
    bench_build_literal,
    bench_join_and_functions
);
criterion_main!(benches);
