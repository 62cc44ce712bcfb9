//! DDL generation and ordered SQL scripts.
//!
//! [`DdlGenerator`] turns a [`Database`] model into the statements that
//! create or drop it; [`SqlScript`] runs such a list on a connection.

use crate::builder::Statement;
use crate::client::DbConnection;
use crate::database::Database;
use crate::dbms::{ColumnDef, DbmsFeature, DbmsHandler};
use crate::error::DbResult;
use crate::ident::QuoteCache;
use crate::relation::Relation;
use crate::sequence::SequenceTable;
use crate::table::{ColumnRef, Index, IndexKind, Table};
use crate::view::View;
use std::fmt;

// ==================== SqlScript ====================

/// An ordered list of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlScript {
    statements: Vec<Statement>,
}

impl SqlScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement without parameters.
    pub fn add_stmt(&mut self, sql: impl Into<String>) {
        self.statements.push(Statement::new(sql));
    }

    pub fn add_statement(&mut self, stmt: Statement) {
        self.statements.push(stmt);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn sql(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|s| s.sql.as_str())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Insert statements at the front, keeping their order.
    pub fn prepend(&mut self, other: SqlScript) {
        let mut statements = other.statements;
        statements.append(&mut self.statements);
        self.statements = statements;
    }

    pub fn append(&mut self, other: SqlScript) {
        self.statements.extend(other.statements);
    }

    /// Run every statement in order, stopping at the first failure.
    pub async fn execute<C>(&self, db: &Database, conn: &C) -> DbResult<()>
    where
        C: DbConnection + ?Sized,
    {
        for stmt in &self.statements {
            db.execute_update(conn, stmt).await?;
        }
        Ok(())
    }

    /// Like [`SqlScript::execute`], but consecutive statements with identical
    /// SQL text go to the connection as one batch when the dialect supports it.
    pub async fn execute_batch<C>(&self, db: &Database, conn: &C) -> DbResult<()>
    where
        C: DbConnection + ?Sized,
    {
        if !db.dbms().is_supported(DbmsFeature::Batch) {
            return self.execute(db, conn).await;
        }
        for group in self.batches() {
            match group {
                [single] => {
                    db.execute_update(conn, single).await?;
                }
                _ => {
                    let params: Vec<_> = group.iter().map(|s| s.params.clone()).collect();
                    db.execute_batch(conn, &group[0].sql, &params).await?;
                }
            }
        }
        Ok(())
    }

    /// Runs of consecutive statements sharing the same SQL text.
    pub fn batches(&self) -> Vec<&[Statement]> {
        let mut out = Vec::new();
        let mut start = 0;
        for i in 1..=self.statements.len() {
            if i == self.statements.len() || self.statements[i].sql != self.statements[start].sql {
                out.push(&self.statements[start..i]);
                start = i;
            }
        }
        out
    }
}

impl fmt::Display for SqlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{};", stmt.sql)?;
        }
        Ok(())
    }
}

// ==================== DdlGenerator ====================

/// Renders CREATE, DROP and ALTER statements for the objects of a database.
#[derive(Debug)]
pub struct DdlGenerator<'a> {
    db: &'a Database,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn dbms(&self) -> &dyn DbmsHandler {
        self.db.dbms().as_ref()
    }

    fn name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        QuoteCache::new().append_name(self.dbms(), &mut out, name);
        out
    }

    /// Schema-qualified object name.
    fn qualified(&self, name: &str) -> String {
        match self.db.schema() {
            Some(schema) => format!("{}.{}", self.name(schema), self.name(name)),
            None => self.name(name),
        }
    }

    fn name_list<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> String {
        names
            .into_iter()
            .map(|n| self.name(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Definition of one column as used by CREATE TABLE and ALTER TABLE.
    pub fn column_def(&self, column: &ColumnRef) -> DbResult<ColumnDef> {
        let col = column.column();
        let default = match &col.default_value {
            Some(value) if self.dbms().is_supported(DbmsFeature::DdlColumnDefault) => {
                Some(self.dbms().format_value(value, col.data_type)?)
            }
            _ => None,
        };
        Ok(ColumnDef {
            name: self.name(&col.name),
            ddl_type: self.dbms().ddl_type(col)?,
            default,
            required: col.required || col.is_auto_increment(),
        })
    }

    /// Statements creating every object of the database, dependencies first.
    pub fn create_database(&self) -> DbResult<SqlScript> {
        let mut script = SqlScript::new();
        if let Some(schema) = self.db.schema()
            && self.dbms().is_supported(DbmsFeature::CreateSchema)
        {
            script.add_stmt(format!("CREATE SCHEMA {}", self.name(schema)));
        }
        for table in self.db.tables() {
            self.create_sequences(table, &mut script);
        }
        for table in self.db.tables() {
            self.create_table(table, &mut script)?;
        }
        for relation in self.db.relations() {
            self.create_relation(relation, &mut script);
        }
        for view in self.db.views() {
            self.create_view(view, &mut script)?;
        }
        Ok(script)
    }

    /// Statements dropping every object of the database, dependents first.
    pub fn drop_database(&self) -> SqlScript {
        let mut script = SqlScript::new();
        for view in self.db.views().iter().rev() {
            self.drop_view(view, &mut script);
        }
        for relation in self.db.relations().iter().rev() {
            self.drop_relation(relation, &mut script);
        }
        for table in self.db.tables().iter().rev() {
            self.drop_table(table, &mut script);
        }
        for table in self.db.tables().iter().rev() {
            self.drop_sequences(table, &mut script);
        }
        script
    }

    /// Sequences named by auto-increment columns, when native sequences are in use.
    fn native_sequences<'t>(&self, table: &'t Table) -> impl Iterator<Item = String> + 't {
        let native = self.db.uses_native_sequences();
        table
            .columns()
            .filter(move |c| native && c.column().is_auto_increment())
            .filter_map(|c| c.column().sequence.clone())
    }

    pub fn create_sequences(&self, table: &Table, script: &mut SqlScript) {
        let start = self.db.config().sequences.min_value;
        for seq in self.native_sequences(table) {
            script.add_stmt(format!(
                "CREATE SEQUENCE {} INCREMENT BY 1 START WITH {start}",
                self.qualified(&seq)
            ));
        }
    }

    pub fn drop_sequences(&self, table: &Table, script: &mut SqlScript) {
        for seq in self.native_sequences(table) {
            script.add_stmt(format!("DROP SEQUENCE {}", self.qualified(&seq)));
        }
    }

    /// CREATE TABLE with its primary key constraint, followed by its indexes.
    pub fn create_table(&self, table: &Table, script: &mut SqlScript) -> DbResult<()> {
        let mut sql = format!("CREATE TABLE {} (", self.qualified(table.name()));
        for (i, column) in table.columns().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str("\n  ");
            sql.push_str(&self.column_def(&column)?.to_sql());
        }
        if !table.primary_key().is_empty() {
            sql.push_str(&format!(
                ",\n  CONSTRAINT {} PRIMARY KEY ({})",
                self.name(&format!("{}_PK", table.name())),
                self.name_list(table.primary_key().iter().map(String::as_str))
            ));
        }
        sql.push(')');
        script.add_stmt(sql);
        for index in table.indexes() {
            self.create_index(table, index, script);
        }
        Ok(())
    }

    /// CREATE [UNIQUE] INDEX. Primary-key indexes are covered by the table constraint.
    pub fn create_index(&self, table: &Table, index: &Index, script: &mut SqlScript) {
        let unique = match index.kind {
            IndexKind::PrimaryKey => return,
            IndexKind::Unique => "UNIQUE ",
            IndexKind::Standard => "",
        };
        script.add_stmt(format!(
            "CREATE {unique}INDEX {} ON {} ({})",
            self.qualified(&index.name),
            self.qualified(table.name()),
            self.name_list(index.columns.iter().map(String::as_str))
        ));
    }

    pub fn drop_table(&self, table: &Table, script: &mut SqlScript) {
        script.add_stmt(format!("DROP TABLE {}", self.qualified(table.name())));
    }

    /// Foreign key as ALTER TABLE ADD CONSTRAINT.
    pub fn create_relation(&self, relation: &Relation, script: &mut SqlScript) {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.qualified(relation.source_table()),
            self.name(&relation.name),
            self.name_list(relation.source_columns().map(ColumnRef::column_name)),
            self.qualified(relation.target_table()),
            self.name_list(relation.target_columns().map(ColumnRef::column_name)),
        );
        if relation.on_delete_cascade {
            sql.push_str(" ON DELETE CASCADE");
        }
        script.add_stmt(sql);
    }

    pub fn drop_relation(&self, relation: &Relation, script: &mut SqlScript) {
        script.add_stmt(
            self.dbms()
                .drop_foreign_key_sql(&self.qualified(relation.source_table()), &self.name(&relation.name)),
        );
    }

    pub fn create_view(&self, view: &View, script: &mut SqlScript) -> DbResult<()> {
        let mut sql = format!("CREATE VIEW {}", self.qualified(view.name()));
        let columns: Vec<String> = view.columns().map(|c| c.column_name().to_string()).collect();
        if !columns.is_empty() {
            sql.push_str(&format!(" ({})", self.name_list(columns.iter().map(String::as_str))));
        }
        sql.push_str(" AS ");
        sql.push_str(&view.definition_sql()?);
        script.add_stmt(sql);
        Ok(())
    }

    pub fn drop_view(&self, view: &View, script: &mut SqlScript) {
        script.add_stmt(format!("DROP VIEW {}", self.qualified(view.name())));
    }

    // ==================== ALTER ====================

    pub fn add_column(&self, column: &ColumnRef, script: &mut SqlScript) -> DbResult<()> {
        script.add_stmt(format!(
            "ALTER TABLE {} ADD {}",
            self.qualified(column.table_name()),
            self.column_def(column)?.to_sql()
        ));
        Ok(())
    }

    /// Change type, default and nullability of an existing column.
    pub fn modify_column(&self, column: &ColumnRef, script: &mut SqlScript) -> DbResult<()> {
        let def = self.column_def(column)?;
        script.add_stmt(
            self.dbms()
                .alter_column_sql(&self.qualified(column.table_name()), &def)?,
        );
        Ok(())
    }

    pub fn drop_column(&self, column: &ColumnRef, script: &mut SqlScript) {
        script.add_stmt(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.qualified(column.table_name()),
            self.name(column.column_name())
        ));
    }

    /// CREATE TABLE for the counter table backing emulated sequences.
    pub fn create_sequence_table(&self, script: &mut SqlScript) -> DbResult<()> {
        let seq = SequenceTable::new(&self.db.config().sequences)?;
        self.create_table(seq.table(), script)
    }

    pub fn drop_sequence_table(&self, script: &mut SqlScript) -> DbResult<()> {
        let seq = SequenceTable::new(&self.db.config().sequences)?;
        self.drop_table(seq.table(), script);
        Ok(())
    }

    /// Whether auto-increment columns draw from the emulated sequence table.
    pub fn needs_sequence_table(&self) -> bool {
        !self.db.uses_native_sequences()
            && self
                .db
                .tables()
                .iter()
                .any(|t| t.auto_increment_column().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::dbms;
    use crate::table::TableColumn;
    use crate::types::{DataType, Value};
    use std::sync::Arc;

    fn model(dbms: Arc<dyn DbmsHandler>, config: DatabaseConfig) -> Database {
        let mut db = Database::new("hr", dbms).with_config(config);
        let mut departments = Table::new("DEPARTMENTS");
        departments.add_column(TableColumn::new("ID", DataType::AutoInc, 4).sequence("DEP_SEQ"));
        departments.add_column(TableColumn::new("NAME", DataType::Varchar, 40).required());
        departments.set_primary_key(&["ID"]).unwrap();
        departments
            .add_index(Index::new("DEP_NAME_IDX", IndexKind::Unique, ["NAME"]))
            .unwrap();

        let mut employees = Table::new("EMPLOYEES");
        employees.add_column(TableColumn::new("ID", DataType::Integer, 4).required());
        employees.add_column(TableColumn::new("DEP_ID", DataType::Integer, 4).required());
        employees.add_column(
            TableColumn::new("ACTIVE", DataType::Bool, 0).default_value(Value::Bool(true)),
        );
        employees.set_primary_key(&["ID"]).unwrap();

        let fk = Relation::new(
            "EMP_DEP_FK",
            [(employees.col("DEP_ID").unwrap(), departments.col("ID").unwrap())],
        )
        .unwrap()
        .on_delete_cascade();
        db.add_table(departments).unwrap();
        db.add_table(employees).unwrap();
        db.add_relation(fk).unwrap();
        db
    }

    #[test]
    fn create_script_orders_dependencies() {
        let db = model(dbms::postgres(), DatabaseConfig::new());
        let script = DdlGenerator::new(&db).create_database().unwrap();
        let sql: Vec<&str> = script.sql().collect();
        assert_eq!(sql[0], "CREATE SEQUENCE DEP_SEQ INCREMENT BY 1 START WITH 1");
        assert_eq!(
            sql[1],
            "CREATE TABLE DEPARTMENTS (\n  ID INTEGER NOT NULL,\n  NAME VARCHAR(40) NOT NULL,\n  CONSTRAINT DEPARTMENTS_PK PRIMARY KEY (ID))"
        );
        assert_eq!(sql[2], "CREATE UNIQUE INDEX DEP_NAME_IDX ON DEPARTMENTS (NAME)");
        assert!(sql[3].starts_with("CREATE TABLE EMPLOYEES ("));
        assert!(sql[3].contains("ACTIVE BOOLEAN DEFAULT TRUE"), "{}", sql[3]);
        assert_eq!(
            sql[4],
            "ALTER TABLE EMPLOYEES ADD CONSTRAINT EMP_DEP_FK FOREIGN KEY (DEP_ID) REFERENCES DEPARTMENTS (ID) ON DELETE CASCADE"
        );
        assert_eq!(script.len(), 5);
    }

    #[test]
    fn drop_script_reverses_order() {
        let db = model(dbms::mysql(), DatabaseConfig::new());
        let script = DdlGenerator::new(&db).drop_database();
        let sql: Vec<&str> = script.sql().collect();
        assert_eq!(
            sql,
            [
                "ALTER TABLE EMPLOYEES DROP FOREIGN KEY EMP_DEP_FK",
                "DROP TABLE EMPLOYEES",
                "DROP TABLE DEPARTMENTS",
            ]
        );
    }

    #[test]
    fn schema_is_created_and_prefixed() {
        let db = model(dbms::postgres(), DatabaseConfig::new().schema("hr").emulate_sequences());
        let script = DdlGenerator::new(&db).create_database().unwrap();
        let sql: Vec<&str> = script.sql().collect();
        assert_eq!(sql[0], "CREATE SCHEMA hr");
        assert!(sql[1].starts_with("CREATE TABLE hr.DEPARTMENTS ("));
        assert!(!sql.iter().any(|s| s.starts_with("CREATE SEQUENCE")));
    }

    #[test]
    fn view_definition_is_literal() {
        let mut db = model(dbms::postgres(), DatabaseConfig::new());
        let employees = db.table("EMPLOYEES").unwrap().clone();
        let mut cmd = db.command();
        cmd.select([employees.col("ID").unwrap()])
            .and_where(crate::expr::SqlExpr::eq(&employees.col("ACTIVE").unwrap(), true));
        db.add_view(View::from_command("ACTIVE_EMPLOYEES", cmd).unwrap()).unwrap();
        let script = DdlGenerator::new(&db).create_database().unwrap();
        assert_eq!(
            script.sql().last().unwrap(),
            "CREATE VIEW ACTIVE_EMPLOYEES (ID) AS SELECT ID FROM EMPLOYEES WHERE ACTIVE = TRUE"
        );
    }

    #[test]
    fn alter_column_statements() {
        let db = model(dbms::postgres(), DatabaseConfig::new());
        let ddl = DdlGenerator::new(&db);
        let name = db.table("DEPARTMENTS").unwrap().col("NAME").unwrap();
        let mut script = SqlScript::new();
        ddl.add_column(&name, &mut script).unwrap();
        ddl.modify_column(&name, &mut script).unwrap();
        ddl.drop_column(&name, &mut script);
        let sql: Vec<&str> = script.sql().collect();
        assert_eq!(sql[0], "ALTER TABLE DEPARTMENTS ADD NAME VARCHAR(40) NOT NULL");
        assert!(sql[1].starts_with("ALTER TABLE DEPARTMENTS ALTER COLUMN NAME TYPE VARCHAR(40)"));
        assert_eq!(sql[2], "ALTER TABLE DEPARTMENTS DROP COLUMN NAME");
    }

    #[test]
    fn sequence_table_definition() {
        let db = Database::new("x", dbms::generic());
        let mut script = SqlScript::new();
        DdlGenerator::new(&db).create_sequence_table(&mut script).unwrap();
        assert_eq!(
            script.sql().next().unwrap(),
            "CREATE TABLE EMPIREDB_SEQUENCES (\n  SEQNAME VARCHAR(40) NOT NULL,\n  SEQVALUE BIGINT NOT NULL,\n  SEQTIME TIMESTAMP NOT NULL,\n  CONSTRAINT EMPIREDB_SEQUENCES_PK PRIMARY KEY (SEQNAME))"
        );
    }

    #[test]
    fn sequence_table_needed_without_native_sequences() {
        let pg = model(dbms::postgres(), DatabaseConfig::new());
        assert!(!DdlGenerator::new(&pg).needs_sequence_table());
        let mysql = model(dbms::mysql(), DatabaseConfig::new());
        let ddl = DdlGenerator::new(&mysql);
        assert!(ddl.needs_sequence_table());
        let mut script = SqlScript::new();
        ddl.drop_sequence_table(&mut script).unwrap();
        assert_eq!(script.sql().next().unwrap(), "DROP TABLE EMPIREDB_SEQUENCES");
    }

    #[test]
    fn batches_group_identical_sql() {
        let mut script = SqlScript::new();
        script.add_statement(Statement::with_params("INSERT INTO T (A) VALUES ($1)", vec![Value::Int(1)]));
        script.add_statement(Statement::with_params("INSERT INTO T (A) VALUES ($1)", vec![Value::Int(2)]));
        script.add_stmt("DELETE FROM U");
        script.add_statement(Statement::with_params("INSERT INTO T (A) VALUES ($1)", vec![Value::Int(3)]));
        let sizes: Vec<usize> = script.batches().iter().map(|b| b.len()).collect();
        assert_eq!(sizes, [2, 1, 1]);
        assert_eq!(script.to_string().lines().count(), 4);
    }
}
