//! Root registry of schema objects bound to one dialect.

use crate::command::Command;
use crate::config::DatabaseConfig;
use crate::dbms::DbmsHandler;
use crate::error::{DbError, DbResult};
use crate::relation::Relation;
use crate::table::Table;
use crate::view::View;
use std::sync::Arc;

/// A database model: tables, views and relations plus the dialect used to
/// render commands against it.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    dbms: Arc<dyn DbmsHandler>,
    config: DatabaseConfig,
    tables: Vec<Table>,
    views: Vec<View>,
    relations: Vec<Relation>,
}

impl Database {
    pub fn new(name: impl Into<String>, dbms: Arc<dyn DbmsHandler>) -> Self {
        Self {
            name: name.into(),
            dbms,
            config: DatabaseConfig::default(),
            tables: Vec::new(),
            views: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: DatabaseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dbms(&self) -> &Arc<dyn DbmsHandler> {
        &self.dbms
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&str> {
        self.config.schema.as_deref()
    }

    /// A new command using this database's dialect, schema and parameter mode.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(Arc::clone(&self.dbms));
        cmd.param_mode(self.config.param_mode)
            .schema(self.config.schema.clone());
        cmd
    }

    fn check_unique(&self, name: &str) -> DbResult<()> {
        let taken = self.tables.iter().any(|t| t.name().eq_ignore_ascii_case(name))
            || self.views.iter().any(|v| v.name().eq_ignore_ascii_case(name));
        if taken {
            return Err(DbError::invalid_argument(format!(
                "{name} is already defined in database {}",
                self.name
            )));
        }
        Ok(())
    }

    pub fn add_table(&mut self, table: Table) -> DbResult<()> {
        self.check_unique(table.name())?;
        self.tables.push(table);
        Ok(())
    }

    pub fn add_view(&mut self, view: View) -> DbResult<()> {
        self.check_unique(view.name())?;
        self.views.push(view);
        Ok(())
    }

    /// Register a relation; both ends must be tables of this database.
    pub fn add_relation(&mut self, relation: Relation) -> DbResult<()> {
        for table in [relation.source_table(), relation.target_table()] {
            if self.table(table).is_none() {
                return Err(DbError::ObjectNotFound(format!(
                    "table {table} of relation {}",
                    relation.name
                )));
            }
        }
        if self.relation(&relation.name).is_some() {
            return Err(DbError::invalid_argument(format!(
                "duplicate relation {}",
                relation.name
            )));
        }
        self.relations.push(relation);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name().eq_ignore_ascii_case(name))
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations whose source is `table`.
    pub fn relations_from<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Relation> {
        self.relations
            .iter()
            .filter(move |r| r.source_table().eq_ignore_ascii_case(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamMode;
    use crate::dbms;
    use crate::expr::SqlExpr;
    use crate::table::TableColumn;
    use crate::types::DataType;

    fn db() -> Database {
        let mut db = Database::new("HR", dbms::postgres())
            .with_config(DatabaseConfig::new().schema("hr").param_mode(ParamMode::Literal));
        let mut dept = Table::new("DEPARTMENTS");
        dept.add_column(TableColumn::new("ID", DataType::Integer, 4));
        let mut emp = Table::new("EMPLOYEES");
        emp.add_column(TableColumn::new("ID", DataType::Integer, 4));
        emp.add_column(TableColumn::new("DEPT_ID", DataType::Integer, 4));
        db.add_table(dept).unwrap();
        db.add_table(emp).unwrap();
        db
    }

    #[test]
    fn lookup_is_case_insensitive_and_names_are_unique() {
        let mut db = db();
        assert!(db.table("employees").is_some());
        assert!(db.add_table(Table::new("Employees")).is_err());
        assert!(db.view("EMPLOYEES").is_none());
    }

    #[test]
    fn relations_need_registered_tables() {
        let mut db = db();
        let fk = db.table("EMPLOYEES").unwrap().col("DEPT_ID").unwrap();
        let pk = db.table("DEPARTMENTS").unwrap().col("ID").unwrap();
        db.add_relation(Relation::new("FK_EMP_DEPT", [(fk.clone(), pk)]).unwrap())
            .unwrap();
        assert_eq!(db.relations_from("employees").count(), 1);

        let mut other = Table::new("OTHER");
        let x = other.add_column(TableColumn::new("X", DataType::Integer, 4));
        let rel = Relation::new("FK_OTHER", [(fk, x)]).unwrap();
        assert!(matches!(db.add_relation(rel), Err(DbError::ObjectNotFound(_))));
    }

    #[test]
    fn command_inherits_schema_and_mode() {
        let db = db();
        let id = db.table("EMPLOYEES").unwrap().col("ID").unwrap();
        let mut cmd = db.command();
        cmd.select([&id]).and_where(id.eq(3));
        assert_eq!(
            cmd.build_select().unwrap().sql,
            "SELECT ID FROM hr.EMPLOYEES WHERE ID = 3"
        );
    }
}
