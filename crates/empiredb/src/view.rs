//! Views: rowsets defined by a command or by SQL text.

use crate::command::Command;
use crate::config::ParamMode;
use crate::error::{DbError, DbResult};
use crate::expr::ColumnExpr;
use crate::table::{ColumnRef, RowSetKind, RowSetMeta, TableColumn};
use crate::types::DataType;
use std::sync::Arc;

/// How a view is defined.
#[derive(Debug, Clone)]
pub enum ViewDefinition {
    Command(Box<Command>),
    Sql(String),
}

#[derive(Debug, Clone)]
pub struct View {
    meta: Arc<RowSetMeta>,
    columns: Vec<Arc<TableColumn>>,
    definition: ViewDefinition,
}

impl View {
    /// A view over a select command. Columns are taken from the select list:
    /// the alias when present, else the column name.
    pub fn from_command(name: impl Into<String>, cmd: Command) -> DbResult<Self> {
        let name = name.into();
        let mut columns = Vec::with_capacity(cmd.select_list().len());
        for expr in cmd.select_list() {
            let column_name = match expr {
                ColumnExpr::Alias { alias, .. } => alias.clone(),
                other => other
                    .column_ref()
                    .map(|c| c.column_name().to_string())
                    .ok_or_else(|| {
                        DbError::invalid_argument(format!(
                            "view {name}: calculated select expressions need an alias"
                        ))
                    })?,
            };
            let data_type = match expr.data_type() {
                DataType::AutoInc => DataType::Integer,
                other => other,
            };
            let size = expr.column_ref().map_or(0, |c| c.column().size);
            columns.push(Arc::new(TableColumn::new(column_name, data_type, size)));
        }
        Ok(Self {
            meta: Self::meta(name),
            columns,
            definition: ViewDefinition::Command(Box::new(cmd)),
        })
    }

    /// A view defined by SQL text; columns are added with [`View::add_column`].
    pub fn from_sql(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            meta: Self::meta(name.into()),
            columns: Vec::new(),
            definition: ViewDefinition::Sql(sql.into()),
        }
    }

    fn meta(name: String) -> Arc<RowSetMeta> {
        Arc::new(RowSetMeta {
            name,
            alias: None,
            kind: RowSetKind::View,
        })
    }

    pub fn add_column(&mut self, column: TableColumn) -> ColumnRef {
        let column = Arc::new(column);
        self.columns.push(Arc::clone(&column));
        ColumnRef::new(Arc::clone(&self.meta), column)
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn rowset(&self) -> &Arc<RowSetMeta> {
        &self.meta
    }

    pub fn definition(&self) -> &ViewDefinition {
        &self.definition
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> + '_ {
        self.columns
            .iter()
            .map(|c| ColumnRef::new(Arc::clone(&self.meta), Arc::clone(c)))
    }

    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        self.columns()
            .find(|c| c.column_name().eq_ignore_ascii_case(name))
    }

    /// The SELECT text of the view. Command definitions are rendered with
    /// inline literals since a view cannot take parameters.
    pub fn definition_sql(&self) -> DbResult<String> {
        match &self.definition {
            ViewDefinition::Sql(sql) => Ok(sql.clone()),
            ViewDefinition::Command(cmd) => {
                let mut cmd = cmd.as_ref().clone();
                cmd.param_mode(ParamMode::Literal);
                let stmt = cmd.build_select()?;
                if stmt.needs_manual_window() {
                    return Err(DbError::not_supported(
                        format!("row window in view {}", self.name()),
                        cmd.dbms().name(),
                    ));
                }
                Ok(stmt.sql)
            }
        }
    }
}
