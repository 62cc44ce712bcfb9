//! Comparison of a declared model with a remote model.

use crate::handler::{ModelErrorHandler, ObjectKind};
use empiredb::{ColumnRef, DataType, Database, Relation, Table, View};
use std::ops::ControlFlow;

/// Walks the declared model and reports what the remote model lacks or
/// defines differently. Objects that exist only remotely are ignored.
#[derive(Debug, Clone)]
pub struct ModelChecker {
    check_relations: bool,
}

impl Default for ModelChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelChecker {
    pub fn new() -> Self {
        Self {
            check_relations: true,
        }
    }

    /// Skip foreign key comparison.
    pub fn without_relations(mut self) -> Self {
        self.check_relations = false;
        self
    }

    /// Compare `model` with `remote`. Returns `Break` when the handler stopped the pass.
    pub fn check<H>(&self, model: &Database, remote: &Database, handler: &mut H) -> ControlFlow<()>
    where
        H: ModelErrorHandler + ?Sized,
    {
        tracing::debug!(
            target: "empiredb.check",
            model = model.name(),
            remote = remote.name(),
            tables = model.tables().len(),
            views = model.views().len(),
            "checking model",
        );
        let result = self.check_all(model, remote, handler);
        if result.is_break() {
            tracing::debug!(target: "empiredb.check", "check stopped by handler");
        }
        result
    }

    fn check_all<H>(&self, model: &Database, remote: &Database, handler: &mut H) -> ControlFlow<()>
    where
        H: ModelErrorHandler + ?Sized,
    {
        for table in model.tables() {
            match remote.table(table.name()) {
                Some(remote_table) => self.check_table(table, remote_table, handler)?,
                None => handler.object_not_found(ObjectKind::Table, table.name())?,
            }
        }
        for view in model.views() {
            match remote.view(view.name()) {
                Some(remote_view) => self.check_view(view, remote_view, handler)?,
                None => handler.object_not_found(ObjectKind::View, view.name())?,
            }
        }
        if self.check_relations {
            for relation in model.relations() {
                self.check_relation(relation, remote, handler)?;
            }
        }
        ControlFlow::Continue(())
    }

    pub fn check_table<H>(&self, table: &Table, remote: &Table, handler: &mut H) -> ControlFlow<()>
    where
        H: ModelErrorHandler + ?Sized,
    {
        for column in table.columns() {
            match remote.column(column.column_name()) {
                Some(remote_column) => check_column(&column, &remote_column, handler)?,
                None => handler.object_not_found(ObjectKind::Column, &qualified(&column))?,
            }
        }
        if !same_names(table.primary_key(), remote.primary_key()) {
            handler.primary_key_mismatch(table, remote.primary_key())?;
        }
        ControlFlow::Continue(())
    }

    /// View columns are compared by existence and type only.
    pub fn check_view<H>(&self, view: &View, remote: &View, handler: &mut H) -> ControlFlow<()>
    where
        H: ModelErrorHandler + ?Sized,
    {
        for column in view.columns() {
            match remote.column(column.column_name()) {
                Some(remote_column) => {
                    if !compatible(column.data_type(), remote_column.data_type()) {
                        handler.column_type_mismatch(&column, remote_column.data_type())?;
                    }
                }
                None => handler.object_not_found(ObjectKind::Column, &qualified(&column))?,
            }
        }
        ControlFlow::Continue(())
    }

    /// Relations are matched by name, then by their column pairs.
    pub fn check_relation<H>(
        &self,
        relation: &Relation,
        remote: &Database,
        handler: &mut H,
    ) -> ControlFlow<()>
    where
        H: ModelErrorHandler + ?Sized,
    {
        let by_name = remote.relation(&relation.name);
        let found = by_name.or_else(|| {
            remote
                .relations()
                .iter()
                .find(|r| same_references(relation, r))
        });
        match found {
            None => handler.object_not_found(ObjectKind::Relation, &relation.name),
            Some(r) if same_references(relation, r) && r.on_delete_cascade == relation.on_delete_cascade => {
                ControlFlow::Continue(())
            }
            Some(r) => handler.relation_mismatch(relation, r),
        }
    }
}

fn check_column<H>(column: &ColumnRef, remote: &ColumnRef, handler: &mut H) -> ControlFlow<()>
where
    H: ModelErrorHandler + ?Sized,
{
    let col = column.column();
    let other = remote.column();
    if !compatible(col.data_type, other.data_type) {
        // size and scale are meaningless across types
        handler.column_type_mismatch(column, other.data_type)?;
    } else {
        match col.data_type {
            DataType::Varchar | DataType::Char if col.size != other.size => {
                handler.column_size_mismatch(column, other.size)?;
            }
            DataType::Decimal if col.size > 0 => {
                if col.size != other.size {
                    handler.column_size_mismatch(column, other.size)?;
                }
                if col.scale != other.scale {
                    handler.column_scale_mismatch(column, other.scale)?;
                }
            }
            _ => {}
        }
    }
    let required = col.required || col.is_auto_increment();
    if required != other.required {
        handler.column_nullability_mismatch(column, required)?;
    }
    ControlFlow::Continue(())
}

/// Types that the remote metadata cannot tell apart.
fn compatible(model: DataType, remote: DataType) -> bool {
    fn base(t: DataType) -> DataType {
        match t {
            DataType::AutoInc => DataType::Integer,
            DataType::Timestamp => DataType::DateTime,
            other => other,
        }
    }
    base(model) == base(remote)
}

fn same_names(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

fn same_references(a: &Relation, b: &Relation) -> bool {
    let key = |r: &Relation| -> Vec<String> {
        r.references
            .iter()
            .map(|(s, t)| {
                format!("{}.{}>{}.{}", s.table_name(), s.column_name(), t.table_name(), t.column_name())
                    .to_ascii_uppercase()
            })
            .collect()
    };
    key(a) == key(b)
}

fn qualified(column: &ColumnRef) -> String {
    format!("{}.{}", column.table_name(), column.column_name())
}
