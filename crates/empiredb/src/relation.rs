//! Foreign-key relations between tables.

use crate::error::{DbError, DbResult};
use crate::table::ColumnRef;

/// A foreign key: source columns referencing target columns.
#[derive(Debug, Clone)]
pub struct Relation {
    pub name: String,
    /// `(source, target)` column pairs.
    pub references: Vec<(ColumnRef, ColumnRef)>,
    pub on_delete_cascade: bool,
}

impl Relation {
    pub fn new<I>(name: impl Into<String>, references: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (ColumnRef, ColumnRef)>,
    {
        let name = name.into();
        let references: Vec<_> = references.into_iter().collect();
        let Some((first_source, first_target)) = references.first() else {
            return Err(DbError::invalid_argument(format!("relation {name} has no columns")));
        };
        let mixed = references.iter().any(|(s, t)| {
            s.rowset().key() != first_source.rowset().key()
                || t.rowset().key() != first_target.rowset().key()
        });
        if mixed {
            return Err(DbError::invalid_argument(format!(
                "relation {name} spans more than one source or target table"
            )));
        }
        Ok(Self {
            name,
            references,
            on_delete_cascade: false,
        })
    }

    pub fn on_delete_cascade(mut self) -> Self {
        self.on_delete_cascade = true;
        self
    }

    pub fn source_table(&self) -> &str {
        self.references.first().map_or("", |(s, _)| s.table_name())
    }

    pub fn target_table(&self) -> &str {
        self.references.first().map_or("", |(_, t)| t.table_name())
    }

    pub fn source_columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.references.iter().map(|(s, _)| s)
    }

    pub fn target_columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.references.iter().map(|(_, t)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Table, TableColumn};
    use crate::types::DataType;

    #[test]
    fn relation_links_two_tables() {
        let mut emp = Table::new("EMPLOYEES");
        let dept_id = emp.add_column(TableColumn::new("DEPT_ID", DataType::Integer, 4));
        let name = emp.add_column(TableColumn::new("NAME", DataType::Varchar, 40));
        let mut dept = Table::new("DEPARTMENTS");
        let id = dept.add_column(TableColumn::new("ID", DataType::Integer, 4));

        let rel = Relation::new("FK_EMP_DEPT", [(dept_id.clone(), id.clone())])
            .unwrap()
            .on_delete_cascade();
        assert_eq!(rel.source_table(), "EMPLOYEES");
        assert_eq!(rel.target_table(), "DEPARTMENTS");
        assert!(rel.on_delete_cascade);

        assert!(Relation::new("EMPTY", Vec::<(ColumnRef, ColumnRef)>::new()).is_err());
        assert!(Relation::new("MIXED", [(dept_id, id.clone()), (id.clone(), name)]).is_err());
    }
}
