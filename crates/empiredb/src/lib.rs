//! # empiredb
//!
//! A schema-model-first SQL command builder. Tables, views and relations are
//! declared once as metadata; commands are assembled from typed column
//! expressions and rendered to SQL for a chosen database dialect.
//!
//! ## Features
//!
//! - **Dialect handlers**: per-vendor phrase templates, identifier quoting,
//!   literal formats, DDL types and pagination (generic, PostgreSQL, MySQL,
//!   Oracle, SQL Server, H2, SQLite)
//! - **Typed expressions**: functions, calculations, CASE/DECODE, conversions,
//!   aggregates and subqueries built from column handles
//! - **Prepared or literal**: values become positional parameters or inline
//!   literals per command
//! - **Row windows**: limit/skip rendered natively where possible, applied
//!   while iterating otherwise
//! - **Sequences**: native sequence objects or a table-backed counter with
//!   bounded compare-and-swap retries
//! - **DDL**: ordered create/drop/alter scripts for the whole model
//!
//! ## Example
//!
//! ```rust
//! use empiredb::prelude::*;
//!
//! let mut db = Database::new("hr", empiredb::dbms::postgres());
//! let mut employees = Table::new("EMPLOYEES");
//! let id = employees.add_column(TableColumn::new("ID", DataType::AutoInc, 4).required());
//! let salary = employees.add_column(TableColumn::new("SALARY", DataType::Decimal, 10).scale(2));
//! db.add_table(employees).unwrap();
//!
//! let mut cmd = db.command();
//! cmd.set(&salary, salary.multiply_with(1.1)).and_where(id.eq(7));
//! let stmt = cmd.build_update().unwrap();
//! assert_eq!(stmt.sql, "UPDATE EMPLOYEES SET SALARY = SALARY * $1 WHERE ID = $2");
//! ```

pub mod builder;
pub mod client;
pub mod command;
pub mod config;
pub mod database;
pub mod dbms;
pub mod ddl;
pub mod error;
pub mod executor;
pub mod expr;
pub mod ident;
pub mod phrase;
pub mod relation;
pub mod row;
pub mod sequence;
pub mod table;
pub mod types;
pub mod view;

pub use builder::{SqlBuilder, Statement};
pub use client::DbConnection;
pub use command::{CombineOp, CombinedCommand, Command, JoinKind, OrderBy};
pub use config::{DatabaseConfig, ParamMode, SequenceConfig};
pub use database::Database;
pub use dbms::{DbmsFeature, DbmsHandler, Pagination, dbms_by_name};
pub use ddl::{DdlGenerator, SqlScript};
pub use error::{DbError, DbResult};
pub use executor::QueryType;
pub use expr::{CmdParam, ColumnExpr, CompareExpr, CompareOp, IntoExpr, SqlContext, SqlExpr};
pub use phrase::Phrase;
pub use relation::Relation;
pub use row::{FromValue, Row};
pub use table::{ColumnRef, Index, IndexKind, Table, TableColumn};
pub use types::{DataType, Value};
pub use view::View;

/// Commonly used types and traits.
pub mod prelude {
    pub use crate::command::{Command, JoinKind, OrderBy};
    pub use crate::database::Database;
    pub use crate::error::{DbError, DbResult};
    pub use crate::expr::{IntoExpr, SqlExpr};
    pub use crate::table::{ColumnRef, Table, TableColumn};
    pub use crate::types::{DataType, Value};
}
