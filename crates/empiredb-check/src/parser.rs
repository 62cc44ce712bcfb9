//! Reads a live schema from `information_schema` into a [`Database`] model.

use crate::error::{CheckError, CheckResult};
use empiredb::config::DatabaseConfig;
use empiredb::dbms::{self, DbmsHandler};
use empiredb::{DataType, Database, DbConnection, Relation, Row, Table, TableColumn, Value, View};
use std::collections::BTreeMap;
use std::sync::Arc;

const TABLES_SQL: &str = "\
SELECT CAST(table_name AS VARCHAR(128)) AS table_name, CAST(table_type AS VARCHAR(32)) AS table_type
FROM information_schema.tables
WHERE table_schema = {schema}
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT CAST(table_name AS VARCHAR(128)) AS table_name,
       CAST(column_name AS VARCHAR(128)) AS column_name,
       CAST(data_type AS VARCHAR(128)) AS data_type,
       CAST(character_maximum_length AS INTEGER) AS char_length,
       CAST(numeric_precision AS INTEGER) AS numeric_precision,
       CAST(numeric_scale AS INTEGER) AS numeric_scale,
       CAST(is_nullable AS VARCHAR(3)) AS is_nullable,
       CAST(column_default AS VARCHAR(4000)) AS column_default
FROM information_schema.columns
WHERE table_schema = {schema}
ORDER BY table_name, ordinal_position";

const PRIMARY_KEYS_SQL: &str = "\
SELECT CAST(tc.table_name AS VARCHAR(128)) AS table_name,
       CAST(kcu.column_name AS VARCHAR(128)) AS column_name
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_schema = tc.constraint_schema
 AND kcu.constraint_name = tc.constraint_name
WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = {schema}
ORDER BY tc.table_name, kcu.ordinal_position";

/// Constraint names are only unique per table, so the referencing columns
/// are matched on the owning table as well.
const FOREIGN_KEYS_SQL: &str = "\
SELECT DISTINCT CAST(rc.constraint_name AS VARCHAR(128)) AS constraint_name,
       CAST(kcu.table_name AS VARCHAR(128)) AS table_name,
       CAST(kcu.column_name AS VARCHAR(128)) AS column_name,
       CAST(kcu.ordinal_position AS INTEGER) AS ordinal_position,
       CAST(pk.table_name AS VARCHAR(128)) AS target_table,
       CAST(pk.column_name AS VARCHAR(128)) AS target_column,
       CAST(rc.delete_rule AS VARCHAR(32)) AS delete_rule
FROM information_schema.referential_constraints rc
JOIN information_schema.table_constraints tc
  ON tc.constraint_schema = rc.constraint_schema
 AND tc.constraint_name = rc.constraint_name
 AND tc.constraint_type = 'FOREIGN KEY'
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_schema = tc.constraint_schema
 AND kcu.constraint_name = tc.constraint_name
 AND kcu.table_schema = tc.table_schema
 AND kcu.table_name = tc.table_name
JOIN information_schema.key_column_usage pk
  ON pk.constraint_schema = rc.unique_constraint_schema
 AND pk.constraint_name = rc.unique_constraint_name
 AND pk.ordinal_position = kcu.position_in_unique_constraint
WHERE rc.constraint_schema = {schema}
ORDER BY constraint_name, table_name, ordinal_position";

/// A column as described by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteColumn {
    pub name: String,
    pub data_type: String,
    pub char_length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
    pub default: Option<String>,
}

impl RemoteColumn {
    /// Model type, size and scale for the remote type name.
    ///
    /// Integer columns fed by `nextval(...)` become `AutoInc`; unknown type
    /// names map to `Unknown` so the checker reports them as mismatches.
    pub fn model_type(&self) -> (DataType, u32, u32) {
        let size = |v: Option<i64>| v.and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
        let name = self.data_type.to_ascii_lowercase();
        let serial = self
            .default
            .as_deref()
            .is_some_and(|d| d.trim_start().to_ascii_lowercase().starts_with("nextval("));
        let int = |bytes: u32| {
            if serial {
                (DataType::AutoInc, bytes, 0)
            } else {
                (DataType::Integer, bytes, 0)
            }
        };
        match name.as_str() {
            "character varying" | "varchar" | "nvarchar" | "varchar2" => {
                (DataType::Varchar, size(self.char_length), 0)
            }
            "character" | "char" | "bpchar" | "nchar" => (DataType::Char, size(self.char_length), 0),
            "text" | "clob" | "longtext" | "mediumtext" | "ntext" => (DataType::Clob, 0, 0),
            "bytea" | "blob" | "longblob" | "varbinary" | "binary" => (DataType::Blob, 0, 0),
            "smallint" | "tinyint" => int(2),
            "integer" | "int" | "mediumint" => int(4),
            "bigint" => int(8),
            "numeric" | "decimal" | "number" => (
                DataType::Decimal,
                size(self.precision),
                size(self.scale),
            ),
            "real" | "double precision" | "double" | "float" => (DataType::Float, 0, 0),
            "boolean" | "bool" | "bit" => (DataType::Bool, 0, 0),
            "date" => (DataType::Date, 0, 0),
            "uuid" | "uniqueidentifier" => (DataType::UniqueId, 0, 0),
            n if n.starts_with("timestamp") || n == "datetime" || n == "datetime2" => {
                (DataType::DateTime, 0, 0)
            }
            n if n.starts_with("time") => (DataType::Time, 0, 0),
            _ => (DataType::Unknown, 0, 0),
        }
    }

    pub fn table_column(&self) -> TableColumn {
        let (data_type, size, scale) = self.model_type();
        let mut column = TableColumn::new(self.name.clone(), data_type, size).scale(scale);
        column.required = !self.nullable;
        column
    }

    fn from_row(row: &Row) -> CheckResult<Self> {
        Ok(Self {
            name: row.get("column_name")?,
            data_type: row.get("data_type")?,
            char_length: row.get("char_length")?,
            precision: row.get("numeric_precision")?,
            scale: row.get("numeric_scale")?,
            nullable: row.get::<String>("is_nullable")?.eq_ignore_ascii_case("YES"),
            default: row.get("column_default")?,
        })
    }
}

struct ForeignKey {
    table: String,
    target: String,
    pairs: Vec<(String, String)>,
    cascade: bool,
}

/// Builds a [`Database`] from the metadata of one remote schema.
#[derive(Debug, Clone)]
pub struct RemoteModelParser {
    schema: String,
    dbms: Arc<dyn DbmsHandler>,
}

impl RemoteModelParser {
    /// Parser for a PostgreSQL schema.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            dbms: dbms::postgres(),
        }
    }

    /// Use another dialect for placeholders and for the resulting model.
    pub fn with_dbms(mut self, dbms: Arc<dyn DbmsHandler>) -> Self {
        self.dbms = dbms;
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn sql(&self, template: &str) -> String {
        template.replace("{schema}", &self.dbms.placeholder(1))
    }

    async fn fetch<C>(&self, conn: &C, template: &str) -> CheckResult<Vec<Row>>
    where
        C: DbConnection + ?Sized,
    {
        let sql = self.sql(template);
        tracing::debug!(target: "empiredb.check", schema = %self.schema, sql = %sql);
        Ok(conn.query(&sql, &[Value::Text(self.schema.clone())]).await?)
    }

    /// Read tables, views, columns, primary keys and foreign keys.
    pub async fn parse<C>(&self, conn: &C) -> CheckResult<Database>
    where
        C: DbConnection + ?Sized,
    {
        let mut tables: BTreeMap<String, Table> = BTreeMap::new();
        let mut views: BTreeMap<String, View> = BTreeMap::new();
        for row in self.fetch(conn, TABLES_SQL).await? {
            let name: String = row.get("table_name")?;
            let kind: String = row.get("table_type")?;
            if kind.eq_ignore_ascii_case("VIEW") {
                views.insert(name.clone(), View::from_sql(name, String::new()));
            } else {
                tables.insert(name.clone(), Table::new(name));
            }
        }
        if tables.is_empty() && views.is_empty() {
            return Err(CheckError::Validation(format!(
                "no tables found in schema {}",
                self.schema
            )));
        }

        for row in self.fetch(conn, COLUMNS_SQL).await? {
            let table_name: String = row.get("table_name")?;
            let column = RemoteColumn::from_row(&row)?.table_column();
            if let Some(table) = tables.get_mut(&table_name) {
                table.add_column(column);
            } else if let Some(view) = views.get_mut(&table_name) {
                view.add_column(column);
            }
        }

        let mut keys: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in self.fetch(conn, PRIMARY_KEYS_SQL).await? {
            keys.entry(row.get("table_name")?)
                .or_default()
                .push(row.get("column_name")?);
        }
        for (table_name, columns) in &keys {
            if let Some(table) = tables.get_mut(table_name) {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                table.set_primary_key(&columns)?;
            }
        }

        let mut foreign_keys: Vec<(String, ForeignKey)> = Vec::new();
        for row in self.fetch(conn, FOREIGN_KEYS_SQL).await? {
            let name: String = row.get("constraint_name")?;
            let table: String = row.get("table_name")?;
            let pair: (String, String) = (row.get("column_name")?, row.get("target_column")?);
            match foreign_keys.last_mut() {
                Some((last, fk)) if *last == name && fk.table == table => {
                    if !fk.pairs.contains(&pair) {
                        fk.pairs.push(pair);
                    }
                }
                _ => foreign_keys.push((
                    name,
                    ForeignKey {
                        table,
                        target: row.get("target_table")?,
                        pairs: vec![pair],
                        cascade: row.get::<String>("delete_rule")?.eq_ignore_ascii_case("CASCADE"),
                    },
                )),
            }
        }

        let config = DatabaseConfig::new().schema(self.schema.clone());
        let mut db = Database::new(self.schema.clone(), Arc::clone(&self.dbms)).with_config(config);
        for table in tables.into_values() {
            db.add_table(table)?;
        }
        for view in views.into_values() {
            db.add_view(view)?;
        }
        for (name, fk) in foreign_keys {
            let (Some(source), Some(target)) = (db.table(&fk.table), db.table(&fk.target)) else {
                tracing::debug!(target: "empiredb.check", relation = %name, "skipping relation to an unknown table");
                continue;
            };
            let mut references = Vec::with_capacity(fk.pairs.len());
            for (from, to) in &fk.pairs {
                references.push((source.col(from)?, target.col(to)?));
            }
            // the model needs unique relation names; qualify a reused one with its table
            let name = if db.relation(&name).is_some() {
                format!("{}.{name}", fk.table)
            } else {
                name
            };
            let mut relation = Relation::new(name, references)?;
            relation.on_delete_cascade = fk.cascade;
            db.add_relation(relation)?;
        }
        tracing::debug!(
            target: "empiredb.check",
            schema = %self.schema,
            tables = db.tables().len(),
            views = db.views().len(),
            relations = db.relations().len(),
            "remote model parsed",
        );
        Ok(db)
    }
}
