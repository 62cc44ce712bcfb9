use empiredb::{
    Database, DatabaseConfig, DataType, Index, IndexKind, Relation, Table, TableColumn, Value,
    View, dbms_by_name,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!("failed to read config file {}: {e}", config_path.display())
        })?;
        let file = ConfigFile::parse(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display()))?;
        Ok(Self { config_path, file })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// Contents of `empiredb.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,

    #[serde(default)]
    pub tables: Vec<TableConfig>,

    #[serde(default)]
    pub relations: Vec<RelationConfig>,

    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_name")]
    pub name: String,
    pub url: Option<String>,
    #[serde(default = "default_dialect")]
    pub dialect: String,
    pub schema: Option<String>,
    /// Emulate sequences with the sequence table even where native ones exist.
    #[serde(default)]
    pub emulate_sequences: bool,
}

fn default_name() -> String {
    "model".to_string()
}

fn default_dialect() -> String {
    "postgres".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<IndexConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub scale: u32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    pub default: Option<toml::Value>,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationConfig {
    pub name: String,
    pub source: String,
    pub target: String,
    /// `[source_column, target_column]` pairs.
    pub columns: Vec<(String, String)>,
    #[serde(default)]
    pub on_delete_cascade: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    pub sql: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url)?;
        }
        if let Some(schema) = self.database.schema.as_mut() {
            *schema = expand_env_vars(schema)?;
        }
        self.database.dialect = expand_env_vars(&self.database.dialect)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        dbms_by_name(&self.database.dialect)?;

        let mut seen = std::collections::HashSet::new();
        let names = self
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.views.iter().map(|v| v.name.as_str()));
        for name in names {
            if name.trim().is_empty() {
                anyhow::bail!("table and view names must not be empty");
            }
            if !seen.insert(name.to_ascii_uppercase()) {
                anyhow::bail!("duplicate table or view: {name}");
            }
        }

        for t in &self.tables {
            if t.columns.is_empty() {
                anyhow::bail!("table {} has no columns", t.name);
            }
        }
        for r in &self.relations {
            if r.columns.is_empty() {
                anyhow::bail!("relation {} has no columns", r.name);
            }
        }

        Ok(())
    }

    /// Build the declared model, optionally for another dialect than configured.
    pub fn build_database(&self, dialect: Option<&str>) -> anyhow::Result<Database> {
        let dbms = dbms_by_name(dialect.unwrap_or(&self.database.dialect))?;

        let mut config = DatabaseConfig::new();
        if let Some(schema) = &self.database.schema {
            config = config.schema(schema.clone());
        }
        if self.database.emulate_sequences {
            config = config.emulate_sequences();
        }
        let mut db = Database::new(self.database.name.clone(), dbms).with_config(config);

        for t in &self.tables {
            db.add_table(t.build()?)?;
        }

        for r in &self.relations {
            let source = db
                .table(&r.source)
                .ok_or_else(|| anyhow::anyhow!("relation {}: unknown table {}", r.name, r.source))?;
            let target = db
                .table(&r.target)
                .ok_or_else(|| anyhow::anyhow!("relation {}: unknown table {}", r.name, r.target))?;
            let mut pairs = Vec::with_capacity(r.columns.len());
            for (s, t) in &r.columns {
                pairs.push((source.col(s)?, target.col(t)?));
            }
            let mut relation = Relation::new(r.name.clone(), pairs)?;
            if r.on_delete_cascade {
                relation = relation.on_delete_cascade();
            }
            db.add_relation(relation)?;
        }

        for v in &self.views {
            let mut view = View::from_sql(v.name.clone(), v.sql.clone());
            for c in &v.columns {
                view.add_column(c.build()?);
            }
            db.add_view(view)?;
        }

        Ok(db)
    }
}

impl TableConfig {
    fn build(&self) -> anyhow::Result<Table> {
        let mut table = Table::new(self.name.clone());
        for c in &self.columns {
            table.add_column(c.build()?);
        }
        if !self.primary_key.is_empty() {
            let key: Vec<&str> = self.primary_key.iter().map(String::as_str).collect();
            table.set_primary_key(&key)?;
        }
        for i in &self.indexes {
            let kind = if i.unique {
                IndexKind::Unique
            } else {
                IndexKind::Standard
            };
            table.add_index(Index::new(i.name.clone(), kind, i.columns.iter().cloned()))?;
        }
        Ok(table)
    }
}

impl ColumnConfig {
    fn build(&self) -> anyhow::Result<TableColumn> {
        let data_type: DataType = self
            .data_type
            .parse()
            .map_err(|e| anyhow::anyhow!("column {}: {e}", self.name))?;
        let mut column = TableColumn::new(self.name.clone(), data_type, self.size).scale(self.scale);
        if self.required {
            column = column.required();
        }
        if self.read_only {
            column = column.read_only();
        }
        if let Some(sequence) = &self.sequence {
            if data_type != DataType::AutoInc {
                anyhow::bail!("column {}: only autoinc columns take a sequence", self.name);
            }
            column = column.sequence(sequence.clone());
        }
        if let Some(default) = &self.default {
            let value = toml_value(default)
                .ok_or_else(|| anyhow::anyhow!("column {}: unsupported default", self.name))?;
            column = column.default_value(value.coerce(data_type)?);
        }
        Ok(column)
    }
}

fn toml_value(v: &toml::Value) -> Option<Value> {
    match v {
        toml::Value::String(s) => Some(Value::Text(s.clone())),
        toml::Value::Integer(i) => Some(Value::Int(*i)),
        toml::Value::Float(f) => Some(Value::Float(*f)),
        toml::Value::Boolean(b) => Some(Value::Bool(*b)),
        toml::Value::Datetime(dt) => Some(Value::Text(dt.to_string())),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
