use crate::cli::DdlArgs;
use crate::config::ProjectConfig;
use empiredb::{Database, DdlGenerator, SqlScript};

pub fn run(args: DdlArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config.clone())?;
    let db = project.file.build_database(args.dialect.as_deref())?;
    let script = render(&db, args.drop)?;

    tracing::debug!(
        config = %project.path().display(),
        dialect = db.dbms().name(),
        statements = script.len(),
        drop = args.drop,
        "rendered ddl script"
    );
    print!("{script}");
    Ok(())
}

/// CREATE or DROP script for the whole model, including the sequence table
/// when auto-increment values are emulated.
pub fn render(db: &Database, drop: bool) -> anyhow::Result<SqlScript> {
    let ddl = DdlGenerator::new(db);
    let mut script = if drop {
        ddl.drop_database()
    } else {
        ddl.create_database()?
    };
    if ddl.needs_sequence_table() {
        let mut seq = SqlScript::new();
        if drop {
            ddl.drop_sequence_table(&mut seq)?;
            script.append(seq);
        } else {
            ddl.create_sequence_table(&mut seq)?;
            script.prepend(seq);
        }
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    const MODEL: &str = r#"
[database]
dialect = "postgres"

[[tables]]
name = "DEPARTMENTS"
primary_key = ["ID"]
columns = [
  { name = "ID", type = "autoinc", size = 4, sequence = "DEP_SEQ" },
  { name = "NAME", type = "varchar", size = 40, required = true },
]
"#;

    #[test]
    fn postgres_uses_native_sequence() {
        let db = ConfigFile::parse(MODEL).unwrap().build_database(None).unwrap();
        let script = render(&db, false).unwrap();
        let sql: Vec<&str> = script.sql().collect();
        assert_eq!(sql[0], "CREATE SEQUENCE DEP_SEQ INCREMENT BY 1 START WITH 1");
        assert!(sql[1].starts_with("CREATE TABLE DEPARTMENTS ("));
        assert_eq!(sql.len(), 2);
    }

    #[test]
    fn mysql_emulates_with_sequence_table() {
        let db = ConfigFile::parse(MODEL)
            .unwrap()
            .build_database(Some("mysql"))
            .unwrap();
        let create = render(&db, false).unwrap();
        let sql: Vec<&str> = create.sql().collect();
        assert!(sql[0].starts_with("CREATE TABLE EMPIREDB_SEQUENCES ("));
        assert!(sql[1].starts_with("CREATE TABLE DEPARTMENTS ("));

        let drop = render(&db, true).unwrap();
        let sql: Vec<&str> = drop.sql().collect();
        assert_eq!(sql, ["DROP TABLE DEPARTMENTS", "DROP TABLE EMPIREDB_SEQUENCES"]);
    }
}
