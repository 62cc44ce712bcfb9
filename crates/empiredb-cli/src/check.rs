use crate::cli::CheckArgs;
use crate::config::ProjectConfig;
use crate::output::{issues_table, print_header, print_success, print_warning};
use anyhow::Context;
use empiredb::Database;
use empiredb_check::{FailFast, ModelChecker, ModelErrorCollector, ModelIssue, RemoteModelParser};

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config.clone())?;
    let model = project.file.build_database(None)?;

    let Some(url) = args.database.clone().or_else(|| project.file.database.url.clone()) else {
        anyhow::bail!(
            "no database url: set database.url in {} or pass --database",
            project.path().display()
        );
    };
    let schema = args
        .schema
        .clone()
        .or_else(|| model.schema().map(str::to_string))
        .unwrap_or_else(|| "public".to_string());

    let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
        .await
        .context("failed to connect to database")?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "database connection error");
        }
    });

    let remote = RemoteModelParser::new(schema.clone())
        .parse(&client)
        .await
        .with_context(|| format!("failed to read schema {schema}"))?;
    tracing::info!(
        schema = %schema,
        tables = remote.tables().len(),
        views = remote.views().len(),
        relations = remote.relations().len(),
        "parsed remote model"
    );

    let issues = compare(&model, &remote, args.fail_fast);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else {
        print_header(&format!("{} vs schema {schema}", project.path().display()));
        if issues.is_empty() {
            print_success("model matches the database");
        } else {
            println!("{}", issues_table(&issues));
            print_warning(&format!("{} difference(s) found", issues.len()));
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("model check failed");
    }
    Ok(())
}

/// All differences, or only the first one when `fail_fast` is set.
pub fn compare(model: &Database, remote: &Database, fail_fast: bool) -> Vec<ModelIssue> {
    let checker = ModelChecker::new();
    if fail_fast {
        let mut handler = FailFast::new();
        let _ = checker.check(model, remote, &mut handler);
        handler.into_first().into_iter().collect()
    } else {
        let mut handler = ModelErrorCollector::new();
        let _ = checker.check(model, remote, &mut handler);
        handler.into_issues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    fn model(name_size: u32, with_view: bool) -> Database {
        let mut raw = format!(
            r#"
[database]
[[tables]]
name = "EMPLOYEES"
primary_key = ["ID"]
columns = [
  {{ name = "ID", type = "integer", size = 4, required = true }},
  {{ name = "NAME", type = "varchar", size = {name_size}, required = true }},
]
"#
        );
        if with_view {
            raw.push_str("[[views]]\nname = \"EMPLOYEE_NAMES\"\nsql = \"SELECT NAME FROM EMPLOYEES\"\n");
        }
        ConfigFile::parse(&raw).unwrap().build_database(None).unwrap()
    }

    #[test]
    fn matching_models_have_no_issues() {
        assert!(compare(&model(40, false), &model(40, false), false).is_empty());
    }

    #[test]
    fn collects_every_difference() {
        let issues = compare(&model(40, true), &model(20, false), false);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind(), "column_size_mismatch");
        assert_eq!(issues[1].kind(), "object_not_found");
    }

    #[test]
    fn fail_fast_keeps_first() {
        let issues = compare(&model(40, true), &model(20, false), true);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].object(), "EMPLOYEES.NAME");
    }
}
