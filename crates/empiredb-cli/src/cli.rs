use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "empiredb.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Ddl,
    Check,
    Phrases,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Ddl(DdlArgs),
    Check(CheckArgs),
    Phrases(PhrasesArgs),
}

#[derive(Debug, Clone)]
pub struct DdlArgs {
    pub config: PathBuf,
    pub dialect: Option<String>,
    pub drop: bool,
}

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub json: bool,
    pub fail_fast: bool,
}

#[derive(Debug, Clone)]
pub struct PhrasesArgs {
    pub dialect: String,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "ddl" => parse_ddl(it.map(|s| s.as_str())),
        "check" => parse_check(it.map(|s| s.as_str())),
        "phrases" => parse_phrases(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Value of `--flag VALUE` or `--flag=VALUE`; `None` when `token` is another argument.
fn flag_value<'a>(
    flag: &str,
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == flag {
        let Some(v) = it.next() else {
            anyhow::bail!("{flag} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(flag)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_ddl<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut dialect: Option<String> = None;
    let mut drop = false;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Ddl));
        }
        if let Some(v) = flag_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        if let Some(v) = flag_value("--dialect", token, &mut it)? {
            dialect = Some(v.to_string());
            continue;
        }
        match token {
            "--drop" => drop = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Ddl(DdlArgs {
        config,
        dialect,
        drop,
    }))
}

fn parse_check<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut database: Option<String> = None;
    let mut schema: Option<String> = None;
    let mut json = false;
    let mut fail_fast = false;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Check));
        }
        if let Some(v) = flag_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        if let Some(v) = flag_value("--database", token, &mut it)? {
            database = Some(v.to_string());
            continue;
        }
        if let Some(v) = flag_value("--schema", token, &mut it)? {
            if v.trim().is_empty() {
                anyhow::bail!("--schema must not be empty");
            }
            schema = Some(v.trim().to_string());
            continue;
        }
        match token {
            "--json" => json = true,
            "--fail-fast" => fail_fast = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Check(CheckArgs {
        config,
        database,
        schema,
        json,
        fail_fast,
    }))
}

fn parse_phrases<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut dialect = "generic".to_string();

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Phrases));
        }
        if let Some(v) = flag_value("--dialect", token, &mut it)? {
            dialect = v.to_string();
            continue;
        }
        anyhow::bail!("unknown argument: {token}");
    }

    Ok(Command::Phrases(PhrasesArgs { dialect }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
empiredb - DDL generation and model checking for empiredb

USAGE:
  empiredb <COMMAND> [OPTIONS]

COMMANDS:
  ddl           Print the DDL script for the configured model
  check         Compare the configured model with a live PostgreSQL schema
  phrases       List the SQL phrase templates of a dialect

Run `empiredb <command> --help` for more."
            );
        }
        HelpTopic::Ddl => {
            println!(
                "\
USAGE:
  empiredb ddl [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: empiredb.toml)
  --dialect <NAME>      Override database.dialect from config
  --drop                Print the DROP script instead of CREATE
  -h, --help            Print help"
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  empiredb check [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: empiredb.toml)
  --database <URL>      Override database.url from config
  --schema <NAME>       Override database.schema (default: public)
  --json                Print differences as JSON
  --fail-fast           Stop at the first difference
  -h, --help            Print help

Exits non-zero when the model and the database differ."
            );
        }
        HelpTopic::Phrases => {
            println!(
                "\
USAGE:
  empiredb phrases [OPTIONS]

OPTIONS:
  --dialect <NAME>      Dialect name (default: generic)
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("empiredb")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_prints_root_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_ddl_drop_with_dialect() {
        let cmd = parse_args(&args(&["ddl", "--dialect=mysql", "--drop"])).unwrap();
        let Command::Ddl(d) = cmd else {
            panic!("expected ddl command");
        };
        assert_eq!(d.dialect.as_deref(), Some("mysql"));
        assert_eq!(d.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(d.drop);
    }

    #[test]
    fn parse_check_options() {
        let cmd = parse_args(&args(&[
            "check",
            "--config",
            "db/model.toml",
            "--database",
            "postgres://localhost/hr",
            "--schema=hr",
            "--json",
            "--fail-fast",
        ]))
        .unwrap();
        let Command::Check(c) = cmd else {
            panic!("expected check command");
        };
        assert_eq!(c.config, PathBuf::from("db/model.toml"));
        assert_eq!(c.database.as_deref(), Some("postgres://localhost/hr"));
        assert_eq!(c.schema.as_deref(), Some("hr"));
        assert!(c.json);
        assert!(c.fail_fast);
    }

    #[test]
    fn phrases_defaults_to_generic() {
        let Command::Phrases(p) = parse_args(&args(&["phrases"])).unwrap() else {
            panic!("expected phrases command");
        };
        assert_eq!(p.dialect, "generic");
    }

    #[test]
    fn subcommand_help() {
        let cmd = parse_args(&args(&["check", "--json", "-h"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Check)));
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        let err = parse_args(&args(&["ddl", "--config"])).unwrap_err();
        assert_eq!(err.to_string(), "--config requires a value");
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse_args(&args(&["ddl", "--bogus"])).is_err());
        assert!(parse_args(&args(&["deploy"])).is_err());
        assert!(parse_args(&args(&["check", "--schema="])).is_err());
    }

    #[test]
    fn similar_flag_prefix_is_not_a_value() {
        let err = parse_args(&args(&["ddl", "--configx"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown argument: --configx");
    }
}
