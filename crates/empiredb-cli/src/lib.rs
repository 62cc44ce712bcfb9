//! Command-line front end for empiredb: DDL scripts, model checks and
//! dialect phrase listings driven by an `empiredb.toml` project file.

mod check;
mod cli;
mod config;
mod ddl;
mod output;
mod phrases;

use tracing_subscriber::EnvFilter;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Ddl(args) => ddl::run(args),
        cli::Command::Check(args) => check::run(args).await,
        cli::Command::Phrases(args) => phrases::run(args),
    }
}

/// Log to stderr so that scripts and JSON on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
