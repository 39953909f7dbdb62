// starload/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::run::RunOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug starload run ... to see the pipeline internals
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            start_date,
            full_refresh,
            skip_dimensions,
        } => {
            let options = RunOptions {
                start_date,
                full_refresh,
                skip_dimensions,
            };
            commands::run::execute(project_dir, options).await
        }
        Commands::Init { project_dir, name } => commands::init::execute(project_dir, name).await,
        Commands::Status {
            project_dir,
            history,
        } => commands::status::execute(project_dir, history).await,
        Commands::Inspect {
            db_path,
            table,
            limit,
        } => commands::inspect::execute(db_path, table, limit).await,
        Commands::Metrics {
            project_dir,
            fact,
            limit,
        } => commands::metrics::execute(project_dir, fact.into(), limit).await,
    }
}
