//! Task API server
//!
//! A minimal task-tracking HTTP service backed by SQLite.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use task_api::api;
use task_api::cli::{Cli, Command};
use task_api::config::Config;
use task_api::db::Database;
use task_api::logging::{self, LogTarget};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::load_or_default(cli.config.as_deref().map(Path::new))?;
    cli.apply_overrides(&mut config);
    config.ensure_db_dir()?;

    // Schema is in place before anything can accept traffic
    let db = Database::open_with_timeout(&config.server.db_path, config.server.busy_timeout_ms)?;
    info!(
        path = %db.path().display(),
        tasks = db.task_count()?,
        "Database initialized"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => Ok(()),
        Command::Serve => run_server(config, db).await,
    }
}

async fn run_server(config: Config, db: Database) -> Result<()> {
    let handle = api::start_server(Arc::new(db), &config.server.host, config.server.port).await?;
    handle.run_until(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
