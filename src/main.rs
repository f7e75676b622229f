mod config;
mod entities;
mod error;
mod models;
mod routes;
mod schema;
mod storage;
mod store;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::{
    config::Config,
    storage::{DataSource, Storage},
    store::{MovieStore, ScheduleStore},
};

#[derive(Debug, Parser)]
#[command(name = "cinema")]
#[command(about = "Cinema catalog: movies and their screenings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Operate,
    /// Create the database tables
    Install,
    /// Drop the database tables
    Uninstall,
}

pub struct AppState {
    pub config: Arc<Config>,
    pub movies: MovieStore,
    pub schedules: ScheduleStore,
}

impl AppState {
    pub fn new(config: Arc<Config>, source: &DataSource) -> Self {
        Self { config, movies: MovieStore::new(source), schedules: ScheduleStore::new(source) }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinema=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);

    let mut storage = Storage::new(config.storage.clone());
    if let Err(err) = storage.connect().await {
        tracing::error!(error = %err, "unable to start database storage, exiting");
        return Err(err.into());
    }

    let result = run(cli.command.unwrap_or(Command::Operate), config, &storage).await;

    if let Err(err) = storage.disconnect().await {
        tracing::warn!(error = %err, "unable to stop database storage");
    }

    result
}

async fn run(command: Command, config: Arc<Config>, storage: &Storage) -> anyhow::Result<()> {
    let source = storage.data_source()?;

    match command {
        Command::Operate => operate(config, source).await,
        Command::Install => Ok(schema::install(source).await?),
        Command::Uninstall => Ok(schema::uninstall(source).await?),
    }
}

async fn operate(config: Arc<Config>, source: &DataSource) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone(), source));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
