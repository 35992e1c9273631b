#![doc = include_str!("../README.md")]

mod collector;

use clap::Parser;
use collector::client::RestClient;
use collector::config::{CliArgs, Command, Config, ListCommand};
use collector::sink::{self, SinkSummary};
use collector::stages;
use collector::telemetry::init_telemetry;
use std::sync::Arc;
use std::time::Instant;
use stratus_core::Envelope;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.json_logs);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    run(config, shutdown).await
}

async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    tracing::debug!("testing connections");
    let client = RestClient::new(&config)?;
    client.test_connection().await?;
    let client = Arc::new(client);

    let start = Instant::now();
    let stream = match config.command {
        Command::List(ListCommand::ManagementGroups) => {
            tracing::info!("collecting azure management groups...");
            stages::list_management_groups(&shutdown, client)
        }
        Command::List(ListCommand::ManagementGroupRoleAssignments) => {
            tracing::info!("collecting azure management group role assignments...");
            let groups = stages::list_management_groups(&shutdown, Arc::clone(&client));
            stages::list_role_assignments(&shutdown, client, groups, stages::LANES)
        }
    };

    let summary = write_output(&config, &shutdown, stream).await?;
    tracing::info!(
        duration = ?start.elapsed(),
        envelopes = summary.total(),
        "collection completed"
    );
    Ok(())
}

/// Routes the envelope stream to the configured destination.
///
/// Stdout is the default so the collector composes with shell pipelines;
/// logs already go to stderr and never interleave with envelopes.
async fn write_output(
    config: &Config,
    shutdown: &CancellationToken,
    stream: mpsc::Receiver<Envelope>,
) -> anyhow::Result<SinkSummary> {
    let summary = match &config.output {
        Some(path) => {
            let file = tokio::fs::File::create(path).await?;
            sink::write_envelopes(shutdown, stream, file).await?
        }
        None => sink::write_envelopes(shutdown, stream, tokio::io::stdout()).await?,
    };
    Ok(summary)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C signal"),
        () = terminate => tracing::info!("received SIGTERM signal"),
    }

    tracing::info!("shutdown signal received, terminating gracefully...");
    shutdown.cancel();
}
