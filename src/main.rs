//! CLI entry point for raw_ingest.
//!
//! `run` performs a single fetch-and-upload pass, `serve` exposes the
//! on-demand HTTP trigger and `schedule` fires the pipeline on a fixed interval.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use raw_ingest::{
    app::build_pipeline,
    config::Config,
    infra::keys::SsmSecretStore,
    logging,
    pipeline::Pipeline,
    triggers::{self, spawn_schedule},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "raw_ingest")]
#[command(about = "Fetch JSON from REST endpoints and store it in blob storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the result as JSON
    Run,
    /// Serve the on-demand trigger over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        /// Also run the pipeline every N seconds in this process
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Run the pipeline on a fixed interval
    Schedule {
        /// Seconds between runs
        #[arg(short, long, default_value_t = 3600)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let config = Config::from_env().context("invalid configuration")?;
    let _log_guard = logging::init(&config);

    let pipeline = match startup(&config).await {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            error!("Startup failed: {e:#}");
            return Err(e);
        }
    };

    match cli.command {
        Commands::Run => {
            let result = pipeline.run().await;
            println!("{}", result.to_json());
        }
        Commands::Serve {
            bind,
            interval_secs,
        } => {
            if let Some(secs) = interval_secs {
                spawn_schedule(pipeline.clone(), interval(secs)?);
                info!(interval_secs = secs, "Scheduled trigger enabled");
            }

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            info!(%bind, "On-demand trigger listening");
            axum::serve(listener, triggers::router(pipeline)).await?;
        }
        Commands::Schedule { interval_secs } => {
            info!(interval_secs, "Scheduled trigger enabled");
            spawn_schedule(pipeline, interval(interval_secs)?).await?;
        }
    }

    Ok(())
}

/// Resolves the storage credential and builds the pipeline.
async fn startup(config: &Config) -> Result<Pipeline> {
    let sdk_config = aws_config::load_from_env().await;
    let secrets = SsmSecretStore::new(&sdk_config, config.secret_store_uri.as_deref());
    build_pipeline(config, &secrets).await
}

fn interval(secs: u64) -> Result<Duration> {
    anyhow::ensure!(secs > 0, "interval must be at least one second");
    Ok(Duration::from_secs(secs))
}
