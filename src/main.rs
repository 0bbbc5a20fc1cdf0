//! Optiroute Worker - route comparison, CO2 estimation and fleet backend
//!
//! `serve` connects to NATS and handles messages from the frontend; the
//! other subcommands run a single workflow and print the result.

mod cli;
mod config;
mod error;
mod handlers;
mod services;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use cli::{Cli, Command};
use services::map_surface::new_shared_map;
use services::Services;
use types::VehicleListResponse;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stderr and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,optiroute_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    let services = Services::from_config(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, services).await,
        command @ Command::Route { .. } => {
            let Some(request) = command.route_request() else { return Ok(()) };
            let map = new_shared_map();
            let outcome = services.route_compare.compare_routes(&map, &request).await;
            let report = cli::route_report(&outcome)?;
            for notice in &outcome.notices {
                eprintln!("{}", notice.message);
            }
            println!("{}", report);
            Ok(())
        }
        command @ Command::Co2 { .. } => {
            let Some(request) = command.emissions_request() else { return Ok(()) };
            let outcome = services.emissions.estimate(&request).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Fleet => {
            let items = services.fleet.list();
            let response = VehicleListResponse { total: items.len(), items };
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

async fn serve(config: &config::Config, services: Services) -> Result<()> {
    info!("Starting Optiroute Worker...");

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, services).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
