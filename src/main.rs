//! herakles-log-collector
//!
//! Collects process telemetry from remote agents over TCP and serves the
//! retained records over HTTP. This is the main entry point that wires the
//! collector, the new-data watcher and the HTTP API together.

mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use herakles_log_collector::{bind_listener, watch_for_new_records, Collector};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

use cli::{Args, Commands, LogLevel};
use commands::command_config;
use config::{parse_log_level, resolve_config, show_config, validate_effective_config, Config};
use handlers::{
    clear_logs_handler, clients_handler, health_handler, logs_handler, metrics_handler,
    root_handler,
};
use metrics::CollectorMetrics;
use state::{AppState, SharedState};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let level = config
        .log_level
        .as_deref()
        .and_then(|l| parse_log_level(l).ok())
        .unwrap_or(LogLevel::Info);

    let max_level = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Resolves and validates configuration, exiting with code 1 if invalid.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Waits for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/logs", get(logs_handler).delete(clear_logs_handler))
        .route("/clients", get(clients_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        return command_config(output.clone(), format.clone(), *commented);
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config);

    info!("Starting herakles-log-collector");

    let collector = Collector::new(config.server_options());
    let collector_addr = config.collector_addr()?;
    let listener = bind_listener(collector_addr).await?;
    info!("herakles-log-collector listening on tcp://{}", collector_addr);

    let cancel = CancellationToken::new();

    let acceptor = {
        let collector = collector.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = collector.run_acceptor(listener, cancel).await {
                error!("Collector acceptor failed: {}", e);
            }
        })
    };

    let watcher = {
        let store = Arc::clone(&collector.store);
        let cancel = cancel.clone();
        let interval = config.refresh_interval();
        tokio::spawn(async move {
            watch_for_new_records(&store, interval, cancel, |new_records| {
                info!(
                    "{} new records received ({} stored)",
                    new_records,
                    store.len()
                );
            })
            .await;
        })
    };

    let http = if config.http_enabled() {
        let http_addr = config.http_addr()?;
        let metrics = CollectorMetrics::new()?;
        let state = Arc::new(AppState::new(collector.clone(), metrics, config.clone()));
        let app = build_router(state);

        let listener = TcpListener::bind(http_addr).await?;
        info!("HTTP API listening on http://{}", http_addr);

        let shutdown = cancel.clone().cancelled_owned();
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("HTTP server error: {}", e);
            }
        }))
    } else {
        debug!("HTTP API disabled in configuration");
        None
    };

    shutdown_signal().await;
    cancel.cancel();

    if let Err(e) = acceptor.await {
        error!("Acceptor task panicked: {}", e);
    }
    if let Err(e) = watcher.await {
        error!("Watcher task panicked: {}", e);
    }
    if let Some(http) = http {
        if let Err(e) = http.await {
            error!("HTTP task panicked: {}", e);
        }
    }

    info!(
        "herakles-log-collector stopped gracefully ({} records in store)",
        collector.store.len()
    );
    Ok(())
}
