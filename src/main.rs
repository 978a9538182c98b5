// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use ingress_hosts::{
    config::Cli,
    constants::{RUNTIME_THREAD_NAME, RUNTIME_WORKER_THREADS},
    hosts_file::HostsFile,
    metrics::serve_metrics,
    runner::run,
    source::KubeIngressSource,
};
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKER_THREADS)
        .thread_name(RUNTIME_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (text or json)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let config = cli.into_config().context("Invalid command line")?;
    info!(
        api = ?config.api,
        mode = config.mode.as_str(),
        path = %config.hosts_file.display(),
        max_errors = config.max_errors,
        "Starting ingress-hosts"
    );

    debug!("Initializing Kubernetes client");
    let source = KubeIngressSource::connect(&config.api).context("Error creating v1 client")?;

    let hosts = HostsFile::open(&config.hosts_file).context("Error reading hosts file")?;

    if let Some(addr) = config.metrics_addr {
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(addr).await {
                error!(address = %addr, error = %e, "Metrics server failed");
            }
        });
    }

    run(&source, &hosts, &config, shutdown_signal()).await?;

    info!("ingress-hosts stopped");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}
