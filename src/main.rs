//! SOAP calculator service binary.
//!
//! Run with: `soap-service --config config.yaml`
//!
//! Serves the WSDL on `GET {prefix}/` and the operations on
//! `POST {prefix}/{Operation}`.

use anyhow::{Context, Result};
use clap::Parser;
use soap_service::{
    soap_schema, AppConfig, OperationRecord, SoapResponse, SoapResult, SoapService, XmlBody,
};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// SOAP 1.1 calculator web service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Listen address, overrides `server.listen`
    #[arg(long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

soap_schema! {
    /// Numbers to add up.
    #[derive(Debug, Clone)]
    pub struct Operands => "Operands" {
        pub operands: Vec<f64> => element("Operand"),
    }
}

soap_schema! {
    #[derive(Debug, Clone)]
    pub struct Total => "Result" {
        pub value: f64 => text(),
    }
}

async fn sum_operation(XmlBody(body): XmlBody<Operands>) -> SoapResult<Total> {
    let value = body.operands.iter().sum();
    Ok(SoapResponse::new(Total { value }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting SOAP service v{}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", args.config.display());

    // Load configuration
    let mut config: AppConfig = if args.config.exists() {
        let content = tokio::fs::read_to_string(&args.config)
            .await
            .context("Failed to read config file")?;
        serde_yaml::from_str(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        AppConfig::default()
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!(
        service = %config.service.name,
        prefix = %config.service.normalized_prefix(),
        validation_faults = ?config.service.validation_faults,
        max_body_size = config.service.max_body_size,
        max_depth = config.service.max_depth,
        "Configuration loaded"
    );

    let app = SoapService::new(config.service.clone())
        .operation(
            OperationRecord::new("SumOperation")
                .request::<Operands>()
                .response::<Total>(),
            sum_operation,
        )
        .into_router();

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    info!(
        "WSDL available at http://{}{}/",
        config.server.listen,
        config.service.normalized_prefix()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("SOAP service stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
