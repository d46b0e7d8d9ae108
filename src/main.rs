//! Privacy Guard - Privacy & Risk Classification Engine
//!
//! Validates JSON payloads from the command line or serves the privacy API
//! over HTTP.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use privacy_guard::{
    config::AppConfig,
    privacy::{
        handler::ReportResponse, privacy_router, AuditLog, FanoutSink, PrivacyState,
        PrivacyValidator, TracingAuditSink,
    },
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "privacy-guard")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Privacy & risk classification for user-authored payloads")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PRIVACY_GUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON payload read from a file or stdin
    Validate {
        /// Payload file (stdin when omitted)
        file: Option<PathBuf>,

        /// Also print the compliance report
        #[arg(long)]
        report: bool,

        /// Exit with status 1 when the payload is not compliant
        #[arg(long)]
        check: bool,
    },

    /// Serve the privacy HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("privacy_guard={},tower_http=debug", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Validate {
            file,
            report,
            check,
        } => {
            let compliant = run_validate(&config, file, report)?;
            if check && !compliant {
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port } => {
            run_serve(config, host, port).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn build_validator(config: &AppConfig) -> Result<PrivacyValidator> {
    Ok(PrivacyValidator::new(
        config.validator.clone(),
        config.lexicon.to_lexicon(),
    )?)
}

fn run_validate(config: &AppConfig, file: Option<PathBuf>, with_report: bool) -> Result<bool> {
    let input = match &file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let validator = build_validator(config)?;
    let result = validator
        .validate_slice(&input)
        .context("Payload is not valid JSON")?;

    if with_report {
        let compliant = result.is_compliant;
        let report = validator.report(&result);
        let output = ReportResponse { result, report };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(compliant);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.is_compliant)
}

async fn run_serve(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);

    let audit = Arc::new(AuditLog::new(config.audit.capacity));
    let sink = FanoutSink::new()
        .with(audit.clone())
        .with(Arc::new(TracingAuditSink));
    let validator = Arc::new(build_validator(&config)?.with_audit_sink(Arc::new(sink)));

    let app = privacy_router(PrivacyState { validator, audit }).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("Privacy API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

fn show_config(config: Option<&AppConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
