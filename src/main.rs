//! # TMM Telemetry
//!
//! Command line companion for Trimble Mobile Manager (TMM) GNSS telemetry.
//!
//! This application performs the TMM WebSocket port handshake and decodes
//! captured telemetry streams.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tmm_telemetry::config::{Config, LoggingConfig};
use tmm_telemetry::handshake::{
    build_response_url, ConsoleTransport, PortDiscovery, PortResponse,
};
use tmm_telemetry::telemetry::{ingest_lines, TelemetryFeed};

/// Log file name prefix inside `logging.log_dir`
const LOG_FILE_PREFIX: &str = "tmm-telemetry.log";

#[derive(Debug, Parser)]
#[command(name = "tmm-telemetry", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the URL that asks TMM for its WebSocket port
    Request {
        /// Return URL, overriding the configured one
        #[arg(long)]
        return_url: Option<String>,
    },

    /// Decode a response URL delivered by TMM
    Port {
        /// URL as opened by TMM, e.g. socketport://app?eyAicG9ydCI6IDQxMjk2IH0=
        url: String,
    },

    /// Print the response URL TMM would send for a port
    Respond {
        port: u64,

        /// Return URL, overriding the configured one
        #[arg(long)]
        return_url: Option<String>,
    },

    /// Decode newline-delimited telemetry messages
    Decode {
        /// Capture file, stdin when omitted
        file: Option<PathBuf>,
    },
}

/// Main entry point for TMM Telemetry
///
/// # Control Flow
///
/// 1. Load configuration (defaults when no file is given)
/// 2. Set up logging to stderr, or to daily files under `logging.log_dir`
/// 3. Run the selected subcommand
///
/// # Examples
///
/// ```bash
/// tmm-telemetry request
/// tmm-telemetry port 'socketport://spp4d.playground.ios?eyAicG9ydCI6IDQxMjk2IH0='
/// tmm-telemetry decode capture.jsonl
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    let _guard = init_logging(&config.logging);

    info!("TMM Telemetry v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Request { return_url } => {
            let return_url = return_url.unwrap_or_else(|| config.handshake.return_url.clone());
            let mut discovery = PortDiscovery::new(ConsoleTransport::stdout(), return_url);
            discovery.request_port()?;
        }

        Command::Port { url } => {
            let discovery =
                PortDiscovery::new(ConsoleTransport::stdout(), config.handshake.return_url.clone());
            let response: PortResponse = discovery
                .handle_incoming(&url)
                .context("URL does not carry a TMM port response")?;
            println!("{}", response.websocket_url_on(&config.handshake.socket_host));
        }

        Command::Respond { port, return_url } => {
            let return_url = return_url.unwrap_or_else(|| config.handshake.return_url.clone());
            println!("{}", build_response_url(&return_url, port)?);
        }

        Command::Decode { file } => {
            run_decode(file, config.feed.max_records).await?;
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must live until exit so buffered file output is flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Decode a capture until end of input or Ctrl+C, then print a summary
async fn run_decode(file: Option<PathBuf>, max_records: usize) -> Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut feed = TelemetryFeed::with_capacity(max_records);
    let mut total: Option<u64> = None;

    tokio::select! {
        result = ingest_lines(reader, &mut feed) => {
            total = Some(result?);
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping...");
        }
    }

    if let Some(total) = total {
        println!("messages: {}", total);
    }
    println!("decoded:  {}", feed.len());
    println!("failures: {}", feed.failures());

    if let Some(latest) = feed.latest() {
        println!(
            "latest:   {:.7}, {:.7} at {:.3} m ({:?}, {:?})",
            latest.latitude,
            latest.longitude,
            latest.altitude,
            latest.diff_status,
            latest.subscription_type
        );
        println!(
            "satellites: {} used, {} in view, {} listed",
            latest.satellites,
            latest.total_sat_in_view,
            latest.satellite_view.len()
        );
    }

    Ok(())
}
