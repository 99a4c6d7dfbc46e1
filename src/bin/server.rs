//! cmdlog Server Binary
//!
//! Starts the TCP server for cmdlog.

use clap::Parser;
use cmdlog::network::Server;
use cmdlog::{Config, LogDevice};
use tracing_subscriber::{fmt, EnvFilter};

/// cmdlog Server
#[derive(Parser, Debug)]
#[command(name = "cmdlog-server")]
#[command(about = "Bounded command log served over TCP")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:9000")]
    listen: String,

    /// Number of commands retained before the oldest is evicted
    #[arg(short, long, default_value = "10")]
    capacity: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Seconds between timestamp lines (0 disables them)
    #[arg(short, long, default_value = "10")]
    timestamp_interval: u64,

    /// Largest accepted command in bytes
    #[arg(long, default_value = "16777216")]
    max_record_size: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cmdlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cmdlog Server v{}", cmdlog::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Capacity: {} commands", args.capacity);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .capacity(args.capacity)
        .max_connections(args.max_connections)
        .timestamp_interval_secs(args.timestamp_interval)
        .max_record_size(args.max_record_size)
        .build();

    // Create the shared log
    let device = match LogDevice::new(&config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to create log: {}", e);
            std::process::exit(1);
        }
    };

    // Start server
    let mut server = match Server::bind(config, device.clone()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    let released = device.teardown();
    tracing::info!("Server stopped, {} records released", released);
}
