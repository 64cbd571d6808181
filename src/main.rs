use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use resplen::config::{self, FillerPolicy, ResplenConfig};
use resplen::lifecycle::{wait_for_signal, Shutdown};
use resplen::net::Listener;
use resplen::{observability, Server};

#[derive(Parser)]
#[command(name = "resplen")]
#[command(about = "Serves HTTP responses with a body of exactly ?n= filler bytes", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port on the configured address (0 picks a free port).
    #[arg(short, long)]
    port: Option<u16>,

    /// Seed for the random filler.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Filler policy for response bodies.
    #[arg(short, long, value_enum)]
    filler: Option<FillerPolicy>,

    /// Largest accepted body length.
    #[arg(long, conflicts_with = "unbounded")]
    max_length: Option<u64>,

    /// Accept any non-negative body length.
    #[arg(long)]
    unbounded: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides.
    fn resolve(&self) -> Result<ResplenConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ResplenConfig::default(),
        };

        if let Some(port) = self.port {
            let mut addr: std::net::SocketAddr = config.listener.bind_address.parse()?;
            addr.set_port(port);
            config.listener.bind_address = addr.to_string();
        }
        if let Some(seed) = self.seed {
            config.response.seed = seed;
        }
        if let Some(filler) = self.filler {
            config.response.filler = filler;
        }
        if let Some(max_length) = self.max_length {
            config.response.max_length = Some(max_length);
        }
        if self.unbounded {
            config.response.max_length = None;
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().resolve()?;
    observability::init(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        filler = %config.response.filler,
        seed = config.response.seed,
        max_length = ?config.response.max_length,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    let shutdown = Shutdown::new();
    let server = Arc::new(Server::new(&config));
    let mut accept_loop = tokio::spawn(Arc::clone(&server).run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            accept_loop.await??;
        }
        stopped = &mut accept_loop => stopped??,
    }

    let drain_timeout = Duration::from_secs(config.shutdown.drain_timeout_secs);
    if !server.tracker().drain(drain_timeout).await {
        tracing::warn!(
            in_flight = server.tracker().active_count(),
            "Drain timeout elapsed, abandoning connections"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
