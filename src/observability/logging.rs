//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Report the outcome of each handled connection
//!
//! # Design Decisions
//! - JSON format for machine parsing, pretty format for development
//! - `RUST_LOG` takes precedence over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
///
/// Fails if a subscriber has already been installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("resplen={}", config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

/// Receives one report per handled connection.
pub trait ConnectionLog: Send + Sync {
    /// A response of `resp_size` bytes carrying `body_size` filler bytes was generated.
    fn response_generated(&self, resp_size: usize, body_size: u64);

    /// The connection was aborted by `error`.
    fn failed(&self, error: &dyn std::error::Error);
}

/// [`ConnectionLog`] backed by `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ConnectionLog for TracingLog {
    fn response_generated(&self, resp_size: usize, body_size: u64) {
        tracing::info!(resp_size, body_size, "Response generated");
    }

    fn failed(&self, error: &dyn std::error::Error) {
        tracing::warn!(error = %error, "Connection failed");
    }
}
