//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upper bound on the requested body length in the bounded variant (2^30).
pub const DEFAULT_MAX_LENGTH: u64 = 1 << 30;

/// Root configuration for the response-length server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResplenConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Request reading limits.
    pub request: RequestConfig,

    /// Response generation policy.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080"). Port 0 picks an ephemeral port.
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections: 1024,
        }
    }
}

/// Which filler bytes make up a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillerPolicy {
    /// Bytes drawn from the shared seeded generator.
    #[default]
    Random,
    /// Every byte is `.`.
    Dot,
}

impl std::fmt::Display for FillerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillerPolicy::Random => f.write_str("random"),
            FillerPolicy::Dot => f.write_str("dot"),
        }
    }
}

/// Response generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Filler policy for response bodies.
    pub filler: FillerPolicy,

    /// Seed for the random filler.
    pub seed: u64,

    /// Largest body length accepted. `None` removes the bound.
    pub max_length: Option<u64>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            filler: FillerPolicy::default(),
            seed: 1,
            max_length: Some(DEFAULT_MAX_LENGTH),
        }
    }
}

/// Limits applied while reading a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Maximum size of the request head in bytes.
    pub header_limit: usize,

    /// Maximum number of header fields in the request head.
    pub max_headers: usize,

    /// Largest request body that is read and discarded before responding.
    pub body_drain_limit: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            header_limit: 8 * 1024,
            max_headers: 128,
            body_drain_limit: 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long to wait for in-flight connections after the stop signal.
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 5,
        }
    }
}
