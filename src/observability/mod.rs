//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → logging::init (tracing subscriber, level + format from config)
//!
//! connection handler
//!     → ConnectionLog (one event per handled connection)
//!     → TracingLog in production, recording logs in tests
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - The per-connection log is injected, not global, so handlers are testable

pub mod logging;

pub use logging::{init, ConnectionLog, TracingLog};
