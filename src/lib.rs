//! Response-length test fixture server.
//!
//! Accepts one HTTP/1.x request per connection, reads the requested body
//! length from the `n` query parameter and answers with
//! `<protocol> 200 \r\n\r\n` followed by exactly `n` filler bytes.
//!
//! # Architecture Overview
//!
//! ```text
//!   client ──▶ net::Listener ──▶ http::Server (task per connection)
//!                                   │
//!                                   ├─▶ http::RequestReader   (parse + validate)
//!                                   ├─▶ http::ResponseGenerator ─▶ filler::FillerSource
//!                                   └─▶ observability::ConnectionLog
//! ```

// Core subsystems
pub mod config;
pub mod filler;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ResplenConfig;
pub use http::Server;
pub use lifecycle::Shutdown;
