//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! accepted connection
//!     → request.rs (read one request head, validate path and `n`)
//!     → response.rs (re-validate, status line + filler body)
//!     → bytes written back by the connection handler
//!
//! server.rs drives the exchange for each connection; any failure
//!     → error.rs taxonomy → logged, connection closed
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{Error, LengthError};
pub use request::{Request, RequestReader};
pub use response::{Protocol, ResponseGenerator, STATUS_SUFFIX};
pub use server::Server;
