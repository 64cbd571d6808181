//! Response generation.
//!
//! # Responsibilities
//! - Re-validate protocol and length independently of the request reader
//! - Emit `<protocol> 200 \r\n\r\n` followed by exactly `length` filler bytes
//!
//! # Design Decisions
//! - No headers and no reason phrase; clients frame the body by connection close
//! - Filler content comes from an injected [`FillerSource`]

use std::str::FromStr;
use std::sync::Arc;

use crate::config::ResponseConfig;
use crate::filler::{self, FillerSource};
use crate::http::error::{check_length, Error, LengthError};
use crate::http::request::Request;

/// Status-line suffix following the protocol token.
pub const STATUS_SUFFIX: &str = " 200 \r\n\r\n";

/// Protocols a response can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http10,
    Http11,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http10 => "HTTP/1.0",
            Protocol::Http11 => "HTTP/1.1",
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(Protocol::Http10),
            "HTTP/1.1" => Ok(Protocol::Http11),
            other => Err(Error::UnsupportedProtocol(other.to_string())),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds response bytes for validated requests.
#[derive(Clone)]
pub struct ResponseGenerator {
    filler: Arc<dyn FillerSource>,
    max_length: Option<u64>,
}

impl ResponseGenerator {
    pub fn new(filler: Arc<dyn FillerSource>, max_length: Option<u64>) -> Self {
        Self { filler, max_length }
    }

    /// Create a generator with the filler policy and bound from config.
    pub fn from_config(config: &ResponseConfig) -> Self {
        Self::new(filler::from_config(config), config.max_length)
    }

    /// Generate the full response for `req`.
    ///
    /// The output is always `protocol.len() + STATUS_SUFFIX.len() + length` bytes.
    pub fn generate(&self, req: &Request) -> Result<Vec<u8>, Error> {
        let protocol: Protocol = req.protocol.parse()?;
        let length = check_length(req.length, self.max_length)?;
        let status_line = status_line(protocol);
        let total = usize::try_from(length)
            .ok()
            .and_then(|length| length.checked_add(status_line.len()))
            .ok_or(LengthError::Unallocatable(req.length))?;

        // An unbounded length must fail this connection, not abort the process.
        let mut buf = Vec::new();
        buf.try_reserve_exact(total)
            .map_err(|_| LengthError::Unallocatable(req.length))?;
        buf.extend_from_slice(status_line.as_bytes());
        buf.resize(total, 0);
        self.filler.fill(&mut buf[status_line.len()..]);

        Ok(buf)
    }
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("filler", &self.filler.policy())
            .field("max_length", &self.max_length)
            .finish()
    }
}

/// The status line (and empty header block) for `protocol`.
pub fn status_line(protocol: Protocol) -> String {
    format!("{protocol}{STATUS_SUFFIX}")
}
