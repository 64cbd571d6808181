//! Failure taxonomy for reading requests and generating responses.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that abort a single connection.
///
/// None of these are fatal to the process; the connection handler logs
/// them and closes the connection without writing a response.
#[derive(Debug, Error)]
pub enum Error {
    /// The bytes on the wire are not a well-formed HTTP/1.x request head.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The request path is anything other than `/`.
    #[error("invalid url path: {0:?}")]
    InvalidPath(String),

    /// The query string carries no (or an empty) `n` parameter.
    #[error("length not specified")]
    MissingLength,

    /// The `n` parameter is not an acceptable body length.
    #[error("invalid length: {0}")]
    InvalidLength(#[from] LengthError),

    /// The protocol is neither HTTP/1.0 nor HTTP/1.1.
    #[error("unsupported protocol: {0:?}")]
    UnsupportedProtocol(String),

    /// The transport failed while the request head was being read.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<httparse::Error> for Error {
    fn from(err: httparse::Error) -> Self {
        Error::MalformedRequest(err.to_string())
    }
}

/// Why a requested length was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthError {
    #[error("{0}")]
    NotANumber(#[from] ParseIntError),

    #[error("{0} is less than zero")]
    Negative(i64),

    #[error("{length} exceeds maximum {max}")]
    TooLarge { length: i64, max: u64 },

    #[error("{0} bytes cannot be allocated")]
    Unallocatable(i64),
}

/// Check `length` against `[0, max]`; `None` leaves the upper end open.
pub fn check_length(length: i64, max: Option<u64>) -> Result<u64, LengthError> {
    let length_u64 = u64::try_from(length).map_err(|_| LengthError::Negative(length))?;
    match max {
        Some(max) if length_u64 > max => Err(LengthError::TooLarge { length, max }),
        _ => Ok(length_u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(check_length(0, Some(10)), Ok(0));
        assert_eq!(check_length(10, Some(10)), Ok(10));
        assert_eq!(
            check_length(11, Some(10)),
            Err(LengthError::TooLarge { length: 11, max: 10 })
        );
    }

    #[test]
    fn negative_lengths_are_rejected_even_when_unbounded() {
        assert_eq!(check_length(-1, None), Err(LengthError::Negative(-1)));
        assert_eq!(check_length(i64::MAX, None), Ok(i64::MAX as u64));
    }

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(Error::MissingLength.to_string(), "length not specified");
        assert_eq!(
            Error::InvalidPath("/a".into()).to_string(),
            "invalid url path: \"/a\""
        );
        assert_eq!(
            Error::from(LengthError::Negative(-5)).to_string(),
            "invalid length: -5 is less than zero"
        );
    }
}
