//! Request reading and validation.
//!
//! # Responsibilities
//! - Read exactly one request head (request line + headers) from a stream
//! - Enforce size and header-count caps on the head before parsing it
//! - Drain and discard the request body, if any, without inspecting it
//! - Validate the path and the `n` query parameter
//!
//! # Design Decisions
//! - The protocol token is captured verbatim; the response generator owns
//!   the authoritative protocol check
//! - The body is drained before validation so the peer never sees a reset
//!   caused by unread bytes, even when the request is rejected

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::config::RequestConfig;
use crate::http::error::{check_length, Error, LengthError};

/// Name of the query parameter carrying the body length.
const LENGTH_PARAM: &str = "n";

/// A validated request for a body of `length` filler bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Protocol token from the request line, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Requested body length.
    pub length: i64,
}

impl Request {
    pub fn new(protocol: impl Into<String>, length: i64) -> Self {
        Self {
            protocol: protocol.into(),
            length,
        }
    }
}

/// How the body following a request head is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFraming {
    Empty,
    Length(u64),
    Chunked,
}

/// The parts of a parsed head the reader cares about.
#[derive(Debug)]
struct RequestHead {
    protocol: String,
    target: String,
    body: BodyFraming,
}

/// Reads and validates one request per connection.
#[derive(Debug, Clone)]
pub struct RequestReader {
    header_limit: usize,
    max_headers: usize,
    body_drain_limit: u64,
    max_length: Option<u64>,
}

impl RequestReader {
    /// Create a reader with default limits and the given length bound.
    pub fn new(max_length: Option<u64>) -> Self {
        Self::from_config(&RequestConfig::default(), max_length)
    }

    /// Create a reader from the request section of the config.
    pub fn from_config(config: &RequestConfig, max_length: Option<u64>) -> Self {
        Self {
            header_limit: config.header_limit,
            max_headers: config.max_headers,
            body_drain_limit: config.body_drain_limit,
            max_length,
        }
    }

    /// Read one request from `stream`, discard its body and validate it.
    ///
    /// At most `header_limit` bytes of head and `body_drain_limit` bytes of
    /// body are consumed from the stream.
    pub async fn read<R>(&self, stream: &mut R) -> Result<Request, Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(stream);
        let raw = self.read_head(&mut reader).await?;
        let head = self.parse_head(&raw)?;
        self.discard_body(&mut reader, head.body).await?;
        self.validate(&head)
    }

    /// Parse and validate a complete request head. Any body is ignored.
    pub fn parse(&self, raw: &[u8]) -> Result<Request, Error> {
        let head = self.parse_head(raw)?;
        self.validate(&head)
    }

    async fn read_head<B>(&self, reader: &mut B) -> Result<Vec<u8>, Error>
    where
        B: AsyncBufRead + Unpin,
    {
        let limit = self.header_limit;
        let mut head = Vec::with_capacity(limit.min(1024));

        loop {
            let start = head.len();
            let remaining = limit.saturating_sub(start) as u64;
            let read = (&mut *reader)
                .take(remaining)
                .read_until(b'\n', &mut head)
                .await?;
            if read == 0 {
                return Err(if head.len() >= limit {
                    Error::MalformedRequest(format!("request head exceeds {limit} bytes"))
                } else {
                    Error::MalformedRequest(
                        "connection closed before end of request head".to_string(),
                    )
                });
            }

            let line = &head[start..];
            if line == b"\r\n" || line == b"\n" {
                if start == 0 {
                    // Leading blank lines before the request line are tolerated.
                    head.clear();
                    continue;
                }
                return Ok(head);
            }
        }
    }

    fn parse_head(&self, raw: &[u8]) -> Result<RequestHead, Error> {
        let mut headers = vec![httparse::EMPTY_HEADER; self.max_headers];
        let mut parsed = httparse::Request::new(&mut headers);

        if parsed.parse(raw)?.is_partial() {
            return Err(Error::MalformedRequest("incomplete request head".to_string()));
        }

        let version = parsed
            .version
            .ok_or_else(|| Error::MalformedRequest("missing protocol version".to_string()))?;
        let target = parsed
            .path
            .ok_or_else(|| Error::MalformedRequest("missing request target".to_string()))?;

        Ok(RequestHead {
            protocol: format!("HTTP/1.{version}"),
            target: target.to_string(),
            body: body_framing(parsed.headers)?,
        })
    }

    fn validate(&self, head: &RequestHead) -> Result<Request, Error> {
        let (path, query) = split_target(&head.target)?;
        if path != "/" {
            return Err(Error::InvalidPath(path));
        }

        let value = query
            .as_deref()
            .and_then(length_param)
            .ok_or(Error::MissingLength)?;
        let length = value.parse::<i64>().map_err(LengthError::from)?;
        check_length(length, self.max_length)?;

        Ok(Request::new(head.protocol.clone(), length))
    }

    async fn discard_body<B>(&self, reader: &mut B, framing: BodyFraming) -> Result<(), Error>
    where
        B: AsyncBufRead + Unpin,
    {
        match framing {
            BodyFraming::Empty => Ok(()),
            BodyFraming::Length(len) => {
                if len > self.body_drain_limit {
                    return Err(Error::MalformedRequest(format!(
                        "request body of {len} bytes exceeds {} bytes",
                        self.body_drain_limit
                    )));
                }
                skip(reader, len).await
            }
            BodyFraming::Chunked => self.discard_chunked(reader).await,
        }
    }

    async fn discard_chunked<B>(&self, reader: &mut B) -> Result<(), Error>
    where
        B: AsyncBufRead + Unpin,
    {
        let mut drained: u64 = 0;
        let mut line = Vec::new();

        loop {
            let size_line = self.read_line(reader, &mut line).await?;
            let size_field = size_line.split(';').next().unwrap_or_default().trim();
            let size = u64::from_str_radix(size_field, 16).map_err(|_| {
                Error::MalformedRequest(format!("invalid chunk size {size_field:?}"))
            })?;
            if size == 0 {
                break;
            }

            drained = drained.saturating_add(size);
            if drained > self.body_drain_limit {
                return Err(Error::MalformedRequest(format!(
                    "chunked request body exceeds {} bytes",
                    self.body_drain_limit
                )));
            }
            skip(reader, size).await?;

            if !self.read_line(reader, &mut line).await?.is_empty() {
                return Err(Error::MalformedRequest(
                    "chunk data not followed by CRLF".to_string(),
                ));
            }
        }

        // Trailer section ends with an empty line.
        while !self.read_line(reader, &mut line).await?.is_empty() {}
        Ok(())
    }

    /// Read one line of chunked framing, returned trimmed.
    async fn read_line<'a, B>(&self, reader: &mut B, line: &'a mut Vec<u8>) -> Result<&'a str, Error>
    where
        B: AsyncBufRead + Unpin,
    {
        line.clear();
        (&mut *reader)
            .take(self.header_limit as u64)
            .read_until(b'\n', line)
            .await?;
        if line.last() != Some(&b'\n') {
            return Err(Error::MalformedRequest(
                "connection closed inside chunked body".to_string(),
            ));
        }

        std::str::from_utf8(line)
            .map(str::trim)
            .map_err(|_| Error::MalformedRequest("chunk line is not UTF-8".to_string()))
    }
}

/// Read and drop exactly `len` bytes.
async fn skip<B>(reader: &mut B, len: u64) -> Result<(), Error>
where
    B: AsyncBufRead + Unpin,
{
    let mut body = (&mut *reader).take(len);
    let skipped = tokio::io::copy_buf(&mut body, &mut tokio::io::sink()).await?;
    if skipped < len {
        return Err(Error::MalformedRequest(
            "connection closed before end of request body".to_string(),
        ));
    }
    Ok(())
}

/// Work out body framing from the header fields.
///
/// `Transfer-Encoding: chunked` takes precedence over `Content-Length`.
fn body_framing(headers: &[httparse::Header<'_>]) -> Result<BodyFraming, Error> {
    let mut framing = BodyFraming::Empty;

    for header in headers {
        let value = || {
            std::str::from_utf8(header.value)
                .map(str::trim)
                .map_err(|_| Error::MalformedRequest(format!("invalid {} header", header.name)))
        };

        if header.name.eq_ignore_ascii_case("transfer-encoding") {
            if value()?
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
            {
                return Ok(BodyFraming::Chunked);
            }
        } else if header.name.eq_ignore_ascii_case("content-length") {
            let raw = value()?;
            let len = raw
                .parse::<u64>()
                .map_err(|_| Error::MalformedRequest(format!("invalid Content-Length {raw:?}")))?;
            match framing {
                BodyFraming::Length(prev) if prev != len => {
                    return Err(Error::MalformedRequest(
                        "conflicting Content-Length headers".to_string(),
                    ));
                }
                _ => framing = BodyFraming::Length(len),
            }
        }
    }

    Ok(framing)
}

/// Split a request target into its path and raw query.
///
/// Accepts origin-form (`/path?query`), absolute-form
/// (`http://host/path?query`) and asterisk-form (`*`) targets.
fn split_target(target: &str) -> Result<(String, Option<String>), Error> {
    if target == "*" {
        return Ok((target.to_string(), None));
    }
    if target.starts_with('/') {
        return Ok(match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        });
    }

    let url = url::Url::parse(target)
        .map_err(|e| Error::MalformedRequest(format!("invalid request target {target:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::MalformedRequest(format!(
            "invalid request target {target:?}"
        )));
    }
    Ok((url.path().to_string(), url.query().map(str::to_string)))
}

/// First non-empty value of the length parameter in a query string.
fn length_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == LENGTH_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
