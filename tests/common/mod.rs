//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;

use resplen::config::{ResplenConfig, ResponseConfig};
use resplen::net::Listener;
use resplen::observability::ConnectionLog;
use resplen::{Server, Shutdown};

/// Raw request head the way a typical test harness sends it.
pub fn make_request(target: &str) -> String {
    format!(
        "GET {target} HTTP/1.1\r\n\
         Host: 127.0.0.1\r\n\
         Accept-Encoding: identity\r\n\
         Connection: close\r\n\
         Content-type: application/x-www-form-urlencoded\r\n\
         Accept: text/plain\r\n\
         \r\n"
    )
}

/// In-memory connection: scripted input, captured output.
pub struct TestConn {
    input: io::Cursor<Vec<u8>>,
    pub written: Vec<u8>,
    write_error: Option<String>,
    pub shutdowns: usize,
}

impl TestConn {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: io::Cursor::new(input.into()),
            written: Vec::new(),
            write_error: None,
            shutdowns: 0,
        }
    }

    /// Every write records its bytes and then fails with `message`.
    pub fn failing_writes(mut self, message: &str) -> Self {
        self.write_error = Some(message.to_string());
        self
    }
}

impl AsyncRead for TestConn {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().input).poll_read(cx, buf)
    }
}

impl AsyncWrite for TestConn {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.written.extend_from_slice(buf);
        match &this.write_error {
            Some(message) => Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, message.clone()))),
            None => Poll::Ready(Ok(buf.len())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}

/// Connection log that keeps one line per report.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ConnectionLog for RecordingLog {
    fn response_generated(&self, resp_size: usize, body_size: u64) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("resp_size={resp_size}, body_size={body_size}"));
    }

    fn failed(&self, error: &dyn std::error::Error) {
        self.lines.lock().unwrap().push(format!("error: {error}"));
    }
}

/// A server running on an ephemeral loopback port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub server: Arc<Server>,
    pub log: Arc<RecordingLog>,
    pub shutdown: Shutdown,
    pub accept_loop: tokio::task::JoinHandle<Result<(), resplen::net::ListenerError>>,
}

/// Bind on 127.0.0.1:0 and start accepting.
pub async fn start_server(config: &ResponseConfig) -> RunningServer {
    let listener = Listener::from_tcp(
        tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap(),
        64,
    );
    let addr = listener.local_addr().unwrap();

    let log = Arc::new(RecordingLog::default());
    let config = ResplenConfig {
        response: config.clone(),
        ..ResplenConfig::default()
    };
    let server = Arc::new(Server::new(&config).with_log(log.clone()));
    let shutdown = Shutdown::new();
    let accept_loop = tokio::spawn(Arc::clone(&server).run(listener, shutdown.subscribe()));

    RunningServer {
        addr,
        server,
        log,
        shutdown,
        accept_loop,
    }
}

/// Send `raw` and read until the server closes the connection.
pub async fn round_trip(addr: SocketAddr, raw: &str) -> Vec<u8> {
    round_trip_bytes(addr, raw.as_bytes()).await
}

/// Like [`round_trip`], for requests that carry a binary body.
pub async fn round_trip_bytes(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut resp = Vec::new();
    stream.read_to_end(&mut resp).await.unwrap();
    resp
}
