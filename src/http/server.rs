//! Connection handling and the accept loop.
//!
//! # Responsibilities
//! - Run one request/response exchange per accepted connection
//! - Report each connection's outcome to the injected [`ConnectionLog`]
//! - Close every connection exactly once, whatever the outcome
//! - Spawn an independent task per connection until shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::ResplenConfig;
use crate::http::request::RequestReader;
use crate::http::response::ResponseGenerator;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::observability::{ConnectionLog, TracingLog};

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Serves synthetic-length responses.
pub struct Server {
    reader: RequestReader,
    generator: ResponseGenerator,
    log: Arc<dyn ConnectionLog>,
    tracker: ConnectionTracker,
}

impl Server {
    /// Create a server from the request and response sections of the config,
    /// logging via tracing.
    pub fn new(config: &ResplenConfig) -> Self {
        Self::from_parts(
            RequestReader::from_config(&config.request, config.response.max_length),
            ResponseGenerator::from_config(&config.response),
            Arc::new(TracingLog),
        )
    }

    /// Assemble a server from explicit collaborators.
    pub fn from_parts(
        reader: RequestReader,
        generator: ResponseGenerator,
        log: Arc<dyn ConnectionLog>,
    ) -> Self {
        Self {
            reader,
            generator,
            log,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Replace the connection log.
    pub fn with_log(mut self, log: Arc<dyn ConnectionLog>) -> Self {
        self.log = log;
        self
    }

    /// Connections spawned by [`Server::run`] that are still in flight.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Handle one connection start to finish, then close it.
    pub async fn serve_conn<S>(&self, mut conn: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.exchange(&mut conn).await;

        if let Err(e) = conn.shutdown().await {
            tracing::debug!(error = %e, "Connection shutdown failed");
        }
    }

    async fn exchange<S>(&self, conn: &mut S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let req = match self.reader.read(conn).await {
            Ok(req) => req,
            Err(e) => {
                self.log.failed(&e);
                return;
            }
        };

        let resp = match self.generator.generate(&req) {
            Ok(resp) => resp,
            Err(e) => {
                // Only reachable if the bounds disagree or the body cannot be allocated.
                tracing::error!(error = %e, protocol = %req.protocol, length = req.length, "Validated request rejected by generator");
                self.log.failed(&e);
                return;
            }
        };
        self.log
            .response_generated(resp.len(), req.length.unsigned_abs());

        let written = async {
            conn.write_all(&resp).await?;
            conn.flush().await
        };
        if let Err(e) = written.await {
            self.log.failed(&e);
        }
    }

    /// Accept connections until `shutdown` fires, one task per connection.
    ///
    /// Returns once the accept loop has stopped; use [`Server::tracker`] to
    /// wait for connections still in flight.
    pub async fn run(
        self: Arc<Self>,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(address = %addr, "Accepting connections");

        loop {
            let (stream, peer, permit) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(ListenerError::Accept(e)) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                _ = shutdown.recv() => {
                    tracing::info!(in_flight = self.tracker.active_count(), "Accept loop stopped");
                    return Ok(());
                }
            };

            let guard = self.tracker.track();
            let span = tracing::info_span!("connection", id = %guard.id(), peer = %peer);
            let server = Arc::clone(&self);
            tokio::spawn(
                async move {
                    let _permit = permit;
                    let _guard = guard;
                    server.serve_conn(stream).await;
                }
                .instrument(span),
            );
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("reader", &self.reader)
            .field("generator", &self.generator)
            .field("in_flight", &self.tracker.active_count())
            .finish()
    }
}
