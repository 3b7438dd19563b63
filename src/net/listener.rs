//! TCP sink listener.
//!
//! # Responsibilities
//! - Bind to the configured interface and port
//! - Accept incoming TCP connections and hand each one to its own task
//! - Keep accepting after accept errors
//! - Stop accepting when the shutdown token fires

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::lifecycle::ShutdownToken;
use crate::net::connection::{handle_connection, ConnectionTracker, OutputSink};
use crate::observability::EventSink;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Accept loop that streams every connection into an [`OutputSink`].
///
/// There is no connection limit and no idle timeout; a peer that never
/// closes keeps its handler alive.
pub struct TcpSink {
    inner: TcpListener,
    tracker: ConnectionTracker,
}

impl TcpSink {
    /// Bind `interface:port`. `interface` may be a host name or IP literal.
    pub async fn bind(interface: &str, port: u16) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind((interface, port))
            .await
            .map_err(|source| ListenerError::Bind {
                address: format!("{}:{}", interface, port),
                source,
            })?;

        Ok(Self::from_listener(listener))
    }

    /// Wrap an already-bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self {
            inner: listener,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Shared view of the active connection count.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Accept until `shutdown` fires.
    ///
    /// Handlers already running are left alone when the loop exits.
    pub async fn run<O: OutputSink>(
        self,
        output: Arc<O>,
        events: Arc<dyn EventSink>,
        mut shutdown: ShutdownToken,
    ) {
        match self.inner.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "Listening for TCP connections"),
            Err(e) => {
                tracing::warn!(error = %e, "Listening for TCP connections on unknown address")
            }
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.inner.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    events.accept_failed(&e);
                    continue;
                }
            };

            let guard = self.tracker.track();
            tracing::debug!(
                connection_id = %guard.id(),
                peer_addr = %peer,
                active_connections = self.tracker.active_count(),
                "Connection accepted"
            );

            let writer = output.open(guard.id());
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                handle_connection(stream, peer, guard.id(), writer, events.as_ref()).await;
                drop(guard);
            });
        }

        events.tcp_accept_stopped(self.tracker.active_count() as usize);
    }
}
