//! Connection and request events.
//!
//! # Responsibilities
//! - Define the logging capability handed to the TCP sink and the HTTP server
//! - Emit those events as structured `tracing` records in production
//!
//! # Design Decisions
//! - Constructed once at startup and passed as `Arc<dyn EventSink>`
//! - Tests swap in a recording implementation instead of scraping log output

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::net::connection::ConnectionId;

/// Everything captured about one completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub method: Method,
    pub path: String,
    pub remote: Option<SocketAddr>,
    pub status: StatusCode,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Receiver for everything worth logging at runtime.
pub trait EventSink: Send + Sync + 'static {
    /// A TCP connection was accepted and its handler started.
    fn connection_opened(&self, id: ConnectionId, peer: SocketAddr);

    /// A TCP handler finished. `error` is set when the copy loop failed.
    fn connection_closed(
        &self,
        id: ConnectionId,
        peer: SocketAddr,
        bytes: u64,
        error: Option<&io::Error>,
    );

    /// `accept()` failed; the listener keeps going.
    fn accept_failed(&self, error: &io::Error);

    /// The TCP accept loop exited. Handlers still running are left alone.
    fn tcp_accept_stopped(&self, active_connections: usize);

    /// An HTTP response finished streaming (or was abandoned by the client).
    fn request_completed(&self, record: &ResponseRecord);

    /// The HTTP server stopped accepting and started draining.
    fn http_shutdown_started(&self, grace_period: Duration, open_connections: usize);

    /// The HTTP server finished draining, or gave up after the grace period.
    fn http_shutdown_complete(&self);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn connection_opened(&self, id: ConnectionId, peer: SocketAddr) {
        tracing::info!(connection_id = %id, peer_addr = %peer, "TCP connection established");
    }

    fn connection_closed(
        &self,
        id: ConnectionId,
        peer: SocketAddr,
        bytes: u64,
        error: Option<&io::Error>,
    ) {
        if let Some(e) = error {
            tracing::error!(
                connection_id = %id,
                peer_addr = %peer,
                error = %e,
                "Error while reading from TCP connection"
            );
        }
        tracing::info!(connection_id = %id, peer_addr = %peer, bytes, "TCP connection closed");
    }

    fn accept_failed(&self, error: &io::Error) {
        tracing::error!(error = %error, "Error accepting TCP connection");
    }

    fn tcp_accept_stopped(&self, active_connections: usize) {
        tracing::info!(active_connections, "Stopped accepting TCP connections");
    }

    fn request_completed(&self, record: &ResponseRecord) {
        tracing::info!(
            status = record.status.as_u16(),
            method = %record.method,
            path = %record.path,
            bytes = record.bytes,
            elapsed = ?record.elapsed,
            remote = ?record.remote,
            "HTTP {} {} {} {} bytes",
            record.status.as_u16(),
            record.method,
            record.path,
            record.bytes
        );
    }

    fn http_shutdown_started(&self, grace_period: Duration, open_connections: usize) {
        tracing::info!(?grace_period, open_connections, "Shutting down HTTP server...");
    }

    fn http_shutdown_complete(&self) {
        tracing::info!("HTTP server shut down gracefully");
    }
}
