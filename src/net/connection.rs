//! Per-connection handling for the TCP sink.
//!
//! # Responsibilities
//! - Generate unique connection IDs for log correlation
//! - Track how many handlers are currently running
//! - Copy every received byte to the output sink, in order

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::observability::EventSink;

/// Read buffer size for the copy loop.
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts running connection handlers. Not a limit.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    /// Get current active connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(connection_id = %self.id, "Connection released");
    }
}

/// Where received bytes go. One writer is opened per connection.
pub trait OutputSink: Send + Sync + 'static {
    type Writer: AsyncWrite + Unpin + Send + 'static;

    fn open(&self, id: ConnectionId) -> Self::Writer;
}

/// The process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    type Writer = tokio::io::Stdout;

    fn open(&self, _id: ConnectionId) -> Self::Writer {
        tokio::io::stdout()
    }
}

/// Copy everything read from `stream` into `output` until EOF or error.
///
/// Emits exactly one open and one close event. The stream is dropped before
/// the close event fires, on every exit path. Returns the bytes delivered.
pub async fn handle_connection<S, W>(
    mut stream: S,
    peer: SocketAddr,
    id: ConnectionId,
    mut output: W,
    events: &dyn EventSink,
) -> u64
where
    S: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    events.connection_opened(id, peer);

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;

    let error = loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break None,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Some(e),
        };

        if let Err(e) = write_chunk(&mut output, &buf[..n]).await {
            break Some(e);
        }
        total += n as u64;
    };

    drop(stream);
    events.connection_closed(id, peer, total, error.as_ref());
    total
}

async fn write_chunk<W: AsyncWrite + Unpin>(output: &mut W, chunk: &[u8]) -> io::Result<()> {
    output.write_all(chunk).await?;
    output.flush().await
}
