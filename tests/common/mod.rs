//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use netsink::config::HttpConfig;
use netsink::lifecycle::ShutdownToken;
use netsink::net::{ConnectionId, OutputSink};
use netsink::observability::{EventSink, ResponseRecord};
use netsink::HttpServer;
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;

/// Everything the event sink was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Opened { id: ConnectionId, peer: SocketAddr },
    Closed {
        id: ConnectionId,
        peer: SocketAddr,
        bytes: u64,
        error: Option<io::ErrorKind>,
    },
    AcceptFailed,
    AcceptStopped { active_connections: usize },
    Request(ResponseRecord),
    HttpShutdownStarted { grace_period: Duration },
    HttpShutdownComplete,
}

#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<Event>>,
}

impl RecordingEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ResponseRecord> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                Event::Request(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn closed_for(
        &self,
        peer: SocketAddr,
    ) -> Vec<(ConnectionId, u64, Option<io::ErrorKind>)> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                Event::Closed {
                    id,
                    peer: p,
                    bytes,
                    error,
                } if p == peer => Some((id, bytes, error)),
                _ => None,
            })
            .collect()
    }

    pub fn opened_id(&self, peer: SocketAddr) -> Option<ConnectionId> {
        self.snapshot().into_iter().find_map(|e| match e {
            Event::Opened { id, peer: p } if p == peer => Some(id),
            _ => None,
        })
    }

    /// Lifecycle events only, in the order they happened.
    pub fn lifecycle(&self) -> Vec<Event> {
        self.snapshot()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::AcceptStopped { .. }
                        | Event::HttpShutdownStarted { .. }
                        | Event::HttpShutdownComplete
                )
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl EventSink for RecordingEvents {
    fn connection_opened(&self, id: ConnectionId, peer: SocketAddr) {
        self.push(Event::Opened { id, peer });
    }

    fn connection_closed(
        &self,
        id: ConnectionId,
        peer: SocketAddr,
        bytes: u64,
        error: Option<&io::Error>,
    ) {
        self.push(Event::Closed {
            id,
            peer,
            bytes,
            error: error.map(|e| e.kind()),
        });
    }

    fn accept_failed(&self, _error: &io::Error) {
        self.push(Event::AcceptFailed);
    }

    fn tcp_accept_stopped(&self, active_connections: usize) {
        self.push(Event::AcceptStopped { active_connections });
    }

    fn request_completed(&self, record: &ResponseRecord) {
        self.push(Event::Request(record.clone()));
    }

    fn http_shutdown_started(&self, grace_period: Duration, _open_connections: usize) {
        self.push(Event::HttpShutdownStarted { grace_period });
    }

    fn http_shutdown_complete(&self) {
        self.push(Event::HttpShutdownComplete);
    }
}

/// In-memory stand-in for stdout, keeping each connection's bytes apart.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    store: Arc<Mutex<HashMap<ConnectionId, Vec<u8>>>>,
}

impl MemorySink {
    pub fn output(&self, id: ConnectionId) -> Vec<u8> {
        self.store.lock().unwrap().get(&id).cloned().unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    type Writer = MemoryWriter;

    fn open(&self, id: ConnectionId) -> MemoryWriter {
        self.store.lock().unwrap().entry(id).or_default();
        MemoryWriter {
            id,
            store: Arc::clone(&self.store),
        }
    }
}

pub struct MemoryWriter {
    id: ConnectionId,
    store: Arc<Mutex<HashMap<ConnectionId, Vec<u8>>>>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.store
            .lock()
            .unwrap()
            .entry(self.id)
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh directory under the system temp dir, populated with `files`.
pub fn served_dir(files: &[(&str, &[u8])]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "netsink-test-{}-{}",
        std::process::id(),
        DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    dir
}

pub fn http_config(root: &Path) -> HttpConfig {
    HttpConfig {
        port: Some(0),
        root: root.to_path_buf(),
        ..HttpConfig::default()
    }
}

/// Start `server` on an ephemeral loopback port.
pub fn spawn_server(
    server: HttpServer,
    shutdown: ShutdownToken,
) -> (SocketAddr, JoinHandle<io::Result<()>>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown));
    (addr, handle)
}

/// Poll `check` until it returns true or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
