//! Per-request response capture.
//!
//! # Responsibilities
//! - Record status code and body bytes actually handed to the client
//! - Report one [`ResponseRecord`] per request once the body is finished
//!
//! # Design Decisions
//! - The body is decorated rather than buffered, so large files still stream
//! - The record fires on end-of-stream or on drop, whichever comes first

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use hyper::body::{Body as HttpBody, Frame, SizeHint};

use crate::observability::{EventSink, ResponseRecord};

/// Status and byte count for one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCapture {
    status: Option<StatusCode>,
    bytes: u64,
}

impl ResponseCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// First write wins; later calls are ignored.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// 200 until a status has been set.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn record(&mut self, written: usize) {
        self.bytes = self.bytes.saturating_add(written as u64);
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

/// Request metadata waiting for the response to finish.
struct PendingRecord {
    method: Method,
    path: String,
    remote: Option<SocketAddr>,
    started: Instant,
    events: Arc<dyn EventSink>,
}

/// Body decorator that counts data frames as they pass through.
pub struct RecordingBody<B> {
    inner: B,
    capture: ResponseCapture,
    pending: Option<PendingRecord>,
}

impl<B> RecordingBody<B> {
    fn new(inner: B, capture: ResponseCapture, pending: PendingRecord) -> Self {
        Self {
            inner,
            capture,
            pending: Some(pending),
        }
    }

    fn finish(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        pending.events.request_completed(&ResponseRecord {
            method: pending.method,
            path: pending.path,
            remote: pending.remote,
            status: self.capture.status(),
            bytes: self.capture.bytes(),
            elapsed: pending.started.elapsed(),
        });
    }
}

impl<B> HttpBody for RecordingBody<B>
where
    B: HttpBody<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.capture.record(data.len());
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => this.finish(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for RecordingBody<B> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Middleware that wraps every response body in a [`RecordingBody`].
pub async fn record_response(
    State(events): State<Arc<dyn EventSink>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    let mut capture = ResponseCapture::new();
    capture.set_status(parts.status);

    let body = RecordingBody::new(
        body,
        capture,
        PendingRecord {
            method,
            path,
            remote,
            started,
            events,
        },
    );

    Response::from_parts(parts, Body::new(body))
}
