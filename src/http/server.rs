//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: static files behind auth and response capture
//! - Fall back to a generated listing for directories without an index
//! - Serve over plain HTTP or HTTPS from an already-bound listener
//! - Drain in-flight requests for a bounded grace period on shutdown

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{body::Body, http::Request, middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tower::{service_fn, ServiceBuilder};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::HttpConfig;
use crate::http::auth::{basic_auth_middleware, AuthGate};
use crate::http::capture::record_response;
use crate::http::listing;
use crate::lifecycle::ShutdownToken;
use crate::observability::EventSink;

/// Static file server.
pub struct HttpServer {
    router: Router,
    tls: Option<RustlsConfig>,
    events: Arc<dyn EventSink>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// TLS is attached separately with [`HttpServer::with_tls`] since loading
    /// the key pair is async and fallible.
    pub fn new(config: &HttpConfig, events: Arc<dyn EventSink>) -> Self {
        let gate = AuthGate::new(config.credentials());
        Self {
            router: build_router(&config.root, gate, Arc::clone(&events)),
            tls: None,
            events,
        }
    }

    pub fn with_tls(mut self, tls: RustlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// After cancellation no new connections are accepted. Open connections
    /// get the token's grace period before they are closed.
    pub async fn run(
        self,
        listener: std::net::TcpListener,
        mut shutdown: ShutdownToken,
    ) -> Result<(), std::io::Error> {
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let handle = Handle::new();

        let watcher = {
            let handle = handle.clone();
            let events = Arc::clone(&self.events);
            tokio::spawn(async move {
                shutdown.cancelled().await;
                events.http_shutdown_started(shutdown.grace_period(), handle.connection_count());
                handle.graceful_shutdown(Some(shutdown.grace_period()));
            })
        };

        tracing::info!(address = %addr, tls = self.tls.is_some(), "Starting HTTP server");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = match self.tls {
            Some(tls) => {
                axum_server::from_tcp_rustls(listener, tls)
                    .handle(handle)
                    .serve(app)
                    .await
            }
            None => axum_server::from_tcp(listener).handle(handle).serve(app).await,
        };

        watcher.abort();
        served?;

        self.events.http_shutdown_complete();
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Outermost first: trace span, response capture, auth gate, files. A 401
/// from the gate is therefore captured and logged like any other response.
/// Directories without an `index.html` get a generated listing.
pub fn build_router(root: &Path, gate: AuthGate, events: Arc<dyn EventSink>) -> Router {
    let listing_root = Arc::new(root.to_path_buf());
    let list_dirs = service_fn(move |request: Request<Body>| {
        let root = Arc::clone(&listing_root);
        async move { Ok::<_, Infallible>(listing::render(&root, request.uri().path()).await) }
    });

    Router::new().fallback_service(ServeDir::new(root).fallback(list_dirs)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(events, record_response))
            .layer(middleware::from_fn_with_state(gate, basic_auth_middleware)),
    )
}
