//! Startup orchestration.
//!
//! # Responsibilities
//! - Dispatch to the TCP sink or the HTTP server based on settings
//! - Load TLS material and bind listeners, failing fast on any error
//! - Wire OS signals into the shutdown token

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{HttpConfig, Mode, Settings};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown, ShutdownToken};
use crate::net::tls::{load_tls_config, TlsError};
use crate::net::{ListenerError, StdoutSink, TcpSink};
use crate::observability::EventSink;

/// Fatal errors; any of these ends the process with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("Failed to load TLS configuration: {0}")]
    Tls(#[from] TlsError),
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the configured mode until SIGINT/SIGTERM.
pub async fn run(settings: Settings, events: Arc<dyn EventSink>) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    signals::trigger_on_signal(shutdown.clone());
    run_until(settings, events, shutdown.token()).await
}

/// Run the configured mode until `shutdown` fires.
pub async fn run_until(
    settings: Settings,
    events: Arc<dyn EventSink>,
    shutdown: ShutdownToken,
) -> Result<(), StartupError> {
    match settings.mode() {
        Mode::Tcp { interface, port } => {
            let sink = TcpSink::bind(&interface, port).await?;
            sink.run(Arc::new(StdoutSink), events, shutdown).await;
            Ok(())
        }
        Mode::Http { port } => serve_http(&settings.http, port, events, shutdown).await,
    }
}

async fn serve_http(
    config: &HttpConfig,
    port: u16,
    events: Arc<dyn EventSink>,
    shutdown: ShutdownToken,
) -> Result<(), StartupError> {
    if config.auth_half_configured() {
        tracing::warn!("Only one of auth-user/auth-pass is set; basic authentication disabled");
    }
    if config.tls_half_configured() {
        tracing::warn!("Only one of tls-cert/tls-key is set; serving plain HTTP");
    }
    if let Some(credentials) = config.credentials() {
        tracing::info!(user = credentials.user(), "Basic authentication enabled");
    }

    let mut server = HttpServer::new(config, events);
    if let Some(paths) = config.tls_paths() {
        let tls = load_tls_config(&paths).await?;
        tracing::info!(cert = ?paths.cert, key = ?paths.key, "TLS enabled");
        server = server.with_tls(tls);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = std::net::TcpListener::bind(addr).map_err(|source| ListenerError::Bind {
        address: addr.to_string(),
        source,
    })?;

    tracing::info!(root = ?config.root, "Serving files");
    server.run(listener, shutdown).await.map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::TracingEvents;

    #[tokio::test]
    async fn tls_failure_is_fatal() {
        let mut settings = Settings::default();
        settings.http.port = Some(0);
        settings.http.tls_cert = Some("/nonexistent/netsink.crt".into());
        settings.http.tls_key = Some("/nonexistent/netsink.key".into());

        let err = run_until(settings, Arc::new(TracingEvents), Shutdown::new().token())
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Tls(TlsError::NotFound(_))));
    }

    #[tokio::test]
    async fn tcp_bind_failure_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut settings = Settings::default();
        settings.tcp.interface = "127.0.0.1".into();
        settings.tcp.port = taken.local_addr().unwrap().port();

        let err = run_until(settings, Arc::new(TracingEvents), Shutdown::new().token())
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Listener(ListenerError::Bind { .. })));
    }

    #[tokio::test]
    async fn tcp_mode_returns_after_shutdown() {
        let mut settings = Settings::default();
        settings.tcp.interface = "127.0.0.1".into();
        settings.tcp.port = 0;

        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            run_until(settings, Arc::new(TracingEvents), shutdown.token()),
        )
        .await
        .expect("listener should stop")
        .unwrap();
    }
}
