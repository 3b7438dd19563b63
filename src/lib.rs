//! netsink: stream TCP connections to stdout, or serve a directory over HTTP(S).
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!     CLI flags / TOML ─▶│ config ─▶ Settings ─▶ lifecycle::startup   │
//!                        │                          │                 │
//!                        │            ┌─────────────┴──────────┐      │
//!                        │            ▼                        ▼      │
//!     TCP peers ────────▶│  net::listener ─▶ net::connection ─▶ stdout│
//!                        │                                            │
//!     HTTP(S) clients ──▶│  http::server ─▶ capture ─▶ auth ─▶ files  │
//!                        │                                            │
//!                        │  observability (EventSink, tracing)        │
//!                        │  lifecycle (signals, shutdown token)       │
//!                        └────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::Settings;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::TcpSink;
