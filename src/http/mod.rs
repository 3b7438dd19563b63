//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server, graceful shutdown)
//!     → capture.rs (status + byte count, logged when the body finishes)
//!     → auth.rs (Basic auth gate, 401 on mismatch)
//!     → ServeDir (static files from the served root)
//!     → listing.rs (index page for directories without index.html)
//! ```

pub mod auth;
pub mod capture;
pub mod listing;
pub mod server;

pub use auth::AuthGate;
pub use capture::{ResponseCapture, RecordingBody};
pub use server::{build_router, HttpServer};
