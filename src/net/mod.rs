//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, one task per connection)
//!     → connection.rs (id, tracking, byte copy into the output sink)
//!     → stdout
//!
//! HTTPS mode:
//!     tls.rs (load static cert/key pair) → handed to the HTTP server
//! ```
//!
//! # Design Decisions
//! - No connection cap, no idle timeout, no framing
//! - Accept errors are logged and the loop keeps going

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{handle_connection, ConnectionId, OutputSink, StdoutSink};
pub use listener::{ListenerError, TcpSink};
