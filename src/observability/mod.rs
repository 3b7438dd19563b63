//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! TCP sink / HTTP server
//!     → events.rs (EventSink: connection and request events)
//!     → TracingEvents (structured tracing records)
//!     → logging.rs (subscriber: stderr or log file)
//! ```

pub mod events;
pub mod logging;

pub use events::{EventSink, ResponseRecord, TracingEvents};
