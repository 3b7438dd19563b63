//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → args.rs (explicit flags override file values)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Settings are resolved once at startup and never change
//! - All fields have defaults so no file is required

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_config, resolve, ConfigError};
pub use schema::{Credentials, HttpConfig, LoggingConfig, Mode, Settings, TcpConfig, TlsPaths};
