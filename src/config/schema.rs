//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same settings can come from a TOML
//! file or from command-line flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// TCP sink settings (used unless `http.port` is set).
    pub tcp: TcpConfig,

    /// Static file server settings.
    pub http: HttpConfig,

    /// Log destination and verbosity.
    pub logging: LoggingConfig,
}

/// TCP sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TcpConfig {
    /// Interface to bind (host name or IP literal).
    pub interface: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            interface: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// HTTP file server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Port to serve on. Setting it selects HTTP mode.
    pub port: Option<u16>,

    /// Directory to serve.
    pub root: PathBuf,

    /// PEM certificate chain.
    pub tls_cert: Option<PathBuf>,

    /// PEM private key.
    pub tls_key: Option<PathBuf>,

    /// Basic auth username.
    pub auth_user: Option<String>,

    /// Basic auth password.
    pub auth_pass: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: None,
            root: PathBuf::from("."),
            tls_cert: None,
            tls_key: None,
            auth_user: None,
            auth_pass: None,
        }
    }
}

impl HttpConfig {
    /// Certificate and key, only when both are configured.
    pub fn tls_paths(&self) -> Option<TlsPaths> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key))
                if !cert.as_os_str().is_empty() && !key.as_os_str().is_empty() =>
            {
                Some(TlsPaths {
                    cert: cert.clone(),
                    key: key.clone(),
                })
            }
            _ => None,
        }
    }

    /// True when exactly one of the TLS paths is set.
    pub fn tls_half_configured(&self) -> bool {
        let set = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| !p.as_os_str().is_empty());
        set(&self.tls_cert) != set(&self.tls_key)
    }

    /// Username and password, only when both are non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::new(
            self.auth_user.as_deref().unwrap_or_default(),
            self.auth_pass.as_deref().unwrap_or_default(),
        )
    }

    /// True when exactly one of the credentials is set.
    pub fn auth_half_configured(&self) -> bool {
        let set = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.auth_user) != set(&self.auth_pass)
    }
}

/// Log destination and verbosity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,

    /// Free-form level name; `debug` also enables microsecond timestamps.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

/// Certificate/key pair for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fixed Basic auth credentials. Both parts are guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    pass: String,
}

impl Credentials {
    /// Returns `None` if either part is empty, which disables auth.
    pub fn new(user: &str, pass: &str) -> Option<Self> {
        if user.is_empty() || pass.is_empty() {
            return None;
        }
        Some(Self {
            user: user.to_string(),
            pass: pass.to_string(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Exact, case-sensitive comparison.
    pub fn matches(&self, user: &str, pass: &str) -> bool {
        self.user == user && self.pass == pass
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Which of the two modes to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Stream inbound TCP bytes to stdout.
    Tcp { interface: String, port: u16 },
    /// Serve files over HTTP(S).
    Http { port: u16 },
}

impl Settings {
    pub fn mode(&self) -> Mode {
        match self.http.port {
            Some(port) => Mode::Http { port },
            None => Mode::Tcp {
                interface: self.tcp.interface.clone(),
                port: self.tcp.port,
            },
        }
    }
}
