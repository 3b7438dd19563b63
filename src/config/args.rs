//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::Settings;

/// Stream TCP connections to stdout, or serve the current directory over HTTP(S).
#[derive(Debug, Default, Parser)]
#[command(name = "netsink", version)]
pub struct Args {
    /// TOML file with the same settings; explicit flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interface to listen on for TCP connections [default: 0.0.0.0]
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Port to listen on for TCP connections [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve files over HTTP on this port instead of listening for TCP
    #[arg(long, value_name = "PORT")]
    pub serve: Option<u16>,

    /// Directory to serve in HTTP mode [default: .]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to TLS certificate file (PEM)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS key file (PEM)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,

    /// Username for basic authentication
    #[arg(long, env = "NETSINK_AUTH_USER")]
    pub auth_user: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "NETSINK_AUTH_PASS", hide_env_values = true)]
    pub auth_pass: Option<String>,

    /// Append log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level: debug, info, warn, error [default: info]
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Overwrite every field of `settings` that was given on the command line.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(interface) = &self.interface {
            settings.tcp.interface = interface.clone();
        }
        if let Some(port) = self.port {
            settings.tcp.port = port;
        }
        if let Some(port) = self.serve {
            settings.http.port = Some(port);
        }
        if let Some(root) = &self.root {
            settings.http.root = root.clone();
        }
        if let Some(cert) = &self.tls_cert {
            settings.http.tls_cert = Some(cert.clone());
        }
        if let Some(key) = &self.tls_key {
            settings.http.tls_key = Some(key.clone());
        }
        if let Some(user) = &self.auth_user {
            settings.http.auth_user = Some(user.clone());
        }
        if let Some(pass) = &self.auth_pass {
            settings.http.auth_pass = Some(pass.clone());
        }
        if let Some(file) = &self.log_file {
            settings.logging.file = Some(file.clone());
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
    }
}
