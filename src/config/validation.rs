//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntax)
//! - Check that the served root and TLS files exist in HTTP mode
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Half-configured TLS or auth pairs are not errors; they disable the feature

use std::path::PathBuf;

use crate::config::schema::{Mode, Settings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tcp.interface must not be empty")]
    EmptyInterface,
    #[error("http.root {0:?} is not a directory")]
    RootNotDirectory(PathBuf),
    #[error("TLS certificate file not found: {0:?}")]
    CertNotFound(PathBuf),
    #[error("TLS private key file not found: {0:?}")]
    KeyNotFound(PathBuf),
}

pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match settings.mode() {
        Mode::Tcp { interface, .. } => {
            if interface.trim().is_empty() {
                errors.push(ValidationError::EmptyInterface);
            }
        }
        Mode::Http { .. } => {
            if !settings.http.root.is_dir() {
                errors.push(ValidationError::RootNotDirectory(settings.http.root.clone()));
            }
            if let Some(tls) = settings.http.tls_paths() {
                if !tls.cert.is_file() {
                    errors.push(ValidationError::CertNotFound(tls.cert));
                }
                if !tls.key.is_file() {
                    errors.push(ValidationError::KeyNotFound(tls.key));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&Settings::default()).is_ok());
    }

    #[test]
    fn empty_interface_rejected_in_tcp_mode() {
        let mut settings = Settings::default();
        settings.tcp.interface = "  ".into();
        assert_eq!(
            validate_config(&settings),
            Err(vec![ValidationError::EmptyInterface])
        );
    }

    #[test]
    fn collects_every_http_error() {
        let mut settings = Settings::default();
        settings.http.port = Some(8000);
        settings.http.root = "/nonexistent/netsink-root".into();
        settings.http.tls_cert = Some("/nonexistent/cert.pem".into());
        settings.http.tls_key = Some("/nonexistent/key.pem".into());

        let errors = validate_config(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::RootNotDirectory(
            "/nonexistent/netsink-root".into()
        )));
        assert!(errors.contains(&ValidationError::CertNotFound("/nonexistent/cert.pem".into())));
        assert!(errors.contains(&ValidationError::KeyNotFound("/nonexistent/key.pem".into())));
    }

    #[test]
    fn half_configured_tls_is_not_checked() {
        let mut settings = Settings::default();
        settings.http.port = Some(8000);
        settings.http.tls_cert = Some("/nonexistent/cert.pem".into());
        assert!(validate_config(&settings).is_ok());
    }
}
