//! TLS configuration and certificate loading.

use std::io;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("TLS file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Failed to read TLS file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed PEM data: {0}")]
    InvalidPem(#[source] io::Error),
    #[error("No certificates found in {0:?}")]
    NoCertificates(PathBuf),
    #[error("No private key found in {0:?}")]
    NoPrivateKey(PathBuf),
    #[error("Rejected certificate/key pair: {0}")]
    Rustls(#[source] io::Error),
}

/// Load the static certificate/key pair used for HTTPS.
pub async fn load_tls_config(paths: &TlsPaths) -> Result<RustlsConfig, TlsError> {
    let cert = read_pem(&paths.cert).await?;
    let key = read_pem(&paths.key).await?;

    check_certificates(&cert, &paths.cert)?;
    check_private_key(&key, &paths.key)?;

    RustlsConfig::from_pem(cert, key).await.map_err(TlsError::Rustls)
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => TlsError::NotFound(path.to_path_buf()),
        _ => TlsError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn check_certificates(pem: &[u8], path: &Path) -> Result<(), TlsError> {
    let mut reader = pem;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TlsError::InvalidPem)?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(())
}

fn check_private_key(pem: &[u8], path: &Path) -> Result<(), TlsError> {
    let mut reader = pem;
    match rustls_pemfile::private_key(&mut reader).map_err(TlsError::InvalidPem)? {
        Some(_) => Ok(()),
        None => Err(TlsError::NoPrivateKey(path.to_path_buf())),
    }
}
