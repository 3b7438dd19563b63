//! HTTP Basic authentication gate.
//!
//! With credentials configured, every request must carry a matching
//! `Authorization: Basic` header or it is answered with 401 and never reaches
//! the file server. Without credentials the gate passes everything through.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;

use crate::config::Credentials;

/// Value of the `WWW-Authenticate` challenge.
pub const CHALLENGE: &str = r#"Basic realm="Restricted""#;

/// Shared gate state for [`basic_auth_middleware`].
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    credentials: Option<Arc<Credentials>>,
}

impl AuthGate {
    /// `None` disables the gate.
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials: credentials.map(Arc::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether a request with these headers may proceed.
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.credentials else {
            return true;
        };

        headers
            .get(header::AUTHORIZATION)
            .and_then(parse_basic)
            .is_some_and(|(user, pass)| expected.matches(&user, &pass))
    }
}

/// Decode an `Authorization: Basic <base64(user:pass)>` header.
///
/// The scheme name is matched case-insensitively; the password may contain
/// colons, only the first one separates it from the user.
pub fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;

    Some((user.to_string(), pass.to_string()))
}

pub async fn basic_auth_middleware(
    State(gate): State<AuthGate>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if gate.allows(request.headers()) {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Rejected request without valid credentials");
    unauthorized()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (header::WWW_AUTHENTICATE, CHALLENGE),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        "Unauthorized\n",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn basic(user: &str, pass: &str) -> String {
        let raw = format!("{}:{}", user, pass);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }

    fn app(gate: AuthGate) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(gate, basic_auth_middleware))
    }

    async fn status_for(gate: AuthGate, authorization: Option<&str>) -> Response {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app(gate).oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    fn enabled() -> AuthGate {
        AuthGate::new(Credentials::new("alice", "s3cr:et"))
    }

    #[test]
    fn parses_basic_header() {
        let value = HeaderValue::from_str(&basic("alice", "s3cr:et")).unwrap();
        assert_eq!(
            parse_basic(&value),
            Some(("alice".to_string(), "s3cr:et".to_string()))
        );

        let lower = HeaderValue::from_str(&basic("a", "b").replacen("Basic", "basic", 1)).unwrap();
        assert_eq!(parse_basic(&lower), Some(("a".into(), "b".into())));
    }

    #[test]
    fn rejects_malformed_headers() {
        for raw in ["Bearer abc", "Basic", "Basic !!!notbase64", "Basic dXNlcg=="] {
            let value = HeaderValue::from_static(raw);
            assert_eq!(parse_basic(&value), None, "{}", raw);
        }
    }

    #[tokio::test]
    async fn missing_credentials_get_challenge() {
        let response = status_for(enabled(), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], CHALLENGE);
    }

    #[tokio::test]
    async fn wrong_credentials_rejected() {
        let response = status_for(enabled(), Some(&basic("alice", "wrong"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = status_for(enabled(), Some(&basic("ALICE", "s3cr:et"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn matching_credentials_pass() {
        let response = status_for(enabled(), Some(&basic("alice", "s3cr:et"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn disabled_gate_passes_everything() {
        let gate = AuthGate::new(Credentials::new("alice", ""));
        assert!(!gate.is_enabled());

        assert_eq!(status_for(gate.clone(), None).await.status(), StatusCode::OK);
        assert_eq!(
            status_for(gate, Some(&basic("bob", "nope"))).await.status(),
            StatusCode::OK
        );
    }
}
