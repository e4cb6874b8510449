//! HTTP Basic authentication for the administrative surface.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AdminAuthState {
    pub admin_user: String,
    pub admin_pass: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Parse `Authorization: Basic <base64(user:pass)>` into its credential pair.
fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Admin Area\"")],
        "Authentication required.",
    )
        .into_response()
}

pub async fn admin_auth_middleware(
    State(auth): State<Arc<AdminAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_credentials);

    match credentials {
        Some((user, pass))
            if secure_compare(&user, &auth.admin_user)
                && secure_compare(&pass, &auth.admin_pass) =>
        {
            next.run(request).await
        }
        _ => {
            tracing::debug!("Rejected admin request without valid credentials");
            unauthorized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_basic_header() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("admin:s3cret");
        let parsed = parse_basic_credentials(&format!("Basic {}", encoded)).unwrap();
        assert_eq!(parsed, ("admin".to_string(), "s3cret".to_string()));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(parse_basic_credentials("Bearer token").is_none());
        assert!(parse_basic_credentials("Basic !!!notbase64!!!").is_none());
        let no_colon = base64::engine::general_purpose::STANDARD.encode("justuser");
        assert!(parse_basic_credentials(&format!("Basic {}", no_colon)).is_none());
    }

    #[test]
    fn secure_compare_requires_exact_match() {
        assert!(secure_compare("secret", "secret"));
        assert!(!secure_compare("secret", "secret2"));
        assert!(!secure_compare("secret", "Secret"));
    }
}
