use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use crate::app::AppState;
use crate::error::AppError;

/// Proof that the request carried `Authorization: Bearer <service token>`.
///
/// Add it as a handler argument to protect an admin route.
#[derive(Debug, Clone, Copy)]
pub struct ServiceAuth;

/// Compare tokens through their digests so timing does not depend on the
/// length of the common prefix.
fn token_matches(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Check a presented bearer token against the configured one. An empty
/// configured token accepts nothing.
fn authorize(provided: Option<&str>, expected: &str) -> Result<(), AppError> {
    let token = provided.ok_or_else(|| AppError::Auth("Authentication required".into()))?;
    if expected.trim().is_empty() || !token_matches(token, expected) {
        return Err(AppError::Auth("Invalid service token".into()));
    }
    Ok(())
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for ServiceAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = bearer_token(parts);
        if let Err(e) = authorize(provided, &state.service_token) {
            if provided.is_some() {
                tracing::warn!(path = %parts.uri.path(), "Rejected admin request with invalid token");
            }
            return Err(e);
        }
        Ok(ServiceAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/admin/articles");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("bearer  abc "))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "secreto"));
        assert!(!token_matches("", "secret"));
    }

    #[test]
    fn test_authorize() {
        assert!(authorize(Some("secret"), "secret").is_ok());
        assert!(matches!(authorize(None, "secret"), Err(AppError::Auth(m)) if m == "Authentication required"));
        assert!(matches!(authorize(Some("nope"), "secret"), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_unset_token_rejects_everything() {
        assert!(authorize(Some(""), "").is_err());
        assert!(authorize(Some("anything"), "").is_err());
        assert!(authorize(Some(" "), " ").is_err());
    }
}
