//! Shared-secret check for create/update/delete routes.

use std::sync::{Arc, LazyLock};

use axum::http::{HeaderMap, Method};
use regex::Regex;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

static API_KEY_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ApiKey\s+(\S+)\s*$").expect("valid ApiKey scheme pattern")
});

#[derive(Debug, Clone)]
pub struct AccessGuard {
    secret: Arc<str>,
}

impl AccessGuard {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check the presented key against the configured secret.
    ///
    /// `x-api-key` wins when present; otherwise the token of an
    /// `Authorization: ApiKey <token>` header is used.
    pub fn authorize(
        &self,
        api_key: Option<&str>,
        authorization: Option<&str>,
    ) -> Result<(), ApiError> {
        let presented = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| authorization.and_then(parse_api_key_scheme))
            .ok_or(ApiError::MissingKey)?;

        if presented == &*self.secret {
            Ok(())
        } else {
            Err(ApiError::InvalidKey)
        }
    }

    pub fn authorize_headers(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        self.authorize(header(API_KEY_HEADER), header("authorization"))
    }

    /// Whether a request to `route` (a route template) with `method` must be authorized.
    pub fn is_guarded(method: &Method, route: &str) -> bool {
        match route {
            "/api/users" | "/api/todos" => *method == Method::POST,
            "/api/users/:id" | "/api/todos/:id" => {
                *method == Method::PATCH || *method == Method::DELETE
            }
            _ => false,
        }
    }
}

fn parse_api_key_scheme(value: &str) -> Option<&str> {
    API_KEY_SCHEME
        .captures(value.trim())
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn guard() -> AccessGuard {
        AccessGuard::new("s3cret")
    }

    #[test]
    fn test_x_api_key_header() {
        assert_eq!(guard().authorize(Some("s3cret"), None), Ok(()));
        assert_eq!(guard().authorize(Some("wrong"), None), Err(ApiError::InvalidKey));
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(guard().authorize(None, None), Err(ApiError::MissingKey));
        assert_eq!(guard().authorize(Some(""), None), Err(ApiError::MissingKey));
        assert_eq!(
            guard().authorize(None, Some("Bearer s3cret")),
            Err(ApiError::MissingKey)
        );
    }

    #[test]
    fn test_authorization_scheme_is_case_insensitive() {
        assert_eq!(guard().authorize(None, Some("ApiKey s3cret")), Ok(()));
        assert_eq!(guard().authorize(None, Some("apikey s3cret")), Ok(()));
        assert_eq!(guard().authorize(None, Some("APIKEY   s3cret")), Ok(()));
        assert_eq!(
            guard().authorize(None, Some("ApiKey nope")),
            Err(ApiError::InvalidKey)
        );
    }

    #[test]
    fn test_x_api_key_takes_precedence() {
        assert_eq!(
            guard().authorize(Some("wrong"), Some("ApiKey s3cret")),
            Err(ApiError::InvalidKey)
        );
    }

    #[test]
    fn test_authorize_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("ApiKey s3cret"));
        assert_eq!(guard().authorize_headers(&headers), Ok(()));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert_eq!(guard().authorize_headers(&headers), Err(ApiError::InvalidKey));
    }

    #[test]
    fn test_guarded_routes() {
        assert!(AccessGuard::is_guarded(&Method::POST, "/api/users"));
        assert!(AccessGuard::is_guarded(&Method::DELETE, "/api/todos/:id"));
        assert!(!AccessGuard::is_guarded(&Method::GET, "/api/users/:id"));
        assert!(!AccessGuard::is_guarded(&Method::GET, "/api/_stats"));
        assert!(!AccessGuard::is_guarded(&Method::POST, "/api/health"));
    }
}
