//! Request identity.
//!
//! The session cookie holds a token signed by the auth service. This service
//! only reads the identity claims out of it; signature checks happen where the
//! token is issued.

pub mod company_auth;
pub mod guard;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

/// Access level granted to Eden operators. Operators skip company checks.
pub const OPERATOR_ACCESS_LEVEL: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub user_id: String,
    #[serde(rename = "accessLevel", default)]
    pub access_level: i64,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw cookie value, forwarded on the user's outbound API calls.
    #[serde(skip)]
    pub token: String,
}

impl Session {
    pub fn is_operator(&self) -> bool {
        self.access_level == OPERATOR_ACCESS_LEVEL
    }
}

#[derive(Debug, Clone)]
pub struct SessionResolver {
    cookie_name: String,
}

impl SessionResolver {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolves the session from request headers. `None` means unauthenticated.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let token = find_cookie(headers, &self.cookie_name)?;
        match decode_claims(&token) {
            Some(session) => Some(session),
            None => {
                debug!("session cookie present but unreadable");
                None
            }
        }
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Reads `{_id, accessLevel, email}` from the payload segment of a JWT.
fn decode_claims(token: &str) -> Option<Session> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let mut session: Session = serde_json::from_slice(&bytes).ok()?;
    session.token = token.to_string();
    (!session.user_id.is_empty()).then_some(session)
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        state
            .sessions
            .resolve(&parts.headers)
            .ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Builds an unsigned token carrying the given claims.
    pub fn token_for(user_id: &str, access_level: i64) -> String {
        let claims = serde_json::json!({
            "_id": user_id,
            "accessLevel": access_level,
            "email": format!("{user_id}@example.com"),
        });
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    pub fn cookie_for(user_id: &str, access_level: i64) -> String {
        format!("theme=dark; edenAuthToken={}", token_for(user_id, access_level))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_resolves_session_from_cookie() {
        let resolver = SessionResolver::new("edenAuthToken");
        let session = resolver.resolve(&headers_with(&cookie_for("u1", 3))).unwrap();

        assert_eq!(session.user_id, "u1");
        assert_eq!(session.access_level, 3);
        assert_eq!(session.email.as_deref(), Some("u1@example.com"));
        assert_eq!(session.token, token_for("u1", 3));
        assert!(!session.is_operator());
    }

    #[test]
    fn test_operator_access_level() {
        let resolver = SessionResolver::new("edenAuthToken");
        let session = resolver.resolve(&headers_with(&cookie_for("op", 5))).unwrap();
        assert!(session.is_operator());
    }

    #[test]
    fn test_missing_cookie_is_unauthenticated() {
        let resolver = SessionResolver::new("edenAuthToken");
        assert!(resolver.resolve(&HeaderMap::new()).is_none());
        assert!(resolver.resolve(&headers_with("theme=dark")).is_none());
    }

    #[test]
    fn test_malformed_token_is_unauthenticated() {
        let resolver = SessionResolver::new("edenAuthToken");
        assert!(resolver
            .resolve(&headers_with("edenAuthToken=not-a-token"))
            .is_none());
        assert!(resolver
            .resolve(&headers_with("edenAuthToken=a.%%%.c"))
            .is_none());
    }

    #[test]
    fn test_token_without_user_id_is_rejected() {
        let claims = URL_SAFE_NO_PAD.encode(r#"{"_id":"","accessLevel":1}"#);
        let resolver = SessionResolver::new("edenAuthToken");
        assert!(resolver
            .resolve(&headers_with(&format!("edenAuthToken=h.{claims}.s")))
            .is_none());
    }
}
