/// Request authentication context
///
/// This module provides the types the API server's session middleware uses
/// to establish "who is asking". The middleware (in the API crate) extracts
/// the session cookie, resolves it through the
/// [`SessionStore`](crate::auth::session::SessionStore), and inserts an
/// [`AuthContext`] into the request extensions; handlers extract it with
/// Axum's `Extension` extractor.
///
/// The identity is established exactly once per request, here, and passed
/// explicitly through every call — no handler re-derives it from the raw
/// request.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use crewtask_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SESSION_COOKIE;

/// Authentication context added to request extensions
///
/// Carries the strongly-typed identity resolved from the session; by the
/// time a handler sees this, the session was valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context for a resolved session
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for the session authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie on the request
    MissingSession,

    /// The session token is unknown or expired
    InvalidSession,

    /// The session store could not be reached
    StoreError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingSession => {
                (StatusCode::UNAUTHORIZED, "Please log in").into_response()
            }
            AuthError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "Session is invalid or expired").into_response()
            }
            AuthError::StoreError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the session token from a request's cookies
///
/// Returns `None` when the session cookie is absent.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_session_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("{}=deadbeef; other=1", SESSION_COOKIE).parse().unwrap(),
        );

        assert_eq!(
            session_token_from_headers(&headers),
            Some("deadbeef".to_string())
        );
    }

    #[test]
    fn test_missing_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_token_from_headers(&headers), None);
    }

    #[test]
    fn test_unrelated_cookies_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "other=1; theme=dark".parse().unwrap());
        assert_eq!(session_token_from_headers(&headers), None);
    }
}
