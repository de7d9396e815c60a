/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration (with auto-login)
/// - Login
/// - Logout
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user, session created immediately
/// - `POST /auth/login` - Login, session cookie set
/// - `POST /auth/logout` - Destroy the current session
///
/// Sessions travel in an HttpOnly cookie; the token itself is opaque and
/// only meaningful to the server-side session store.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use crewtask_shared::{
    auth::{password, session::SESSION_COOKIE},
    models::user::{CreateUser, PublicUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (unique)
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Email address (unique)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register / login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user's public fields
    pub user: PublicUser,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new user
///
/// Creates the account and logs the caller in as one step: the response
/// already carries an active session cookie. The coupling is deliberate —
/// from the caller's point of view, identity and session arrive atomically.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "adalovelace",
///   "email": "ada@example.com",
///   "password": "enchantress"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username or email already exists (no row is created)
/// - `422 Unprocessable Entity`: Validation failed
/// - `503 Service Unavailable`: Session store unreachable
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    // Never store or log the plaintext
    let password_hash = password::hash_password(&req.password)?;

    // Uniqueness is decided by the database constraints; a duplicate
    // username or email surfaces as 409 with no row created
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let token = state.sessions.create(user.id).await?;
    let jar = jar.add(session_cookie(
        token,
        state.sessions.ttl_secs(),
        state.config.api.production,
    ));

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    ))
}

/// Login endpoint
///
/// Authenticates a user by username and password and sets a fresh session
/// cookie.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "username": "adalovelace",
///   "password": "enchantress"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (same message
///   for both, so the response doesn't confirm account existence)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = state.sessions.create(user.id).await?;
    let jar = jar.add(session_cookie(
        token,
        state.sessions.ttl_secs(),
        state.config.api.production,
    ));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    ))
}

/// Logout endpoint
///
/// Destroys the current session and clears the cookie. Behind the auth
/// layer, so a second logout with the same (now dead) cookie gets 401 from
/// the middleware rather than reaching this handler.
///
/// # Endpoint
///
/// ```text
/// POST /auth/logout
/// ```
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<MessageResponse>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}

/// Builds the session cookie
///
/// HttpOnly and SameSite=Lax always; Secure in production. Max-Age matches
/// the server-side session TTL so the cookie and the session expire
/// together.
fn session_cookie(token: String, ttl_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl_secs as i64))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token123".to_string(), 86_400, true);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "token123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(cookie::time::Duration::seconds(86_400))
        );
    }

    #[test]
    fn test_session_cookie_not_secure_in_development() {
        let cookie = session_cookie("token123".to_string(), 86_400, false);
        assert_eq!(cookie.secure(), Some(false));
    }
}
