/// Session store backed by redis
///
/// Sessions are the sole channel through which a caller's identity is
/// established. A session is an opaque token minted at login/registration
/// and handed to the client as a cookie; the server side is a single redis
/// key `session:{token}` holding the user id, with a TTL.
///
/// Properties:
/// - Tokens are 32 bytes from the OS RNG, hex-encoded (64 chars). Nothing
///   about the user is recoverable or forgeable from the token.
/// - Expiry is fixed at creation (default 24 hours) and is NOT extended by
///   activity: [`SessionStore::resolve`] never touches the TTL.
/// - Redis expiry removes the key; a resolve after expiry simply returns
///   `None`, which the auth layer turns into a 401 — never a crash.
/// - The store survives API restarts.
///
/// # Example
///
/// ```no_run
/// use crewtask_shared::auth::session::SessionStore;
/// use crewtask_shared::redis::client::{RedisClient, RedisConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> anyhow::Result<()> {
/// let redis = RedisClient::new(RedisConfig::from_env()?).await?;
/// let sessions = SessionStore::new(redis, 86_400);
///
/// let token = sessions.create(Uuid::new_v4()).await?;
/// assert!(sessions.resolve(&token).await?.is_some());
///
/// sessions.destroy(&token).await?;
/// assert!(sessions.resolve(&token).await?.is_none());
/// # Ok(())
/// # }
/// ```

use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use uuid::Uuid;

use crate::redis::client::RedisClient;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "crewtask_session";

/// Default session lifetime: 24 hours from creation
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

const SESSION_KEY_PREFIX: &str = "session:";

/// Error type for session store operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying redis operation failed
    #[error("Session store error: {0}")]
    Store(#[from] redis::RedisError),
}

/// Redis-backed session store
///
/// Cheap to clone; the wrapped client shares its connection manager.
#[derive(Clone)]
pub struct SessionStore {
    redis: RedisClient,
    ttl_secs: u64,
}

impl SessionStore {
    /// Creates a session store with the given TTL in seconds
    pub fn new(redis: RedisClient, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    /// Session lifetime in seconds (also used for the cookie Max-Age)
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Creates a session for a user and returns the opaque token
    ///
    /// # Errors
    ///
    /// Returns an error if the redis write fails
    pub async fn create(&self, user_id: Uuid) -> Result<String, SessionError> {
        let token = generate_session_token();
        let mut conn = self.redis.get_connection();

        redis::cmd("SET")
            .arg(session_key(&token))
            .arg(user_id.to_string())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::debug!(user_id = %user_id, "Session created");

        Ok(token)
    }

    /// Resolves a session token to the user id it was bound to
    ///
    /// Returns `None` for unknown, malformed, or expired tokens. Does not
    /// refresh the TTL.
    ///
    /// # Errors
    ///
    /// Returns an error only if the redis read fails
    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
        let mut conn = self.redis.get_connection();

        let value: Option<String> = redis::cmd("GET")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;

        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    /// Destroys a session
    ///
    /// # Returns
    ///
    /// True if a session was destroyed, false if it was already gone
    ///
    /// # Errors
    ///
    /// Returns an error if the redis delete fails
    pub async fn destroy(&self, token: &str) -> Result<bool, SessionError> {
        let mut conn = self.redis.get_connection();

        let deleted: i64 = redis::cmd("DEL")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;

        Ok(deleted > 0)
    }
}

fn session_key(token: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, token)
}

/// Generates an opaque session token: 32 bytes of OS randomness, hex-encoded
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_key_format() {
        assert_eq!(session_key("abc123"), "session:abc123");
    }

    // Integration tests against a live redis are in crewtask-api/tests/
}
