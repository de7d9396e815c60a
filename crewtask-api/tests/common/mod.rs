/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (runs migrations)
/// - Test redis connection for the session store
/// - Registering users through the real API (so tests exercise the same
///   path as clients, cookie and all)
/// - Request helpers that carry the session cookie
///
/// Tests require a running PostgreSQL and redis, configured via
/// DATABASE_URL and REDIS_URL (a `.env` file works).

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use crewtask_api::app::{build_router, AppState};
use crewtask_api::config::Config;
use crewtask_shared::auth::session::{SessionStore, SESSION_COOKIE};
use crewtask_shared::models::user::User;
use crewtask_shared::redis::client::{RedisClient, RedisConfig};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    /// Users registered through this context, deleted on cleanup
    pub user_ids: Vec<Uuid>,
}

/// A user registered through the API, with their live session cookie
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    /// Session token from the registration response cookie
    pub session: String,
}

impl TestUser {
    /// Cookie header value for authenticated requests
    pub fn cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.session)
    }
}

/// A response decoded for assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Session token from a Set-Cookie header, if one was set
    pub session: Option<String>,
}

impl TestContext {
    /// Creates a new test context against the configured database and redis
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to this crate's Cargo.toml)
        sqlx::migrate!("../crewtask-shared/migrations").run(&db).await?;

        let redis = RedisClient::new(RedisConfig {
            url: config.session.redis_url.clone(),
            connection_timeout_secs: 5,
            command_timeout_secs: 10,
        })
        .await?;
        let sessions = SessionStore::new(redis, config.session.ttl_secs);

        let state = AppState::new(db.clone(), sessions, config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            user_ids: Vec::new(),
        })
    }

    /// Registers a fresh user through `POST /auth/register`
    ///
    /// Usernames are suffixed with random hex so parallel tests can share a
    /// database.
    pub async fn register_user(&mut self, prefix: &str) -> anyhow::Result<TestUser> {
        let unique = Uuid::new_v4().simple().to_string();
        let username = format!("{}-{}", prefix, &unique[..12]);
        let email = format!("{}@example.com", username);
        let password = "correct-horse-battery".to_string();

        let response = self
            .post(
                "/auth/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;

        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "register failed: {} {}",
            response.status,
            response.body
        );

        let id = Uuid::parse_str(
            response.body["user"]["id"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("register response missing user id"))?,
        )?;
        let session = response
            .session
            .ok_or_else(|| anyhow::anyhow!("register response set no session cookie"))?;

        self.user_ids.push(id);

        Ok(TestUser {
            id,
            username,
            password,
            session,
        })
    }

    /// Sends a GET request
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request(Method::Get, uri, cookie, None)).await
    }

    /// Sends a POST request with a JSON body
    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::Post, uri, cookie, Some(body))).await
    }

    /// Sends a PUT request with a JSON body
    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::Put, uri, cookie, Some(body))).await
    }

    /// Sends a DELETE request
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request(Method::Delete, uri, cookie, None)).await
    }

    /// Sends a raw request through the router and decodes the response
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .call(request)
            .await
            .expect("router call is infallible");

        let status = response.status();
        let session = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|s| s.starts_with(SESSION_COOKIE))
            .filter_map(|s| s.split(';').next())
            .filter_map(|s| s.split_once('='))
            .map(|(_, value)| value.to_string())
            .find(|value| !value.is_empty());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            session,
        }
    }

    /// Cleans up test data
    ///
    /// Deleting the registered users cascades to their memberships and the
    /// teams (and thus tasks) they created.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for user_id in &self.user_ids {
            User::delete(&self.db, *user_id).await?;
        }
        Ok(())
    }
}

enum Method {
    Get,
    Post,
    Put,
    Delete,
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let method = match method {
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Put => "PUT",
        Method::Delete => "DELETE",
    };

    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).expect("request should build")
}
