#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use swing_api::auth::identity::{IdentityVerifier, VerifiedIdentity};
use swing_api::auth::jwt::{generate_session_token, JwtConfig};
use swing_api::config::ServerConfig;
use swing_api::router::build_app_router;
use swing_api::state::AppState;
use swing_core::error::CoreError;
use swing_db::models::user::{CreateUser, User};
use swing_db::Store;
use swing_events::EventBus;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@swing.test";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
        },
        google_client_id: None,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        enforce_free_vote_cooldown: false,
        competition_sweep_secs: 60,
    }
}

/// Accepts credentials of the form `"<subject>:<email>"`; anything else is
/// rejected.
pub struct StaticVerifier;

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, CoreError> {
        let (subject, email) = credential
            .split_once(':')
            .ok_or_else(|| CoreError::Unauthorized("Invalid credential".into()))?;
        Ok(VerifiedIdentity {
            subject: subject.to_string(),
            email: email.to_string(),
            name: Some(subject.to_string()),
            picture: None,
        })
    }
}

/// A running test application plus handles into its state.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub config: ServerConfig,
    pub event_bus: Arc<EventBus>,
    pub upload_dir: tempfile::TempDir,
}

impl TestApp {
    /// A clone of the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Insert a user directly into the store and return it with a session
    /// token.
    pub async fn user(&self, email: &str, role: &str) -> (User, String) {
        let user = self
            .store
            .users
            .insert(&User::new(CreateUser {
                google_id: None,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or_default().to_string(),
                image: None,
                role: role.to_string(),
            }))
            .await
            .unwrap();
        let token =
            generate_session_token(&user.id, &user.role, &user.email, &self.config.jwt).unwrap();
        (user, token)
    }

    /// Insert a user with a fixed id, for fixtures such as `m1`.
    pub async fn user_with_id(&self, id: &str, email: &str) -> User {
        let mut user = User::new(CreateUser {
            google_id: None,
            email: email.to_string(),
            name: id.to_string(),
            image: None,
            role: "model".to_string(),
        });
        user.id = id.to_string();
        self.store.users.insert(&user).await.unwrap()
    }
}

/// Build the full application router over a fresh in-memory store.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], with a hook to adjust the config.
pub fn build_test_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(upload_dir.path().to_path_buf());
    configure(&mut config);

    let store = Store::in_memory();
    let event_bus = Arc::new(EventBus::default());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        identity: Arc::new(StaticVerifier),
        event_bus: Arc::clone(&event_bus),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        config,
        event_bus,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::PATCH, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

/// Send a raw request (multipart uploads and the like).
pub async fn request(app: Router, request: Request<Body>) -> Response<Body> {
    send(app, request).await
}
