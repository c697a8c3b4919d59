//! Session lifecycle against an in-process backend.

mod common;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use sb_api::ApiClient;
use sb_core::config::ServerConfig;
use sb_models::{Credentials, Registration, TokenPair};
use sb_services::session::{SessionService, SessionState, TokenStore};

const GOOD_TOKEN: &str = "good-access";

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth == format!("Bearer {GOOD_TOKEN}") {
        (
            StatusCode::OK,
            Json(json!({"id": 3, "username": "kiran", "user_type": "provider"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Given token not valid for any token type"})),
        )
    }
}

async fn token(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({"access": GOOD_TOKEN, "refresh": "good-refresh"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
    }
}

async fn spawn_backend() -> ApiClient {
    let app = Router::new()
        .route("/api/me/", get(me))
        .route("/api/token/", post(token))
        .route(
            "/api/register/",
            post(|| async { (StatusCode::CREATED, Json(json!({"id": 3}))) }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(&ServerConfig {
        address: format!("http://{addr}"),
        realtime_url: String::new(),
        api_timeout_ms: 5_000,
        accept_invalid_certs: false,
    })
    .unwrap()
}

fn service(api: ApiClient, dir: &TempDir) -> (SessionService, TokenStore) {
    let store = TokenStore::new(dir.path().join("session.json"));
    let svc = SessionService::new(api, store.clone(), common::create_test_event_bus());
    (svc, store)
}

#[tokio::test]
async fn test_restore_without_tokens_is_anonymous() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(spawn_backend().await, &dir);
    assert_eq!(svc.restore().await.unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_restore_with_valid_tokens() {
    let dir = TempDir::new().unwrap();
    let (svc, store) = service(spawn_backend().await, &dir);
    store
        .save(&TokenPair {
            access: GOOD_TOKEN.into(),
            refresh: "r".into(),
        })
        .unwrap();

    let state = svc.restore().await.unwrap();
    assert_eq!(state.user().unwrap().username, "kiran");
    assert_eq!(svc.access_token().await.as_deref(), Some(GOOD_TOKEN));
}

#[tokio::test]
async fn test_rejected_tokens_are_removed_silently() {
    let dir = TempDir::new().unwrap();
    let (svc, store) = service(spawn_backend().await, &dir);
    store
        .save(&TokenPair {
            access: "stale".into(),
            refresh: "stale".into(),
        })
        .unwrap();

    let state = svc.restore().await.unwrap();
    assert_eq!(state, SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
    assert!(svc.access_token().await.is_none());
}

#[tokio::test]
async fn test_login_persists_and_logout_clears() {
    let dir = TempDir::new().unwrap();
    let (svc, store) = service(spawn_backend().await, &dir);

    let user = svc
        .login(&Credentials {
            username: "kiran".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert!(user.is_provider());
    assert_eq!(store.load().unwrap().unwrap().access, GOOD_TOKEN);
    assert!(svc.state().await.is_authenticated());

    svc.logout().await.unwrap();
    assert!(store.load().unwrap().is_none());
    assert!(!svc.state().await.is_authenticated());
    assert!(svc.require_user().await.is_err());
}

#[tokio::test]
async fn test_bad_password_leaves_no_tokens() {
    let dir = TempDir::new().unwrap();
    let (svc, store) = service(spawn_backend().await, &dir);

    let err = svc
        .login(&Credentials {
            username: "kiran".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
    assert!(store.load().unwrap().is_none());
    assert!(!svc.state().await.is_authenticated());
}

#[tokio::test]
async fn test_register_then_login() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(spawn_backend().await, &dir);
    let user = svc
        .register_and_login(&Registration {
            username: "kiran".into(),
            email: "kiran@example.com".into(),
            password: "secret".into(),
            phone: None,
        })
        .await
        .unwrap();
    assert_eq!(user.username, "kiran");
}
