//! Client behavior against an in-process HTTP server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use sb_api::ApiClient;
use sb_core::config::ServerConfig;
use sb_core::error::SbError;
use sb_models::{BookingStatus, Credentials, TokenPair};

async fn serve(app: Router) -> ApiClient {
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

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[tokio::test]
async fn test_login_then_me_sends_bearer() {
    let app = Router::new()
        .route(
            "/api/token/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["username"], "kiran");
                Json(json!({"access": "acc-1", "refresh": "ref-1"}))
            }),
        )
        .route(
            "/api/me/",
            get(|headers: HeaderMap| async move {
                match bearer(&headers).as_deref() {
                    Some("Bearer acc-1") => (
                        StatusCode::OK,
                        Json(json!({"id": 3, "username": "kiran", "user_type": "provider"})),
                    ),
                    _ => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"detail": "Authentication credentials were not provided."})),
                    ),
                }
            }),
        );
    let client = serve(app).await;

    let err = client.me().await.unwrap_err();
    assert!(err.is_auth_failure());

    let tokens = client
        .obtain_tokens(&Credentials {
            username: "kiran".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        tokens,
        TokenPair {
            access: "acc-1".into(),
            refresh: "ref-1".into()
        }
    );
    client.set_tokens(tokens).await;

    let me = client.me().await.unwrap();
    assert!(me.is_provider());
}

#[tokio::test]
async fn test_server_error_message_from_body() {
    let app = Router::new().route(
        "/api/bookings/request/",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "No providers available"})),
            )
        }),
    );
    let client = serve(app).await;

    let body = sb_models::BookingRequest {
        service_id: 1,
        scheduled_date: "2024-06-01".into(),
        scheduled_time: "10:00".into(),
        customer_latitude: 18.5,
        customer_longitude: 73.8,
        customer_address: "12 Lake Rd".into(),
        notes: None,
    };
    match client.request_booking(&body).await.unwrap_err() {
        SbError::ServerError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "No providers available");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_request_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/bookings/provider/",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::SERVICE_UNAVAILABLE
            }),
        )
        .with_state(hits.clone());
    let client = serve(app).await;

    let err = client.provider_bookings().await.unwrap_err();
    assert!(matches!(err, SbError::ServerError { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_provider_bookings_paginated_and_plain() {
    let app = Router::new()
        .route(
            "/api/bookings/provider/",
            get(|| async {
                Json(json!({
                    "count": 2, "next": null, "previous": null,
                    "results": [
                        {"id": 1, "status": "notified", "service_name": "Plumbing"},
                        {"id": 2, "status": "confirmed", "service_name": "Cleaning"}
                    ]
                }))
            }),
        )
        .route(
            "/api/services/categories/",
            get(|| async { Json(json!([{"id": 1, "name": "Home"}])) }),
        );
    let client = serve(app).await;

    let bookings = client.provider_bookings().await.unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[1].status, BookingStatus::Confirmed);

    let categories = client.service_categories().await.unwrap();
    assert_eq!(categories[0].name, "Home");
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let app = Router::new().route("/api/me/", get(|| async { "not json" }));
    let client = serve(app).await;
    let err = client.me().await.unwrap_err();
    assert!(matches!(err, SbError::Serialization(_)));
}

#[tokio::test]
async fn test_admin_cancel_booking_patches_status() {
    let app = Router::new().route(
        "/api/admin/bookings/bookings/{id}/",
        axum::routing::patch(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({"status": "cancelled"}));
            Json(json!({"id": 8, "status": "cancelled"}))
        }),
    );
    let client = serve(app).await;
    let booking = client.admin_cancel_booking(8).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
}
