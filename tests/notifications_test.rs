//! Tests for messaging-provider dispatch: OTP delivery and the best-effort
//! payment confirmation.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn messaging_app(mock_server: &MockServer) -> TestApp {
    let url = format!("{}/send", mock_server.uri());
    TestApp::with_config(move |cfg| {
        cfg.messaging_api_url = url;
        cfg.messaging_api_token = Some("msg-token".to_string());
    })
    .await
}

#[tokio::test]
async fn send_otp_dispatches_via_the_provider_without_the_plus_prefix() {
    let mock_server = MockServer::start().await;
    let app = messaging_app(&mock_server).await;

    app.seed_user("otp@example.com", "pw", Some("+6281234567890"))
        .await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("Authorization", "msg-token"))
        .and(body_partial_json(json!({ "target": "6281234567890" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/send-otp",
            Some(json!({ "email": "otp@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn failed_otp_dispatch_fails_the_login_attempt() {
    let mock_server = MockServer::start().await;
    let app = messaging_app(&mock_server).await;

    app.seed_user("downstream@example.com", "pw", Some("+6281234567890"))
        .await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/send-otp",
            Some(json!({ "email": "downstream@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn notify_success_messages_the_order_owner() {
    let mock_server = MockServer::start().await;
    let app = messaging_app(&mock_server).await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app
        .seed_user("owner@example.com", "pw", Some("+6281234567890"))
        .await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({ "target": "6281234567890" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/notify-success",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn notify_success_swallows_provider_failures() {
    let mock_server = MockServer::start().await;
    let app = messaging_app(&mock_server).await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app
        .seed_user("besteffort@example.com", "pw", Some("+6281234567890"))
        .await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The notification fails, the acknowledgement does not
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/notify-success",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn notify_success_requires_an_order_and_a_phone_number() {
    let mock_server = MockServer::start().await;
    let app = messaging_app(&mock_server).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/notify-success",
            Some(json!({ "order_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("silent@example.com", "pw", None).await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/notify-success",
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
