//! End-to-end tests for checkout: server-side pricing, atomic order
//! creation, shipping-address edits, and the admin listing.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_order_prices_cart_from_catalog() {
    let app = TestApp::new().await;

    let chair = app.seed_product("Chair", dec!(25000)).await;
    let desk = app.seed_product("Desk", dec!(35000)).await;
    let user_id = app.seed_user("buyer@example.com", "hunter2", None).await;

    // The client-submitted price is ignored; only the catalog price counts.
    let payload = json!({
        "user_id": user_id,
        "customer_name": "Buyer One",
        "shipping_address": "Jl. Sudirman No. 1, Jakarta",
        "items": [
            { "product_id": chair, "quantity": 2, "price": 1 },
            { "product_id": desk, "quantity": 1, "price": 1 }
        ]
    });

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let order_id = body["data"]["order_id"].as_str().expect("order id").to_string();

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], "PENDING");
    assert_eq!(decimal_field(&data["subtotal"]), dec!(85000));
    assert_eq!(decimal_field(&data["tax"]), dec!(8500));
    assert_eq!(decimal_field(&data["shipping"]), dec!(15000));
    assert_eq!(decimal_field(&data["total_amount"]), dec!(108500));
    assert_eq!(data["currency"], "IDR");
    assert_eq!(data["items"].as_array().map(Vec::len), Some(2));

    // Line snapshots carry the catalog price at purchase time
    let items = data["items"].as_array().unwrap();
    let chair_line = items
        .iter()
        .find(|item| item["name"] == "Chair")
        .expect("chair line");
    assert_eq!(decimal_field(&chair_line["unit_price"]), dec!(25000));
    assert_eq!(chair_line["quantity"], 2);
    assert_eq!(decimal_field(&chair_line["total_price"]), dec!(50000));
}

#[tokio::test]
async fn order_snapshot_survives_later_price_change() {
    let app = TestApp::new().await;

    let product = app.seed_product("Lamp", dec!(10000)).await;
    let user_id = app.seed_user("lamp@example.com", "pw", None).await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    // Reprice the product after purchase
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{product}"),
            Some(json!({ "price": 99000 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    let body = response_json(response).await;
    let item = &body["data"]["items"][0];
    assert_eq!(decimal_field(&item["unit_price"]), dec!(10000));
}

#[tokio::test]
async fn unknown_product_aborts_whole_order() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("ghost@example.com", "pw", None).await;

    let payload = json!({
        "user_id": user_id,
        "customer_name": "Ghost Cart",
        "shipping_address": "Jl. Sudirman No. 1, Jakarta",
        "items": [
            { "product_id": product, "quantity": 1 },
            { "product_id": Uuid::new_v4(), "quantity": 3 }
        ]
    });

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No partial order was written
    let response = app.request(Method::GET, "/api/v1/orders", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn empty_cart_and_blank_customer_are_rejected() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("empty@example.com", "pw", None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "user_id": user_id,
                "customer_name": "Empty Cart",
                "shipping_address": "Somewhere",
                "items": []
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let product = app.seed_product("Chair", dec!(25000)).await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "user_id": user_id,
                "customer_name": "",
                "shipping_address": "Somewhere",
                "items": [{ "product_id": product, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_order_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shipping_address_edit_allowed_until_paid() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("mover@example.com", "pw", None).await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "shipping_address": "Jl. Thamrin No. 9, Jakarta" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["shipping_address"], "Jl. Thamrin No. 9, Jakarta");

    // Settle the order, then the edit window is closed
    app.state
        .services
        .orders
        .mark_paid(order_id)
        .await
        .expect("mark paid");

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "shipping_address": "Jl. Lain No. 2" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_shipping_address_is_rejected() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("blank@example.com", "pw", None).await;
    let order_id = app.seed_order(user_id, &[(product, 1)]).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "shipping_address": "" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_listing_paginates_newest_first() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("lister@example.com", "pw", None).await;
    for _ in 0..3 {
        app.seed_order(user_id, &[(product, 1)]).await;
    }

    let response = app
        .request(Method::GET, "/api/v1/orders?page=1&limit=2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn order_listing_filters_by_status() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("filter@example.com", "pw", None).await;
    let first = app.seed_order(user_id, &[(product, 1)]).await;
    app.seed_order(user_id, &[(product, 2)]).await;

    app.state
        .services
        .orders
        .mark_paid(first)
        .await
        .expect("mark paid");

    let response = app
        .request(Method::GET, "/api/v1/orders?status=paid", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["status"], "PAID");

    let response = app
        .request(Method::GET, "/api/v1/orders?status=bogus", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_summary_counts_paid_revenue_only() {
    let app = TestApp::new().await;

    let product = app.seed_product("Chair", dec!(25000)).await;
    let user_id = app.seed_user("stats@example.com", "pw", None).await;

    // 2 x 25000 subtotal, 5000 tax, 15000 shipping = 70000 total
    let paid = app.seed_order(user_id, &[(product, 2)]).await;
    app.seed_order(user_id, &[(product, 1)]).await;

    app.state
        .services
        .orders
        .mark_paid(paid)
        .await
        .expect("mark paid");

    let response = app
        .request(Method::GET, "/api/v1/analytics/summary", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["total_orders"], 2);
    assert_eq!(data["paid_orders"], 1);
    assert_eq!(data["pending_orders"], 1);
    assert_eq!(decimal_field(&data["total_revenue"]), dec!(70000));

    let days = data["revenue_by_day"].as_array().expect("daily buckets");
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["purchases"], 1);
    assert_eq!(decimal_field(&days[0]["revenue"]), dec!(70000));
}
