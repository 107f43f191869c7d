//! Tests for the product catalog: storefront reads and admin CRUD.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_and_fetch_product() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Standing Desk",
                "price": 1250000,
                "description": "Electric, two motors",
                "category": "furniture",
                "image_url": "https://cdn.example.com/desk.jpg"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let id = body["data"]["id"].as_str().expect("product id").to_string();
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(1250000));

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "Standing Desk");
    assert_eq!(body["data"]["category"], "furniture");
}

#[tokio::test]
async fn price_is_coerced_to_numeric_from_string_input() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Mug", "price": "45000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(45000));
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Mug", "price": -1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "   ", "price": 1000 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_is_sorted_by_name() {
    let app = TestApp::new().await;

    app.seed_product("Zebra Rug", dec!(200000)).await;
    app.seed_product("Armchair", dec!(800000)).await;
    app.seed_product("Mirror", dec!(150000)).await;

    let response = app.request(Method::GET, "/api/v1/products", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("product list")
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Armchair", "Mirror", "Zebra Rug"]);
}

#[tokio::test]
async fn update_changes_only_the_provided_fields() {
    let app = TestApp::new().await;
    let id = app.seed_product("Bookshelf", dec!(500000)).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "price": 475000 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "Bookshelf");
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(475000));
}

#[tokio::test]
async fn delete_removes_the_product_once() {
    let app = TestApp::new().await;
    let id = app.seed_product("Side Table", dec!(300000)).await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_product_operations_return_not_found() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{missing}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{missing}"),
            Some(json!({ "price": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
