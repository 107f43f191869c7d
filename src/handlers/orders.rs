use std::str::FromStr;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::order::OrderStatus;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::services::orders::{CreateOrderRequest, OrderDetailResponse, OrderResponse};
use crate::{
    errors::{ApiError, ServiceError},
    AppState, ListQuery, PaginatedResponse,
};

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/", post(create_order))
        .route("/notify-success", post(notify_success))
        .route("/:id", get(get_order))
        .route("/:id", patch(update_shipping_address))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateShippingAddressRequest {
    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub shipping_address: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NotifySuccessRequest {
    pub order_id: Uuid,
}

/// Create a new order from a cart snapshot
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = crate::ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Empty cart, missing user info, or unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state.services.orders.create_order(payload).await?;
    Ok(created_response(CreateOrderResponse { order_id: order.id }))
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = crate::ApiResponse<PaginatedResponse<OrderResponse>>),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            OrderStatus::from_str(&raw.to_ascii_uppercase()).map_err(|_| {
                ApiError::ValidationError(format!("Unknown order status: {raw}"))
            })
        })
        .transpose()?;

    let result = state
        .services
        .orders
        .list_orders(query.page, query.limit, status)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        result.orders,
        result.page,
        result.per_page,
        result.total,
    )))
}

/// Get an order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved", body = crate::ApiResponse<OrderDetailResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(success_response(order))
}

/// Update the shipping address of an unpaid order
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateShippingAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = crate::ApiResponse<OrderResponse>),
        (status = 400, description = "Missing address or order already paid", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShippingAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .orders
        .update_shipping_address(id, &payload.shipping_address)
        .await?;
    Ok(success_response(order))
}

/// Send the payment confirmation message for a paid order
///
/// Fire-and-forget from the client's perspective: a messaging-provider
/// failure is logged and the endpoint still acknowledges.
#[utoipa::path(
    post,
    path = "/api/v1/orders/notify-success",
    request_body = NotifySuccessRequest,
    responses(
        (status = 200, description = "Notification dispatched"),
        (status = 404, description = "Order, user, or phone number not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn notify_success(
    State(state): State<AppState>,
    Json(payload): Json<NotifySuccessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .find_order(payload.order_id)
        .await?
        .ok_or_else(|| {
            ApiError::ServiceError(ServiceError::NotFound(
                "Order or associated user not found".to_string(),
            ))
        })?;

    let user_id = order.user_id.ok_or_else(|| {
        ApiError::ServiceError(ServiceError::NotFound(
            "Order or associated user not found".to_string(),
        ))
    })?;

    let user = state
        .services
        .users
        .find_user(user_id)
        .await?
        .ok_or_else(|| {
            ApiError::ServiceError(ServiceError::NotFound(
                "Order or associated user not found".to_string(),
            ))
        })?;

    let phone = user.phone_number.clone().ok_or_else(|| {
        ApiError::ServiceError(ServiceError::NotFound(
            "User phone number not found".to_string(),
        ))
    })?;

    let order_ref = payload.order_id.simple().to_string();
    let short_id = &order_ref[..8];
    let message = format!(
        "Thank you, {}! Your payment for order #{} has been successfully processed. \
         We will prepare your items for shipment shortly.",
        user.name, short_id
    );

    state
        .services
        .notifications
        .send_best_effort(&phone, &message)
        .await;

    info!(order_id = %payload.order_id, "Payment confirmation dispatched");
    Ok(success_response(serde_json::json!({
        "message": "Notification sent successfully"
    })))
}
