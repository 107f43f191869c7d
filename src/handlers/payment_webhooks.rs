use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{errors::ServiceError, AppState};

/// Header carrying the shared secret configured with the payment gateway
pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Callback payload from the payment gateway. `external_id` is the order id
/// we handed over when the invoice was created.
#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    #[serde(default)]
    pub id: Option<String>,
    pub external_id: String,
    pub status: String,
}

// POST /api/v1/webhooks/payment
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/payment",
    request_body = String,
    responses(
        (status = 200, description = "Webhook acknowledged"),
        (status = 401, description = "Invalid callback token", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PaymentCallback>,
) -> Result<impl IntoResponse, ServiceError> {
    // The gateway authenticates with a shared secret header; no token
    // configured means no callback can be trusted.
    let expected = state
        .config
        .payment_callback_token
        .as_deref()
        .ok_or_else(|| {
            warn!("Payment callback received but no callback token is configured");
            ServiceError::Unauthorized("invalid callback token".to_string())
        })?;

    let presented = headers
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !constant_time_eq(presented, expected) {
        warn!("Payment callback token mismatch");
        return Err(ServiceError::Unauthorized(
            "invalid callback token".to_string(),
        ));
    }

    info!(external_id = %payload.external_id, status = %payload.status, "Payment callback received");

    let order_id = Uuid::parse_str(&payload.external_id).map_err(|_| {
        ServiceError::BadRequest(format!("Invalid external id: {}", payload.external_id))
    })?;

    match payload.status.to_ascii_uppercase().as_str() {
        "PAID" => {
            let order = state.services.orders.mark_paid(order_id).await?;
            info!(order_id = %order.id, "Order marked paid by payment callback");
        }
        "EXPIRED" | "FAILED" => {
            let order = state
                .services
                .orders
                .mark_failed_if_pending(order_id)
                .await?;
            info!(order_id = %order.id, status = %order.status, "Order resolved by payment callback");
        }
        other => {
            info!(status = %other, "Unhandled payment callback status");
        }
    }

    Ok((StatusCode::OK, "ok"))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
