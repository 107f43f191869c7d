use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::handlers::common::success_response;
use crate::{errors::ApiError, AppState};

/// Creates the router for payment endpoints
pub fn payments_routes() -> Router<AppState> {
    Router::new().route("/", post(create_invoice))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceUrlResponse {
    pub invoice_url: String,
}

/// Create a hosted invoice for an order and return its redirect URL
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice created", body = crate::ApiResponse<InvoiceUrlResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Payment gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice_url = state
        .services
        .payments
        .create_invoice(payload.order_id)
        .await?;

    Ok(success_response(InvoiceUrlResponse { invoice_url }))
}
