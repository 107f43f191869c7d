use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::common::{created_response, success_response, validate_input};
use crate::services::users::{RegisterRequest, UserResponse};
use crate::{errors::ApiError, AppState};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

/// Creates the router for auth endpoints
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
}

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = crate::ApiResponse<UserResponse>),
        (status = 400, description = "Missing or invalid fields", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state.services.users.register(payload).await?;
    Ok(created_response(user))
}

/// Password login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = crate::ApiResponse<UserResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .login(&payload.email, &payload.password)
        .await?;
    Ok(success_response(user))
}

/// Validate credentials and dispatch a one-time login code
#[utoipa::path(
    post,
    path = "/api/v1/auth/send-otp",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "OTP sent"),
        (status = 400, description = "No phone number on file", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 502, description = "Messaging provider failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let (user, otp) = state
        .services
        .users
        .issue_otp(&payload.email, &payload.password)
        .await?;

    // issue_otp guarantees a phone number is on file
    let phone = user.phone_number.as_deref().unwrap_or_default();
    let message = format!("Your login OTP is: {}", otp);

    // OTP delivery is not best-effort: the login flow must know when the
    // code never went out.
    state
        .services
        .notifications
        .send(phone, &message)
        .await
        .map_err(ApiError::ServiceError)?;

    info!(user_id = %user.id, "Login OTP dispatched");
    Ok(success_response(serde_json::json!({
        "message": "OTP sent successfully"
    })))
}

/// Verify a one-time login code
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Login successful", body = crate::ApiResponse<UserResponse>),
        (status = 400, description = "No pending OTP", body = crate::errors::ErrorResponse),
        (status = 401, description = "Wrong or expired code", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .verify_otp(&payload.email, &payload.otp)
        .await?;
    Ok(success_response(user))
}
