use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

Backend for a small commerce storefront and its admin dashboard: product
catalog, server-priced checkout, hosted-invoice payments with webhook
confirmation, OTP-gated login, and admin transaction/analytics views.

## Error Handling

Failures use consistent HTTP status codes and a standard error body:

```json
{
  "error": "Bad Request",
  "message": "Cart is empty",
  "request_id": "req-abc123",
  "timestamp": "2025-06-09T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Registration, login, and OTP endpoints"),
        (name = "Products", description = "Catalog reads and admin CRUD"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Payments", description = "Hosted invoice creation and gateway callbacks"),
        (name = "Analytics", description = "Admin dashboard figures"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::send_otp,
        crate::handlers::auth::verify_otp,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_shipping_address,
        crate::handlers::orders::notify_success,

        // Payments
        crate::handlers::payments::create_invoice,
        crate::handlers::payment_webhooks::payment_webhook,

        // Analytics
        crate::handlers::analytics::dashboard_summary,

        // Health
        crate::handlers::health::health,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Auth types
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::VerifyOtpRequest,
            crate::services::users::RegisterRequest,
            crate::services::users::UserResponse,

            // Product types
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::services::products::ProductResponse,

            // Order types
            crate::services::orders::CartLine,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderDetailResponse,
            crate::services::orders::OrderItemResponse,
            crate::handlers::orders::CreateOrderResponse,
            crate::handlers::orders::UpdateShippingAddressRequest,
            crate::handlers::orders::NotifySuccessRequest,
            crate::entities::order::OrderStatus,

            // Payment types
            crate::handlers::payments::CreateInvoiceRequest,
            crate::handlers::payments::InvoiceUrlResponse,

            // Analytics types
            crate::services::analytics::DashboardSummary,
            crate::services::analytics::DailyRevenue,

            // Health and error types
            crate::handlers::health::HealthStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
