use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{config::AppConfig, errors::ServiceError, services::orders::OrderService};

/// Invoice request sent to the payment gateway. The external id carries our
/// order id so the asynchronous callback can be correlated back to the order.
#[derive(Debug, Serialize)]
struct InvoiceRequest {
    external_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: String,
    description: String,
    success_redirect_url: String,
    failure_redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceCreated {
    id: String,
    invoice_url: String,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    message: Option<String>,
}

/// Client for the hosted-invoice payment gateway.
#[derive(Clone)]
pub struct PaymentService {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    currency: String,
    public_base_url: String,
    orders: Arc<OrderService>,
}

impl PaymentService {
    pub fn new(config: &AppConfig, orders: Arc<OrderService>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("HTTP client construction cannot fail with static options"),
            api_base: config.payment_api_base.trim_end_matches('/').to_string(),
            api_key: config.payment_api_key.clone(),
            currency: config.default_currency.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            orders,
        }
    }

    /// Creates a hosted invoice for the order and returns its redirect URL.
    ///
    /// The gateway's invoice id is persisted on the order best-effort: a
    /// persistence failure is logged but the URL is still returned so the
    /// customer can pay.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_invoice(&self, order_id: Uuid) -> Result<String, ServiceError> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let api_key = self.api_key.clone().ok_or_else(|| {
            ServiceError::ExternalApiError("Payment gateway API key is not configured".to_string())
        })?;

        let request = InvoiceRequest {
            external_id: order.id.to_string(),
            amount: order.total_amount,
            currency: self.currency.clone(),
            description: format!("Payment for Order #{}", order.id),
            success_redirect_url: format!("{}/payment/success", self.public_base_url),
            failure_redirect_url: format!("{}/payment/failure", self.public_base_url),
        };

        let response = self
            .client
            .post(format!("{}/v2/invoices", self.api_base))
            .basic_auth(&api_key, None::<&str>)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Payment gateway request failed");
                ServiceError::ExternalApiError(format!(
                    "Failed to connect to payment gateway: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<GatewayError>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("Payment gateway returned {}", status));
            error!(%status, %message, "Payment gateway rejected invoice request");
            return Err(ServiceError::ExternalApiError(message));
        }

        let invoice: InvoiceCreated = response.json().await.map_err(|e| {
            error!(error = %e, "Payment gateway returned an unreadable invoice payload");
            ServiceError::ExternalApiError("Payment gateway returned an invalid response".into())
        })?;

        if let Err(e) = self.orders.set_invoice_id(order.id, &invoice.id).await {
            warn!(error = %e, order_id = %order.id, invoice_id = %invoice.id,
                "Failed to record invoice id on order; returning redirect anyway");
        }

        info!(order_id = %order.id, invoice_id = %invoice.id, "Invoice created");
        Ok(invoice.invoice_url)
    }
}
