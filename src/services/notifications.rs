use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::{config::AppConfig, errors::ServiceError};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    target: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<&'a str>,
}

/// Client for the WhatsApp messaging provider used for OTP delivery and
/// payment confirmations. One request per message, no retry, no delivery
/// tracking.
#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    sender: Option<String>,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("HTTP client construction cannot fail with static options"),
            api_url: config.messaging_api_url.clone(),
            token: config.messaging_api_token.clone(),
            sender: config.messaging_sender.clone(),
        }
    }

    /// Sends one message to the given phone number.
    #[instrument(skip(self, message))]
    pub async fn send(&self, target: &str, message: &str) -> Result<(), ServiceError> {
        let token = self.token.clone().ok_or_else(|| {
            ServiceError::ExternalApiError("Messaging provider token is not configured".to_string())
        })?;

        // The provider expects numbers without the leading plus
        let target = target.trim_start_matches('+');

        let request = SendMessageRequest {
            target,
            message,
            sender: self.sender.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Messaging provider request failed");
                ServiceError::ExternalApiError(format!(
                    "Failed to reach messaging provider: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Messaging provider rejected the message");
            return Err(ServiceError::ExternalApiError(format!(
                "Messaging provider returned {}",
                status
            )));
        }

        info!(target = %target, "Message dispatched");
        Ok(())
    }

    /// Best-effort variant: delivery failures are logged and swallowed so the
    /// surrounding business operation is never rolled back by a notification.
    pub async fn send_best_effort(&self, target: &str, message: &str) {
        if let Err(e) = self.send(target, message).await {
            warn!(error = %e, "Notification delivery failed; continuing");
        }
    }
}
