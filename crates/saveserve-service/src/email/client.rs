//! HTTP email relay client.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use saveserve_core::config::email::EmailConfig;
use saveserve_core::error::AppError;

/// JSON body posted to the relay endpoint.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends transactional email through an HTTP relay.
///
/// When disabled (the default), sends are logged at debug level and
/// dropped — useful for development and tests.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    config: EmailConfig,
}

impl EmailClient {
    /// Creates a new email client from configuration.
    pub fn new(config: EmailConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        if config.enabled {
            info!(relay = %config.relay_url, "Email relay enabled");
        } else {
            info!("Email relay disabled; outbound mail will be dropped");
        }

        Ok(Self { http, config })
    }

    /// Sends one message. Errors describe the relay failure; the caller
    /// decides whether the failure matters.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            debug!(%to, %subject, "Email relay disabled, dropping message");
            return Ok(());
        }

        let message = RelayMessage {
            from: &self.config.from_address,
            to,
            subject,
            text: body,
        };

        let response = self
            .http
            .post(&self.config.relay_url)
            .bearer_auth(&self.config.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Email relay request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Email relay returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
