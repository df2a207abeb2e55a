//! services/api/src/adapters/email.rs
//!
//! Implements the `EmailService` port against the SendGrid v3 mail API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use smartdoc_core::ports::EmailService;
use std::time::Duration;
use tracing::{error, info};

/// Status reported when the message never reached the mail API.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

#[derive(Clone)]
pub struct SendGridEmailAdapter {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl SendGridEmailAdapter {
    /// Every request to the mail API is abandoned after `timeout`.
    pub fn new(
        api_url: &str,
        api_key: Option<String>,
        from: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("smartdoc/mail")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailService for SendGridEmailAdapter {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> u16 {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Email send error: EMAIL_API_KEY is not configured");
            return TRANSPORT_FAILURE_STATUS;
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html_body }],
        });

        let result = self
            .http
            .post(format!("{}/v3/mail/send", self.api_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                info!(%to, status, "Email handed to SendGrid");
                status
            }
            Err(e) => {
                error!(%to, error = %e, "Email send error");
                TRANSPORT_FAILURE_STATUS
            }
        }
    }
}
