use async_trait::async_trait;
use serde_json::json;

use super::Notifier;

/// Mailer backed by the Resend HTTP API. Without an API key it degrades
/// to logging the would-be delivery, which keeps development and tests
/// offline.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
}

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

impl ResendMailer {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for ResendMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(api_key) = &self.api_key else {
            tracing::info!(%to, %subject, "email delivery skipped (no API key)");
            return;
        };

        let payload = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": body,
        });

        match self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(%to, %subject, "email sent");
            }
            Ok(resp) => {
                tracing::warn!(%to, status = %resp.status(), "email delivery rejected");
            }
            Err(e) => {
                tracing::warn!(%to, error = %e, "email delivery failed");
            }
        }
    }
}
