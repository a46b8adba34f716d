use anyhow::{Context, Result};
use async_trait::async_trait;

/// Alert collaborator: delivers a budget notification for one user.
/// Dispatch failure is non-fatal — callers report the outcome and move on.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn notify(&self, user_id: &str, percentage_used: f64) -> Result<()>;
}

/// POSTs the alert payload to a configured webhook.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookDispatcher {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl AlertDispatcher for WebhookDispatcher {
    async fn notify(&self, user_id: &str, percentage_used: f64) -> Result<()> {
        let payload = serde_json::json!({
            "user_id": user_id,
            "percentage_used": percentage_used,
            "message": format!(
                "Budget alert: {:.1}% of your monthly budget is used",
                percentage_used
            ),
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("Alert webhook request failed")?;

        response
            .error_for_status()
            .context("Alert webhook returned an error status")?;

        Ok(())
    }
}

/// Fallback when no webhook is configured: the alert only lands in the log.
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn notify(&self, user_id: &str, percentage_used: f64) -> Result<()> {
        tracing::warn!(
            "Budget alert for {}: {:.1}% of monthly budget used (no webhook configured)",
            user_id,
            percentage_used
        );
        Ok(())
    }
}
