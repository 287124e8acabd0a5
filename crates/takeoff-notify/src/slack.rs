//! Slack chat.postMessage client.

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Notification delivery errors. Callers that go through [`SlackNotifier::notify`]
/// never see these; they exist for the tested `send` path.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack accepted the request but rejected the message.
    #[error("Slack API error: {0}")]
    Api(String),
}

/// Minimal chat.postMessage response body.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Posts plain-text messages to one Slack channel.
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
    post_message_url: String,
}

impl SlackNotifier {
    pub fn new(
        token: impl Into<String>,
        channel: impl Into<String>,
        post_message_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            channel: channel.into(),
            post_message_url: post_message_url.into(),
        }
    }

    /// Send `text` to the configured channel.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "channel": self.channel,
            "text": text,
        });

        let response = self
            .client
            .post(&self.post_message_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Api(format!("status {}", status)));
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Api(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(channel = %self.channel, "notification sent");
        Ok(())
    }

    /// Fire-and-forget wrapper: delivery failures are logged, never returned.
    pub async fn notify(&self, text: &str) {
        if let Err(e) = self.send(text).await {
            warn!(error = %e, "failed to send Slack notification");
        }
    }
}
