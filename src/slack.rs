//! Slack delivery sink
//!
//! Posts the rendered insight report to one fixed Slack channel via
//! `chat.postMessage`. Fire-and-forget: no retry, no rollback of computed
//! insights when delivery fails.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Slack replies 200 OK even on logical failure; the body's `ok` field
/// decides the outcome.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    channel_id: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build Slack HTTP client")?;
        Ok(Self {
            client,
            token: token.into(),
            channel_id: channel_id.into(),
        })
    }

    /// Post a single text blob to the configured channel.
    pub async fn post_message(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "channel": self.channel_id,
                "text": text,
            }))
            .send()
            .await
            .context("Failed to reach the Slack API")?;

        let body: PostMessageResponse = response
            .json()
            .await
            .context("Failed to decode the Slack API response")?;

        if !body.ok {
            anyhow::bail!(
                "Slack rejected the message: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        info!(channel = %self.channel_id, "Message posted to Slack");
        Ok(())
    }
}
