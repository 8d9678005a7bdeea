use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;

use crate::types::SlackPayload;

/// Client for posting Slack-compatible payloads to incoming webhooks.
pub struct WebhookClient {
    client: Arc<Client>,
}

impl WebhookClient {
    /// Creates a new `WebhookClient` sharing the given HTTP client.
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Posts the payload to `url`. Non-2xx responses are errors.
    pub async fn post(&self, url: &str, payload: &SlackPayload) -> Result<()> {
        self.client
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Discord accepts Slack-formatted bodies on the `/slack` suffix of a webhook URL.
pub fn discord_slack_endpoint(webhook_url: &str) -> String {
    let base = webhook_url.trim_end_matches('/');
    if base.ends_with("/slack") {
        base.to_string()
    } else {
        format!("{}/slack", base)
    }
}
