//! Delivery of formatted payloads to Slack and Discord webhooks.

use async_trait::async_trait;
use clients_webhook::{discord_slack_endpoint, SlackPayload, WebhookClient};
use tracing::{info, warn};

use crate::config::NotifierConfig;
use crate::formatter::MessageFormatter;
use crate::types::ChangeEvent;

/// Anything that can post a payload to a webhook URL.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn post(&self, url: &str, payload: &SlackPayload) -> anyhow::Result<()>;
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn post(&self, url: &str, payload: &SlackPayload) -> anyhow::Result<()> {
        WebhookClient::post(self, url, payload).await
    }
}

/// A payload and every URL it should be posted to.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub payload: SlackPayload,
    pub destinations: Vec<String>,
}

/// Counts of attempted posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

impl DeliveryReport {
    fn merge(&mut self, other: DeliveryReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// Plans and sends the notifications for one run.
pub struct Dispatcher<'a, S: ?Sized> {
    sink: &'a S,
    config: &'a NotifierConfig,
    formatter: MessageFormatter,
}

impl<'a, S: WebhookSink + ?Sized> Dispatcher<'a, S> {
    pub fn new(sink: &'a S, config: &'a NotifierConfig) -> Self {
        Self {
            sink,
            config,
            formatter: MessageFormatter::new(&config.sender_name, &config.icon_emoji),
        }
    }

    /// Builds the deliveries for `events`.
    ///
    /// The default Slack webhook and default Discord webhooks get one payload
    /// with every changed coin. A coin with its own Slack channel or Discord
    /// webhook additionally gets a payload with only that coin.
    pub fn plan(&self, events: &[ChangeEvent]) -> Vec<Delivery> {
        let mut deliveries = Vec::new();

        let attachments = self.formatter.attachments(events);
        if attachments.is_empty() {
            return deliveries;
        }

        let mut broadcast = Vec::new();
        if let Some(url) = &self.config.slack_webhook_url {
            broadcast.push(url.clone());
        }
        broadcast.extend(
            self.config
                .discord_webhook_urls
                .iter()
                .map(|url| discord_slack_endpoint(url)),
        );
        if !broadcast.is_empty() {
            deliveries.push(Delivery {
                payload: self
                    .formatter
                    .payload(self.config.slack_channel.as_deref(), attachments),
                destinations: broadcast,
            });
        }

        for event in events {
            let Some(attachment) = self.formatter.attachment(event) else {
                continue;
            };
            if let (Some(channel), Some(url)) =
                (&event.coin.slack_channel, &self.config.slack_webhook_url)
            {
                deliveries.push(Delivery {
                    payload: self
                        .formatter
                        .payload(Some(channel.as_str()), vec![attachment.clone()]),
                    destinations: vec![url.clone()],
                });
            }
            if let Some(url) = &event.coin.discord_webhook_url {
                deliveries.push(Delivery {
                    payload: self.formatter.payload(None, vec![attachment]),
                    destinations: vec![discord_slack_endpoint(url)],
                });
            }
        }

        deliveries
    }

    /// Sends every planned delivery. Failures are logged and counted.
    pub async fn deliver(&self, events: &[ChangeEvent]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for delivery in self.plan(events) {
            report.merge(dispatch(self.sink, &delivery.payload, &delivery.destinations).await);
        }
        report
    }
}

/// Posts `payload` to each destination independently.
pub async fn dispatch<S: WebhookSink + ?Sized>(
    sink: &S,
    payload: &SlackPayload,
    destinations: &[String],
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for url in destinations {
        match sink.post(url, payload).await {
            Ok(()) => {
                report.sent += 1;
                info!(
                    destination = %redact(url),
                    channel = payload.channel.as_deref().unwrap_or("-"),
                    attachments = payload.attachments.len(),
                    "notification sent"
                );
            }
            Err(e) => {
                report.failed += 1;
                warn!(destination = %redact(url), error = %format!("{:#}", e), "notification failed");
            }
        }
    }
    report
}

/// Webhook URLs embed their secret in the path; only the host is logged.
fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}/...",
            parsed.scheme(),
            parsed.host_str().unwrap_or("?")
        ),
        Err(_) => "<invalid url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_keeps_only_scheme_and_host() {
        assert_eq!(
            redact("https://hooks.slack.com/services/T000/B000/XXXX"),
            "https://hooks.slack.com/..."
        );
        assert_eq!(redact("not a url"), "<invalid url>");
    }
}
