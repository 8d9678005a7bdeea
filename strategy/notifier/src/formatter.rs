//! Turns change events into Slack-compatible attachments and payloads.

use clients_webhook::{Attachment, SlackPayload};
use utils::format_amount;

use crate::types::{ChangeEvent, Direction, Metric};

const COIN_PAGE_URL: &str = "https://coinmarketcap.com/currencies";
const COLOR_INCREASED: &str = "#7CD197";
const COLOR_DECREASED: &str = "#D17C7C";

/// Builds message payloads with a fixed sender identity.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    username: String,
    icon_emoji: String,
}

impl MessageFormatter {
    pub fn new(username: impl Into<String>, icon_emoji: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            icon_emoji: icon_emoji.into(),
        }
    }

    /// One attachment describing `event`.
    ///
    /// Returns `None` if the event has no directional change to report.
    pub fn attachment(&self, event: &ChangeEvent) -> Option<Attachment> {
        let primary = event.primary()?;
        let name = event.display_name();
        let threshold = event
            .fired
            .iter()
            .find(|c| c.metric == primary.metric)
            .map(|c| c.percent)
            .unwrap_or_default();

        let title = format!(
            "{} {} {} by {}% (threshold {}%)",
            name,
            primary.metric.label(),
            primary.direction,
            format_amount(primary.percent, 2),
            format_amount(threshold, 2),
        );

        let current = &event.current;
        let previous = &event.previous;
        let mut lines = vec![
            format!(
                "New price is *${}*, *btc {}*",
                format_amount(current.price_usd, 6),
                format_amount(current.price_btc, 8)
            ),
            format!(
                "Old price is *${}*, *btc {}*",
                format_amount(previous.price_usd, 6),
                format_amount(previous.price_btc, 8)
            ),
        ];
        if primary.metric != Metric::PriceUsd {
            if let Some(usd) = event.change(Metric::PriceUsd) {
                lines.push(format!(
                    "Price {} by *{}%*",
                    usd.direction,
                    format_amount(usd.percent, 2)
                ));
            }
        }
        if let Some(btc) = event.change(Metric::PriceBtc) {
            lines.push(format!(
                "BTC price {} by *{}%*",
                btc.direction,
                format_amount(btc.percent, 2)
            ));
        }
        lines.push(format!(
            "24h volume is *${}*",
            format_amount(current.daily_volume_usd, 0)
        ));
        if let Some(supply) = event.change(Metric::TotalSupply) {
            lines.push(format!(
                "Total supply {} by *{}* (*{}%*)",
                supply.direction,
                format_amount(supply.delta().abs(), 2),
                format_amount(supply.percent, 5)
            ));
        }

        Some(Attachment {
            pretext: format!("*{}*", name),
            title,
            text: lines.join("\n"),
            thumb_url: event.coin.icon_url.clone(),
            title_link: format!("{}/{}/", COIN_PAGE_URL, event.coin.id),
            color: match primary.direction {
                Direction::Increased => COLOR_INCREASED,
                Direction::Decreased => COLOR_DECREASED,
            }
            .to_string(),
            mrkdwn_in: vec!["pretext".to_string(), "text".to_string()],
        })
    }

    /// Attachments for every event that has something to report.
    pub fn attachments<'e, I>(&self, events: I) -> Vec<Attachment>
    where
        I: IntoIterator<Item = &'e ChangeEvent>,
    {
        events
            .into_iter()
            .filter_map(|event| self.attachment(event))
            .collect()
    }

    pub fn payload(&self, channel: Option<&str>, attachments: Vec<Attachment>) -> SlackPayload {
        SlackPayload {
            channel: channel.map(slack_channel),
            username: self.username.clone(),
            icon_emoji: self.icon_emoji.clone(),
            attachments,
        }
    }
}

/// Channel names are configured bare; Slack expects the leading `#`.
fn slack_channel(name: &str) -> String {
    if name.starts_with('#') {
        name.to_string()
    } else {
        format!("#{}", name)
    }
}
