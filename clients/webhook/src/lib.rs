mod client;
mod types;

pub use client::{discord_slack_endpoint, WebhookClient};
pub use types::{Attachment, SlackPayload};
