use serde::Serialize;

/// Body of a Slack "incoming webhook" request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub username: String,
    pub icon_emoji: String,
    pub attachments: Vec<Attachment>,
}

/// A single message attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub pretext: String,
    pub title: String,
    pub text: String,
    pub thumb_url: String,
    pub title_link: String,
    pub color: String,
    /// Fields rendered as markdown.
    pub mrkdwn_in: Vec<String>,
}
