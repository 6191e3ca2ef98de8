use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use url::Url;

use crate::submission::SubmissionRecord;

#[derive(Debug)]
pub struct NotifyError {
    pub message: String,
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NotifyError {}

impl From<String> for NotifyError {
    fn from(s: String) -> Self {
        NotifyError { message: s }
    }
}

/// Team channel notifications for recorded submissions.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_submission(&self, record: &SubmissionRecord) -> Result<(), NotifyError>;
    async fn notify_error(&self, message: &str) -> Result<(), NotifyError>;
}

/// Posts messages to a Slack incoming webhook.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Url,
}

impl SlackNotifier {
    pub fn new(webhook_url: Url) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(super::NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build Slack client: {e}"))?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    async fn post(&self, message: &Value) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.webhook_url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| format!("Slack webhook request failed: {e}"))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!("Slack webhook failed: {}", status.as_u16()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_submission(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        self.post(&submission_message(record)).await
    }

    async fn notify_error(&self, message: &str) -> Result<(), NotifyError> {
        self.post(&error_message(message)).await
    }
}

/// Block Kit message announcing a new delight.
pub fn submission_message(record: &SubmissionRecord) -> Value {
    let title = "🎉 New External Delight Submission";
    json!({
        "text": format!("{title}!"),
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": title }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Agent:* {}", escape(&record.agent_name)) },
                    { "type": "mrkdwn", "text": format!("*Occasion:* {}", escape(&record.occasion)) },
                    { "type": "mrkdwn", "text": format!("*Submitted:* {}", display_time(&record.timestamp)) }
                ]
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*Links:*\n• <{}|View Ticket>\n• <{}|View Product>",
                        escape(&record.ticket_link),
                        escape(&record.product_link)
                    )
                }
            },
            { "type": "divider" },
            {
                "type": "context",
                "elements": [
                    {
                        "type": "mrkdwn",
                        "text": "💝 Budget: Up to ₹3,000 (≈ $35) | Review and process this delight request"
                    }
                ]
            }
        ]
    })
}

pub fn error_message(message: &str) -> Value {
    json!({
        "text": format!("❌ Error in External Delights workflow: {}", escape(message)),
    })
}

/// Slack treats `&`, `<` and `>` as control characters in mrkdwn.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn display_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%b %-d, %Y %H:%M UTC")
            .to_string(),
        Err(_) => escape(timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            ticket_link: "https://support.example.com/t/1".to_string(),
            product_link: "https://www.amazon.com/dp/B0?a=1&b=2".to_string(),
            occasion: "Birthday <3".to_string(),
            agent_name: "Jane Doe".to_string(),
            timestamp: "2025-03-14T09:26:53.000Z".to_string(),
        }
    }

    #[test]
    fn submission_message_carries_record_fields() {
        let msg = submission_message(&record());
        assert_eq!(msg["blocks"][0]["type"], "header");

        let fields = msg["blocks"][1]["fields"].as_array().unwrap();
        assert_eq!(fields[0]["text"], "*Agent:* Jane Doe");
        assert_eq!(fields[1]["text"], "*Occasion:* Birthday &lt;3");
        assert_eq!(fields[2]["text"], "*Submitted:* Mar 14, 2025 09:26 UTC");

        let links = msg["blocks"][2]["text"]["text"].as_str().unwrap();
        assert!(links.contains("<https://support.example.com/t/1|View Ticket>"));
        assert!(links.contains("<https://www.amazon.com/dp/B0?a=1&amp;b=2|View Product>"));
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        assert_eq!(display_time("sometime"), "sometime");
    }

    #[test]
    fn error_message_is_plain_text() {
        let msg = error_message("disk full");
        assert_eq!(msg["text"], "❌ Error in External Delights workflow: disk full");
        assert!(msg.get("blocks").is_none());
    }
}
