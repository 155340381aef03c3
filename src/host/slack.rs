//! Slack Notifier Module
//!
//! フォームに回答が送信されたことを、Slackの Incoming Webhook に投稿する。

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use super::Notifier;
use crate::error::{Result, SkillRadarError};

/// 入力完了の通知内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// 会社名
    pub organization: String,
    /// 氏名
    pub person: String,
    /// PDFのダウンロードURL
    pub pdf_url: Option<String>,
}

impl Notification {
    /// mrkdwn形式の本文
    pub fn message(&self) -> String {
        let mut text = format!(
            "「{}」の「{}」さんがスキルチェックシートに入力しました。",
            self.organization, self.person
        );
        if let Some(url) = &self.pdf_url {
            text.push_str(&format!("\n\n<{}|PDFをダウンロード>", url));
        }
        text
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    blocks: Vec<Block<'a>>,
}

#[derive(Serialize)]
struct Block<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: Text,
}

#[derive(Serialize)]
struct Text {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

/// Slack Incoming Webhook への投稿
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook: String,
}

impl SlackNotifier {
    /// Webhook URLを指定して生成
    pub fn new(webhook: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook: webhook.into(),
        }
    }

    /// 送信するJSONペイロード
    pub fn payload(notification: &Notification) -> Result<serde_json::Value> {
        let payload = WebhookPayload {
            blocks: vec![Block {
                kind: "section",
                text: Text {
                    kind: "mrkdwn",
                    text: notification.message(),
                },
            }],
        };
        Ok(serde_json::to_value(payload)?)
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        debug!(organization = %notification.organization, person = %notification.person, "post webhook");
        let response = self
            .client
            .post(&self.webhook)
            .json(&Self::payload(notification)?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillRadarError::Http {
                status: status.as_u16(),
                url: self.webhook.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::serve_once;
    use serde_json::json;

    fn notification(pdf_url: Option<&str>) -> Notification {
        Notification {
            organization: "ACME".to_string(),
            person: "山田".to_string(),
            pdf_url: pdf_url.map(str::to_string),
        }
    }

    #[test]
    fn test_message_with_pdf_link() {
        assert_eq!(
            notification(Some("https://example.com/a.pdf")).message(),
            "「ACME」の「山田」さんがスキルチェックシートに入力しました。\n\n<https://example.com/a.pdf|PDFをダウンロード>"
        );
    }

    #[test]
    fn test_message_without_pdf() {
        assert_eq!(
            notification(None).message(),
            "「ACME」の「山田」さんがスキルチェックシートに入力しました。"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = SlackNotifier::payload(&notification(None)).unwrap();
        assert_eq!(
            payload,
            json!({
                "blocks": [{
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": "「ACME」の「山田」さんがスキルチェックシートに入力しました。"
                    }
                }]
            })
        );
    }

    #[test]
    fn test_notify_posts_json_payload() {
        let (base_url, server) = serve_once("200 OK", b"ok");
        let notifier = SlackNotifier::new(format!("{}/services/T000/B000/XXXX", base_url));
        let notification = notification(Some("https://example.com/a.pdf"));

        notifier.notify(&notification).unwrap();

        let request = server.join().unwrap();
        assert_eq!(request.request_line, "POST /services/T000/B000/XXXX HTTP/1.1");
        assert_eq!(request.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, SlackNotifier::payload(&notification).unwrap());
    }

    #[test]
    fn test_notify_error_status() {
        let (base_url, server) = serve_once("403 Forbidden", b"invalid_token");
        let webhook = format!("{}/services/T000/B000/XXXX", base_url);

        let result = SlackNotifier::new(webhook.clone()).notify(&notification(None));

        match result {
            Err(SkillRadarError::Http { status, url }) => {
                assert_eq!(status, 403);
                assert_eq!(url, webhook);
            }
            other => panic!("Expected Http error: {:?}", other),
        }
        server.join().unwrap();
    }
}
