use anyhow::{Context, Result};
use reqwest::Client;

use super::{format_message, Notifier};
use crate::analyze::EnrichedArticle;

/// Posts `{"text": ...}` to an incoming-webhook URL (Slack / Mattermost style).
pub struct WebhookNotifier {
    webhook_url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            webhook_url: url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, article: &EnrichedArticle) -> Result<()> {
        let body = serde_json::json!({ "text": format_message(article) });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }
}
