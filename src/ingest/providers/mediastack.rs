// src/ingest/providers/mediastack.rs
use async_trait::async_trait;
use serde_json::Value;

use crate::ingest::field_str;
use crate::ingest::types::{CanonicalArticle, FetchQuery, SourceAdapter, SourceError};

pub const MEDIASTACK_BASE_URL: &str = "http://api.mediastack.com/v1/news";

/// Provider caps `limit` at 100.
const MEDIASTACK_MAX_LIMIT: usize = 100;

/// Alternate keyword-search provider (mediastack). Uses the native `limit`
/// parameter and still truncates locally in case the provider ignores it.
pub struct MediastackAdapter {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl MediastackAdapter {
    pub fn new(client: reqwest::Client, access_key: impl Into<String>) -> Self {
        Self {
            client,
            access_key: access_key.into(),
            base_url: MEDIASTACK_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn params(&self, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let limit = query.max_results.clamp(1, MEDIASTACK_MAX_LIMIT);
        let mut params = vec![
            ("access_key", self.access_key.clone()),
            ("keywords", query.query.clone()),
            ("limit", limit.to_string()),
        ];
        if let Some(lang) = query.language() {
            params.push(("languages", lang.to_string()));
        }
        if let Some(country) = query.country() {
            params.push(("countries", country.to_string()));
        }
        params
    }

    pub(crate) fn parse_response(
        body: &str,
        max_results: usize,
    ) -> Result<Vec<CanonicalArticle>, SourceError> {
        let data: Value = serde_json::from_str(body)?;

        if let Some(err) = data.get("error") {
            let msg = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(SourceError::Provider(msg.to_string()));
        }

        let Some(items) = data.get("data").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        Ok(items
            .iter()
            .take(max_results)
            .map(|item| CanonicalArticle {
                published_at: field_str(item, "published_at"),
                title: field_str(item, "title"),
                body: field_str(item, "description"),
                source_label: field_str(item, "source"),
                url: field_str(item, "url"),
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for MediastackAdapter {
    fn name(&self) -> &'static str {
        "mediastack"
    }

    async fn try_fetch(&self, query: &FetchQuery) -> Result<Vec<CanonicalArticle>, SourceError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.params(query))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body = resp.text().await?;
        Self::parse_response(&body, query.max_results)
    }
}
