// src/ingest/providers/newsdata.rs
use async_trait::async_trait;
use serde_json::Value;

use crate::ingest::field_str;
use crate::ingest::types::{CanonicalArticle, FetchQuery, SourceAdapter, SourceError};

pub const NEWSDATA_BASE_URL: &str = "https://newsdata.io/api/1/news";

/// Keyword-search provider (newsdata.io). Results are capped client-side:
/// the native `size` parameter is plan-dependent and rejects large values.
pub struct NewsDataAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsDataAdapter {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: NEWSDATA_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn params(&self, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("q", query.query.clone()),
        ];
        if let Some(lang) = query.language() {
            params.push(("language", lang.to_string()));
        }
        if let Some(country) = query.country() {
            params.push(("country", country.to_string()));
        }
        params
    }

    pub(crate) fn parse_response(
        body: &str,
        max_results: usize,
    ) -> Result<Vec<CanonicalArticle>, SourceError> {
        let data: Value = serde_json::from_str(body)?;

        if data.get("status").and_then(Value::as_str) == Some("error") {
            let msg = data
                .pointer("/results/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(SourceError::Provider(msg.to_string()));
        }

        let Some(results) = data.get("results").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        Ok(results
            .iter()
            .take(max_results)
            .map(|item| CanonicalArticle {
                published_at: field_str(item, "pubDate"),
                title: field_str(item, "title"),
                body: field_str(item, "description"),
                source_label: field_str(item, "source_id"),
                url: field_str(item, "link"),
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for NewsDataAdapter {
    fn name(&self) -> &'static str {
        "newsdata"
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
