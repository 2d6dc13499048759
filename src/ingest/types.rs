// src/ingest/types.rs
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized article shape every provider is converted into.
/// Fields a provider does not supply are empty strings, never missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalArticle {
    pub published_at: String, // raw provider date, format varies per source
    pub title: String,
    pub body: String,
    pub source_label: String, // provider id, feed title or feed URL
    pub url: String,
}

/// Parameters shared by every adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub query: String,
    pub max_results: usize,
    pub language: Option<String>,
    pub country: Option<String>,
}

impl FetchQuery {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            language: None,
            country: None,
        }
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_string);
        self
    }

    pub fn with_country(mut self, country: Option<&str>) -> Self {
        self.country = country.map(str::to_string);
        self
    }

    /// Language filter to send, or `None` when the caller asked for "all".
    pub fn language(&self) -> Option<&str> {
        selected(self.language.as_deref())
    }

    /// Country filter to send, or `None` when the caller asked for "all".
    pub fn country(&self) -> Option<&str> {
        selected(self.country.as_deref())
    }
}

/// Folds the "no filter" sentinels (`None`, empty, `all`) into `None`.
pub fn selected(value: Option<&str>) -> Option<&str> {
    match value.map(str::trim) {
        None => None,
        Some(v) if v.is_empty() || v.eq_ignore_ascii_case("all") => None,
        Some(v) => Some(v),
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed parse error: {0}")]
    Feed(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// One external news source: fetches and normalizes to [`CanonicalArticle`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw call; failures are reported, not hidden.
    async fn try_fetch(&self, query: &FetchQuery) -> Result<Vec<CanonicalArticle>, SourceError>;

    /// Best-effort fetch: any failure degrades to an empty result for this source.
    async fn fetch(&self, query: &FetchQuery) -> Vec<CanonicalArticle> {
        match self.try_fetch(query).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(source = self.name(), error = %e, "source adapter failed");
                counter!("monitor_source_errors_total", "source" => self.name()).increment(1);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_mean_no_filter() {
        assert_eq!(selected(None), None);
        assert_eq!(selected(Some("")), None);
        assert_eq!(selected(Some("  ")), None);
        assert_eq!(selected(Some("ALL")), None);
        assert_eq!(selected(Some(" fr ")), Some("fr"));
    }

    #[test]
    fn fetch_query_exposes_only_active_filters() {
        let q = FetchQuery::new("DS Automobiles", 5)
            .with_language(Some("all"))
            .with_country(Some("fr"));
        assert_eq!(q.language(), None);
        assert_eq!(q.country(), Some("fr"));
    }
}
