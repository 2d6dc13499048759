// src/ingest/mod.rs
pub mod providers;
pub mod types;

use std::time::Duration;

use crate::ingest::types::{CanonicalArticle, FetchQuery, SourceAdapter};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde_json::Value;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "monitor_articles_fetched_total",
            "Articles returned by source adapters."
        );
        describe_counter!(
            "monitor_source_errors_total",
            "Source adapter failures degraded to an empty result."
        );
        describe_counter!(
            "monitor_classifier_failures_total",
            "Classifier failures replaced by the fallback label."
        );
        describe_counter!(
            "monitor_notify_failures_total",
            "Notification deliveries that failed and were dropped."
        );
        describe_histogram!("monitor_fetch_ms", "Adapter fetch time in milliseconds.");
    });
}

/// Shared HTTP client for providers, the classifier and webhooks.
/// The timeout applies per request; expiry counts as that caller's failure.
pub fn build_http_client(timeout_secs: u64) -> reqwest::Client {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    reqwest::Client::builder()
        .user_agent(concat!("brand-news-monitor/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "http client builder failed, using defaults");
            reqwest::Client::new()
        })
}

/// Call every adapter in order and keep one result list per adapter.
/// Adapters run one after another; a failing adapter contributes an empty list.
pub async fn fetch_all(
    adapters: &[Box<dyn SourceAdapter>],
    query: &FetchQuery,
) -> Vec<Vec<CanonicalArticle>> {
    ensure_metrics_described();

    let mut out = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        let t0 = std::time::Instant::now();
        let articles = adapter.fetch(query).await;
        histogram!("monitor_fetch_ms", "source" => adapter.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("monitor_articles_fetched_total", "source" => adapter.name())
            .increment(articles.len() as u64);
        tracing::debug!(
            source = adapter.name(),
            count = articles.len(),
            "collected articles"
        );
        out.push(articles);
    }
    out
}

/// Straight concatenation in adapter order. No dedup, no reordering.
pub fn merge(batches: Vec<Vec<CanonicalArticle>>) -> Vec<CanonicalArticle> {
    batches.into_iter().flatten().collect()
}

/// Read a string field from a provider JSON object.
/// Missing or null fields become "", numbers and booleans are stringified.
pub(crate) fn field_str(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
