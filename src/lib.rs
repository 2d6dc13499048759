// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod sentiment;
pub mod timeline;

// Ingestion: source adapters + merge
pub mod ingest;

// Enrichment: model tagging, sentiment classification, summary
pub mod analyze;

// Per-article alerts
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::analyze::classifier::{ClassId, LazyClassifier, SentimentClassifier};
pub use crate::analyze::{EnrichedArticle, Enricher, ModelCatalog, SentimentLabels};
pub use crate::api::router;
pub use crate::config::MonitorConfig;
pub use crate::filter::ArticleFilter;
pub use crate::ingest::types::{CanonicalArticle, FetchQuery, SourceAdapter, SourceError};
pub use crate::notify::{Notifier, WebhookNotifier};
pub use crate::pipeline::{Monitor, MonitorOutcome, MonitorRequest};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. `RUST_LOG` wins over the default filter;
/// `MONITOR_LOG_JSON=1` switches to JSON lines. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("brand_news_monitor=info,warn"));

    let json = std::env::var("MONITOR_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
