//! # Monitor pipeline
//! fetch (sequential, per-source fault isolation) → merge → enrich → sort →
//! notify (pre-filter) → filter. Stateless: every run starts from nothing.

use std::sync::Arc;

use serde::Serialize;

use crate::analyze::classifier::shared_classifier;
use crate::analyze::{EnrichedArticle, Enricher};
use crate::config::MonitorConfig;
use crate::filter::ArticleFilter;
use crate::ingest::providers::{FeedAdapter, MediastackAdapter, NewsDataAdapter};
use crate::ingest::types::{FetchQuery, SourceAdapter};
use crate::ingest::{build_http_client, fetch_all, merge};
use crate::notify::{notify_all, Notifier, WebhookNotifier};
use crate::timeline::sort_newest_first;

#[derive(Debug, Clone)]
pub struct MonitorRequest {
    pub fetch: FetchQuery,
    pub filter: ArticleFilter,
    pub notify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonitorOutcome {
    /// Every source came back empty; nothing was enriched or sent.
    NoResults,
    Articles {
        /// Count before filtering.
        total: usize,
        articles: Vec<EnrichedArticle>,
    },
}

impl MonitorOutcome {
    pub fn articles(&self) -> &[EnrichedArticle] {
        match self {
            Self::NoResults => &[],
            Self::Articles { articles, .. } => articles,
        }
    }
}

pub struct Monitor {
    adapters: Vec<Box<dyn SourceAdapter>>,
    enricher: Enricher,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Monitor {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, enricher: Enricher) -> Self {
        Self {
            adapters,
            enricher,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Wire adapters, the shared classifier and the webhook from config.
    /// Sources without credentials are left out.
    pub fn from_config(cfg: &MonitorConfig) -> Self {
        let http = build_http_client(cfg.http_timeout_secs);
        let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

        let src = &cfg.sources;
        if src.newsdata_api_key.is_empty() {
            tracing::info!(source = "newsdata", "no API key, source disabled");
        } else {
            let mut a = NewsDataAdapter::new(http.clone(), src.newsdata_api_key.clone());
            if let Some(url) = &src.newsdata_base_url {
                a = a.with_base_url(url.clone());
            }
            adapters.push(Box::new(a));
        }

        if src.mediastack_api_key.is_empty() {
            tracing::info!(source = "mediastack", "no API key, source disabled");
        } else {
            let mut a = MediastackAdapter::new(http.clone(), src.mediastack_api_key.clone());
            if let Some(url) = &src.mediastack_base_url {
                a = a.with_base_url(url.clone());
            }
            adapters.push(Box::new(a));
        }

        if !src.feeds.is_empty() {
            adapters.push(Box::new(
                FeedAdapter::new(http.clone(), src.feeds.clone())
                    .with_title_filter(src.feed_title_filter),
            ));
        }

        let classifier = shared_classifier(&cfg.classifier, http.clone());
        let enricher = Enricher::new(classifier, cfg.catalog(), cfg.labels.clone());
        let mut monitor = Self::new(adapters, enricher);

        if cfg.notify.enabled && !cfg.notify.webhook_url.is_empty() {
            monitor = monitor.with_notifier(Arc::new(WebhookNotifier::new(
                cfg.notify.webhook_url.clone(),
                http,
            )));
        }
        monitor
    }

    pub async fn run(&self, req: &MonitorRequest) -> MonitorOutcome {
        let merged = merge(fetch_all(&self.adapters, &req.fetch).await);
        if merged.is_empty() {
            tracing::info!(query = %req.fetch.query, "no articles found");
            return MonitorOutcome::NoResults;
        }

        let mut enriched = self.enricher.enrich_all(merged).await;
        sort_newest_first(&mut enriched);

        if req.notify {
            match &self.notifier {
                Some(n) => {
                    let sent = notify_all(n.as_ref(), &enriched).await;
                    tracing::info!(sent, total = enriched.len(), "notifications sent");
                }
                None => tracing::debug!("notify requested but no notifier configured"),
            }
        }

        let total = enriched.len();
        let articles = if req.filter.is_pass_through() {
            enriched
        } else {
            req.filter.apply(&enriched)
        };
        tracing::info!(total, shown = articles.len(), "monitor run finished");

        MonitorOutcome::Articles { total, articles }
    }
}
