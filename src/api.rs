use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::MonitorConfig;
use crate::filter::ArticleFilter;
use crate::ingest::types::FetchQuery;
use crate::metrics::Metrics;
use crate::pipeline::{Monitor, MonitorOutcome, MonitorRequest};

/// Values used when a query parameter is absent.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub query: String,
    pub max_results: usize,
    pub language: Option<String>,
    pub country: Option<String>,
}

impl From<&MonitorConfig> for RequestDefaults {
    fn from(cfg: &MonitorConfig) -> Self {
        Self {
            query: cfg.query.clone(),
            max_results: cfg.max_results,
            language: cfg.language.clone(),
            country: cfg.country.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub defaults: Arc<RequestDefaults>,
    pub metrics: Option<Metrics>,
}

/// `/metrics` is only mounted when a recorder was installed.
pub fn router(state: AppState) -> Router {
    let metrics = state.metrics.clone();
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/monitor", get(run_monitor))
        .with_state(state);

    let app = match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    };
    app.layer(CorsLayer::very_permissive())
}

#[derive(Debug, Default, Deserialize)]
pub struct MonitorParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub model: Option<String>,
    pub tone: Option<String>,
    #[serde(default)]
    pub notify: bool,
}

impl MonitorParams {
    fn into_request(self, d: &RequestDefaults) -> MonitorRequest {
        let query = self
            .q
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| d.query.clone());
        let max_results = self.limit.unwrap_or(d.max_results).clamp(1, 100);
        // An explicit "all" must survive here so it can disable the default filter.
        let language = self.language.or_else(|| d.language.clone());
        let country = self.country.or_else(|| d.country.clone());

        MonitorRequest {
            fetch: FetchQuery::new(query, max_results)
                .with_language(language.as_deref())
                .with_country(country.as_deref()),
            filter: ArticleFilter::new(self.model.as_deref(), self.tone.as_deref()),
            notify: self.notify,
        }
    }
}

#[derive(Debug, Serialize)]
struct ArticleRow {
    date: String,
    published_at_ts: Option<i64>,
    title: String,
    model: String,
    tone: String,
    summary: String,
    source: String,
    link: String,
}

#[derive(Debug, Serialize)]
struct MonitorResponse {
    status: &'static str,
    total: usize,
    count: usize,
    articles: Vec<ArticleRow>,
}

async fn run_monitor(
    State(state): State<AppState>,
    Query(params): Query<MonitorParams>,
) -> Json<MonitorResponse> {
    let req = params.into_request(&state.defaults);
    let outcome = state.monitor.run(&req).await;

    let (status, total) = match &outcome {
        MonitorOutcome::NoResults => ("no_results", 0),
        MonitorOutcome::Articles { total, .. } => ("ok", *total),
    };
    let articles: Vec<ArticleRow> = outcome
        .articles()
        .iter()
        .map(|a| ArticleRow {
            date: a.article.published_at.clone(),
            published_at_ts: a.published_at_ts.map(|t| t.timestamp()),
            title: a.article.title.clone(),
            model: a.model.clone(),
            tone: a.sentiment.clone(),
            summary: a.summary.clone(),
            source: a.article.source_label.clone(),
            link: a.article.url.clone(),
        })
        .collect();

    Json(MonitorResponse {
        status,
        total,
        count: articles.len(),
        articles,
    })
}
