// src/analyze/mod.rs
//! Enrichment: model tag, sentiment label and summary for each fetched article.

pub mod classifier;
pub mod models;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::analyze::classifier::{ClassId, ClassifierError, LazyClassifier};
use crate::ingest::types::CanonicalArticle;

pub use crate::analyze::models::{detect_model, ModelCatalog};

/// Characters of body kept in the summary.
pub const SUMMARY_CHARS: usize = 200;
/// Characters of body submitted to the classifier.
pub const CLASSIFIER_INPUT_CHARS: usize = 512;

/// Article after enrichment. `published_at_ts` is filled by the timeline sort;
/// `None` there means the raw date could not be parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: CanonicalArticle,
    pub summary: String,
    pub sentiment: String,
    pub model: String,
    pub published_at_ts: Option<DateTime<Utc>>,
}

fn default_negative() -> String {
    "Negative".into()
}
fn default_neutral() -> String {
    "Neutral".into()
}
fn default_positive() -> String {
    "Positive".into()
}

/// Human labels for the three classes plus the label used when classification fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentLabels {
    #[serde(default = "default_negative")]
    pub negative: String,
    #[serde(default = "default_neutral")]
    pub neutral: String,
    #[serde(default = "default_positive")]
    pub positive: String,
    #[serde(default = "default_neutral")]
    pub fallback: String,
}

impl Default for SentimentLabels {
    fn default() -> Self {
        Self {
            negative: default_negative(),
            neutral: default_neutral(),
            positive: default_positive(),
            fallback: default_neutral(),
        }
    }
}

impl SentimentLabels {
    pub fn label_for(&self, class: ClassId) -> &str {
        match class {
            ClassId::Negative => &self.negative,
            ClassId::Neutral => &self.neutral,
            ClassId::Positive => &self.positive,
        }
    }

    /// True for any value the enricher can emit.
    pub fn contains(&self, label: &str) -> bool {
        [&self.negative, &self.neutral, &self.positive, &self.fallback]
            .iter()
            .any(|l| l.as_str() == label)
    }
}

/// First 200 characters of `body` followed by "...", or "" for an empty body.
/// The marker is appended even when nothing was cut.
pub fn summarize(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    let mut out: String = body.chars().take(SUMMARY_CHARS).collect();
    out.push_str("...");
    out
}

pub struct Enricher {
    classifier: Arc<LazyClassifier>,
    catalog: ModelCatalog,
    labels: SentimentLabels,
}

impl Enricher {
    pub fn new(classifier: Arc<LazyClassifier>, catalog: ModelCatalog, labels: SentimentLabels) -> Self {
        Self {
            classifier,
            catalog,
            labels,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn labels(&self) -> &SentimentLabels {
        &self.labels
    }

    /// Classify the leading part of the body. Errors are returned, not folded.
    pub async fn classify_body(&self, body: &str) -> Result<ClassId, ClassifierError> {
        let input: String = body.chars().take(CLASSIFIER_INPUT_CHARS).collect();
        self.classifier.classify(&input).await
    }

    pub async fn enrich(&self, article: CanonicalArticle) -> EnrichedArticle {
        let sentiment = match self.classify_body(&article.body).await {
            Ok(class) => self.labels.label_for(class).to_string(),
            Err(e) => {
                tracing::warn!(error = %e, url = %article.url, "classification failed, using fallback label");
                counter!("monitor_classifier_failures_total").increment(1);
                self.labels.fallback.clone()
            }
        };
        let model = self.catalog.detect(&article.title).to_string();
        let summary = summarize(&article.body);

        EnrichedArticle {
            article,
            summary,
            sentiment,
            model,
            published_at_ts: None,
        }
    }

    /// Enrich every article, one at a time, preserving order and count.
    pub async fn enrich_all(&self, articles: Vec<CanonicalArticle>) -> Vec<EnrichedArticle> {
        let mut out = Vec::with_capacity(articles.len());
        for a in articles {
            out.push(self.enrich(a).await);
        }
        out
    }
}
