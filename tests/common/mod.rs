// tests/common/mod.rs
// Stubs shared by the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brand_news_monitor::analyze::classifier::{ClassifierError, DynClassifier};
use brand_news_monitor::{
    CanonicalArticle, ClassId, EnrichedArticle, Enricher, FetchQuery, LazyClassifier,
    ModelCatalog, Notifier, SentimentClassifier, SentimentLabels, SourceAdapter, SourceError,
};

pub const MODELS: &[&str] = &[
    "DS N4", "DS N8", "DS7", "DS3", "DS9", "DS4", "Jules Verne", "N°4", "N°8",
];

pub fn catalog() -> ModelCatalog {
    ModelCatalog::new(MODELS.iter().map(|m| m.to_string()).collect(), "DS Global")
}

pub fn article(date: &str, title: &str, body: &str) -> CanonicalArticle {
    CanonicalArticle {
        published_at: date.into(),
        title: title.into(),
        body: body.into(),
        source_label: "stub".into(),
        url: format!("https://example.test/{}", title.replace(' ', "-")),
    }
}

/// Always answers the same class.
pub struct FixedClassifier(pub ClassId);

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassId, ClassifierError> {
        Ok(self.0)
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Always fails, like an unreachable model endpoint.
pub struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassId, ClassifierError> {
        Err(ClassifierError::Unavailable("stub offline".into()))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

/// "good" → Positive, "bad" → Negative, empty → rejected, else Neutral.
/// Records every input it receives.
#[derive(Default)]
pub struct KeywordClassifier {
    pub inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<ClassId, ClassifierError> {
        self.inputs.lock().expect("inputs lock").push(text.to_string());
        if text.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        let t = text.to_lowercase();
        Ok(if t.contains("good") {
            ClassId::Positive
        } else if t.contains("bad") {
            ClassId::Negative
        } else {
            ClassId::Neutral
        })
    }
    fn name(&self) -> &'static str {
        "keyword"
    }
}

pub fn enricher_with(classifier: DynClassifier) -> Enricher {
    Enricher::new(
        Arc::new(LazyClassifier::ready(classifier)),
        catalog(),
        SentimentLabels::default(),
    )
}

/// Adapter returning canned articles, or failing when `articles` is `None`.
pub struct StubAdapter {
    pub name: &'static str,
    pub articles: Option<Vec<CanonicalArticle>>,
}

impl StubAdapter {
    pub fn ok(name: &'static str, articles: Vec<CanonicalArticle>) -> Self {
        Self {
            name,
            articles: Some(articles),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            articles: None,
        }
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn try_fetch(&self, _query: &FetchQuery) -> Result<Vec<CanonicalArticle>, SourceError> {
        self.articles
            .clone()
            .ok_or_else(|| SourceError::Provider("stub outage".into()))
    }
}

/// Collects titles of every article it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, article: &EnrichedArticle) -> anyhow::Result<()> {
        self.sent
            .lock()
            .expect("sent lock")
            .push(article.article.title.clone());
        if self.fail {
            anyhow::bail!("webhook unreachable");
        }
        Ok(())
    }
}
