//! Sentiment classifier boundary: provider abstraction + lazily loaded shared instance.
//!
//! Classifiers answer with one of three ordinal classes. Every failure is a
//! [`ClassifierError`] so the enricher can fold it into the fallback label.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sentiment::LexiconClassifier;

pub const DEFAULT_HF_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment";

/// Ordinal class returned by a three-class sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassId {
    Negative = 0,
    Neutral = 1,
    Positive = 2,
}

impl ClassId {
    pub fn from_index(i: u8) -> Option<Self> {
        match i {
            0 => Some(Self::Negative),
            1 => Some(Self::Neutral),
            2 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Parse a provider label: `LABEL_0..2` or the plain class names.
    pub fn from_label(label: &str) -> Result<Self, ClassifierError> {
        let l = label.trim();
        if let Some(idx) = l.strip_prefix("LABEL_") {
            return idx
                .parse::<u8>()
                .ok()
                .and_then(Self::from_index)
                .ok_or_else(|| ClassifierError::UnexpectedOutput(l.to_string()));
        }
        match l.to_ascii_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            _ => Err(ClassifierError::UnexpectedOutput(l.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected classifier output: {0}")]
    UnexpectedOutput(String),

    #[error("empty input rejected")]
    EmptyInput,
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassId, ClassifierError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Hugging Face when a token is configured, lexicon otherwise.
    #[default]
    Auto,
    HuggingFace,
    Lexicon,
}

fn default_model_url() -> String {
    DEFAULT_HF_MODEL_URL.to_string()
}

fn default_api_token() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,
    #[serde(default = "default_model_url")]
    pub model_url: String,
    /// "ENV" means: read from HF_API_TOKEN.
    #[serde(default = "default_api_token")]
    pub api_token: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            model_url: default_model_url(),
            api_token: default_api_token(),
        }
    }
}

// ------------------------------------------------------------
// Hugging Face Inference API
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

pub struct HuggingFaceClassifier {
    http: reqwest::Client,
    model_url: String,
    api_token: String,
}

impl HuggingFaceClassifier {
    pub fn new(http: reqwest::Client, model_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            http,
            model_url: model_url.into(),
            api_token: api_token.into(),
        }
    }

    /// Pick the highest-scoring label out of an inference response body.
    pub(crate) fn best_label(body: &str) -> Result<ClassId, ClassifierError> {
        let parsed: HfResponse = serde_json::from_str(body)
            .map_err(|e| ClassifierError::UnexpectedOutput(e.to_string()))?;
        let scores = match parsed {
            HfResponse::Nested(mut outer) if !outer.is_empty() => outer.swap_remove(0),
            HfResponse::Nested(_) => Vec::new(),
            HfResponse::Flat(v) => v,
            HfResponse::Error { error } => return Err(ClassifierError::Unavailable(error)),
        };
        let best = scores
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ClassifierError::UnexpectedOutput("no labels".into()))?;
        ClassId::from_label(&best.label)
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<ClassId, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        let body = serde_json::json!({
            "inputs": text,
            "options": { "wait_for_model": true },
        });
        let resp = self
            .http
            .post(&self.model_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status));
        }
        let text = resp.text().await?;
        Self::best_label(&text)
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}

// ------------------------------------------------------------
// Lazy, shared holder
// ------------------------------------------------------------

pub type DynClassifier = Arc<dyn SentimentClassifier>;

type Loader = Box<dyn Fn() -> Result<DynClassifier, ClassifierError> + Send + Sync>;

/// Loads the classifier on first use and keeps it for the life of the holder.
/// A failed load is reported to the caller and attempted again on the next call.
pub struct LazyClassifier {
    cell: OnceCell<DynClassifier>,
    loader: Loader,
}

impl LazyClassifier {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<DynClassifier, ClassifierError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Holder around an already built classifier (tests, stubs).
    pub fn ready(classifier: DynClassifier) -> Self {
        Self {
            cell: OnceCell::with_value(classifier),
            loader: Box::new(|| Err(ClassifierError::Unavailable("preloaded holder".into()))),
        }
    }

    pub fn from_config(cfg: &ClassifierConfig, http: reqwest::Client) -> Self {
        let cfg = cfg.clone();
        Self::new(move || build_classifier(&cfg, http.clone()))
    }

    pub fn get(&self) -> Result<&DynClassifier, ClassifierError> {
        self.cell.get_or_try_init(|| {
            let c = (self.loader)()?;
            tracing::info!(classifier = c.name(), "sentiment classifier loaded");
            Ok(c)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub async fn classify(&self, text: &str) -> Result<ClassId, ClassifierError> {
        self.get()?.classify(text).await
    }
}

fn build_classifier(cfg: &ClassifierConfig, http: reqwest::Client) -> Result<DynClassifier, ClassifierError> {
    let token = cfg.api_token.trim();
    let has_token = !token.is_empty() && !token.eq_ignore_ascii_case("env");
    match cfg.backend {
        ClassifierBackend::HuggingFace if !has_token => Err(ClassifierError::Unavailable(
            "missing Hugging Face API token".into(),
        )),
        ClassifierBackend::HuggingFace | ClassifierBackend::Auto if has_token => Ok(Arc::new(
            HuggingFaceClassifier::new(http, cfg.model_url.clone(), token),
        )),
        _ => {
            let lex = LexiconClassifier::bundled()
                .map_err(|e| ClassifierError::Unavailable(format!("lexicon: {e}")))?;
            Ok(Arc::new(lex))
        }
    }
}

/// Process-wide classifier used by the binaries; the first caller's config wins.
pub fn shared_classifier(cfg: &ClassifierConfig, http: reqwest::Client) -> Arc<LazyClassifier> {
    static SHARED: OnceCell<Arc<LazyClassifier>> = OnceCell::new();
    SHARED
        .get_or_init(|| Arc::new(LazyClassifier::from_config(cfg, http)))
        .clone()
}
