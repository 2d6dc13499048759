// src/config/monitor.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::analyze::classifier::ClassifierConfig;
use crate::analyze::models::DEFAULT_UNCLASSIFIED;
use crate::analyze::{ModelCatalog, SentimentLabels};

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";

const DEFAULT_TOML_PATH: &str = "config/monitor.toml";
const DEFAULT_JSON_PATH: &str = "config/monitor.json";
const MAX_RESULTS_CAP: usize = 100;

fn default_query() -> String {
    "DS Automobiles".into()
}
fn default_max_results() -> usize {
    10
}
fn default_language() -> Option<String> {
    Some("fr".into())
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_models() -> Vec<String> {
    ["DS N4", "DS N8", "DS7", "DS3", "DS9", "DS4", "Jules Verne", "N°4", "N°8"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_unclassified() -> String {
    DEFAULT_UNCLASSIFIED.into()
}
fn default_env() -> String {
    "ENV".into()
}
fn default_feeds() -> Vec<String> {
    vec![
        "https://news.google.com/rss/search?q=DS+Automobiles&hl=fr&gl=FR&ceid=FR:fr".into(),
        "https://www.leblogauto.com/feed".into(),
    ]
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// "ENV" means: read from NEWSDATA_API_KEY. Empty disables the source.
    #[serde(default = "default_env")]
    pub newsdata_api_key: String,
    /// "ENV" means: read from MEDIASTACK_API_KEY. Empty disables the source.
    #[serde(default = "default_env")]
    pub mediastack_api_key: String,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    /// Keep only feed entries whose title contains the query.
    #[serde(default = "default_true")]
    pub feed_title_filter: bool,
    #[serde(default)]
    pub newsdata_base_url: Option<String>,
    #[serde(default)]
    pub mediastack_base_url: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            newsdata_api_key: default_env(),
            mediastack_api_key: default_env(),
            feeds: default_feeds(),
            feed_title_filter: true,
            newsdata_base_url: None,
            mediastack_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "ENV" means: read from MONITOR_WEBHOOK_URL.
    #[serde(default = "default_env")]
    pub webhook_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: default_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_language")]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Ordered: the first identifier found in a title wins.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_unclassified")]
    pub unclassified_model: String,
    #[serde(default)]
    pub labels: SentimentLabels,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            max_results: default_max_results(),
            language: default_language(),
            country: None,
            http_timeout_secs: default_timeout_secs(),
            models: default_models(),
            unclassified_model: default_unclassified(),
            labels: SentimentLabels::default(),
            sources: SourcesConfig::default(),
            classifier: ClassifierConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, &ext)?;
        Ok(cfg.sanitized().resolved())
    }

    /// Load using env var + fallbacks:
    /// 1) $MONITOR_CONFIG_PATH
    /// 2) config/monitor.toml
    /// 3) config/monitor.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from_file(&p);
            }
        }
        tracing::info!("no monitor config file found, using defaults");
        Ok(Self::default().sanitized().resolved())
    }

    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone(), self.unclassified_model.clone())
    }

    /// Clamp counts, trim the model list (order kept, later duplicates dropped).
    fn sanitized(mut self) -> Self {
        self.max_results = self.max_results.clamp(1, MAX_RESULTS_CAP);
        self.http_timeout_secs = self.http_timeout_secs.max(1);

        let mut models: Vec<String> = Vec::with_capacity(self.models.len());
        for m in self.models.drain(..) {
            let t = m.trim();
            if !t.is_empty() && !models.iter().any(|seen| seen == t) {
                models.push(t.to_string());
            }
        }
        self.models = models;

        if self.unclassified_model.trim().is_empty() {
            self.unclassified_model = default_unclassified();
        }
        self.sources.feeds.retain(|f| !f.trim().is_empty());
        self
    }

    /// Replace "ENV" secrets with the matching environment variable ("" when unset).
    fn resolved(mut self) -> Self {
        self.sources.newsdata_api_key =
            resolve_secret(&self.sources.newsdata_api_key, "NEWSDATA_API_KEY");
        self.sources.mediastack_api_key =
            resolve_secret(&self.sources.mediastack_api_key, "MEDIASTACK_API_KEY");
        self.classifier.api_token = resolve_secret(&self.classifier.api_token, "HF_API_TOKEN");
        self.notify.webhook_url = resolve_secret(&self.notify.webhook_url, "MONITOR_WEBHOOK_URL");
        self
    }
}

fn resolve_secret(value: &str, env_key: &str) -> String {
    if !value.trim().eq_ignore_ascii_case("env") {
        return value.trim().to_string();
    }
    match env::var(env_key) {
        Ok(v) => v.trim().to_string(),
        Err(_) => {
            tracing::debug!(var = env_key, "secret not set in environment");
            String::new()
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<MonitorConfig> {
    match hint_ext {
        "json" => serde_json::from_str(s).context("parsing monitor config json"),
        "toml" => toml::from_str(s).context("parsing monitor config toml"),
        _ => toml::from_str(s)
            .or_else(|_| serde_json::from_str(s))
            .map_err(|_| anyhow!("unsupported monitor config format")),
    }
}
