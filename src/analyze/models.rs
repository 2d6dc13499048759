// src/analyze/models.rs
//! Product model tagging by title substring.

use serde::{Deserialize, Serialize};

pub const DEFAULT_UNCLASSIFIED: &str = "DS Global";

/// Ordered list of known model identifiers plus the "unclassified" value.
/// Order is part of the contract: identifiers overlap, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: Vec<String>,
    unclassified: String,
}

impl ModelCatalog {
    pub fn new(models: Vec<String>, unclassified: impl Into<String>) -> Self {
        Self {
            models,
            unclassified: unclassified.into(),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn unclassified(&self) -> &str {
        &self.unclassified
    }

    /// True for any value `detect` can return.
    pub fn contains(&self, value: &str) -> bool {
        value == self.unclassified || self.models.iter().any(|m| m == value)
    }

    pub fn detect(&self, title: &str) -> &str {
        detect_model(title, &self.models).unwrap_or(&self.unclassified)
    }
}

/// First identifier (in list order) whose lowercase form occurs in the lowercased title.
pub fn detect_model<'a>(title: &str, models: &'a [String]) -> Option<&'a str> {
    let title = title.to_lowercase();
    models
        .iter()
        .find(|m| title.contains(&m.to_lowercase()))
        .map(String::as_str)
}
