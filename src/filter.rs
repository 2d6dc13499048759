// src/filter.rs
//! Post-sort membership filters on model and sentiment.

use serde::{Deserialize, Serialize};

use crate::analyze::EnrichedArticle;
use crate::ingest::types::selected;

/// Two independent equality filters combined with AND.
/// A selector of `None`, "" or "all" keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    pub model: Option<String>,
    pub sentiment: Option<String>,
}

impl ArticleFilter {
    pub fn new(model: Option<&str>, sentiment: Option<&str>) -> Self {
        Self {
            model: selected(model).map(str::to_string),
            sentiment: selected(sentiment).map(str::to_string),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.model().is_none() && self.sentiment().is_none()
    }

    fn model(&self) -> Option<&str> {
        selected(self.model.as_deref())
    }

    fn sentiment(&self) -> Option<&str> {
        selected(self.sentiment.as_deref())
    }

    pub fn matches(&self, article: &EnrichedArticle) -> bool {
        self.model().map_or(true, |m| m == article.model)
            && self.sentiment().map_or(true, |s| s == article.sentiment)
    }

    /// Keep matching articles in their current order.
    pub fn apply(&self, articles: &[EnrichedArticle]) -> Vec<EnrichedArticle> {
        articles
            .iter()
            .filter(|a| self.matches(a))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::CanonicalArticle;

    fn row(title: &str, model: &str, sentiment: &str) -> EnrichedArticle {
        EnrichedArticle {
            article: CanonicalArticle {
                title: title.into(),
                ..Default::default()
            },
            summary: String::new(),
            sentiment: sentiment.into(),
            model: model.into(),
            published_at_ts: None,
        }
    }

    fn titles(v: &[EnrichedArticle]) -> Vec<&str> {
        v.iter().map(|a| a.article.title.as_str()).collect()
    }

    #[test]
    fn sentinels_keep_everything() {
        let rows = vec![row("a", "DS7", "Positive"), row("b", "DS3", "Negative")];
        let f = ArticleFilter::new(Some("all"), None);
        assert!(f.is_pass_through());
        assert_eq!(titles(&f.apply(&rows)), ["a", "b"]);
    }

    #[test]
    fn filters_compose_with_and() {
        let rows = vec![
            row("a", "DS7", "Positive"),
            row("b", "DS7", "Negative"),
            row("c", "DS3", "Positive"),
        ];
        let f = ArticleFilter::new(Some("DS7"), Some("Positive"));
        assert_eq!(titles(&f.apply(&rows)), ["a"]);
    }

    #[test]
    fn equality_is_exact() {
        let rows = vec![row("a", "DS7", "Positive"), row("b", "DS 7", "Positive")];
        let f = ArticleFilter::new(Some("DS7"), None);
        assert_eq!(titles(&f.apply(&rows)), ["a"]);
    }
}
