// src/notify/mod.rs
//! Best-effort per-article alerts. Delivery failures never reach the caller.

pub mod webhook;

use anyhow::Result;
use metrics::counter;

use crate::analyze::EnrichedArticle;

pub use webhook::WebhookNotifier;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, article: &EnrichedArticle) -> Result<()>;
}

/// Short alert text: model, title, sentiment and link.
pub fn format_message(article: &EnrichedArticle) -> String {
    let title = if article.article.title.is_empty() {
        "(untitled)"
    } else {
        article.article.title.as_str()
    };
    let mut msg = format!("*[{}]* {}\nTone: {}", article.model, title, article.sentiment);
    if !article.article.url.is_empty() {
        msg.push('\n');
        msg.push_str(&article.article.url);
    }
    msg
}

/// Send one message per article, sequentially. No retry, no batching.
/// Returns how many deliveries succeeded.
pub async fn notify_all(notifier: &dyn Notifier, articles: &[EnrichedArticle]) -> usize {
    let mut delivered = 0usize;
    for a in articles {
        match notifier.send(a).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(error = %e, url = %a.article.url, "notification dropped");
                counter!("monitor_notify_failures_total").increment(1);
            }
        }
    }
    delivered
}
