// src/timeline.rs
//! Lenient date parsing and newest-first ordering.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::analyze::EnrichedArticle;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// RFC 2822 look-alikes seen in feeds (single-digit hour, missing weekday).
const LOOSE_RFC2822_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
];

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .and_then(|dt| Utc.timestamp_opt(dt.unix_timestamp(), 0).single())
        .or_else(|| DateTime::parse_from_rfc2822(ts).ok().map(|dt| dt.with_timezone(&Utc)))
        .or_else(|| {
            LOOSE_RFC2822_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(ts, fmt).ok())
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Parse a provider date string. Accepts RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS`
/// (taken as UTC) and bare `YYYY-MM-DD` (midnight UTC). `None` means unparseable.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_rfc2822(s) {
        return Some(dt);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Descending by timestamp; unparseable dates go after every valid one.
fn newest_first(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fill `published_at_ts` from the raw date and sort newest first.
pub fn sort_newest_first(articles: &mut [EnrichedArticle]) {
    for a in articles.iter_mut() {
        a.published_at_ts = parse_published(&a.article.published_at);
    }
    articles.sort_by(|a, b| newest_first(&a.published_at_ts, &b.published_at_ts));
}
