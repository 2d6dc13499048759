// src/ingest/providers/feed.rs
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::{CanonicalArticle, FetchQuery, SourceAdapter, SourceError};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<String>,
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    #[serde(default)]
    link: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_href(&self) -> String {
        self.link
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone())
            .unwrap_or_default()
    }
}

/// Feed reader over a fixed list of RSS 2.0 / Atom URLs.
/// Feeds have no server-side search, so the query is matched against titles locally.
pub struct FeedAdapter {
    client: reqwest::Client,
    feeds: Vec<String>,
    title_filter: bool,
}

impl FeedAdapter {
    pub fn new(client: reqwest::Client, feeds: Vec<String>) -> Self {
        Self {
            client,
            feeds,
            title_filter: true,
        }
    }

    /// Disable the local title match (keep every entry up to the cap).
    pub fn with_title_filter(mut self, enabled: bool) -> Self {
        self.title_filter = enabled;
        self
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<CanonicalArticle>, SourceError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body = resp.text().await?;
        parse_feed(&body, url)
    }

    fn keep(&self, article: &CanonicalArticle, needle: &str) -> bool {
        !self.title_filter || needle.is_empty() || article.title.to_lowercase().contains(needle)
    }
}

/// Parse an RSS or Atom document into canonical articles.
/// `feed_url` labels entries when the feed has no title of its own.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<CanonicalArticle>, SourceError> {
    let xml_clean = scrub_html_entities_for_xml(xml);

    let rss_err = match from_str::<Rss>(&xml_clean) {
        Ok(rss) => {
            let label = feed_label(rss.channel.title.as_deref(), feed_url);
            return Ok(rss
                .channel
                .item
                .into_iter()
                .map(|it| CanonicalArticle {
                    published_at: it.pub_date.unwrap_or_default(),
                    title: it.title.unwrap_or_default(),
                    body: it.description.unwrap_or_default(),
                    source_label: label.clone(),
                    url: it.link.unwrap_or_default(),
                })
                .collect());
        }
        Err(e) => e,
    };

    // Not RSS 2.0, try Atom.
    let atom: AtomFeed = from_str(&xml_clean)
        .map_err(|atom_err| SourceError::Feed(format!("rss: {rss_err}; atom: {atom_err}")))?;
    if atom.entry.is_empty() && atom.title.is_none() {
        return Err(SourceError::Feed(format!("not a feed document: {rss_err}")));
    }
    let label = feed_label(atom.title.as_deref(), feed_url);
    Ok(atom
        .entry
        .into_iter()
        .map(|e| {
            let url = e.alternate_href();
            CanonicalArticle {
                published_at: e.published.or(e.updated).unwrap_or_default(),
                title: e.title.unwrap_or_default(),
                body: e.summary.or(e.content).unwrap_or_default(),
                source_label: label.clone(),
                url,
            }
        })
        .collect())
}

fn feed_label(title: Option<&str>, feed_url: &str) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => feed_url.to_string(),
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    fn name(&self) -> &'static str {
        "feeds"
    }

    /// A failing feed is skipped; the adapter only fails when every feed did.
    async fn try_fetch(&self, query: &FetchQuery) -> Result<Vec<CanonicalArticle>, SourceError> {
        let needle = query.query.trim().to_lowercase();
        let mut out = Vec::new();
        let mut first_err = None;
        let mut failed = 0usize;

        for url in &self.feeds {
            if out.len() >= query.max_results {
                break;
            }
            match self.fetch_one(url).await {
                Ok(entries) => {
                    let room = query.max_results - out.len();
                    out.extend(
                        entries
                            .into_iter()
                            .filter(|a| self.keep(a, &needle))
                            .take(room),
                    );
                }
                Err(e) => {
                    tracing::warn!(source = self.name(), feed = %url, error = %e, "feed fetch failed");
                    failed += 1;
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) if failed == self.feeds.len() => Err(e),
            _ => Ok(out),
        }
    }
}

/// Entities XML resolves on its own.
const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Rewrite HTML named entities into text the XML parser accepts.
/// Unknown names are dropped instead of failing the whole document.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let s = s
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&laquo;", "\"")
        .replace("&raquo;", "\"")
        .replace("&hellip;", "...");

    let mut out = String::with_capacity(s.len());
    let mut rest = s.as_str();
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match entity_name(tail) {
            Some(name) if !XML_ENTITIES.contains(&name) => {
                let token = &tail[..name.len() + 2];
                let decoded = html_escape::decode_html_entities(token);
                if decoded != token {
                    out.push_str(&html_escape::encode_text(&decoded));
                }
                rest = &tail[token.len()..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `name` from a leading `&name;`. Numeric references are not names.
fn entity_name(tail: &str) -> Option<&str> {
    let body = tail.strip_prefix('&')?;
    let end = body.find(|c: char| !c.is_ascii_alphanumeric())?;
    let name = &body[..end];
    let starts_alpha = name.chars().next().map_or(false, |c| c.is_ascii_alphabetic());
    (starts_alpha && body[end..].starts_with(';')).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Le Blog Auto</title>
    <item>
      <title>DS N8&nbsp;: premier essai</title>
      <link>https://example.test/n8</link>
      <pubDate>Fri, 01 Mar 2024 09:30:00 GMT</pubDate>
      <description><![CDATA[<p>La DS N8 arrive.</p>]]></description>
    </item>
    <item>
      <title>Sans date</title>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom News</title>
  <entry>
    <title>DS 9 update</title>
    <link rel="alternate" href="https://example.test/ds9"/>
    <updated>2024-02-10T12:00:00Z</updated>
    <summary>Facelift.</summary>
  </entry>
</feed>"#;

    #[test]
    fn rss_items_are_normalized() {
        let out = parse_feed(RSS, "https://feed.test/rss").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "DS N8 : premier essai");
        assert_eq!(out[0].url, "https://example.test/n8");
        assert_eq!(out[0].published_at, "Fri, 01 Mar 2024 09:30:00 GMT");
        assert_eq!(out[0].body, "<p>La DS N8 arrive.</p>");
        assert_eq!(out[0].source_label, "Le Blog Auto");
        assert_eq!(out[1].published_at, "");
        assert_eq!(out[1].url, "");
    }

    #[test]
    fn atom_entries_are_normalized() {
        let out = parse_feed(ATOM, "https://feed.test/atom").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].published_at, "2024-02-10T12:00:00Z");
        assert_eq!(out[0].url, "https://example.test/ds9");
        assert_eq!(out[0].body, "Facelift.");
        assert_eq!(out[0].source_label, "Atom News");
    }

    #[test]
    fn untitled_channel_uses_feed_url() {
        let xml = r#"<rss><channel><item><title>x</title></item></channel></rss>"#;
        let out = parse_feed(xml, "https://feed.test/rss").unwrap();
        assert_eq!(out[0].source_label, "https://feed.test/rss");
    }

    #[test]
    fn atom_links_interleaved_with_other_elements() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Blog DS</title>
  <entry>
    <title>DS7 restylée</title>
    <link rel="alternate" href="https://example.test/ds7"/>
    <id>1</id>
    <content>Corps</content>
    <link rel="replies" href="https://example.test/ds7#comments"/>
  </entry>
  <entry>
    <title>DS3 hybride</title>
    <link rel="enclosure" href="https://example.test/ds3.jpg"/>
    <id>2</id>
    <link rel="alternate" href="https://example.test/ds3"/>
  </entry>
</feed>"#;
        let out = parse_feed(xml, "https://feed.test/atom").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.test/ds7");
        assert_eq!(out[0].body, "Corps");
        assert_eq!(out[1].url, "https://example.test/ds3");
    }

    #[test]
    fn rss_items_split_by_other_channel_elements() {
        let xml = r#"<rss version="2.0"><channel>
  <title>Flux</title>
  <item><title>Premier</title></item>
  <lastBuildDate>Mon, 04 Mar 2024 08:00:00 +0100</lastBuildDate>
  <item><title>Second</title></item>
</channel></rss>"#;
        let out = parse_feed(xml, "https://feed.test/rss").unwrap();
        let titles: Vec<_> = out.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Premier", "Second"]);
    }

    #[test]
    fn html_entities_do_not_break_parsing() {
        let xml = r#"<rss><channel><title>C&ocirc;t&eacute; auto</title>
  <item><title>Prix &agrave; 40&nbsp;000&euro; &amp; plus&bogus;</title>
  <description>Ma&icirc;tris&eacute;e, 5 &lt; 6, &#233;t&ecirc;</description></item>
</channel></rss>"#;
        let out = parse_feed(xml, "https://feed.test/rss").unwrap();
        assert_eq!(out[0].source_label, "Côté auto");
        assert_eq!(out[0].title, "Prix à 40 000€ & plus");
        assert_eq!(out[0].body, "Maîtrisée, 5 < 6, été");
    }

    #[test]
    fn entity_names_are_recognized() {
        assert_eq!(entity_name("&ocirc; x"), Some("ocirc"));
        assert_eq!(entity_name("&#233;"), None);
        assert_eq!(entity_name("& plus"), None);
        assert_eq!(entity_name("&amp"), None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("this is not xml at all <<<", "u").is_err());
    }
}
