//! Syndication feed source.
//!
//! Pulls one RSS 2.0 document (by default the G1 "all news" feed) and turns
//! each `<item>` into an [`Article`]. The document is read with a streaming
//! `quick-xml` reader; only the handful of elements the normalizer needs are
//! collected:
//!
//! - `title`, `link`, `description`, `pubDate`, `source`
//! - `content:encoded`
//! - `enclosure`, `media:content`, `media:thumbnail` (image URLs, read from
//!   attributes)
//!
//! Entities, numeric character references, and CDATA sections are decoded
//! before the text reaches the normalizer.

use crate::classify::CategoryClassifier;
use crate::error::NewsError;
use crate::models::{Article, RawFeedItem};
use crate::normalize::normalize_feed_item;
use crate::sources::ArticleSource;
use crate::utils::{strip_html, truncate_for_log};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// A parsed feed document.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    /// `<channel><title>`, used as the fallback source name.
    pub title: Option<String>,
    pub items: Vec<RawFeedItem>,
}

/// Parse an RSS 2.0 document into raw items.
///
/// Items without an item-level `<source>` inherit the channel title as
/// their source name.
///
/// # Errors
///
/// Returns the underlying [`quick_xml::Error`] for malformed XML, bad
/// escapes, or mismatched tags.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut feed = ParsedFeed::default();
    let mut current: Option<RawFeedItem> = None;
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = qualified_name(&e);
                if let Some(item) = current.as_mut() {
                    read_image_attributes(item, &name, &e)?;
                } else if name == "item" {
                    current = Some(RawFeedItem::default());
                }
                path.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                if let Some(item) = current.as_mut() {
                    read_image_attributes(item, &qualified_name(&e), &e)?;
                }
            }
            Event::Text(t) => text.push_str(&t.decode()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::GeneralRef(r) => match r.resolve_char_ref()? {
                Some(ch) => text.push(ch),
                None => {
                    let entity = r.decode()?;
                    match resolve_predefined_entity(&entity) {
                        Some(resolved) => text.push_str(resolved),
                        None => {
                            text.push('&');
                            text.push_str(&entity);
                            text.push(';');
                        }
                    }
                }
            },
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                let value = std::mem::take(&mut text);
                if name == "item" {
                    feed.items.extend(current.take());
                } else if let Some(item) = current.as_mut() {
                    set_item_field(item, &name, value.trim());
                } else if name == "title" && path.last().is_some_and(|p| p == "channel") {
                    feed.title = non_empty(value.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(channel_title) = &feed.title {
        for item in feed.items.iter_mut().filter(|i| i.source_name.is_none()) {
            item.source_name = Some(channel_title.clone());
        }
    }
    debug!(items = feed.items.len(), title = ?feed.title, "Parsed feed document");
    Ok(feed)
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Value of attribute `key`, entity-decoded.
fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            let raw = String::from_utf8_lossy(&attr.value);
            return Ok(non_empty(unescape(&raw)?.trim()));
        }
    }
    Ok(None)
}

/// Whether a MIME type / medium attribute allows the element to be an image.
fn is_image_kind(kind: Option<&str>) -> bool {
    kind.is_none_or(|k| k.starts_with("image"))
}

fn read_image_attributes(
    item: &mut RawFeedItem,
    name: &str,
    e: &BytesStart<'_>,
) -> Result<(), quick_xml::Error> {
    match name {
        "enclosure" if item.enclosure_url.is_none() => {
            if is_image_kind(attribute(e, "type")?.as_deref()) {
                item.enclosure_url = attribute(e, "url")?;
            }
        }
        "media:content" if item.media_content_url.is_none() => {
            let medium = attribute(e, "medium")?;
            let kind = attribute(e, "type")?;
            if is_image_kind(medium.as_deref()) && is_image_kind(kind.as_deref()) {
                item.media_content_url = attribute(e, "url")?;
            }
        }
        "media:thumbnail" if item.media_thumbnail_url.is_none() => {
            item.media_thumbnail_url = attribute(e, "url")?;
        }
        _ => {}
    }
    Ok(())
}

fn set_item_field(item: &mut RawFeedItem, name: &str, value: &str) {
    let slot = match name {
        "title" => &mut item.title,
        "link" => &mut item.link,
        "pubDate" | "dc:date" => &mut item.pub_date,
        "source" => &mut item.source_name,
        "description" => {
            if item.description_html.is_none() {
                item.description_html = non_empty(value);
                item.description = non_empty(&strip_html(value));
            }
            return;
        }
        "content:encoded" => {
            if item.content_encoded.is_none() {
                item.content_encoded = non_empty(value);
                item.content_snippet = non_empty(&strip_html(value));
            }
            return;
        }
        _ => return,
    };
    if slot.is_none() {
        *slot = non_empty(value);
    }
}

/// Fetches the configured syndication feed.
#[derive(Debug, Clone)]
pub struct FeedSource {
    client: Client,
    url: String,
    classifier: CategoryClassifier,
}

impl FeedSource {
    pub fn new(client: Client, url: impl Into<String>, classifier: CategoryClassifier) -> Self {
        Self {
            client,
            url: url.into(),
            classifier,
        }
    }
}

impl ArticleSource for FeedSource {
    fn name(&self) -> &'static str {
        "feed"
    }

    /// The feed is not filtered by category; every kept item is classified
    /// from its own link instead.
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch(&self, _category: &str) -> Result<Vec<Article>, NewsError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| NewsError::upstream(self.name(), e))?
            .text()
            .await
            .map_err(|e| NewsError::upstream(self.name(), e))?;

        let feed = parse_feed(&body).map_err(|e| {
            warn!(error = %e, body_preview = %truncate_for_log(&body, 300), "Feed is not valid XML");
            NewsError::upstream(self.name(), e)
        })?;

        let total = feed.items.len();
        let articles: Vec<Article> = feed
            .items
            .iter()
            .filter_map(|item| normalize_feed_item(item, &self.classifier))
            .collect();
        info!(
            total,
            kept = articles.len(),
            dropped = total - articles.len(),
            "Normalized feed items"
        );
        Ok(articles)
    }
}
