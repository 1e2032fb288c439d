//! Data models for raw upstream records and the canonical article.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: The normalized, source-agnostic news record served to clients
//! - [`RawFeedItem`]: One `<item>` pulled out of the syndication feed
//! - [`HeadlinesResponse`] / [`RawHeadline`]: The headlines API payload
//! - [`Page`]: One paginated slice of a category's articles
//!
//! Client-facing models use camelCase field names on the wire (`pubDate`,
//! `currentPage`, ...) to match what existing front-ends consume.

use serde::{Deserialize, Serialize};

/// A normalized news article.
///
/// Articles are built once per cache fill by [`crate::normalize`] and never
/// mutated afterwards; the cache hands out shared references to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Hex digest of `link`, see [`crate::utils::article_id`].
    pub id: String,
    pub title: String,
    /// At most 150 characters, ellipsized when cut.
    pub description: String,
    pub content: String,
    /// Canonical URL, `"#"` when the source gave none.
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
    /// Display name of the publication.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
}

/// One feed entry as it comes off the wire, before normalization.
///
/// Text fields hold what the feed said with entities decoded. HTML-bearing
/// fields are kept raw (`description_html`, `content_encoded`) so the image
/// scan can look inside them; their tag-stripped forms live in
/// `description` and `content_snippet`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// `<description>` with markup removed.
    pub description: Option<String>,
    /// `<description>` exactly as published.
    pub description_html: Option<String>,
    /// `<content:encoded>` exactly as published.
    pub content_encoded: Option<String>,
    /// `<content:encoded>` with markup removed.
    pub content_snippet: Option<String>,
    pub enclosure_url: Option<String>,
    pub media_content_url: Option<String>,
    pub media_thumbnail_url: Option<String>,
    pub pub_date: Option<String>,
    /// Item-level `<source>`, falling back to the channel title.
    pub source_name: Option<String>,
}

/// Top-level payload returned by the headlines API.
#[allow(non_snake_case)]
#[derive(Debug, Default, Deserialize)]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub totalArticles: Option<u64>,
    #[serde(default)]
    pub articles: Vec<RawHeadline>,
}

/// One article as returned by the headlines API.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawHeadline {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub publishedAt: Option<String>,
    #[serde(default)]
    pub source: Option<HeadlineSource>,
}

impl RawHeadline {
    /// Whether the record carries a usable image URL.
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Publication block nested inside a [`RawHeadline`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HeadlineSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One page of a category listing, as returned by `GET /news`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub articles: Vec<Article>,
}
