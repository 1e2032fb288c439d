//! Utility functions for identifiers, string truncation, and markup stripping.
//!
//! This module provides helper functions used throughout the application:
//! - Deterministic article identifiers derived from links
//! - Character-safe truncation for descriptions and log previews
//! - Tag stripping and HTML entity decoding for feed fields that arrive as HTML

use itertools::Itertools;
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap());

/// Derive the identifier of an article from its canonical link.
///
/// The id is the lowercase hex MD5 digest of the link's bytes: 32 characters,
/// no salt, so the same link maps to the same id in every process.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(article_id("#"), article_id("#"));
/// assert_eq!(article_id("https://example.com").len(), 32);
/// ```
pub fn article_id(link: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended. Cuts on a character boundary, so
/// Portuguese text is safe to pass in.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Shorten `s` to its first `keep` characters when it has more than `max`.
///
/// The kept prefix has trailing whitespace removed before `suffix` is
/// appended. Strings of `max` characters or fewer come back unchanged.
pub fn truncate_chars(s: &str, max: usize, keep: usize, suffix: &str) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let prefix: String = s.chars().take(keep).collect();
    format!("{}{}", prefix.trim_end(), suffix)
}

/// Remove markup from an HTML fragment, decode its entities, and collapse
/// runs of whitespace.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    decode_html_entities(&text).split_whitespace().join(" ")
}

/// Replace named HTML5 entities and numeric character references.
///
/// Feed text is already XML-unescaped once, so escaped markup such as
/// `&amp;nbsp;` reaches this point as `&nbsp;`. Unknown names and invalid
/// code points are left as written.
pub fn decode_html_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let numeric = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()
            } else {
                return resolve_html5_entity(entity)
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string());
            };
            numeric
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Treat empty or whitespace-only strings as missing.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
