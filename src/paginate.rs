//! Page/limit parsing and slicing.
//!
//! Query values are forgiving: a missing, non-numeric, or zero `page` or
//! `limit` silently becomes the default (page 1, limit 5), and when a key is
//! repeated (`page=2&page=3`, `page[]=2`) the first value wins. Pagination
//! never fails and never touches the list it slices.

use crate::config::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::models::{Article, Page};
use std::collections::HashMap;
use url::form_urlencoded;

/// Query parameters accepted by the news endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl NewsQuery {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(raw: Option<&str>) -> Self {
        let mut first: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let key = key.strip_suffix("[]").unwrap_or(&*key).to_string();
            first.entry(key).or_insert_with(|| value.into_owned());
        }

        Self {
            category: first.remove("category"),
            page: positive_or(first.get("page"), DEFAULT_PAGE),
            limit: positive_or(first.get("limit"), DEFAULT_PAGE_SIZE),
        }
    }
}

fn positive_or(value: Option<&String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Slice one page out of `articles`.
///
/// `page` is 1-based. A page past the end yields an empty `articles` list
/// with the same `total_pages`.
pub fn paginate(articles: &[Article], page: usize, limit: usize) -> Page {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_items = articles.len();
    let start = (page - 1).saturating_mul(limit).min(total_items);
    let end = start.saturating_add(limit).min(total_items);

    Page {
        current_page: page,
        total_pages: total_items.div_ceil(limit),
        total_items,
        page_size: limit,
        articles: articles[start..end].to_vec(),
    }
}
