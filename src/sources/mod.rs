//! Upstream news sources.
//!
//! Each source turns one upstream into a list of normalized [`Article`]s.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | G1 feed | [`feed`] | RSS 2.0 over HTTP | Category comes from the article link; items without images are dropped |
//! | GNews | [`headlines`] | JSON top-headlines API | Requires API key; category is the requested topic |
//!
//! # Common Patterns
//!
//! Every source implements [`ArticleSource`]. Failures are never swallowed:
//! a network error, non-success status, or unparseable body becomes
//! [`NewsError::Upstream`] so the aggregator can refuse to cache a half
//! result. [`crate::retry::RetrySource`] can wrap any source to retry it.

use crate::error::NewsError;
use crate::models::Article;
use std::future::Future;

pub mod feed;
pub mod headlines;

pub use feed::FeedSource;
pub use headlines::HeadlinesSource;

/// Something that can produce the articles for a category.
pub trait ArticleSource: Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetch and normalize the articles for `category`.
    ///
    /// `category` is already lowercased. Sources that cannot filter by
    /// category upstream are free to ignore it.
    fn fetch(&self, category: &str) -> impl Future<Output = Result<Vec<Article>, NewsError>> + Send;
}
