//! Cache-or-fetch aggregation over the two upstream sources.
//!
//! A request for category `C` looks in the [`ArticleCache`]. On a miss both
//! sources are fetched concurrently, their results are concatenated (feed
//! first, then headlines) and the merged list is cached under `C`.
//!
//! If either source fails the whole refresh fails and nothing is cached;
//! there is no partial result. Articles that appear in both sources are
//! kept twice.

use crate::cache::{ArticleCache, ArticleList};
use crate::config::DEFAULT_CATEGORY;
use crate::error::NewsError;
use crate::models::Article;
use crate::sources::ArticleSource;
use std::time::Instant;
use tracing::{info, instrument};

/// Lowercased, trimmed category; missing or blank input becomes `default`.
pub fn normalize_category(category: Option<&str>, default: &str) -> String {
    category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| default.trim().to_lowercase())
}

/// Owns the sources and the cache; shared by every request handler.
#[derive(Debug)]
pub struct Aggregator<F, H> {
    feed: F,
    headlines: H,
    cache: ArticleCache,
    default_category: String,
}

impl<F, H> Aggregator<F, H>
where
    F: ArticleSource,
    H: ArticleSource,
{
    pub fn new(feed: F, headlines: H, cache: ArticleCache) -> Self {
        Self {
            feed,
            headlines,
            cache,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Serve requests that name no category from `category` instead of
    /// [`DEFAULT_CATEGORY`].
    pub fn with_default_category(mut self, category: &str) -> Self {
        self.default_category = normalize_category(Some(category), DEFAULT_CATEGORY);
        self
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// The cache key and fetch category for a request's `category` parameter.
    pub fn category(&self, requested: Option<&str>) -> String {
        normalize_category(requested, &self.default_category)
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    /// Merged article list for `category`, from cache when fresh.
    ///
    /// # Errors
    ///
    /// [`NewsError::Upstream`] when either source fails on a cache miss.
    pub async fn articles(&self, category: &str) -> Result<ArticleList, NewsError> {
        self.cache
            .get_or_try_fill(category, self.fetch_all(category))
            .await
    }

    /// Find one article by id within `category`'s list.
    ///
    /// # Errors
    ///
    /// [`NewsError::NotFound`] when no article in the list has `id`, or the
    /// upstream error if the list could not be produced.
    pub async fn find(&self, category: &str, id: &str) -> Result<Article, NewsError> {
        let articles = self.articles(category).await?;
        articles
            .iter()
            .find(|article| article.id == id)
            .cloned()
            .ok_or_else(|| NewsError::NotFound(id.to_string()))
    }

    /// One fetch episode: both sources concurrently, fail together.
    #[instrument(level = "info", skip(self))]
    async fn fetch_all(&self, category: &str) -> Result<Vec<Article>, NewsError> {
        let t0 = Instant::now();
        let (mut merged, headlines) =
            futures::try_join!(self.feed.fetch(category), self.headlines.fetch(category))?;

        let feed_count = merged.len();
        let headlines_count = headlines.len();
        merged.extend(headlines);
        info!(
            feed_count,
            headlines_count,
            total = merged.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched and merged sources"
        );
        Ok(merged)
    }
}
