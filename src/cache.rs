//! Per-category article cache.
//!
//! Each entry maps a lowercased category to the full merged article list for
//! that category. Entries live for the configured TTL from the moment they
//! are written and are replaced wholesale on refresh; nothing ever edits a
//! cached list in place, so readers share it through an [`Arc`].
//!
//! Backed by `moka`'s async cache, which also gives single-flight fills:
//! concurrent misses for one category wait on the same fetch instead of each
//! hitting the upstreams. A failed fill is not stored.

use crate::error::NewsError;
use crate::models::Article;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub type ArticleList = Arc<Vec<Article>>;

/// Category → article list, expiring `ttl` after each write.
#[derive(Clone)]
pub struct ArticleCache {
    inner: Cache<String, ArticleList>,
    ttl: Duration,
}

impl std::fmt::Debug for ArticleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

fn cache_key(category: &str) -> String {
    category.trim().to_lowercase()
}

impl ArticleCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached list for `category`, if present and not yet expired.
    pub async fn get(&self, category: &str) -> Option<ArticleList> {
        self.inner.get(&cache_key(category)).await
    }

    /// Store `articles` under `category`, replacing any previous list and
    /// restarting its TTL.
    pub async fn set(&self, category: &str, articles: Vec<Article>) -> ArticleList {
        let list = Arc::new(articles);
        self.inner.insert(cache_key(category), Arc::clone(&list)).await;
        list
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Return the cached list, or run `fill` to produce and store one.
    ///
    /// Concurrent callers for the same category share a single `fill`; if it
    /// fails they all get the error and nothing is cached.
    #[instrument(level = "debug", skip_all, fields(category = %category))]
    pub async fn get_or_try_fill<F>(&self, category: &str, fill: F) -> Result<ArticleList, NewsError>
    where
        F: Future<Output = Result<Vec<Article>, NewsError>>,
    {
        let key = cache_key(category);
        self.inner
            .try_get_with(key, async {
                debug!("Cache miss; filling");
                fill.await.map(Arc::new)
            })
            .await
            .map_err(Arc::unwrap_or_clone)
    }
}
