//! Headlines API source (GNews `top-headlines`).
//!
//! One request per cache miss:
//!
//! ```text
//! GET {headlines_url}?lang=pt&topic=business&max=10&apikey=...
//! ```
//!
//! Records without an `image` are discarded before normalization, and every
//! surviving article is filed under the category that was requested rather
//! than one derived from its link.

use crate::error::NewsError;
use crate::models::{Article, HeadlinesResponse};
use crate::normalize::normalize_headline;
use crate::sources::ArticleSource;
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Topic the headlines API understands for one of our category names.
///
/// Categories are Portuguese section names; the API expects its own English
/// topic list. Names without a translation are sent as-is.
pub fn topic_for(category: &str) -> &str {
    match category {
        "geral" => "general",
        "economia" => "business",
        "tecnologia" => "technology",
        "esportes" | "esporte" => "sports",
        "ciencia" | "ciência" => "science",
        "saude" | "saúde" => "health",
        "mundo" => "world",
        "entretenimento" => "entertainment",
        "brasil" => "nation",
        other => other,
    }
}

/// Calls the headlines API for one topic per request.
#[derive(Debug, Clone)]
pub struct HeadlinesSource {
    client: Client,
    url: String,
    api_key: Option<String>,
    language: String,
    max_results: u32,
}

impl HeadlinesSource {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: Option<String>,
        language: impl Into<String>,
        max_results: u32,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            language: language.into(),
            max_results,
        }
    }

    fn query(&self, topic: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lang", self.language.clone()),
            ("topic", topic.to_string()),
            ("max", self.max_results.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }
}

impl ArticleSource for HeadlinesSource {
    fn name(&self) -> &'static str {
        "headlines"
    }

    #[instrument(level = "info", skip_all, fields(%category, topic = topic_for(category)))]
    async fn fetch(&self, category: &str) -> Result<Vec<Article>, NewsError> {
        let payload: HeadlinesResponse = self
            .client
            .get(&self.url)
            .query(&self.query(topic_for(category)))
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| NewsError::upstream(self.name(), e.without_url()))?
            .json()
            .await
            .map_err(|e| NewsError::upstream(self.name(), e.without_url()))?;

        let total = payload.articles.len();
        let available = payload.totalArticles;
        let articles: Vec<Article> = payload
            .articles
            .iter()
            .filter(|headline| headline.has_image())
            .map(|headline| normalize_headline(headline, category))
            .collect();
        if articles.len() < total {
            warn!(skipped = total - articles.len(), "Skipped headlines without image");
        }
        info!(available = ?available, total, kept = articles.len(), "Normalized headlines");
        Ok(articles)
    }
}
