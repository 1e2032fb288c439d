//! # News Hub
//!
//! A small news aggregation service that merges a publisher's RSS feed with
//! a third-party headlines API, normalizes both into one article shape, and
//! serves cached, paginated listings per category.
//!
//! ## Features
//!
//! - Pulls the G1 RSS feed and GNews top headlines concurrently
//! - Normalizes titles, descriptions, content, and images with fallback chains
//! - Derives stable article ids from links for `GET /news/{id}` lookups
//! - Caches each category's merged list for a configurable TTL
//! - Serves `GET /news?category=&page=&limit=` as a paginated JSON page
//!
//! ## Usage
//!
//! ```sh
//! GNEWS_API_KEY=... news_hub -p 5000
//! ```
//!
//! ## Architecture
//!
//! Each request follows the same pipeline:
//! 1. **Lookup**: Check the per-category cache
//! 2. **Fetching**: On a miss, fetch the feed and the headlines API together
//! 3. **Normalization**: Map raw records to articles, dropping imageless ones
//! 4. **Output**: Cache the merged list and slice out the requested page

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use news_hub::aggregate::Aggregator;
use news_hub::cache::ArticleCache;
use news_hub::classify::CategoryClassifier;
use news_hub::cli::Cli;
use news_hub::config::AppConfig;
use news_hub::retry::RetrySource;
use news_hub::routes;
use news_hub::sources::{FeedSource, HeadlinesSource};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_hub starting up");

    let args = Cli::parse();
    let config = AppConfig::load(&args)?;
    if config.api_key.is_none() {
        warn!("No headlines API key configured; every cache refresh will fail until one is set");
    }

    // One client for both upstreams; the timeout bounds every fetch.
    let client = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let classifier = CategoryClassifier::new(&config.publisher_host, &config.default_category);
    let feed = RetrySource::new(
        FeedSource::new(client.clone(), &config.feed_url, classifier),
        config.max_retries,
        config.retry_base_delay(),
    );
    let headlines = RetrySource::new(
        HeadlinesSource::new(
            client,
            &config.headlines_url,
            config.api_key.clone(),
            &config.language,
            config.max_results,
        ),
        config.max_retries,
        config.retry_base_delay(),
    );
    let cache = ArticleCache::new(config.cache_ttl(), config.cache_capacity);
    info!(ttl = ?cache.ttl(), capacity = config.cache_capacity, "Article cache ready");

    let aggregator = Arc::new(
        Aggregator::new(feed, headlines, cache).with_default_category(&config.default_category),
    );
    let app = routes::router(aggregator);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, feed = %config.feed_url, "News API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("news_hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
