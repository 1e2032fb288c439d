//! HTTP routes.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /news?category=&page=&limit=` | [`Page`] of the category's articles |
//! | `GET /news/{id}?category=` | one [`Article`] or a 404 envelope |
//! | `GET /health` | liveness probe |
//!
//! Every response carries the security headers in [`security_headers`]
//! unless the handler already set them.
//!
//! Handlers stay thin: parse the query, ask the [`Aggregator`], and let
//! [`NewsError`] render the error envelope.

use crate::aggregate::Aggregator;
use crate::error::NewsError;
use crate::models::{Article, Page};
use crate::paginate::{paginate, NewsQuery};
use crate::sources::ArticleSource;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, instrument};

type SharedAggregator<F, H> = State<Arc<Aggregator<F, H>>>;

/// Content security policy sent with every response.
pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; font-src 'self' https: data:; style-src 'self' 'unsafe-inline' https:";

/// Header/value pairs added to every response that does not already set them.
pub fn security_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ),
    ]
}

/// Build the application router around a shared aggregator.
pub fn router<F, H>(aggregator: Arc<Aggregator<F, H>>) -> Router
where
    F: ArticleSource,
    H: ArticleSource,
{
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/news", get(list_news::<F, H>))
        .route("/news/{id}", get(get_article::<F, H>));
    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }
    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(aggregator)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[instrument(level = "info", skip_all, fields(query = ?query))]
async fn list_news<F, H>(
    State(aggregator): SharedAggregator<F, H>,
    RawQuery(query): RawQuery,
) -> Result<Json<Page>, NewsError>
where
    F: ArticleSource,
    H: ArticleSource,
{
    let params = NewsQuery::parse(query.as_deref());
    let category = aggregator.category(params.category.as_deref());
    let articles = aggregator.articles(&category).await?;
    let page = paginate(&articles, params.page, params.limit);
    debug!(
        %category,
        page = page.current_page,
        returned = page.articles.len(),
        total = page.total_items,
        "Serving page"
    );
    Ok(Json(page))
}

#[instrument(level = "info", skip_all, fields(%id))]
async fn get_article<F, H>(
    State(aggregator): SharedAggregator<F, H>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Article>, NewsError>
where
    F: ArticleSource,
    H: ArticleSource,
{
    let params = NewsQuery::parse(query.as_deref());
    let category = aggregator.category(params.category.as_deref());
    aggregator.find(&category, &id).await.map(Json)
}
