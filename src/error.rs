//! Error taxonomy for the request path and its HTTP mapping.
//!
//! Callers only ever see two envelopes: a generic 500 when anything upstream
//! went wrong and a 404 when an id is not in the category. The specific
//! cause (which source, which status, which parse error) is logged here and
//! never returned.

use crate::config::{NOT_FOUND_MESSAGE, UPSTREAM_ERROR_MESSAGE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Error)]
pub enum NewsError {
    /// Network failure, non-success status, or unparseable body from a source.
    #[error("{origin} upstream failed: {reason}")]
    Upstream { origin: &'static str, reason: String },

    /// No article with this id in the requested category.
    #[error("article {0} not found")]
    NotFound(String),
}

impl NewsError {
    pub fn upstream(origin: &'static str, cause: impl Display) -> Self {
        NewsError::Upstream {
            origin,
            reason: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            NewsError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            NewsError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the `{"error": ...}` envelope.
    pub fn public_message(&self) -> &'static str {
        match self {
            NewsError::Upstream { .. } => UPSTREAM_ERROR_MESSAGE,
            NewsError::NotFound(_) => NOT_FOUND_MESSAGE,
        }
    }
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        match &self {
            NewsError::Upstream { origin, reason } => {
                error!(%origin, %reason, "Upstream fetch failed");
            }
            NewsError::NotFound(id) => info!(%id, "Article not found"),
        }

        let payload = Json(json!({"error": self.public_message()}));
        (self.status(), payload).into_response()
    }
}
