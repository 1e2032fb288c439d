//! Runtime configuration and the table of fallback values.
//!
//! Configuration is layered: built-in defaults, then an optional YAML file,
//! then CLI flags / environment variables (see [`crate::cli::Cli`]).
//!
//! The constants at the top of this module are every literal the pipeline
//! substitutes when an upstream record leaves a field empty. Keep them here
//! rather than inline so the normalizer, pagination, and error envelopes all
//! agree.

use crate::cli::Cli;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Category used when a request does not name one.
pub const DEFAULT_CATEGORY: &str = "geral";

pub const PLACEHOLDER_TITLE: &str = "Sem título";
pub const PLACEHOLDER_DESCRIPTION: &str = "Descrição não disponível";
pub const PLACEHOLDER_CONTENT: &str = "Conteúdo não disponível";
pub const PLACEHOLDER_LINK: &str = "#";
pub const FEED_SOURCE_FALLBACK: &str = "G1";
pub const HEADLINES_SOURCE_FALLBACK: &str = "GNews";

/// Descriptions longer than this many characters get cut.
pub const DESCRIPTION_MAX_CHARS: usize = 150;
/// Characters kept from an over-long description before the ellipsis.
pub const DESCRIPTION_CUT_CHARS: usize = 147;
pub const ELLIPSIS: &str = "...";

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 5;

pub const UPSTREAM_ERROR_MESSAGE: &str = "Erro ao buscar notícias";
pub const NOT_FOUND_MESSAGE: &str = "Notícia não encontrada";

/// Errors raised while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Fully resolved settings for one server process.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Syndication feed polled on every cache miss.
    pub feed_url: String,
    /// Host whose first path segment names the category of a feed article.
    pub publisher_host: String,
    pub headlines_url: String,
    pub api_key: Option<String>,
    pub language: String,
    /// Result cap sent to the headlines API.
    pub max_results: u32,
    pub cache_ttl_secs: u64,
    /// Maximum number of categories held at once.
    pub cache_capacity: u64,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
    pub default_category: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            feed_url: "https://g1.globo.com/rss/g1/".to_string(),
            publisher_host: "g1.globo.com".to_string(),
            headlines_url: "https://gnews.io/api/v4/top-headlines".to_string(),
            api_key: None,
            language: "pt".to_string(),
            max_results: 10,
            cache_ttl_secs: 300,
            cache_capacity: 64,
            request_timeout_secs: 5,
            max_retries: 0,
            retry_base_delay_ms: 500,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl AppConfig {
    /// Build the effective configuration for a parsed command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `--config` points at a file that cannot be
    /// read or is not valid YAML.
    #[instrument(level = "info", skip_all)]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        info!(
            host = %config.host,
            port = config.port,
            ttl_secs = config.cache_ttl_secs,
            has_api_key = config.api_key.is_some(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Read a YAML file; keys it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(key) = &cli.gnews_api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(ttl) = cli.cache_ttl {
            self.cache_ttl_secs = ttl;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
