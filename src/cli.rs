//! Command-line interface definitions for News Hub.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every flag is optional: anything left out falls back to the YAML config
//! file (when `--config` is given) and then to the built-in defaults in
//! [`crate::config`].

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Hub server.
///
/// Values given here override whatever the config file says.
///
/// # Examples
///
/// ```sh
/// # Defaults: listen on 127.0.0.1:5000
/// news_hub
///
/// # With a config file and an API key from the environment
/// GNEWS_API_KEY=abc news_hub -c ./news_hub.yaml
///
/// # Short cache window for local testing
/// news_hub --cache-ttl 30 -p 8080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP listener to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind the HTTP listener to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// API key for the headlines service
    #[arg(long, env = "GNEWS_API_KEY")]
    pub gnews_api_key: Option<String>,

    /// Seconds a category stays cached before it is fetched again
    #[arg(long, env = "NEWS_CACHE_TTL")]
    pub cache_ttl: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_are_empty() {
        // `gnews_api_key` and `cache_ttl` also read the environment, so only
        // the flag-only options are checked here.
        let cli = Cli::parse_from(["news_hub"]);

        assert!(cli.config.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "news_hub",
            "--config",
            "./news_hub.yaml",
            "--host",
            "0.0.0.0",
            "--gnews-api-key",
            "secret",
            "--cache-ttl",
            "60",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("./news_hub.yaml")));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.gnews_api_key.as_deref(), Some("secret"));
        assert_eq!(cli.cache_ttl, Some(60));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_hub", "-c", "/etc/news.yaml", "-p", "8080"]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/news.yaml")));
        assert_eq!(cli.port, Some(8080));
    }
}
