use serde::Deserialize;
use std::time::Duration;

use crate::models::MediaKind;
use crate::services::aggregator::AggregatorConfig;
use crate::services::executor::{ExecutorConfig, RetryPolicy};
use crate::services::ranker::RankerConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key, sent as the `api_key` query parameter
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language requested from TMDB
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Attempts per logical upstream request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// One backoff unit; failed attempt n (1-based) is followed by 2^(n-1) units
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Whether 4xx statuses other than 429 are retried
    #[serde(default = "default_retry_client_errors")]
    pub retry_client_errors: bool,

    /// Timeout applied to each individual attempt
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of items in the ranked trailer feed
    #[serde(default = "default_feed_max_results")]
    pub feed_max_results: usize,

    /// Film entities kept from each discovery source before merging
    #[serde(default = "default_movie_source_limit")]
    pub movie_source_limit: usize,

    /// Series entities kept from each discovery source before merging
    #[serde(default = "default_tv_source_limit")]
    pub tv_source_limit: usize,

    /// Upper bound on in-flight requests within one fan-out stage (sources or videos)
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// The only video hosting site eligible for ranking
    #[serde(default = "default_trailer_site")]
    pub trailer_site: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_client_errors() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_feed_max_results() -> usize {
    24
}

fn default_movie_source_limit() -> usize {
    30
}

fn default_tv_source_limit() -> usize {
    15
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_trailer_site() -> String {
    "YouTube".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn executor(&self) -> ExecutorConfig {
        ExecutorConfig {
            base_url: self.tmdb_api_url.clone(),
            api_key: self.tmdb_api_key.clone(),
            language: self.tmdb_language.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retry: RetryPolicy::new(
                self.max_attempts,
                Duration::from_millis(self.retry_base_delay_ms),
            )
            .with_client_error_retries(self.retry_client_errors),
        }
    }

    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            per_source_limit: [
                (MediaKind::Movie, self.movie_source_limit),
                (MediaKind::Tv, self.tv_source_limit),
            ]
            .into_iter()
            .collect(),
            max_concurrent_requests: self.max_concurrent_requests.max(1),
        }
    }

    pub fn ranker(&self) -> RankerConfig {
        RankerConfig {
            eligible_site: self.trailer_site.clone(),
            max_results: self.feed_max_results,
            max_concurrent_requests: self.max_concurrent_requests.max(1),
        }
    }
}
