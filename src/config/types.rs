use serde::Deserialize;

/// GitHub's GraphQL endpoint, used when the config file does not override it
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Main configuration structure for Star-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Total number of repositories the crawl aims to harvest
    #[serde(rename = "total-target")]
    pub total_target: u64,

    /// Number of repositories fetched and persisted per batch
    #[serde(rename = "batch-size")]
    pub batch_size: u64,

    /// Page size requested from the remote (capped at GitHub's maximum)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// GitHub search expression selecting the repositories to harvest
    /// (e.g. "stars:>1"; date windows like "created:2024-01-01..2024-06-30"
    /// are expressed here too)
    #[serde(rename = "search-query", default = "default_search_query")]
    pub search_query: String,
}

/// Remote API tuning configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Total request attempts for transient failures before giving up
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between transient-failure attempts,
    /// in seconds
    #[serde(rename = "backoff-base-secs")]
    pub backoff_base_secs: u64,

    /// Remaining-quota low-water mark below which the crawl pauses until
    /// the advertised reset
    #[serde(rename = "rate-limit-threshold")]
    pub rate_limit_threshold: u32,

    /// Extra seconds slept past the advertised reset instant
    #[serde(rename = "safety-margin-secs")]
    pub safety_margin_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_retries: 3,
            backoff_base_secs: 2,
            rate_limit_threshold: 100,
            safety_margin_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_search_query() -> String {
    "stars:>1".to_string()
}
