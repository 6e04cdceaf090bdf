//! Star-Harvest: a GitHub repository star crawler
//!
//! This crate harvests repository records from the GitHub GraphQL search API,
//! respecting the remote's advertised rate-limit quota, and persists them
//! durably in SQLite together with an append-only star-count time series.

pub mod config;
pub mod crawler;
pub mod github;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Star-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] github::ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
}

/// Result type alias for Star-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use github::{ApiError, GitHubClient, RateLimitGovernor, RateLimitSnapshot};
pub use model::Repo;
