//! Configuration module for Star-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the credential that is read from the environment rather than
//! the file.
//!
//! # Example
//!
//! ```no_run
//! use star_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawl target: {} repositories", config.crawl.total_target);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, CrawlConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, github_token, load_config, load_config_with_hash, TOKEN_ENV};
