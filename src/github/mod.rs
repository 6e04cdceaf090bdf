//! GitHub GraphQL API layer
//!
//! This module contains everything that talks to the remote API:
//! - The query executor with retry and backoff classification
//! - The rate-limit governor that pauses before quota starvation
//! - The wire shapes of the GraphQL response

mod client;
mod rate_limit;
pub mod wire;

pub use client::{GitHubClient, SearchVariables, SEARCH_QUERY};
pub use rate_limit::{RateLimitGovernor, RateLimitSnapshot};
pub use wire::SearchPage;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Largest page the GitHub search API will serve
pub const MAX_PAGE_SIZE: u32 = 100;

/// Failures surfaced by the query executor
///
/// The two-tier retry policy hangs off this taxonomy: `Transient` is retried
/// a bounded number of times with exponential backoff, `RateLimited` is
/// resolved by a deterministic wait until the advertised reset, and
/// `NonRecoverable` is never retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transient API failure: {message}")]
    Transient { message: String },

    #[error("rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("non-recoverable API failure ({status}): {message}")]
    NonRecoverable { status: u16, message: String },
}
