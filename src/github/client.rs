//! GraphQL query executor
//!
//! This module issues single search requests against the remote API and
//! classifies every outcome into the retry taxonomy:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 200, well-formed body | Return the page |
//! | HTTP 200, GraphQL `errors` | Non-recoverable, no retry |
//! | HTTP 403/429 with a reset header | Sleep until reset + margin, retry; budget untouched |
//! | HTTP 403/429 without reset | Non-recoverable |
//! | HTTP 5xx | Retry with `base^attempt` backoff, bounded |
//! | Network failure / timeout | Retry with `base^attempt` backoff, bounded |
//! | Any other status | Non-recoverable, no retry |
//!
//! The query is read-only, so repeating it is always safe.

use crate::config::ApiConfig;
use crate::github::wire::{QueryResponse, SearchPage};
use crate::github::ApiError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// The fixed search query template; per-request values travel as variables
pub const SEARCH_QUERY: &str = r#"
query($search: String!, $cursor: String, $pageSize: Int!) {
  search(query: $search, type: REPOSITORY, first: $pageSize, after: $cursor) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      ... on Repository {
        databaseId
        name
        owner {
          login
        }
        stargazerCount
      }
    }
  }
  rateLimit {
    remaining
    resetAt
  }
}
"#;

/// Variables accompanying one search request
///
/// `cursor` is `None` for the first page; `page_size` is already clamped by
/// the caller against both the remote maximum and the remaining target.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables<'a> {
    pub search: &'a str,
    pub cursor: Option<&'a str>,
    pub page_size: u32,
}

/// Executor for single search requests against the GitHub GraphQL API
///
/// Explicitly constructed and passed where needed; holds no process-wide
/// state, so tests can point it at a fake transport.
pub struct GitHubClient {
    http: Client,
    endpoint: String,
    token: String,
    max_retries: u32,
    backoff_base: u64,
    safety_margin: Duration,
}

impl GitHubClient {
    /// Builds a client from API configuration and the bearer token
    pub fn new(config: &ApiConfig, token: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("star-harvest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: token.to_string(),
            max_retries: config.max_retries.max(1),
            backoff_base: config.backoff_base_secs,
            safety_margin: Duration::from_secs(config.safety_margin_secs),
        })
    }

    /// Executes one search request, retrying per the module's policy
    ///
    /// Rate-limit rejections are resolved by a deterministic wait keyed to
    /// the advertised reset and do not count against the bounded retry
    /// budget; transient failures do.
    pub async fn execute(&self, variables: &SearchVariables<'_>) -> Result<SearchPage, ApiError> {
        let payload = serde_json::json!({
            "query": SEARCH_QUERY,
            "variables": variables,
        });

        let mut attempt: u32 = 0;
        loop {
            match self.post_once(&payload).await {
                Ok(page) => return Ok(page),
                Err(ApiError::RateLimited { reset_at }) => {
                    let wait = wait_until(reset_at, self.safety_margin);
                    tracing::warn!(
                        reset_at = %reset_at,
                        wait_secs = wait.as_secs(),
                        "rate limit exceeded, waiting for reset"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err @ ApiError::NonRecoverable { .. }) => {
                    tracing::error!(error = %err, "request rejected, not retrying");
                    return Err(err);
                }
                Err(ApiError::Transient { message }) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        tracing::error!(
                            attempts = attempt,
                            error = %message,
                            "transient failure exhausted retries"
                        );
                        return Err(ApiError::Transient { message });
                    }
                    let backoff =
                        Duration::from_secs(self.backoff_base.saturating_pow(attempt));
                    tracing::warn!(
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %message,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Sends exactly one request and classifies the outcome
    async fn post_once(&self, payload: &serde_json::Value) -> Result<SearchPage, ApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Transient {
                message: if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failure: {}", e)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(reset_at) = rate_limit_reset(response.headers()) {
                return Err(ApiError::RateLimited { reset_at });
            }
            let message = body_excerpt(response).await;
            return Err(ApiError::NonRecoverable {
                status: status.as_u16(),
                message,
            });
        }

        if status.is_server_error() {
            return Err(ApiError::Transient {
                message: format!("server error {}", status),
            });
        }

        if !status.is_success() {
            let message = body_excerpt(response).await;
            return Err(ApiError::NonRecoverable {
                status: status.as_u16(),
                message,
            });
        }

        let body: QueryResponse =
            response.json().await.map_err(|e| ApiError::NonRecoverable {
                status: status.as_u16(),
                message: format!("undecodable response body: {}", e),
            })?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::NonRecoverable {
                status: status.as_u16(),
                message,
            });
        }

        let data = body.data.ok_or_else(|| ApiError::NonRecoverable {
            status: status.as_u16(),
            message: "response carried neither data nor errors".to_string(),
        })?;

        Ok(SearchPage::from(data))
    }
}

/// Extracts the advertised reset instant from a rejection's headers
///
/// GitHub sends `x-ratelimit-reset` as epoch seconds; proxies may send
/// `retry-after` in seconds instead. Neither present means the rejection is
/// not a rate limit.
fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    if let Some(epoch) = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
    {
        return DateTime::<Utc>::from_timestamp(epoch, 0);
    }

    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .map(|secs| Utc::now() + ChronoDuration::seconds(secs))
}

/// Time to sleep until `reset_at` plus the safety margin, floored at zero
fn wait_until(reset_at: DateTime<Utc>, margin: Duration) -> Duration {
    let wait = reset_at.signed_duration_since(Utc::now())
        + ChronoDuration::milliseconds(margin.as_millis() as i64);
    wait.to_std().unwrap_or(Duration::ZERO)
}

async fn body_excerpt(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    text.chars().take(200).collect()
}
