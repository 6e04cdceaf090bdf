//! Cursor-driven pagination over the search API
//!
//! The paginator owns the cursor for exactly as long as one `fetch` call;
//! when the call returns, the position in the remote dataset is gone.

use crate::github::{GitHubClient, RateLimitGovernor, SearchVariables, MAX_PAGE_SIZE};
use crate::model::Repo;

/// Drives repeated executor calls along the remote's cursor
pub struct Paginator<'a> {
    client: &'a GitHubClient,
    governor: &'a RateLimitGovernor,
    search: &'a str,
}

impl<'a> Paginator<'a> {
    pub fn new(
        client: &'a GitHubClient,
        governor: &'a RateLimitGovernor,
        search: &'a str,
    ) -> Self {
        Self {
            client,
            governor,
            search,
        }
    }

    /// Fetches up to `target` repositories, page by page
    ///
    /// Each request asks for `min(page_size, target - accumulated)` records.
    /// A failed page terminates the loop and whatever was accumulated so far
    /// is returned; partial success is a result, not an error. Never returns
    /// more than `target` records.
    pub async fn fetch(&self, target: usize, page_size: u32) -> Vec<Repo> {
        let mut repos: Vec<Repo> = Vec::new();
        let mut cursor: Option<String> = None;

        while repos.len() < target {
            let remaining = (target - repos.len()) as u32;
            let variables = SearchVariables {
                search: self.search,
                cursor: cursor.as_deref(),
                page_size: page_size.min(remaining).min(MAX_PAGE_SIZE).max(1),
            };

            let page = match self.client.execute(&variables).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        fetched = repos.len(),
                        "page fetch failed, keeping what was accumulated"
                    );
                    break;
                }
            };

            for node in &page.nodes {
                match Repo::from_node(node) {
                    Some(repo) => repos.push(repo),
                    None => tracing::debug!("skipping node without a database id"),
                }
            }

            tracing::debug!(fetched = repos.len(), requested = target, "page processed");

            if !page.has_next_page {
                break;
            }
            cursor = match page.end_cursor {
                Some(end_cursor) => Some(end_cursor),
                // A next page without a cursor cannot be followed
                None => break,
            };

            self.governor.observe(page.rate_limit.as_ref()).await;
        }

        repos.truncate(target);
        repos
    }
}
