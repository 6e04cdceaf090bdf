//! Wire shapes of the GraphQL search response
//!
//! Everything in here mirrors what the remote actually sends; the rest of
//! the crate only sees [`SearchPage`] and the domain model built from it.
//! Node fields are deliberately lenient (`Option` plus defaults) so a
//! degenerate node is skipped by the mapping instead of poisoning its page.

use crate::github::rate_limit::RateLimitSnapshot;
use serde::Deserialize;

/// Top-level GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub data: Option<QueryData>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// A GraphQL-level error entry
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    pub search: SearchResult,
    pub rate_limit: Option<RateLimitSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<RepoNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A repository node as the search query returns it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoNode {
    pub database_id: Option<i64>,
    pub name: String,
    pub owner: RepoOwner,
    pub stargazer_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// One page of search results as consumed by the paginator
#[derive(Debug)]
pub struct SearchPage {
    pub nodes: Vec<RepoNode>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
    pub rate_limit: Option<RateLimitSnapshot>,
}

impl From<QueryData> for SearchPage {
    fn from(data: QueryData) -> Self {
        Self {
            nodes: data.search.nodes.into_iter().flatten().collect(),
            has_next_page: data.search.page_info.has_next_page,
            end_cursor: data.search.page_info.end_cursor,
            rate_limit: data.rate_limit,
        }
    }
}
