//! Domain model for harvested repositories
//!
//! The `Repo` value is the only shape the rest of the crate works with; the
//! translation from the remote's wire nodes happens here and nowhere else.

use crate::github::wire::RepoNode;
use chrono::{DateTime, Utc};

/// An immutable observation of a repository at a point in time
///
/// Two `Repo` values with the same `id` describe the same remote repository
/// observed at possibly different times; the star count is a time-series
/// fact, not the repository's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    /// GitHub's numeric database id, unique across the remote
    pub id: i64,

    /// Repository name (without the owner prefix)
    pub name: String,

    /// Login of the owning account
    pub owner: String,

    /// Stargazer count at the moment of observation
    pub stars: i64,

    /// When this observation was stored; populated when read back from
    /// storage, `None` for freshly fetched records
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Repo {
    /// Translates a wire node into the domain model
    ///
    /// Returns `None` when the node has no usable identity, which callers
    /// treat as "skip this node" rather than a page-level failure.
    pub fn from_node(node: &RepoNode) -> Option<Self> {
        let id = node.database_id?;
        Some(Self {
            id,
            name: node.name.clone(),
            owner: node.owner.login.clone(),
            stars: node.stargazer_count,
            recorded_at: None,
        })
    }

    /// The `owner/name` form used in logs and reports
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::wire::RepoOwner;

    #[test]
    fn test_from_node_maps_all_fields() {
        let node = RepoNode {
            database_id: Some(42),
            name: "harvester".to_string(),
            owner: RepoOwner {
                login: "octocat".to_string(),
            },
            stargazer_count: 1234,
        };

        let repo = Repo::from_node(&node).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.name, "harvester");
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.stars, 1234);
        assert!(repo.recorded_at.is_none());
    }

    #[test]
    fn test_from_node_without_identity_is_skipped() {
        let node = RepoNode {
            database_id: None,
            name: "ghost".to_string(),
            owner: RepoOwner {
                login: "nobody".to_string(),
            },
            stargazer_count: 7,
        };

        assert!(Repo::from_node(&node).is_none());
    }

    #[test]
    fn test_full_name() {
        let node = RepoNode {
            database_id: Some(1),
            name: "tools".to_string(),
            owner: RepoOwner {
                login: "acme".to_string(),
            },
            stargazer_count: 0,
        };

        let repo = Repo::from_node(&node).unwrap();
        assert_eq!(repo.full_name(), "acme/tools");
    }
}
