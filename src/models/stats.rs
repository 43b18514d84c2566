//! Third-party statistics about a project: ScratchDB ranks and moderation status.

use serde::{Deserialize, Serialize};

fn unranked() -> i64 {
    -1
}

/// Global and per-country ranks from ScratchDB. Unavailable ranks are `-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRanks {
    #[serde(default = "unranked")]
    pub views: i64,
    #[serde(default = "unranked")]
    pub loves: i64,
    #[serde(default = "unranked")]
    pub favorites: i64,
    #[serde(default)]
    pub country: Option<CountryRanks>,
}

/// Ranks within the author's country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRanks {
    #[serde(default = "unranked")]
    pub views: i64,
    #[serde(default = "unranked")]
    pub loves: i64,
    #[serde(default = "unranked")]
    pub favorites: i64,
}

impl Default for ProjectRanks {
    fn default() -> Self {
        Self {
            views: unranked(),
            loves: unranked(),
            favorites: unranked(),
            country: None,
        }
    }
}

/// ScratchDB `v3/project/info` response, reduced to the ranks.
#[derive(Debug, Deserialize)]
pub(crate) struct ScratchDbInfo {
    #[serde(default)]
    pub statistics: Option<ScratchDbStatistics>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScratchDbStatistics {
    #[serde(default)]
    pub ranks: Option<ProjectRanks>,
}

/// Review state of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationStatus {
    /// Reviewed and suitable for everyone.
    Safe,
    /// Reviewed and hidden from search, explore and the front page.
    NotSafe,
    /// Not reviewed yet.
    NotReviewed,
    /// Any other status reported by the service.
    Other(String),
}

impl ModerationStatus {
    /// Map a status string from the moderation service.
    pub fn from_status(status: &str) -> Self {
        match status {
            "safe" => Self::Safe,
            "notsafe" => Self::NotSafe,
            "notreviewed" => Self::NotReviewed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Moderation service response.
#[derive(Debug, Deserialize)]
pub(crate) struct ModerationResponse {
    pub status: String,
}
