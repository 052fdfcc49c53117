use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as returned by the GitHub API.
///
/// Read-only: the API is the source of truth and nothing here is ever
/// mutated locally. Field names follow the wire format, so this
/// deserializes straight out of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

impl Repository {
    /// Homepage URL, if one is actually set. GitHub reports repos without
    /// a homepage as `""` rather than `null`.
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref().filter(|url| !url.is_empty())
    }
}
