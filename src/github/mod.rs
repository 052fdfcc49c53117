//! Client for the GitHub repositories API.
//!
//! One unauthenticated list request per load cycle, bounded by a
//! client-side timeout, followed by pure filter/rank post-processing.
//! Every failure mode collapses into a single error render state at the
//! call site; the taxonomy below exists for logs, not for visitors.

use std::time::Duration;

use reqwest::header::ACCEPT;
use thiserror::Error;

use crate::config::Config;
use crate::models::Repository;

/// GitHub's versioned media type.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Loader failures. `Transport` covers connect/read errors, `Parse` a body
/// that is not the expected JSON array.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("GitHub API error: {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed repository payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// HTTP client for the repository list.
#[derive(Debug, Clone)]
pub struct GithubClient {
    base_url: String,
    per_page: u8,
    timeout: Duration,
    client: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            timeout: config.fetch_timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch one page of the account's repositories, newest-updated first
    /// at the source.
    ///
    /// The whole send/read/parse chain runs inside one
    /// [`tokio::time::timeout`]; hitting the bound drops the in-flight
    /// request, so cancellation and cleanup cannot be skipped on any path.
    pub async fn list_repositories(&self, username: &str) -> Result<Vec<Repository>, GithubError> {
        let url = format!(
            "{}/users/{}/repos?per_page={}&sort=updated",
            self.base_url,
            encode_path_segment(username),
            self.per_page
        );

        let fetch = async {
            let response = self
                .client
                .get(&url)
                .header(ACCEPT, GITHUB_ACCEPT)
                .send()
                .await
                .map_err(GithubError::Transport)?;

            let status = response.status();
            if !status.is_success() {
                return Err(GithubError::Status(status.as_u16()));
            }

            let body = response.text().await.map_err(GithubError::Transport)?;
            serde_json::from_str(&body).map_err(GithubError::Parse)
        };

        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(GithubError::Timeout(self.timeout)),
        }
    }

    /// Full load cycle: fetch, then filter and rank.
    pub async fn load_projects(&self, username: &str) -> Result<Vec<Repository>, GithubError> {
        let repos = self.list_repositories(username).await?;
        Ok(rank_repositories(repos))
    }
}

/// Drop forks and archived repositories, then order by stargazers
/// descending with ties broken by last-updated descending. Chronological
/// comparison on `updated_at`, not lexical.
pub fn rank_repositories(mut repos: Vec<Repository>) -> Vec<Repository> {
    repos.retain(|repo| !repo.fork && !repo.archived);
    repos.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    repos
}

/// Percent-encode the characters that matter in a path segment. GitHub
/// usernames are alphanumeric-plus-hyphen, so this is defensive only.
fn encode_path_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '/' => "%2F".to_string(),
            '?' => "%3F".to_string(),
            '#' => "%23".to_string(),
            '%' => "%25".to_string(),
            '&' => "%26".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn repo(name: &str, stars: u64, updated: &str, fork: bool, archived: bool) -> Repository {
        Repository {
            name: name.to_string(),
            html_url: format!("https://github.com/voniem12/{name}"),
            description: None,
            stargazers_count: stars,
            forks_count: 0,
            updated_at: updated.parse().unwrap(),
            language: None,
            homepage: None,
            fork,
            archived,
        }
    }

    #[test]
    fn ranking_excludes_forks_and_archived_and_breaks_ties_by_recency() {
        let ranked = rank_repositories(vec![
            repo("a", 5, "2024-01-01T00:00:00Z", false, false),
            repo("b", 5, "2024-06-01T00:00:00Z", false, false),
            repo("c", 100, "2024-06-01T00:00:00Z", true, false),
            repo("d", 100, "2024-06-01T00:00:00Z", false, true),
        ]);

        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn ranking_orders_by_stars_before_recency() {
        let ranked = rank_repositories(vec![
            repo("old-popular", 50, "2020-01-01T00:00:00Z", false, false),
            repo("new-quiet", 1, "2024-06-01T00:00:00Z", false, false),
        ]);
        assert_eq!(ranked[0].name, "old-popular");
    }

    #[test]
    fn ranking_keeps_loader_order_stable_for_full_ties() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let ranked = rank_repositories(vec![
            repo("first", 3, "2024-03-01T00:00:00Z", false, false),
            repo("second", 3, "2024-03-01T00:00:00Z", false, false),
        ]);
        assert_eq!(ranked[0].name, "first");
        assert_eq!(ranked[0].updated_at, when);
    }

    #[test]
    fn encode_path_segment_passes_usernames_through() {
        assert_eq!(encode_path_segment("voniem12"), "voniem12");
        assert_eq!(encode_path_segment("a/b?c"), "a%2Fb%3Fc");
    }
}
