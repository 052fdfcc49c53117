//! Runtime configuration.
//!
//! Everything has a compiled default so `porch serve` works out of the box;
//! each knob can be overridden with a `PORCHLIGHT_*` environment variable,
//! and the CLI overrides both for the flags it exposes.

use std::time::Duration;

/// Default GitHub account whose repositories are shown.
const DEFAULT_GITHUB_USER: &str = "voniem12";

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Fallback reveal bound when no usable media duration is known.
const DEFAULT_REVEAL_FALLBACK: Duration = Duration::from_millis(45_000);

/// Safety margin added past the expected natural end of the media.
const REVEAL_MARGIN: Duration = Duration::from_millis(500);

/// How close to the end a time-update must be to count as "near end".
const NEAR_END_WINDOW_SECS: f64 = 0.2;

/// Client-side bound on the GitHub request.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Single-page fetch size; large enough for typical accounts.
const DEFAULT_PER_PAGE: u8 = 100;

/// Directory served under `/assets` (intro video, stylesheet).
const DEFAULT_ASSETS_DIR: &str = "assets";

const DEFAULT_TAGLINE: &str = "Projects, experiments, and other late-night commits.";

/// Visits idle longer than this are pruned from the store.
const VISIT_IDLE_HORIZON: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub account whose repositories are listed.
    pub github_user: String,
    /// Base URL of the GitHub API (overridable so tests can point at a stub).
    pub api_base: String,
    pub reveal_fallback: Duration,
    pub fetch_timeout: Duration,
    pub per_page: u8,
    pub assets_dir: String,
    pub tagline: String,
    pub visit_idle_horizon: Duration,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// compiled defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(user) = std::env::var("PORCHLIGHT_GITHUB_USER") {
            config.github_user = user;
        }
        if let Ok(base) = std::env::var("PORCHLIGHT_API_BASE") {
            config.api_base = base;
        }
        if let Some(ms) = env_millis("PORCHLIGHT_REVEAL_FALLBACK_MS") {
            config.reveal_fallback = ms;
        }
        if let Some(ms) = env_millis("PORCHLIGHT_FETCH_TIMEOUT_MS") {
            config.fetch_timeout = ms;
        }
        if let Ok(dir) = std::env::var("PORCHLIGHT_ASSETS_DIR") {
            config.assets_dir = dir;
        }
        if let Ok(tagline) = std::env::var("PORCHLIGHT_TAGLINE") {
            config.tagline = tagline;
        }
        config
    }

    /// Config for a specific user (CLI override / tests).
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            github_user: user.into(),
            ..Self::default()
        }
    }

    /// Fallback delay derived from a known media duration:
    /// `ceil(duration) + 500ms`, a small margin past the expected natural end.
    ///
    /// Returns `None` for non-finite or non-positive durations; the caller
    /// keeps whatever fallback is already armed.
    pub fn fallback_for_duration(&self, duration_secs: f64) -> Option<Duration> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return None;
        }
        let millis = (duration_secs * 1000.0).ceil() as u64;
        Some(Duration::from_millis(millis) + REVEAL_MARGIN)
    }

    /// Whether a playback position counts as "near the end" of the media.
    pub fn is_near_end(&self, position_secs: f64, duration_secs: f64) -> bool {
        duration_secs.is_finite()
            && duration_secs > 0.0
            && position_secs >= duration_secs - NEAR_END_WINDOW_SECS
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_user: DEFAULT_GITHUB_USER.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            reveal_fallback: DEFAULT_REVEAL_FALLBACK,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
            tagline: DEFAULT_TAGLINE.to_string(),
            visit_idle_horizon: VISIT_IDLE_HORIZON,
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
