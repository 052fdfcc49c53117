use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::AudioButton;
use crate::reveal::{RevealSignal, RevealState};

/// Input for creating a visit.
///
/// The front-end declares up front whether a media element is present and,
/// when metadata is already cached, its duration. Without media only the
/// generic fallback timer is armed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisitInput {
    #[serde(default = "default_media_present")]
    pub media_present: bool,
    /// Media duration in seconds, when already known at page load.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

fn default_media_present() -> bool {
    true
}

impl Default for CreateVisitInput {
    fn default() -> Self {
        Self {
            media_present: true,
            duration_secs: None,
        }
    }
}

/// A reveal signal as accepted over HTTP.
///
/// Deliberately narrower than [`RevealSignal`]: the fallback-elapsed signal
/// belongs to the server's own timer and cannot be injected from outside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalInput {
    MetadataLoaded { duration_secs: f64 },
    TimeUpdate { position_secs: f64, duration_secs: f64 },
    Ended,
    Skip,
}

impl From<SignalInput> for RevealSignal {
    fn from(input: SignalInput) -> Self {
        match input {
            SignalInput::MetadataLoaded { duration_secs } => {
                RevealSignal::MetadataLoaded { duration_secs }
            }
            SignalInput::TimeUpdate {
                position_secs,
                duration_secs,
            } => RevealSignal::TimeUpdate {
                position_secs,
                duration_secs,
            },
            SignalInput::Ended => RevealSignal::Ended,
            SignalInput::Skip => RevealSignal::SkipRequested,
        }
    }
}

/// The render state of the projects region, derived per load cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    Empty,
    Error,
    Populated,
}

impl RenderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Error => "error",
            Self::Populated => "populated",
        }
    }
}

/// Where the projects region currently stands for a visit.
///
/// `Pending` before reveal, `Loading` while the fetch is in flight, then
/// one of the three render states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectsStatus {
    Pending,
    Loading,
    Empty,
    Error,
    Populated,
}

impl From<RenderState> for ProjectsStatus {
    fn from(state: RenderState) -> Self {
        match state {
            RenderState::Empty => Self::Empty,
            RenderState::Error => Self::Error,
            RenderState::Populated => Self::Populated,
        }
    }
}

/// `hidden` flags for the page regions the reveal transition toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsView {
    pub tagline_hidden: bool,
    pub main_hidden: bool,
    pub footer_hidden: bool,
}

impl RegionsView {
    pub fn for_state(state: RevealState) -> Self {
        let hidden = state == RevealState::Hidden;
        Self {
            tagline_hidden: hidden,
            main_hidden: hidden,
            footer_hidden: hidden,
        }
    }
}

/// Snapshot of the projects region for a visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsSnapshot {
    pub status: ProjectsStatus,
    /// Rendered fragment, present once a load cycle finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Snapshot of a visit, returned from every visit endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VisitView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub reveal_state: RevealState,
    pub regions: RegionsView,
    pub audio: AudioButton,
    pub projects: ProjectsSnapshot,
}

/// Response for an audio toggle.
#[derive(Debug, Clone, Serialize)]
pub struct AudioToggleView {
    #[serde(flatten)]
    pub button: AudioButton,
    /// Tell the front-end to attempt `play()`; the attempt is best-effort
    /// and a rejection is ignored on both sides.
    pub resume_playback: bool,
}
