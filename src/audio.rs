//! Audio opt-in for the intro video.
//!
//! Browsers only allow autoplaying media while muted, so every visit starts
//! muted and the visitor opts in through the toggle. Unmuting also asks the
//! player to (re)start playback; that start is best-effort by contract:
//! gesture-policy edge cases can reject it, and the rejection is logged and
//! otherwise discarded rather than surfaced.

use serde::Serialize;
use thiserror::Error;

/// The player declined to start playback (e.g. autoplay gesture policy).
/// Non-fatal by contract: callers log it and move on.
#[derive(Debug, Error)]
#[error("playback start rejected")]
pub struct PlaybackRejected;

/// Hook for asking the media player to (re)start playback.
///
/// Over the HTTP surface the "player" is the visitor's browser, so the
/// server-side implementation just records that a start should be attempted
/// and relays it in the response; tests substitute a rejecting player.
pub trait Playback {
    fn play(&mut self) -> Result<(), PlaybackRejected>;
}

/// A playback hook that always accepts. The actual attempt happens in the
/// front-end, whose rejection is equally ignored.
#[derive(Debug, Default)]
pub struct RelayedPlayback;

impl Playback for RelayedPlayback {
    fn play(&mut self) -> Result<(), PlaybackRejected> {
        Ok(())
    }
}

/// What the audio button should show after a toggle.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AudioButton {
    /// 🔇 while muted, 🔊 while audible.
    pub label: &'static str,
    /// `aria-pressed`: true exactly when audio is on.
    pub aria_pressed: bool,
}

/// Per-visit audio state. "Audible" requires both unmuted and nonzero
/// volume, matching how media elements report effective muting.
#[derive(Debug, Clone)]
pub struct AudioControl {
    muted: bool,
    volume: f32,
}

impl Default for AudioControl {
    fn default() -> Self {
        // Autoplay policy: fresh visits start muted at full volume.
        Self {
            muted: true,
            volume: 1.0,
        }
    }
}

impl AudioControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted || self.volume == 0.0
    }

    /// Flip the audio state. Unmuting sets full volume and asks the player
    /// to start; a rejected start leaves the unmuted state in place.
    /// Returns the refreshed button view.
    pub fn toggle(&mut self, playback: &mut impl Playback) -> AudioButton {
        if self.is_muted() {
            self.muted = false;
            self.volume = 1.0;
            if playback.play().is_err() {
                // Best-effort: the visitor keeps the unmuted state and the
                // next natural play (loop restart) picks the audio up.
                tracing::debug!("playback start rejected; continuing unmuted");
            }
        } else {
            self.muted = true;
        }
        self.button()
    }

    /// Current button view, without toggling.
    pub fn button(&self) -> AudioButton {
        if self.is_muted() {
            AudioButton {
                label: "🔇",
                aria_pressed: false,
            }
        } else {
            AudioButton {
                label: "🔊",
                aria_pressed: true,
            }
        }
    }
}
