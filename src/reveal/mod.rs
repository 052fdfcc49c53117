//! The reveal state machine.
//!
//! A visit starts with the intro playing and the page content hidden.
//! Several signals race to end the intro: a fallback timer, a near-end
//! check on time updates, the media's natural ended signal, and a manual
//! skip. Whichever fires first wins; everything after is a no-op.
//!
//! The controller owns at most one pending fallback timer handle. Re-arming
//! (when media metadata arrives after the default fallback was armed)
//! replaces the previous handle rather than stacking a second timer, and is
//! skipped entirely once revealed.
//!
//! [`RevealController::apply`] is pure apart from aborting the pending
//! handle: it returns an [`Effect`] telling the caller what to do next, so
//! timer spawning stays in one place (the visit store) and the transition
//! logic is testable without a runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::AbortHandle;

use crate::config::Config;

/// Whether the page content is visible yet. Transitions once, irreversibly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    Hidden,
    Revealed,
}

impl RevealState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Revealed => "revealed",
        }
    }
}

impl Default for RevealState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Signals that race to end the intro.
///
/// `FallbackElapsed` is produced internally by the fallback timer task; the
/// HTTP surface only accepts the other four (see `models::SignalInput`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealSignal {
    /// Media metadata became available; the fallback can now be derived
    /// from the real duration instead of the generic default.
    MetadataLoaded { duration_secs: f64 },
    /// Periodic playback progress, used for the near-end check. Looping
    /// media never emits `Ended`, so this is the path that catches it.
    TimeUpdate {
        position_secs: f64,
        duration_secs: f64,
    },
    /// The media finished a full play-through.
    Ended,
    /// The visitor asked to skip the intro.
    SkipRequested,
    /// The fallback timer expired.
    FallbackElapsed,
}

/// What the caller must do after a signal is applied.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Effect {
    /// Nothing to do; the signal was absorbed.
    None,
    /// Arm (or re-arm) the fallback timer with this delay, then hand the
    /// new handle back via [`RevealController::store_timer`].
    Arm(Duration),
    /// The reveal just fired: unhide the page regions and start the
    /// project load. Returned exactly once per controller.
    Reveal,
}

/// Per-visit reveal state: the current [`RevealState`] plus the single
/// pending fallback timer handle, mutated only through [`apply`] and
/// [`store_timer`].
///
/// [`apply`]: RevealController::apply
/// [`store_timer`]: RevealController::store_timer
#[derive(Debug, Default)]
pub struct RevealController {
    state: RevealState,
    pending: Option<AbortHandle>,
}

impl RevealController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        self.state == RevealState::Revealed
    }

    /// Apply a signal and report the resulting effect.
    ///
    /// The revealed check comes first: once revealed, every signal is
    /// absorbed, including a late `MetadataLoaded` that would otherwise
    /// re-arm the fallback. At most one call ever returns
    /// [`Effect::Reveal`].
    pub fn apply(&mut self, signal: RevealSignal, config: &Config) -> Effect {
        if self.is_revealed() {
            return Effect::None;
        }
        match signal {
            RevealSignal::MetadataLoaded { duration_secs } => {
                match config.fallback_for_duration(duration_secs) {
                    Some(delay) => Effect::Arm(delay),
                    // Unusable duration: keep the fallback already armed.
                    None => Effect::None,
                }
            }
            RevealSignal::TimeUpdate {
                position_secs,
                duration_secs,
            } => {
                if config.is_near_end(position_secs, duration_secs) {
                    self.reveal()
                } else {
                    Effect::None
                }
            }
            RevealSignal::Ended | RevealSignal::SkipRequested | RevealSignal::FallbackElapsed => {
                self.reveal()
            }
        }
    }

    /// Record the handle of a fallback timer the caller just spawned,
    /// aborting any previous one so a single timer is live at a time.
    pub fn store_timer(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.pending.replace(handle) {
            previous.abort();
        }
    }

    /// Abort and drop the pending timer, if any. Used when a visit is
    /// evicted before it revealed.
    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn reveal(&mut self) -> Effect {
        self.state = RevealState::Revealed;
        self.cancel_timer();
        Effect::Reveal
    }
}
