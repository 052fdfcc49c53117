//! In-memory store of page visits.
//!
//! Each visit owns a reveal controller, an audio state, and the projects
//! region for that viewing. The store arms the fallback timer tasks,
//! dispatches signals, triggers the project load exactly once when the
//! reveal fires, and evicts idle visits. Nothing is persisted; a restart
//! forgets every visit.
//!
//! The map lock is held only across pure state mutation; timer arming and
//! the GitHub fetch happen in spawned tasks that re-enter through the same
//! public methods.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::audio::{AudioControl, RelayedPlayback};
use crate::config::Config;
use crate::github::GithubClient;
use crate::models::{
    AudioToggleView, CreateVisitInput, ProjectsSnapshot, ProjectsStatus, RegionsView, VisitView,
};
use crate::page::{self, ProjectsFragment};
use crate::reveal::{Effect, RevealController, RevealSignal};

#[derive(Debug, Error)]
pub enum VisitError {
    #[error("Visit not found: {0}")]
    NotFound(Uuid),
}

/// Projects region lifecycle for one visit. A failed load still lands in
/// `Ready`, holding the error fragment, because reveal itself never fails.
enum Projects {
    Pending,
    Loading,
    Ready(ProjectsFragment),
}

struct Visit {
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    controller: RevealController,
    audio: AudioControl,
    projects: Projects,
}

#[derive(Clone)]
pub struct VisitStore {
    visits: Arc<Mutex<HashMap<Uuid, Visit>>>,
    github: GithubClient,
    config: Config,
}

impl VisitStore {
    pub fn new(config: Config) -> Self {
        let github = GithubClient::new(&config);
        Self {
            visits: Arc::new(Mutex::new(HashMap::new())),
            github,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a new visit and arm its initial fallback timer: derived
    /// from the media duration when the front-end already knows it, the
    /// generic default otherwise (including media-less visits).
    pub fn create(&self, input: CreateVisitInput) -> VisitView {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut visit = Visit {
            created_at: now,
            last_seen: now,
            controller: RevealController::new(),
            audio: AudioControl::new(),
            projects: Projects::Pending,
        };

        let delay = input
            .duration_secs
            .filter(|_| input.media_present)
            .and_then(|secs| self.config.fallback_for_duration(secs))
            .unwrap_or(self.config.reveal_fallback);
        visit.controller.store_timer(self.spawn_fallback(id, delay));

        let view = view_of(id, &visit);
        self.lock().insert(id, visit);
        tracing::debug!(visit = %id, ?delay, "visit created, fallback armed");
        view
    }

    /// Dispatch a reveal signal. At most one call per visit ever crosses
    /// into the revealed state, and only that call starts the project load.
    pub fn signal(&self, id: Uuid, signal: RevealSignal) -> Result<VisitView, VisitError> {
        let mut revealed_now = false;
        let view = {
            let mut visits = self.lock();
            let visit = visits.get_mut(&id).ok_or(VisitError::NotFound(id))?;
            visit.last_seen = Utc::now();
            match visit.controller.apply(signal, &self.config) {
                Effect::None => {}
                Effect::Arm(delay) => {
                    let handle = self.spawn_fallback(id, delay);
                    visit.controller.store_timer(handle);
                    tracing::debug!(visit = %id, ?delay, "fallback re-armed from metadata");
                }
                Effect::Reveal => {
                    visit.projects = Projects::Loading;
                    revealed_now = true;
                }
            }
            view_of(id, visit)
        };

        if revealed_now {
            tracing::info!(visit = %id, ?signal, "intro revealed, loading projects");
            self.spawn_load(id);
        }
        Ok(view)
    }

    /// Snapshot a visit.
    pub fn get(&self, id: Uuid) -> Result<VisitView, VisitError> {
        let mut visits = self.lock();
        let visit = visits.get_mut(&id).ok_or(VisitError::NotFound(id))?;
        visit.last_seen = Utc::now();
        Ok(view_of(id, visit))
    }

    /// Toggle the visit's audio state. `resume_playback` asks the
    /// front-end to attempt `play()` after an unmute; both sides treat a
    /// rejected start as best-effort.
    pub fn toggle_audio(&self, id: Uuid) -> Result<AudioToggleView, VisitError> {
        let mut visits = self.lock();
        let visit = visits.get_mut(&id).ok_or(VisitError::NotFound(id))?;
        visit.last_seen = Utc::now();
        let was_muted = visit.audio.is_muted();
        let button = visit.audio.toggle(&mut RelayedPlayback);
        Ok(AudioToggleView {
            button,
            resume_playback: was_muted,
        })
    }

    /// Evict visits idle past the configured horizon, aborting their
    /// pending timers. Returns how many were dropped.
    pub fn prune_idle(&self) -> usize {
        let horizon = chrono::Duration::from_std(self.config.visit_idle_horizon)
            .unwrap_or_else(|_| chrono::Duration::hours(1));
        let cutoff = Utc::now() - horizon;

        let mut visits = self.lock();
        let before = visits.len();
        visits.retain(|id, visit| {
            let keep = visit.last_seen > cutoff;
            if !keep {
                visit.controller.cancel_timer();
                tracing::debug!(visit = %id, "pruned idle visit");
            }
            keep
        });
        before - visits.len()
    }

    /// Run the pruning sweep on an interval until the process exits.
    pub async fn run_pruner(self, every: Duration) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let dropped = self.prune_idle();
            if dropped > 0 {
                tracing::info!(dropped, "visit store pruned");
            }
        }
    }

    fn spawn_fallback(&self, id: Uuid, delay: Duration) -> AbortHandle {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The visit may have been pruned; an elapsed timer for a gone
            // visit has nothing left to do.
            let _ = store.signal(id, RevealSignal::FallbackElapsed);
        })
        .abort_handle()
    }

    fn spawn_load(&self, id: Uuid) {
        let store = self.clone();
        tokio::spawn(async move {
            let fragment = match store.github.load_projects(&store.config.github_user).await {
                Ok(repos) => page::render_projects(&repos, Utc::now()),
                Err(error) => {
                    tracing::warn!(visit = %id, %error, "project load failed");
                    page::render_error()
                }
            };
            if let Some(visit) = store.lock().get_mut(&id) {
                visit.projects = Projects::Ready(fragment);
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Visit>> {
        self.visits.lock().expect("visit store lock poisoned")
    }
}

fn view_of(id: Uuid, visit: &Visit) -> VisitView {
    let (status, html) = match &visit.projects {
        Projects::Pending => (ProjectsStatus::Pending, None),
        Projects::Loading => (ProjectsStatus::Loading, None),
        Projects::Ready(fragment) => (fragment.state.into(), Some(fragment.html.clone())),
    };
    VisitView {
        id,
        created_at: visit.created_at,
        reveal_state: visit.controller.state(),
        regions: RegionsView::for_state(visit.controller.state()),
        audio: visit.audio.button(),
        projects: ProjectsSnapshot { status, html },
    }
}
