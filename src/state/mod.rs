pub mod clock;
pub mod scoreboard;
mod sse;

use std::{sync::Arc, time::SystemTime};

use tokio::sync::{Mutex, watch};

use crate::{config::AppConfig, dao::scoreboard_store::ScoreboardStore};

pub use self::sse::SseHub;
use self::{clock::Clock, scoreboard::Scoreboard, sse::PUBLIC_SSE_CAPACITY};

/// Handle to the application state shared by routes and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state: the live scoreboard, its store and the SSE hub.
///
/// The scoreboard and the lock guarding it live together; every operation on it
/// goes through [`AppState::scoreboard`].
pub struct AppState {
    store: Arc<dyn ScoreboardStore>,
    scoreboard: Mutex<Scoreboard>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
    sse: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The store is expected to be reachable, so the state starts out healthy.
    pub fn new(
        store: Arc<dyn ScoreboardStore>,
        scoreboard: Scoreboard,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            store,
            scoreboard: Mutex::new(scoreboard),
            clock,
            config,
            sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            degraded: degraded_tx,
        })
    }

    /// Persistence backend.
    pub fn store(&self) -> &Arc<dyn ScoreboardStore> {
        &self.store
    }

    /// The single live scoreboard and its lock.
    pub fn scoreboard(&self) -> &Mutex<Scoreboard> {
        &self.scoreboard
    }

    /// Current wall-clock instant according to the injected clock.
    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// Settings loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Set the degraded flag, returning whether it actually changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::scoreboard_store::MemoryScoreboardStore,
        state::{clock::ManualClock, scoreboard::TeamSlot},
    };

    fn state() -> SharedState {
        let scoreboard = Scoreboard::new(TeamSlot::new("A"), TeamSlot::new("B"), 600, 300);
        AppState::new(
            Arc::new(MemoryScoreboardStore::new()),
            scoreboard,
            Arc::new(ManualClock::default()),
            AppConfig::default(),
        )
    }

    #[test]
    fn degraded_flag_reports_changes_only() {
        let state = state();
        let watcher = state.degraded_watcher();
        assert!(!state.is_degraded());

        assert!(state.update_degraded(true));
        assert!(!state.update_degraded(true));
        assert!(state.is_degraded());
        assert!(*watcher.borrow());

        assert!(state.update_degraded(false));
        assert!(!state.is_degraded());
    }
}
