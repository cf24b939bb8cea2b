use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{services::sse_events, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Watch the storage backend, entering degraded mode while it is unreachable.
pub async fn run(state: SharedState) {
    let mut delay = INITIAL_DELAY;

    loop {
        if probe(&state).await {
            delay = INITIAL_DELAY;
            sleep(HEALTH_POLL_INTERVAL).await;
        } else {
            warn!(
                wait_ms = delay.as_millis(),
                "exhausted storage reconnect attempts; staying in degraded mode"
            );
            sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);
        }
    }
}

/// One health round: check the store and try to reconnect when it fails.
/// Returns whether the store ends up usable.
async fn probe(state: &SharedState) -> bool {
    let store = state.store().clone();
    if store.health_check().await.is_ok() {
        if set_degraded(state, false) {
            info!("storage healthy again; leaving degraded mode");
        }
        return true;
    }

    let mut reconnect_delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                set_degraded(state, false);
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    set_degraded(state, true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

fn set_degraded(state: &SharedState, degraded: bool) -> bool {
    let changed = state.update_degraded(degraded);
    if changed {
        sse_events::broadcast_system_status(state, degraded);
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::scoreboard_store::MemoryScoreboardStore,
        state::{
            AppState,
            clock::ManualClock,
            scoreboard::{Scoreboard, TeamSlot},
        },
    };

    fn state(store: &MemoryScoreboardStore) -> SharedState {
        let board = Scoreboard::new(TeamSlot::new("A"), TeamSlot::new("B"), 600, 300);
        AppState::new(
            Arc::new(store.clone()),
            board,
            Arc::new(ManualClock::default()),
            AppConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_store_enters_and_leaves_degraded_mode() {
        let store = MemoryScoreboardStore::new();
        let state = state(&store);
        let mut events = state.public_sse().subscribe();

        store.set_unreachable(true);
        assert!(!probe(&state).await);
        assert!(state.is_degraded());
        let event = events.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("system.status"));
        assert_eq!(event.data, r#"{"degraded":true}"#);

        store.set_unreachable(false);
        assert!(probe(&state).await);
        assert!(!state.is_degraded());
        let event = events.try_recv().unwrap();
        assert_eq!(event.data, r#"{"degraded":false}"#);
    }

    #[tokio::test]
    async fn healthy_store_sends_nothing() {
        let store = MemoryScoreboardStore::new();
        let state = state(&store);
        let mut events = state.public_sse().subscribe();

        assert!(probe(&state).await);
        assert!(events.try_recv().is_err());
    }
}
