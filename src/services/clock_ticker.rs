use std::{sync::Arc, time::Duration};

use tokio::time::{MissedTickBehavior, interval};

use crate::{services::scoreboard_service, state::SharedState};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Push the scoreboard to SSE subscribers every second while the clock runs.
///
/// The task holds a weak handle and ends once the application state is dropped.
pub fn spawn(state: &SharedState) {
    let weak = Arc::downgrade(state);
    tokio::spawn(async move {
        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(state) = weak.upgrade() else {
                break;
            };
            scoreboard_service::tick(&state).await;
        }
    });
}
