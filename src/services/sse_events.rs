use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        history::MatchHistoryItem,
        scoreboard::ScoreboardSnapshot,
        sse::{ServerEvent, SystemStatus},
    },
    state::SharedState,
};

const EVENT_SCOREBOARD: &str = "scoreboard";
const EVENT_MATCH_CLOSED: &str = "match.closed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the scoreboard as it stands after a change.
pub fn broadcast_scoreboard(state: &SharedState, snapshot: &ScoreboardSnapshot) {
    send_public_event(state, EVENT_SCOREBOARD, snapshot);
}

/// Broadcast the history record written when a match was closed.
pub fn broadcast_match_closed(state: &SharedState, record: &MatchHistoryItem) {
    send_public_event(state, EVENT_MATCH_CLOSED, record);
}

/// Broadcast that the backend entered or left degraded mode.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Scoreboard event addressed to a single subscriber rather than the whole hub.
pub fn scoreboard_event(snapshot: &ScoreboardSnapshot) -> Option<ServerEvent> {
    ServerEvent::json(Some(EVENT_SCOREBOARD.to_string()), snapshot)
        .inspect_err(|err| warn!(error = %err, "failed to serialize scoreboard SSE payload"))
        .ok()
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scoreboard::{Scoreboard, TeamSlot};

    #[test]
    fn scoreboard_event_carries_the_snapshot() {
        let board = Scoreboard::new(TeamSlot::new("Toros"), TeamSlot::new("B"), 600, 300);
        let snapshot: ScoreboardSnapshot = board.snapshot(std::time::UNIX_EPOCH).into();

        let event = scoreboard_event(&snapshot).unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_SCOREBOARD));
        assert!(event.data.contains("\"Toros\""));
    }
}
