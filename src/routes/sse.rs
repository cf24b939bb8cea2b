use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    services::{scoreboard_service, sse_events, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream scoreboard updates to connected displays.
///
/// The new display alone receives a connection message and the current scoreboard
/// before the shared updates.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    info!("New public SSE connection");
    let current = scoreboard_service::snapshot(&state).await;
    let mut initial = vec![sse_service::info_event("public stream connected")];
    initial.extend(sse_events::scoreboard_event(&current));
    sse_service::to_sse_stream(receiver, initial)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
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

    #[tokio::test]
    async fn new_connection_does_not_disturb_other_displays() {
        let scoreboard = Scoreboard::new(TeamSlot::new("A"), TeamSlot::new("B"), 600, 300);
        let state = AppState::new(
            Arc::new(MemoryScoreboardStore::new()),
            scoreboard,
            Arc::new(ManualClock::default()),
            AppConfig::default(),
        );
        let mut existing = state.public_sse().subscribe();

        let _stream = public_stream(State(state.clone())).await;
        assert!(existing.try_recv().is_err());
    }
}
