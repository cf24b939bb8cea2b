use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the backend can currently persist scoreboard changes.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded() {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded();
    }

    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::scoreboard_store::MemoryScoreboardStore,
        dto::health::HealthStatus,
        state::{
            AppState,
            clock::ManualClock,
            scoreboard::{Scoreboard, TeamSlot},
        },
    };

    #[tokio::test]
    async fn reports_unreachable_store_as_degraded() {
        let store = MemoryScoreboardStore::new();
        let board = Scoreboard::new(TeamSlot::new("A"), TeamSlot::new("B"), 600, 300);
        let state = AppState::new(
            Arc::new(store.clone()),
            board,
            Arc::new(ManualClock::default()),
            AppConfig::default(),
        );

        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);
        store.set_unreachable(true);
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);
    }
}
