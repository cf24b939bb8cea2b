//! Operations on the live scoreboard.
//!
//! Every mutation runs under the scoreboard lock and follows the same steps: apply
//! the transition to a copy, commit the copy through the store as one unit of work,
//! and only then replace the in-memory scoreboard and notify subscribers. A failed
//! commit leaves the live scoreboard exactly as it was.

use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{MatchHistoryEntity, UnitOfWork},
        scoreboard_store::ScoreboardStore,
    },
    dto::{
        history::MatchHistoryItem,
        scoreboard::{ClockStatusResponse, ScoreboardSnapshot},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        scoreboard::{
            AUTO_CLOSE_REASON, CloseStatus, MatchRecord, QuarterTransition, Scoreboard, Side,
            Snapshot, TeamSlot,
        },
    },
};

/// What a transition did to the draft scoreboard.
enum Effect {
    /// Nothing to persist.
    Unchanged,
    Changed,
    /// The match was closed into this record.
    Closed(MatchRecord),
}

/// Current scoreboard, stopping an expired clock on the way.
pub async fn snapshot(state: &SharedState) -> ScoreboardSnapshot {
    read_settled(state).await.0.into()
}

/// Clock-only view of the scoreboard; settles an expired clock like [`snapshot`].
pub async fn clock_status(state: &SharedState) -> ClockStatusResponse {
    read_settled(state).await.0.into()
}

/// Broadcast the running clock so displays stay in sync. Returns whether anything was sent.
pub async fn tick(state: &SharedState) -> bool {
    let running = state.scoreboard().lock().await.is_running();
    if !running {
        return false;
    }

    let (current, broadcasted) = read_settled(state).await;
    if !broadcasted {
        sse_events::broadcast_scoreboard(state, &current.into());
    }
    true
}

/// Snapshot at the current instant. When the clock ran out since the last change,
/// the stop is persisted; a failed persist is logged and the stopped view is still
/// returned while the live state stays untouched, so the next read retries.
async fn read_settled(state: &SharedState) -> (Snapshot, bool) {
    let now = state.now();
    let mut guard = state.scoreboard().lock().await;
    let mut draft = guard.clone();
    if !draft.settle(now) {
        return (draft.snapshot(now), false);
    }

    let current = draft.snapshot(now);
    if state.is_degraded() {
        debug!("clock expired while degraded; stop not persisted");
        return (current, false);
    }

    match state.store().commit(unit_for(&draft, now, None)).await {
        Ok(()) => {
            info!(scoreboard = %draft.id, "clock expired; stopped");
            *guard = draft;
            sse_events::broadcast_scoreboard(state, &current.clone().into());
            (current, true)
        }
        Err(err) => {
            warn!(error = %err, "failed to persist expired clock stop");
            (current, false)
        }
    }
}

/// Add `amount` points to `side`; negative amounts add nothing.
pub async fn add_points(
    state: &SharedState,
    side: &str,
    amount: i32,
) -> Result<ScoreboardSnapshot, ServiceError> {
    let side: Side = side.parse()?;
    apply(state, "add_points", |board, _| {
        board.add_points(side, amount);
        Effect::Changed
    })
    .await
}

/// Remove `amount` points from `side` without going below zero.
pub async fn subtract_points(
    state: &SharedState,
    side: &str,
    amount: i32,
) -> Result<ScoreboardSnapshot, ServiceError> {
    let side: Side = side.parse()?;
    apply(state, "subtract_points", |board, _| {
        board.subtract_points(side, amount);
        Effect::Changed
    })
    .await
}

/// Charge one foul to `side`.
pub async fn register_foul(
    state: &SharedState,
    side: &str,
) -> Result<ScoreboardSnapshot, ServiceError> {
    let side: Side = side.parse()?;
    apply(state, "register_foul", |board, _| {
        board.register_foul(side);
        Effect::Changed
    })
    .await
}

/// Start (or resume) the clock; a running clock is left alone.
pub async fn start_clock(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "start_clock", |board, now| {
        if board.start_clock(now) {
            Effect::Changed
        } else {
            Effect::Unchanged
        }
    })
    .await
}

/// Pause the clock, freezing the remaining time; a stopped clock is left alone.
pub async fn pause_clock(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "pause_clock", |board, now| {
        if board.pause_clock(now) {
            Effect::Changed
        } else {
            Effect::Unchanged
        }
    })
    .await
}

/// Overwrite the remaining time, clamped at zero.
pub async fn set_remaining_seconds(
    state: &SharedState,
    seconds: i64,
) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "set_remaining_seconds", |board, now| {
        board.set_remaining(seconds, now);
        Effect::Changed
    })
    .await
}

/// Configure a new period length and stop the clock at its start. Without `seconds`
/// the configured period length is used.
pub async fn reset_clock(
    state: &SharedState,
    seconds: Option<i64>,
) -> Result<ScoreboardSnapshot, ServiceError> {
    let seconds = seconds.unwrap_or_else(|| i64::from(state.config().period_duration_secs));
    apply(state, "reset_clock", |board, _| {
        board.reset_clock(seconds);
        Effect::Changed
    })
    .await
}

/// Move to the next period, or into overtime once regulation is over. Never closes
/// the match.
pub async fn advance_quarter(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    let mut taken = None;
    let snapshot = apply(state, "advance_quarter", |board, now| {
        taken = Some(board.advance_quarter(now));
        Effect::Changed
    })
    .await?;
    log_transition(taken);
    Ok(snapshot)
}

/// Like [`advance_quarter`], except that at the end of regulation the match is
/// closed as finished by time instead of entering overtime.
pub async fn advance_or_close(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    let mut taken = None;
    let snapshot = apply(state, "advance_or_close", |board, now| {
        if board.regulation_over() {
            Effect::Closed(board.close(now, CloseStatus::AutoFinished, Some(AUTO_CLOSE_REASON)))
        } else {
            taken = Some(board.advance_quarter(now));
            Effect::Changed
        }
    })
    .await?;
    log_transition(taken);
    Ok(snapshot)
}

fn log_transition(taken: Option<QuarterTransition>) {
    match taken {
        Some(QuarterTransition::Period(period)) => info!(period, "advanced to next period"),
        Some(QuarterTransition::Overtime(number)) => info!(overtime = number, "entered overtime"),
        None => {}
    }
}

/// Rename the current teams in place.
pub async fn rename_teams(
    state: &SharedState,
    home: Option<String>,
    away: Option<String>,
) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "rename_teams", |board, _| {
        board.rename(home.as_deref(), away.as_deref());
        Effect::Changed
    })
    .await
}

/// Point each side with a new name at a brand-new team record carrying the current
/// points and fouls, leaving the previous record untouched.
pub async fn rename_creating_new_roster(
    state: &SharedState,
    home: Option<String>,
    away: Option<String>,
) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "rename_creating_new_roster", |board, _| {
        let mut changed = false;
        for (side, name) in [(Side::Home, home), (Side::Away, away)] {
            let Some(name) = name.map(|name| name.trim().to_owned()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let previous = board.team(side);
            let team = TeamSlot {
                points: previous.points,
                fouls: previous.fouls,
                ..TeamSlot::new(name)
            };
            debug!(?side, previous = %previous.id, team = %team.id, "created replacement team");
            board.replace_team(side, team);
            changed = true;
        }
        if changed {
            Effect::Changed
        } else {
            Effect::Unchanged
        }
    })
    .await
}

/// Start over at period 1 with empty tallies and a stopped clock.
pub async fn new_match(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "new_match", |board, _| {
        board.new_match();
        Effect::Changed
    })
    .await
}

/// Hard reset: settle the clock, then behave like [`new_match`].
pub async fn reset_to_zero(state: &SharedState) -> Result<ScoreboardSnapshot, ServiceError> {
    apply(state, "reset_to_zero", |board, now| {
        board.reset_to_zero(now);
        Effect::Changed
    })
    .await
}

/// Close the current match into history; `status` defaults to finished.
///
/// Not idempotent: every call appends a new history record.
pub async fn close_match(
    state: &SharedState,
    status: Option<CloseStatus>,
    reason: Option<String>,
) -> Result<ScoreboardSnapshot, ServiceError> {
    let status = status.unwrap_or(CloseStatus::Finished);
    apply(state, "close_match", |board, now| {
        Effect::Closed(board.close(now, status, reason.as_deref()))
    })
    .await
}

/// Put the two teams of a scheduled match on the scoreboard and start it from scratch.
pub async fn load_match(state: &SharedState, id: Uuid) -> Result<ScoreboardSnapshot, ServiceError> {
    let scheduled = state
        .store()
        .find_match(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}`")))?;

    let home = find_team_slot(state, scheduled.home_team_id, id).await?;
    let away = find_team_slot(state, scheduled.away_team_id, id).await?;

    apply(state, "load_match", |board, _| {
        board.load_teams(home, away);
        Effect::Changed
    })
    .await
}

async fn find_team_slot(
    state: &SharedState,
    team_id: Uuid,
    match_id: Uuid,
) -> Result<TeamSlot, ServiceError> {
    state
        .store()
        .find_team(team_id)
        .await?
        .map(TeamSlot::from)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` of match `{match_id}`")))
}

/// Closed matches, most recent first.
pub async fn list_history(state: &SharedState) -> Result<Vec<MatchHistoryItem>, ServiceError> {
    let records = state.store().list_history().await?;
    Ok(records.into_iter().map(Into::into).collect())
}

/// Load the persisted scoreboard or create and persist a default one.
///
/// Called once at startup, before the shared state exists.
pub async fn bootstrap(
    store: &dyn ScoreboardStore,
    config: &AppConfig,
    now: SystemTime,
) -> Result<Scoreboard, ServiceError> {
    let mut board = match store.load_scoreboard().await? {
        Some(row) => {
            let home = store.find_team(row.home_team_id).await?;
            let away = store.find_team(row.away_team_id).await?;
            match (home, away) {
                (Some(home), Some(away)) => {
                    info!(scoreboard = %row.id, "loaded persisted scoreboard");
                    Scoreboard::from_entities(row, home, away)
                }
                _ => {
                    warn!(
                        scoreboard = %row.id,
                        "persisted scoreboard references missing teams; starting fresh"
                    );
                    // Keep the row id so the damaged row is overwritten in place.
                    let board = Scoreboard {
                        id: row.id,
                        ..fresh_scoreboard(config)
                    };
                    store.commit(unit_for(&board, now, None)).await?;
                    board
                }
            }
        }
        None => {
            let board = fresh_scoreboard(config);
            store.commit(unit_for(&board, now, None)).await?;
            info!(scoreboard = %board.id, "created default scoreboard");
            board
        }
    };

    if config.reset_on_startup {
        board.reset_to_zero(now);
        store.commit(unit_for(&board, now, None)).await?;
        info!("scoreboard reset on startup");
    }

    Ok(board)
}

fn fresh_scoreboard(config: &AppConfig) -> Scoreboard {
    Scoreboard::new(
        TeamSlot::new(config.home_team_name.clone()),
        TeamSlot::new(config.away_team_name.clone()),
        config.period_duration_secs,
        config.overtime_duration_secs,
    )
}

fn unit_for(board: &Scoreboard, now: SystemTime, closed: Option<MatchHistoryEntity>) -> UnitOfWork {
    let unit = UnitOfWork::new()
        .with_scoreboard(board.to_entity(now))
        .with_teams(board.team_entities(now));
    match closed {
        Some(record) => unit.with_history(record),
        None => unit,
    }
}

async fn apply<F>(
    state: &SharedState,
    operation: &'static str,
    transition: F,
) -> Result<ScoreboardSnapshot, ServiceError>
where
    F: FnOnce(&mut Scoreboard, SystemTime) -> Effect,
{
    if state.is_degraded() {
        return Err(ServiceError::Degraded);
    }

    let now = state.now();
    let mut guard = state.scoreboard().lock().await;
    let mut draft = guard.clone();
    let settled = draft.settle(now);

    let closed = match transition(&mut draft, now) {
        Effect::Unchanged if !settled => {
            debug!(operation, "no change to persist");
            return Ok(draft.snapshot(now).into());
        }
        Effect::Unchanged | Effect::Changed => None,
        Effect::Closed(record) => Some(MatchHistoryEntity::from(record)),
    };

    if let Err(err) = state
        .store()
        .commit(unit_for(&draft, now, closed.clone()))
        .await
    {
        warn!(operation, error = %err, "failed to persist scoreboard change");
        return Err(err.into());
    }

    let current: ScoreboardSnapshot = draft.snapshot(now).into();
    *guard = draft;
    debug!(operation, "scoreboard updated");

    sse_events::broadcast_scoreboard(state, &current);
    if let Some(record) = closed {
        info!(
            operation,
            record = %record.id,
            status = %record.status,
            home_points = record.home_points,
            away_points = record.away_points,
            "match closed"
        );
        sse_events::broadcast_match_closed(state, &record.into());
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        dao::{
            models::{MatchEntity, TeamEntity},
            scoreboard_store::MemoryScoreboardStore,
        },
        dto::scoreboard::ClockStateDto,
        state::{
            AppState,
            clock::{Clock, ManualClock},
        },
    };

    struct Harness {
        state: SharedState,
        store: MemoryScoreboardStore,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        async fn new() -> Self {
            Self::with_config(AppConfig::default()).await
        }

        async fn with_config(config: AppConfig) -> Self {
            let store = MemoryScoreboardStore::new();
            let clock = Arc::new(ManualClock::default());
            let board = bootstrap(&store, &config, clock.now()).await.unwrap();
            let state = AppState::new(Arc::new(store.clone()), board, clock.clone(), config);
            Self { state, store, clock }
        }

        fn wait(&self, secs: u64) {
            self.clock.advance(Duration::from_secs(secs));
        }

        async fn live(&self) -> Scoreboard {
            self.state.scoreboard().lock().await.clone()
        }
    }

    #[tokio::test]
    async fn full_match_scenario() {
        let h = Harness::new().await;
        let start = snapshot(&h.state).await;
        assert_eq!((start.period, start.remaining_seconds), (1, 600));
        assert_eq!((start.home.points, start.away.points), (0, 0));

        let s = add_points(&h.state, "home", 2).await.unwrap();
        assert_eq!(s.home.points, 2);

        start_clock(&h.state).await.unwrap();
        h.wait(10);
        let s = pause_clock(&h.state).await.unwrap();
        assert_eq!(s.remaining_seconds, 590);
        assert!(!s.clock_running);

        register_foul(&h.state, "away").await.unwrap();
        let s = advance_quarter(&h.state).await.unwrap();
        assert_eq!(s.period, 2);
        assert_eq!(s.remaining_seconds, 600);
        assert_eq!((s.home.fouls, s.away.fouls), (0, 0));

        let s = add_points(&h.state, "away", 3).await.unwrap();
        assert_eq!(s.away.points, 3);

        close_match(&h.state, Some(CloseStatus::Finished), Some("fin de prueba".into()))
            .await
            .unwrap();

        let history = h.store.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.home_name, "Equipo A");
        assert_eq!(record.home_points, 2);
        assert_eq!(record.away_name, "Equipo B");
        assert_eq!(record.away_points, 3);
        assert_eq!(record.period, 2);
        assert_eq!(record.status, "Terminado");
        assert_eq!(record.reason.as_deref(), Some("fin de prueba"));
    }

    #[tokio::test]
    async fn closing_updates_teams_and_is_not_idempotent() {
        let h = Harness::new().await;
        add_points(&h.state, "local", 7).await.unwrap();
        register_foul(&h.state, "visitante").await.unwrap();

        close_match(&h.state, None, Some("manual".into())).await.unwrap();
        close_match(&h.state, None, Some("manual".into())).await.unwrap();

        assert_eq!(h.store.list_history().await.unwrap().len(), 2);

        let live = h.live().await;
        let home = h.store.find_team(live.home.id).await.unwrap().unwrap();
        let away = h.store.find_team(live.away.id).await.unwrap().unwrap();
        assert_eq!((home.points, home.fouls), (7, 0));
        assert_eq!((away.points, away.fouls), (0, 1));
    }

    #[tokio::test]
    async fn close_stops_the_clock_and_records_the_elapsed_time() {
        let h = Harness::new().await;
        start_clock(&h.state).await.unwrap();
        h.wait(45);

        let s = close_match(&h.state, Some(CloseStatus::Suspended), Some("  ".into()))
            .await
            .unwrap();
        assert!(!s.clock_running);
        assert_eq!(s.remaining_seconds, 555);

        let history = h.store.list_history().await.unwrap();
        assert_eq!(history[0].remaining_seconds, 555);
        assert_eq!(history[0].status, "Suspendido");
        assert_eq!(history[0].reason, None);
    }

    #[tokio::test]
    async fn failed_commit_leaves_the_scoreboard_untouched() {
        let h = Harness::new().await;
        add_points(&h.state, "home", 4).await.unwrap();
        let before = h.live().await;

        h.store.fail_commits(true);
        let err = add_points(&h.state, "home", 3).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let err = close_match(&h.state, None, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        assert_eq!(h.live().await, before);
        assert!(h.store.list_history().await.unwrap().is_empty());

        h.store.fail_commits(false);
        let s = add_points(&h.state, "home", 3).await.unwrap();
        assert_eq!(s.home.points, 7);
    }

    #[tokio::test]
    async fn invalid_side_is_rejected_before_any_change() {
        let h = Harness::new().await;
        let before = h.live().await;

        let err = add_points(&h.state, "bench", 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        let err = register_foul(&h.state, "").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        assert_eq!(h.live().await, before);
    }

    #[tokio::test]
    async fn subtracting_never_goes_negative_and_negative_adds_are_ignored() {
        let h = Harness::new().await;
        add_points(&h.state, "away", 2).await.unwrap();

        let s = subtract_points(&h.state, "away", 5).await.unwrap();
        assert_eq!(s.away.points, 0);

        let s = add_points(&h.state, "away", -4).await.unwrap();
        assert_eq!(s.away.points, 0);
    }

    #[tokio::test]
    async fn expired_clock_is_stopped_and_persisted_on_read() {
        let h = Harness::new().await;
        set_remaining_seconds(&h.state, 5).await.unwrap();
        start_clock(&h.state).await.unwrap();
        let mut events = h.state.public_sse().subscribe();

        h.wait(8);
        let s = snapshot(&h.state).await;
        assert_eq!(s.remaining_seconds, 0);
        assert!(!s.clock_running);

        assert!(!h.live().await.is_running());
        let row = h.store.load_scoreboard().await.unwrap().unwrap();
        assert!(!row.clock_running);
        assert_eq!(row.remaining_seconds, 0);

        let event = events.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("scoreboard"));
    }

    #[tokio::test]
    async fn expired_clock_read_survives_a_failed_persist() {
        let h = Harness::new().await;
        set_remaining_seconds(&h.state, 5).await.unwrap();
        start_clock(&h.state).await.unwrap();
        h.store.fail_commits(true);

        h.wait(8);
        let s = clock_status(&h.state).await;
        assert_eq!(s.remaining_seconds, 0);
        assert!(!s.clock_running);
        assert!(h.live().await.is_running());

        h.store.fail_commits(false);
        snapshot(&h.state).await;
        assert!(!h.live().await.is_running());
    }

    #[tokio::test]
    async fn start_is_idempotent_and_set_keeps_running_clock_consistent() {
        let h = Harness::new().await;
        start_clock(&h.state).await.unwrap();
        h.wait(20);
        let s = start_clock(&h.state).await.unwrap();
        assert_eq!(s.remaining_seconds, 580);

        let s = set_remaining_seconds(&h.state, 100).await.unwrap();
        assert!(s.clock_running);
        h.wait(30);
        assert_eq!(snapshot(&h.state).await.remaining_seconds, 70);

        let s = set_remaining_seconds(&h.state, -3).await.unwrap();
        assert_eq!(s.remaining_seconds, 0);
    }

    #[tokio::test]
    async fn paused_clock_does_not_keep_counting() {
        let h = Harness::new().await;
        start_clock(&h.state).await.unwrap();
        h.wait(12);
        pause_clock(&h.state).await.unwrap();
        h.wait(100);

        let s = snapshot(&h.state).await;
        assert_eq!(s.remaining_seconds, 588);
        assert_eq!(s.clock_state, ClockStateDto::Paused);
    }

    #[tokio::test]
    async fn reset_clock_uses_the_given_or_configured_length() {
        let h = Harness::new().await;
        advance_quarter(&h.state).await.unwrap();
        advance_quarter(&h.state).await.unwrap();
        advance_quarter(&h.state).await.unwrap();
        advance_quarter(&h.state).await.unwrap();
        start_clock(&h.state).await.unwrap();

        let s = reset_clock(&h.state, Some(300)).await.unwrap();
        assert_eq!(s.period_duration_secs, 300);
        assert_eq!(s.remaining_seconds, 300);
        assert!(!s.clock_running);
        assert!(!s.in_overtime);
        assert_eq!(s.clock_state, ClockStateDto::Stopped);

        let s = reset_clock(&h.state, None).await.unwrap();
        assert_eq!(s.period_duration_secs, 600);
    }

    #[tokio::test]
    async fn advance_quarter_enters_overtime_after_regulation() {
        let h = Harness::new().await;
        for _ in 0..3 {
            advance_quarter(&h.state).await.unwrap();
        }
        let s = advance_quarter(&h.state).await.unwrap();
        assert_eq!(s.period, 4);
        assert!(s.in_overtime);
        assert_eq!(s.overtime_number, 1);
        assert_eq!(s.remaining_seconds, 300);

        let s = advance_quarter(&h.state).await.unwrap();
        assert_eq!(s.overtime_number, 2);
        assert!(h.store.list_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn advance_or_close_closes_at_end_of_regulation() {
        let h = Harness::new().await;
        let s = advance_or_close(&h.state).await.unwrap();
        assert_eq!(s.period, 2);
        assert!(h.store.list_history().await.unwrap().is_empty());

        advance_or_close(&h.state).await.unwrap();
        advance_or_close(&h.state).await.unwrap();
        let s = advance_or_close(&h.state).await.unwrap();
        assert_eq!(s.period, 4);
        assert!(!s.in_overtime);

        let history = h.store.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "TerminadoAuto");
        assert_eq!(history[0].reason.as_deref(), Some(AUTO_CLOSE_REASON));
    }

    #[tokio::test]
    async fn advance_or_close_continues_an_overtime() {
        let h = Harness::new().await;
        for _ in 0..4 {
            advance_quarter(&h.state).await.unwrap();
        }
        let s = advance_or_close(&h.state).await.unwrap();
        assert_eq!(s.overtime_number, 2);
        assert!(h.store.list_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rename_in_place_keeps_team_identity() {
        let h = Harness::new().await;
        let before = h.live().await;

        let s = rename_teams(&h.state, Some("Toros".into()), None).await.unwrap();
        assert_eq!(s.home.name, "Toros");
        assert_eq!(s.home.id, before.home.id);
        assert_eq!(s.away.name, "Equipo B");

        let stored = h.store.find_team(before.home.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Toros");
    }

    #[tokio::test]
    async fn rename_creating_new_roster_keeps_the_old_team() {
        let h = Harness::new().await;
        add_points(&h.state, "away", 9).await.unwrap();
        let before = h.live().await;
        let teams_before = h.store.team_count().await;

        let s = rename_creating_new_roster(&h.state, None, Some("Halcones".into()))
            .await
            .unwrap();
        assert_eq!(s.away.name, "Halcones");
        assert_eq!(s.away.points, 9);
        assert_ne!(s.away.id, before.away.id);
        assert_eq!(s.home.id, before.home.id);

        assert_eq!(h.store.team_count().await, teams_before + 1);
        let old = h.store.find_team(before.away.id).await.unwrap().unwrap();
        assert_eq!(old.name, "Equipo B");

        let s = rename_creating_new_roster(&h.state, Some(" ".into()), None)
            .await
            .unwrap();
        assert_eq!(s.home.id, before.home.id);
        assert_eq!(h.store.team_count().await, teams_before + 1);
    }

    #[tokio::test]
    async fn new_match_and_reset_clear_everything() {
        let h = Harness::new().await;
        add_points(&h.state, "home", 10).await.unwrap();
        register_foul(&h.state, "home").await.unwrap();
        advance_quarter(&h.state).await.unwrap();
        start_clock(&h.state).await.unwrap();
        h.wait(5);

        let s = new_match(&h.state).await.unwrap();
        assert_eq!((s.period, s.home.points, s.home.fouls), (1, 0, 0));
        assert_eq!(s.remaining_seconds, 600);
        assert!(!s.clock_running);

        add_points(&h.state, "away", 1).await.unwrap();
        start_clock(&h.state).await.unwrap();
        h.wait(700);
        let s = reset_to_zero(&h.state).await.unwrap();
        assert_eq!((s.period, s.away.points), (1, 0));
        assert_eq!(s.remaining_seconds, 600);
        assert!(!s.clock_running);
    }

    #[tokio::test]
    async fn load_match_installs_scheduled_teams() {
        let h = Harness::new().await;
        add_points(&h.state, "home", 5).await.unwrap();

        let team = |name: &str, points| TeamEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            points,
            fouls: 2,
            updated_at: h.clock.now(),
        };
        let (home, away) = (team("Toros", 40), team("Halcones", 38));
        h.store.insert_team(home.clone()).await;
        h.store.insert_team(away.clone()).await;
        let scheduled = MatchEntity {
            id: Uuid::new_v4(),
            home_team_id: home.id,
            away_team_id: away.id,
            scheduled_at: h.clock.now(),
        };
        h.store.insert_match(scheduled.clone()).await;

        let s = load_match(&h.state, scheduled.id).await.unwrap();
        assert_eq!(s.home.id, home.id);
        assert_eq!(s.away.name, "Halcones");
        assert_eq!((s.home.points, s.away.fouls), (0, 0));
        assert_eq!(s.period, 1);
    }

    #[tokio::test]
    async fn load_match_reports_missing_records() {
        let h = Harness::new().await;
        let before = h.live().await;

        let err = load_match(&h.state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let scheduled = MatchEntity {
            id: Uuid::new_v4(),
            home_team_id: Uuid::new_v4(),
            away_team_id: before.away.id,
            scheduled_at: h.clock.now(),
        };
        h.store.insert_match(scheduled.clone()).await;
        let err = load_match(&h.state, scheduled.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert_eq!(h.live().await, before);
    }

    #[tokio::test]
    async fn mutations_fail_fast_while_degraded() {
        let h = Harness::new().await;
        h.state.update_degraded(true);

        let err = add_points(&h.state, "home", 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
        assert_eq!(snapshot(&h.state).await.home.points, 0);
    }

    #[tokio::test]
    async fn history_is_listed_newest_first() {
        let h = Harness::new().await;
        close_match(&h.state, Some(CloseStatus::Cancelled), Some("lluvia".into()))
            .await
            .unwrap();
        h.wait(60);
        close_match(&h.state, None, Some("fin".into())).await.unwrap();

        let items = list_history(&h.state).await.unwrap();
        let reasons: Vec<_> = items.iter().map(|i| i.reason.as_deref()).collect();
        assert_eq!(reasons, [Some("fin"), Some("lluvia")]);
        assert_eq!(items[1].status, "Cancelado");
    }

    #[tokio::test]
    async fn bootstrap_reloads_the_persisted_scoreboard() {
        let store = MemoryScoreboardStore::new();
        let clock = ManualClock::default();
        let config = AppConfig {
            reset_on_startup: false,
            ..AppConfig::default()
        };

        let mut first = bootstrap(&store, &config, clock.now()).await.unwrap();
        first.add_points(Side::Home, 12);
        first.start_clock(clock.now());
        ScoreboardStore::commit(&store, unit_for(&first, clock.now(), None))
            .await
            .unwrap();

        let second = bootstrap(&store, &config, clock.now()).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.home.points, 12);
        assert!(!second.is_running());
    }

    #[tokio::test]
    async fn bootstrap_resets_on_startup_by_default() {
        let store = MemoryScoreboardStore::new();
        let clock = ManualClock::default();
        let config = AppConfig::default();
        let mut first = bootstrap(&store, &config, clock.now()).await.unwrap();
        first.add_points(Side::Away, 3);
        first.advance_quarter(clock.now());
        ScoreboardStore::commit(&store, unit_for(&first, clock.now(), None))
            .await
            .unwrap();

        let board = bootstrap(&store, &config, clock.now()).await.unwrap();
        assert_eq!(board.id, first.id);
        assert_eq!(board.away.points, 0);
        assert_eq!(board.period, 1);
        let row = store.load_scoreboard().await.unwrap().unwrap();
        let away = store.find_team(row.away_team_id).await.unwrap().unwrap();
        assert_eq!(away.points, 0);
    }

    #[tokio::test]
    async fn bootstrap_overwrites_a_row_with_missing_teams() {
        let store = MemoryScoreboardStore::new();
        let clock = ManualClock::default();
        let config = AppConfig {
            reset_on_startup: false,
            ..AppConfig::default()
        };
        let damaged = Scoreboard::new(
            TeamSlot::new("Gone A"),
            TeamSlot::new("Gone B"),
            config.period_duration_secs,
            config.overtime_duration_secs,
        );
        ScoreboardStore::commit(
            &store,
            UnitOfWork::new().with_scoreboard(damaged.to_entity(clock.now())),
        )
        .await
        .unwrap();

        let board = bootstrap(&store, &config, clock.now()).await.unwrap();
        assert_eq!(board.id, damaged.id);
        assert_eq!(board.home.name, config.home_team_name);

        let row = store.load_scoreboard().await.unwrap().unwrap();
        assert_eq!(row.id, damaged.id);
        assert_eq!(row.home_team_id, board.home.id);
        assert!(store.find_team(row.home_team_id).await.unwrap().is_some());

        let again = bootstrap(&store, &config, clock.now()).await.unwrap();
        assert_eq!(again.id, damaged.id);
        assert_eq!(again.home.id, board.home.id);
        assert_eq!(again.away.id, board.away.id);
    }

    #[tokio::test]
    async fn tick_broadcasts_only_while_running() {
        let h = Harness::new().await;
        let mut events = h.state.public_sse().subscribe();
        assert!(!tick(&h.state).await);
        assert!(events.try_recv().is_err());

        start_clock(&h.state).await.unwrap();
        let _ = events.try_recv();
        h.wait(1);
        assert!(tick(&h.state).await);
        let event = events.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("scoreboard"));
    }
}
