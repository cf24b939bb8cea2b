use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        history::MatchHistoryItem,
        scoreboard::{
            ClockStatusResponse, CloseMatchRequest, FoulRequest, PointsRequest,
            RenameTeamsRequest, ResetClockQuery, ScoreboardSnapshot, SetClockRequest,
        },
    },
    error::AppError,
    services::scoreboard_service,
    state::SharedState,
};

/// Live scoreboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/scoreboard", get(get_scoreboard))
        .route("/scoreboard/clock", get(get_clock))
        .route("/scoreboard/points/add", post(add_points))
        .route("/scoreboard/points/subtract", post(subtract_points))
        .route("/scoreboard/fouls", post(register_foul))
        .route("/scoreboard/clock/start", post(start_clock))
        .route("/scoreboard/clock/resume", post(resume_clock))
        .route("/scoreboard/clock/pause", post(pause_clock))
        .route("/scoreboard/clock/set", post(set_clock))
        .route("/scoreboard/clock/reset", post(reset_clock))
        .route("/scoreboard/quarter/advance", post(advance_quarter))
        .route("/scoreboard/quarter/next", post(advance_or_close))
        .route("/scoreboard/teams/rename", post(rename_teams))
        .route("/scoreboard/teams/rename-new", post(rename_creating_new_roster))
        .route("/scoreboard/new", post(new_match))
        .route("/scoreboard/reset", post(reset_to_zero))
        .route("/scoreboard/match/close", post(close_match))
        .route("/scoreboard/match/{id}/load", post(load_match))
        .route("/scoreboard/history", get(list_history))
}

/// Current scoreboard. Stops the clock if it ran out since the last change.
#[utoipa::path(
    get,
    path = "/scoreboard",
    tag = "scoreboard",
    responses((status = 200, description = "Current scoreboard", body = ScoreboardSnapshot))
)]
pub async fn get_scoreboard(State(state): State<SharedState>) -> Json<ScoreboardSnapshot> {
    Json(scoreboard_service::snapshot(&state).await)
}

/// Clock-only view of the scoreboard.
#[utoipa::path(
    get,
    path = "/scoreboard/clock",
    tag = "scoreboard",
    responses((status = 200, description = "Clock status", body = ClockStatusResponse))
)]
pub async fn get_clock(State(state): State<SharedState>) -> Json<ClockStatusResponse> {
    Json(scoreboard_service::clock_status(&state).await)
}

/// Add points to one side.
#[utoipa::path(
    post,
    path = "/scoreboard/points/add",
    tag = "scoreboard",
    request_body = PointsRequest,
    responses(
        (status = 200, description = "Points added", body = ScoreboardSnapshot),
        (status = 400, description = "Unknown side or amount out of range"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn add_points(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<PointsRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot = scoreboard_service::add_points(&state, &payload.side, payload.amount).await?;
    Ok(Json(snapshot))
}

/// Take points away from one side.
#[utoipa::path(
    post,
    path = "/scoreboard/points/subtract",
    tag = "scoreboard",
    request_body = PointsRequest,
    responses(
        (status = 200, description = "Points subtracted, never below zero", body = ScoreboardSnapshot),
        (status = 400, description = "Unknown side or amount out of range"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn subtract_points(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<PointsRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot =
        scoreboard_service::subtract_points(&state, &payload.side, payload.amount).await?;
    Ok(Json(snapshot))
}

/// Charge a foul to one side.
#[utoipa::path(
    post,
    path = "/scoreboard/fouls",
    tag = "scoreboard",
    request_body = FoulRequest,
    responses(
        (status = 200, description = "Foul registered", body = ScoreboardSnapshot),
        (status = 400, description = "Unknown side"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn register_foul(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<FoulRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::register_foul(&state, &payload.side).await?))
}

/// Start the clock.
#[utoipa::path(
    post,
    path = "/scoreboard/clock/start",
    tag = "scoreboard",
    responses((status = 200, description = "Clock running", body = ScoreboardSnapshot))
)]
pub async fn start_clock(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::start_clock(&state).await?))
}

/// Same as starting the clock; kept for scoreboard consoles with a separate resume button.
#[utoipa::path(
    post,
    path = "/scoreboard/clock/resume",
    tag = "scoreboard",
    responses((status = 200, description = "Clock running", body = ScoreboardSnapshot))
)]
pub async fn resume_clock(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::start_clock(&state).await?))
}

/// Pause the clock, keeping the remaining time.
#[utoipa::path(
    post,
    path = "/scoreboard/clock/pause",
    tag = "scoreboard",
    responses((status = 200, description = "Clock paused", body = ScoreboardSnapshot))
)]
pub async fn pause_clock(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::pause_clock(&state).await?))
}

/// Overwrite the remaining time.
#[utoipa::path(
    post,
    path = "/scoreboard/clock/set",
    tag = "scoreboard",
    request_body = SetClockRequest,
    responses(
        (status = 200, description = "Remaining time updated", body = ScoreboardSnapshot),
        (status = 400, description = "Seconds out of range")
    )
)]
pub async fn set_clock(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SetClockRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot = scoreboard_service::set_remaining_seconds(&state, payload.seconds).await?;
    Ok(Json(snapshot))
}

/// Set a new period length and stop the clock at its start.
#[utoipa::path(
    post,
    path = "/scoreboard/clock/reset",
    tag = "scoreboard",
    params(ResetClockQuery),
    responses((status = 200, description = "Clock reset", body = ScoreboardSnapshot))
)]
pub async fn reset_clock(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<ResetClockQuery>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::reset_clock(&state, query.seconds).await?))
}

/// Next period, or next overtime once regulation is over.
#[utoipa::path(
    post,
    path = "/scoreboard/quarter/advance",
    tag = "scoreboard",
    responses((status = 200, description = "Period advanced", body = ScoreboardSnapshot))
)]
pub async fn advance_quarter(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::advance_quarter(&state).await?))
}

/// Next period; closes the match instead when regulation is over and no overtime started.
#[utoipa::path(
    post,
    path = "/scoreboard/quarter/next",
    tag = "scoreboard",
    responses((status = 200, description = "Period advanced or match closed", body = ScoreboardSnapshot))
)]
pub async fn advance_or_close(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::advance_or_close(&state).await?))
}

/// Rename the teams in place.
#[utoipa::path(
    post,
    path = "/scoreboard/teams/rename",
    tag = "scoreboard",
    request_body = RenameTeamsRequest,
    responses((status = 200, description = "Teams renamed", body = ScoreboardSnapshot))
)]
pub async fn rename_teams(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RenameTeamsRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot = scoreboard_service::rename_teams(&state, payload.home, payload.away).await?;
    Ok(Json(snapshot))
}

/// Rename by creating new team records, keeping the previous ones as they were.
#[utoipa::path(
    post,
    path = "/scoreboard/teams/rename-new",
    tag = "scoreboard",
    request_body = RenameTeamsRequest,
    responses((status = 200, description = "Teams replaced", body = ScoreboardSnapshot))
)]
pub async fn rename_creating_new_roster(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RenameTeamsRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot =
        scoreboard_service::rename_creating_new_roster(&state, payload.home, payload.away).await?;
    Ok(Json(snapshot))
}

/// Start a new match with the same teams.
#[utoipa::path(
    post,
    path = "/scoreboard/new",
    tag = "scoreboard",
    responses((status = 200, description = "New match started", body = ScoreboardSnapshot))
)]
pub async fn new_match(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::new_match(&state).await?))
}

/// Hard reset: scores, fouls, period and clock back to the start.
#[utoipa::path(
    post,
    path = "/scoreboard/reset",
    tag = "scoreboard",
    responses((status = 200, description = "Scoreboard reset", body = ScoreboardSnapshot))
)]
pub async fn reset_to_zero(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::reset_to_zero(&state).await?))
}

/// Close the current match into history. Each call writes a new record.
#[utoipa::path(
    post,
    path = "/scoreboard/match/close",
    tag = "scoreboard",
    request_body = CloseMatchRequest,
    responses(
        (status = 200, description = "Match closed", body = ScoreboardSnapshot),
        (status = 503, description = "History could not be written; nothing changed")
    )
)]
pub async fn close_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CloseMatchRequest>>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    let snapshot = scoreboard_service::close_match(
        &state,
        payload.status.map(Into::into),
        payload.reason,
    )
    .await?;
    Ok(Json(snapshot))
}

/// Put the teams of a scheduled match on the scoreboard.
#[utoipa::path(
    post,
    path = "/scoreboard/match/{id}/load",
    tag = "scoreboard",
    params(("id" = String, Path, description = "Identifier of the scheduled match")),
    responses(
        (status = 200, description = "Match loaded", body = ScoreboardSnapshot),
        (status = 404, description = "Match or one of its teams not found")
    )
)]
pub async fn load_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::load_match(&state, id).await?))
}

/// Closed matches, newest first.
#[utoipa::path(
    get,
    path = "/scoreboard/history",
    tag = "scoreboard",
    responses((status = 200, description = "Closed matches, newest first", body = [MatchHistoryItem]))
)]
pub async fn list_history(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchHistoryItem>>, AppError> {
    Ok(Json(scoreboard_service::list_history(&state).await?))
}
