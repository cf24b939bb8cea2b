use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Courtside Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::scoreboard::get_scoreboard,
        crate::routes::scoreboard::get_clock,
        crate::routes::scoreboard::add_points,
        crate::routes::scoreboard::subtract_points,
        crate::routes::scoreboard::register_foul,
        crate::routes::scoreboard::start_clock,
        crate::routes::scoreboard::resume_clock,
        crate::routes::scoreboard::pause_clock,
        crate::routes::scoreboard::set_clock,
        crate::routes::scoreboard::reset_clock,
        crate::routes::scoreboard::advance_quarter,
        crate::routes::scoreboard::advance_or_close,
        crate::routes::scoreboard::rename_teams,
        crate::routes::scoreboard::rename_creating_new_roster,
        crate::routes::scoreboard::new_match,
        crate::routes::scoreboard::reset_to_zero,
        crate::routes::scoreboard::close_match,
        crate::routes::scoreboard::load_match,
        crate::routes::scoreboard::list_history,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::scoreboard::ScoreboardSnapshot,
            crate::dto::scoreboard::TeamScore,
            crate::dto::scoreboard::ClockStatusResponse,
            crate::dto::scoreboard::ClockStateDto,
            crate::dto::scoreboard::PointsRequest,
            crate::dto::scoreboard::FoulRequest,
            crate::dto::scoreboard::SetClockRequest,
            crate::dto::scoreboard::RenameTeamsRequest,
            crate::dto::scoreboard::CloseMatchRequest,
            crate::dto::scoreboard::CloseStatusDto,
            crate::dto::history::MatchHistoryItem,
            crate::dto::history::HistoryTeam,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "scoreboard", description = "Live scoreboard, clock and match lifecycle"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scoreboard_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/scoreboard",
            "/scoreboard/points/add",
            "/scoreboard/quarter/next",
            "/scoreboard/match/close",
            "/scoreboard/match/{id}/load",
            "/scoreboard/history",
            "/sse/public",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
