use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::MatchHistoryEntity, dto::format_system_time};

/// One team's line in a closed match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryTeam {
    /// Team record identifier.
    pub team_id: Uuid,
    /// Name at the time of the close.
    pub name: String,
    /// Final points.
    pub points: u32,
    /// Fouls in the last period played.
    pub fouls: u32,
}

/// Record of a closed match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchHistoryItem {
    /// History record identifier.
    pub id: Uuid,
    /// RFC 3339 timestamp of the close.
    pub closed_at: String,
    /// Home team line.
    pub home: HistoryTeam,
    /// Away team line.
    pub away: HistoryTeam,
    /// Period being played at the close.
    pub period: u32,
    /// Whether the match was in overtime.
    pub in_overtime: bool,
    /// Overtime periods played.
    pub overtime_number: u32,
    /// Regulation period length in use.
    pub period_duration_secs: u32,
    /// Time left on the clock.
    pub remaining_seconds: u32,
    /// Display label of the closing status, e.g. `Terminado`.
    pub status: String,
    /// Operator-supplied reason.
    pub reason: Option<String>,
}

impl From<MatchHistoryEntity> for MatchHistoryItem {
    fn from(value: MatchHistoryEntity) -> Self {
        Self {
            id: value.id,
            closed_at: format_system_time(value.closed_at),
            home: HistoryTeam {
                team_id: value.home_team_id,
                name: value.home_name,
                points: value.home_points,
                fouls: value.home_fouls,
            },
            away: HistoryTeam {
                team_id: value.away_team_id,
                name: value.away_name,
                points: value.away_points,
                fouls: value.away_fouls,
            },
            period: value.period,
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number,
            period_duration_secs: value.period_duration_secs,
            remaining_seconds: value.remaining_seconds,
            status: value.status,
            reason: value.reason,
        }
    }
}
