use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::format_clock,
    state::scoreboard::{ClockState, CloseStatus, Snapshot, TeamSlot},
};

/// Longest accepted team display name.
const MAX_NAME_LEN: u64 = 64;
/// Longest accepted close reason.
const MAX_REASON_LEN: u64 = 256;
/// Upper bound for any clock value set over HTTP (24h).
const MAX_CLOCK_SECS: i64 = 86_400;

/// Live tallies of one team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamScore {
    /// Team record identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Points in the current match.
    pub points: u32,
    /// Fouls in the current period.
    pub fouls: u32,
}

impl From<TeamSlot> for TeamScore {
    fn from(value: TeamSlot) -> Self {
        Self {
            id: value.id,
            name: value.name,
            points: value.points,
            fouls: value.fouls,
        }
    }
}

/// Clock status as exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClockStateDto {
    /// Full period length, not running.
    Stopped,
    /// Counting down.
    Running,
    /// Stopped part way through a period.
    Paused,
}

impl From<ClockState> for ClockStateDto {
    fn from(value: ClockState) -> Self {
        match value {
            ClockState::Stopped => ClockStateDto::Stopped,
            ClockState::Running => ClockStateDto::Running,
            ClockState::Paused => ClockStateDto::Paused,
        }
    }
}

/// Full view of the scoreboard returned by every scoreboard operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreboardSnapshot {
    /// Scoreboard identifier.
    pub id: Uuid,
    /// Home team.
    pub home: TeamScore,
    /// Away team.
    pub away: TeamScore,
    /// Current regulation period, 1 to 4.
    pub period: u32,
    /// Whether an overtime period is being played.
    pub in_overtime: bool,
    /// Overtime periods entered so far.
    pub overtime_number: u32,
    /// Remaining time at the instant the snapshot was taken.
    pub remaining_seconds: u32,
    /// Remaining time as `MM:SS`.
    pub clock_display: String,
    /// Whether the clock is counting down.
    pub clock_running: bool,
    /// Stopped, running or paused.
    pub clock_state: ClockStateDto,
    /// Configured regulation period length.
    pub period_duration_secs: u32,
    /// Configured overtime period length.
    pub overtime_duration_secs: u32,
}

impl From<Snapshot> for ScoreboardSnapshot {
    fn from(value: Snapshot) -> Self {
        Self {
            id: value.id,
            home: value.home.into(),
            away: value.away.into(),
            period: value.period,
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number,
            remaining_seconds: value.remaining_seconds,
            clock_display: format_clock(value.remaining_seconds),
            clock_running: value.clock_running,
            clock_state: value.clock_state.into(),
            period_duration_secs: value.period_duration_secs,
            overtime_duration_secs: value.overtime_duration_secs,
        }
    }
}

/// Compact clock view for displays that only render the timer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClockStatusResponse {
    /// Remaining time in seconds.
    pub remaining_seconds: u32,
    /// Remaining time as `MM:SS`.
    pub clock_display: String,
    /// Whether the clock is counting down.
    pub clock_running: bool,
    /// Stopped, running or paused.
    pub clock_state: ClockStateDto,
    /// Current regulation period.
    pub period: u32,
    /// Whether an overtime period is being played.
    pub in_overtime: bool,
    /// Overtime periods entered so far.
    pub overtime_number: u32,
}

impl From<Snapshot> for ClockStatusResponse {
    fn from(value: Snapshot) -> Self {
        Self {
            remaining_seconds: value.remaining_seconds,
            clock_display: format_clock(value.remaining_seconds),
            clock_running: value.clock_running,
            clock_state: value.clock_state.into(),
            period: value.period,
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number,
        }
    }
}

/// Points to add to or subtract from one side.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PointsRequest {
    /// `home`/`local` or `away`/`visitante`.
    #[validate(length(min = 1, max = 16))]
    pub side: String,
    /// Points to apply.
    #[validate(range(min = 0, max = 100))]
    pub amount: i32,
}

/// Side charged with a foul.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FoulRequest {
    /// `home`/`local` or `away`/`visitante`.
    #[validate(length(min = 1, max = 16))]
    pub side: String,
}

/// New remaining time for the current period.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetClockRequest {
    /// Remaining seconds to show.
    #[validate(range(min = 0, max = MAX_CLOCK_SECS))]
    pub seconds: i64,
}

/// Optional period length for a clock reset.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ResetClockQuery {
    /// New period length; the configured length when omitted.
    #[validate(range(min = 0, max = MAX_CLOCK_SECS))]
    pub seconds: Option<i64>,
}

/// Names to apply; omitted or blank names leave that side untouched.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct RenameTeamsRequest {
    /// New home team name.
    #[serde(default)]
    #[validate(length(max = MAX_NAME_LEN))]
    pub home: Option<String>,
    /// New away team name.
    #[serde(default)]
    #[validate(length(max = MAX_NAME_LEN))]
    pub away: Option<String>,
}

/// Closing status accepted when a match is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CloseStatusDto {
    /// Played to completion.
    Finished,
    /// Interrupted.
    Suspended,
    /// Called off.
    Cancelled,
    /// Closed at the end of regulation.
    AutoFinished,
}

impl From<CloseStatusDto> for CloseStatus {
    fn from(value: CloseStatusDto) -> Self {
        match value {
            CloseStatusDto::Finished => CloseStatus::Finished,
            CloseStatusDto::Suspended => CloseStatus::Suspended,
            CloseStatusDto::Cancelled => CloseStatus::Cancelled,
            CloseStatusDto::AutoFinished => CloseStatus::AutoFinished,
        }
    }
}

/// Close the current match into history.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CloseMatchRequest {
    /// Defaults to `finished`.
    #[serde(default)]
    pub status: Option<CloseStatusDto>,
    /// Free-text reason stored with the record.
    #[serde(default)]
    #[validate(length(max = MAX_REASON_LEN))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_status_uses_snake_case() {
        let request: CloseMatchRequest =
            serde_json::from_str(r#"{"status": "auto_finished", "reason": "x"}"#).unwrap();
        assert_eq!(request.status, Some(CloseStatusDto::AutoFinished));
    }

    #[test]
    fn out_of_range_points_are_rejected() {
        let request = PointsRequest {
            side: "home".into(),
            amount: 101,
        };
        assert!(request.validate().is_err());

        let request = PointsRequest {
            side: "home".into(),
            amount: 3,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn long_names_are_rejected() {
        let request = RenameTeamsRequest {
            home: Some("x".repeat(65)),
            away: None,
        };
        assert!(request.validate().is_err());
    }
}
