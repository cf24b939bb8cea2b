use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Team record owned by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name of the team.
    pub name: String,
    /// Points at the last save.
    pub points: u32,
    /// Fouls at the last save.
    pub fouls: u32,
    /// Last time this team was updated.
    pub updated_at: SystemTime,
}

/// Singleton row mirroring the live scoreboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreboardEntity {
    /// Primary key of the scoreboard row.
    pub id: Uuid,
    /// Team currently shown as home.
    pub home_team_id: Uuid,
    /// Team currently shown as away.
    pub away_team_id: Uuid,
    /// Current regulation period.
    pub period: u32,
    /// Remaining seconds frozen at the last save.
    pub remaining_seconds: u32,
    /// Whether overtime has started.
    pub in_overtime: bool,
    /// Overtime periods entered so far.
    pub overtime_number: u32,
    /// Whether the clock was running at the last save (informational for displays).
    pub clock_running: bool,
    /// Configured regulation period length.
    pub period_duration_secs: u32,
    /// Configured overtime period length.
    pub overtime_duration_secs: u32,
    /// Last time the row was written.
    pub updated_at: SystemTime,
}

/// Scheduled match between two stored teams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Team playing at home.
    pub home_team_id: Uuid,
    /// Visiting team.
    pub away_team_id: Uuid,
    /// Scheduled tip-off.
    pub scheduled_at: SystemTime,
}

/// Append-only snapshot written when a match is closed.
///
/// Team names are copied so later renames do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchHistoryEntity {
    /// History record identifier.
    pub id: Uuid,
    /// Instant the match was closed.
    pub closed_at: SystemTime,
    /// Home team record.
    pub home_team_id: Uuid,
    /// Home team name at the close.
    pub home_name: String,
    /// Home final points.
    pub home_points: u32,
    /// Home fouls in the last period.
    pub home_fouls: u32,
    /// Away team record.
    pub away_team_id: Uuid,
    /// Away team name at the close.
    pub away_name: String,
    /// Away final points.
    pub away_points: u32,
    /// Away fouls in the last period.
    pub away_fouls: u32,
    /// Period being played.
    pub period: u32,
    /// Whether the match was in overtime.
    pub in_overtime: bool,
    /// Overtime periods played.
    pub overtime_number: u32,
    /// Regulation period length configured when the match was closed.
    pub period_duration_secs: u32,
    /// Time left on the clock when the match was closed.
    pub remaining_seconds: u32,
    /// Closing status label (`Terminado`, `Suspendido`, ...).
    pub status: String,
    /// Free-text reason given by the operator.
    pub reason: Option<String>,
}

/// Group of writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOfWork {
    /// Scoreboard row to upsert.
    pub scoreboard: Option<ScoreboardEntity>,
    /// Team records to upsert.
    pub teams: Vec<TeamEntity>,
    /// History records to append.
    pub history: Vec<MatchHistoryEntity>,
}

impl UnitOfWork {
    /// Start an empty unit of work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the scoreboard row.
    pub fn with_scoreboard(mut self, scoreboard: ScoreboardEntity) -> Self {
        self.scoreboard = Some(scoreboard);
        self
    }

    /// Upsert the given teams.
    pub fn with_teams(mut self, teams: impl IntoIterator<Item = TeamEntity>) -> Self {
        self.teams.extend(teams);
        self
    }

    /// Append a history record.
    pub fn with_history(mut self, record: MatchHistoryEntity) -> Self {
        self.history.push(record);
        self
    }

    /// Whether committing this unit would write nothing.
    pub fn is_empty(&self) -> bool {
        self.scoreboard.is_none() && self.teams.is_empty() && self.history.is_empty()
    }
}
