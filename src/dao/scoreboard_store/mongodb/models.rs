use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{MatchEntity, MatchHistoryEntity, ScoreboardEntity, TeamEntity};

/// Collection holding the single live scoreboard row.
pub const SCOREBOARD_COLLECTION_NAME: &str = "scoreboards";
/// Collection holding team tallies.
pub const TEAM_COLLECTION_NAME: &str = "teams";
/// Collection of scheduled matches, written by other services.
pub const MATCH_COLLECTION_NAME: &str = "matches";
/// Append-only collection of closed matches.
pub const HISTORY_COLLECTION_NAME: &str = "match_history";

/// Team row as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    points: i64,
    fouls: i64,
    updated_at: DateTime,
}

/// Scoreboard row as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScoreboardDocument {
    #[serde(rename = "_id")]
    id: String,
    home_team_id: String,
    away_team_id: String,
    period: i64,
    remaining_seconds: i64,
    in_overtime: bool,
    overtime_number: i64,
    #[serde(default)]
    clock_running: bool,
    period_duration_secs: i64,
    overtime_duration_secs: i64,
    updated_at: DateTime,
}

/// Scheduled match as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    home_team_id: String,
    away_team_id: String,
    scheduled_at: DateTime,
}

/// Closed match as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoHistoryDocument {
    #[serde(rename = "_id")]
    id: String,
    closed_at: DateTime,
    home_team_id: String,
    home_name: String,
    home_points: i64,
    home_fouls: i64,
    away_team_id: String,
    away_name: String,
    away_points: i64,
    away_fouls: i64,
    period: i64,
    in_overtime: bool,
    overtime_number: i64,
    period_duration_secs: i64,
    remaining_seconds: i64,
    status: String,
    reason: Option<String>,
}

/// Filter selecting a document by its string `_id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn parse_id(collection: &'static str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|err| MongoDaoError::CorruptDocument {
        collection,
        id: value.to_owned(),
        reason: err.to_string(),
    })
}

fn counter(collection: &'static str, id: &str, field: &str, value: i64) -> MongoResult<u32> {
    u32::try_from(value).map_err(|_| MongoDaoError::CorruptDocument {
        collection,
        id: id.to_owned(),
        reason: format!("`{field}` out of range: {value}"),
    })
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            points: value.points.into(),
            fouls: value.fouls.into(),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> MongoResult<Self> {
        const C: &str = TEAM_COLLECTION_NAME;
        Ok(Self {
            id: parse_id(C, &value.id)?,
            points: counter(C, &value.id, "points", value.points)?,
            fouls: counter(C, &value.id, "fouls", value.fouls)?,
            name: value.name,
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

impl From<ScoreboardEntity> for MongoScoreboardDocument {
    fn from(value: ScoreboardEntity) -> Self {
        Self {
            id: value.id.to_string(),
            home_team_id: value.home_team_id.to_string(),
            away_team_id: value.away_team_id.to_string(),
            period: value.period.into(),
            remaining_seconds: value.remaining_seconds.into(),
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number.into(),
            clock_running: value.clock_running,
            period_duration_secs: value.period_duration_secs.into(),
            overtime_duration_secs: value.overtime_duration_secs.into(),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoScoreboardDocument> for ScoreboardEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoScoreboardDocument) -> MongoResult<Self> {
        const C: &str = SCOREBOARD_COLLECTION_NAME;
        let id = &value.id;
        Ok(Self {
            id: parse_id(C, id)?,
            home_team_id: parse_id(C, &value.home_team_id)?,
            away_team_id: parse_id(C, &value.away_team_id)?,
            period: counter(C, id, "period", value.period)?,
            remaining_seconds: counter(C, id, "remaining_seconds", value.remaining_seconds)?,
            in_overtime: value.in_overtime,
            overtime_number: counter(C, id, "overtime_number", value.overtime_number)?,
            clock_running: value.clock_running,
            period_duration_secs: counter(C, id, "period_duration_secs", value.period_duration_secs)?,
            overtime_duration_secs: counter(
                C,
                id,
                "overtime_duration_secs",
                value.overtime_duration_secs,
            )?,
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> MongoResult<Self> {
        const C: &str = MATCH_COLLECTION_NAME;
        Ok(Self {
            id: parse_id(C, &value.id)?,
            home_team_id: parse_id(C, &value.home_team_id)?,
            away_team_id: parse_id(C, &value.away_team_id)?,
            scheduled_at: value.scheduled_at.to_system_time(),
        })
    }
}

impl From<MatchHistoryEntity> for MongoHistoryDocument {
    fn from(value: MatchHistoryEntity) -> Self {
        Self {
            id: value.id.to_string(),
            closed_at: DateTime::from_system_time(value.closed_at),
            home_team_id: value.home_team_id.to_string(),
            home_name: value.home_name,
            home_points: value.home_points.into(),
            home_fouls: value.home_fouls.into(),
            away_team_id: value.away_team_id.to_string(),
            away_name: value.away_name,
            away_points: value.away_points.into(),
            away_fouls: value.away_fouls.into(),
            period: value.period.into(),
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number.into(),
            period_duration_secs: value.period_duration_secs.into(),
            remaining_seconds: value.remaining_seconds.into(),
            status: value.status,
            reason: value.reason,
        }
    }
}

impl TryFrom<MongoHistoryDocument> for MatchHistoryEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoHistoryDocument) -> MongoResult<Self> {
        const C: &str = HISTORY_COLLECTION_NAME;
        let id = &value.id;
        Ok(Self {
            id: parse_id(C, id)?,
            closed_at: value.closed_at.to_system_time(),
            home_team_id: parse_id(C, &value.home_team_id)?,
            home_points: counter(C, id, "home_points", value.home_points)?,
            home_fouls: counter(C, id, "home_fouls", value.home_fouls)?,
            away_team_id: parse_id(C, &value.away_team_id)?,
            away_points: counter(C, id, "away_points", value.away_points)?,
            away_fouls: counter(C, id, "away_fouls", value.away_fouls)?,
            period: counter(C, id, "period", value.period)?,
            in_overtime: value.in_overtime,
            overtime_number: counter(C, id, "overtime_number", value.overtime_number)?,
            period_duration_secs: counter(C, id, "period_duration_secs", value.period_duration_secs)?,
            remaining_seconds: counter(C, id, "remaining_seconds", value.remaining_seconds)?,
            home_name: value.home_name,
            away_name: value.away_name,
            status: value.status,
            reason: value.reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn history_document_keeps_every_field() {
        let entity = MatchHistoryEntity {
            id: Uuid::new_v4(),
            closed_at: SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123),
            home_team_id: Uuid::new_v4(),
            home_name: "Toros".into(),
            home_points: 81,
            home_fouls: 3,
            away_team_id: Uuid::new_v4(),
            away_name: "Halcones".into(),
            away_points: 79,
            away_fouls: 5,
            period: 4,
            in_overtime: true,
            overtime_number: 1,
            period_duration_secs: 600,
            remaining_seconds: 12,
            status: "Terminado".into(),
            reason: Some("fin".into()),
        };

        let document: MongoHistoryDocument = entity.clone().into();
        let back = MatchHistoryEntity::try_from(document).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn malformed_ids_are_reported() {
        let document = MongoMatchDocument {
            id: "not-a-uuid".into(),
            home_team_id: Uuid::new_v4().to_string(),
            away_team_id: Uuid::new_v4().to_string(),
            scheduled_at: DateTime::now(),
        };

        let err = MatchEntity::try_from(document).unwrap_err();
        assert!(matches!(
            err,
            MongoDaoError::CorruptDocument {
                collection: MATCH_COLLECTION_NAME,
                ..
            }
        ));
    }

    #[test]
    fn negative_counters_are_rejected() {
        let document = MongoTeamDocument {
            id: Uuid::new_v4().to_string(),
            name: "Toros".into(),
            points: -1,
            fouls: 0,
            updated_at: DateTime::now(),
        };

        assert!(TeamEntity::try_from(document).is_err());
    }
}
