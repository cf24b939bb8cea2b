//! Live scoreboard: team tallies, periods, overtime and the game clock.
//!
//! Every transition is a plain method taking the current instant explicitly, so
//! callers can apply it to a draft copy, persist the draft and only then swap it
//! in as the authoritative state.

use std::{str::FromStr, time::SystemTime};

use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::{MatchHistoryEntity, ScoreboardEntity, TeamEntity};

/// Number of regulation periods in a match.
pub const REGULATION_PERIODS: u32 = 4;
/// Default regulation period length (10:00).
pub const DEFAULT_PERIOD_SECS: u32 = 600;
/// Default overtime period length (5:00).
pub const DEFAULT_OVERTIME_SECS: u32 = 300;
/// Reason recorded when a match is closed by running out of regulation time.
pub const AUTO_CLOSE_REASON: &str = "Tiempo finalizado";

/// Which of the two teams on the scoreboard an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Home team ("local").
    Home,
    /// Away team ("visitante").
    Away,
}

/// Raised when a side token is neither home nor away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team side `{0}`: expected `home` or `away`")]
pub struct InvalidSide(pub String);

impl FromStr for Side {
    type Err = InvalidSide;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "home" | "local" => Ok(Side::Home),
            "away" | "visitante" => Ok(Side::Away),
            _ => Err(InvalidSide(value.to_owned())),
        }
    }
}

/// Cached copy of a team's live tallies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSlot {
    /// Identifier of the persisted team record.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Points scored in the current match.
    pub points: u32,
    /// Fouls committed in the current period.
    pub fouls: u32,
}

impl TeamSlot {
    /// Build a fresh team with no points or fouls.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: 0,
            fouls: 0,
        }
    }

    fn clear(&mut self) {
        self.points = 0;
        self.fouls = 0;
    }
}

/// Observable status of the game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Clock is at the full duration of the current period and not running.
    Stopped,
    /// Clock is counting down.
    Running,
    /// Clock was stopped part way through a period.
    Paused,
}

/// Administrative outcome recorded when a match is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    /// Played to completion and closed by an operator.
    Finished,
    /// Interrupted, may be resumed later.
    Suspended,
    /// Called off.
    Cancelled,
    /// Closed automatically at the end of regulation.
    AutoFinished,
}

impl CloseStatus {
    /// Label stored in history records.
    pub fn label(self) -> &'static str {
        match self {
            CloseStatus::Finished => "Terminado",
            CloseStatus::Suspended => "Suspendido",
            CloseStatus::Cancelled => "Cancelado",
            CloseStatus::AutoFinished => "TerminadoAuto",
        }
    }
}

/// Transition taken by [`Scoreboard::advance_quarter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTransition {
    /// Moved to the given regulation period.
    Period(u32),
    /// Entered (or continued) overtime; carries the overtime number.
    Overtime(u32),
}

/// Immutable point-in-time copy of the scoreboard handed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Scoreboard identifier.
    pub id: Uuid,
    /// Home team tallies.
    pub home: TeamSlot,
    /// Away team tallies.
    pub away: TeamSlot,
    /// Current regulation period.
    pub period: u32,
    /// Whether overtime is being played.
    pub in_overtime: bool,
    /// Overtime periods entered so far.
    pub overtime_number: u32,
    /// Remaining time at the snapshot instant.
    pub remaining_seconds: u32,
    /// Whether the clock is counting down.
    pub clock_running: bool,
    /// Derived clock status.
    pub clock_state: ClockState,
    /// Regulation period length.
    pub period_duration_secs: u32,
    /// Overtime period length.
    pub overtime_duration_secs: u32,
}

/// Frozen record of a match at the moment it was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// History record identifier.
    pub id: Uuid,
    /// Instant of the close.
    pub closed_at: SystemTime,
    /// Home team as it stood.
    pub home: TeamSlot,
    /// Away team as it stood.
    pub away: TeamSlot,
    /// Period being played.
    pub period: u32,
    /// Whether the match was in overtime.
    pub in_overtime: bool,
    /// Overtime periods played.
    pub overtime_number: u32,
    /// Regulation period length in use.
    pub period_duration_secs: u32,
    /// Time left on the clock.
    pub remaining_seconds: u32,
    /// Why the match ended.
    pub status: CloseStatus,
    /// Operator-supplied reason.
    pub reason: Option<String>,
}

/// Authoritative live scoreboard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    /// Identifier of the persisted scoreboard row.
    pub id: Uuid,
    /// Home team.
    pub home: TeamSlot,
    /// Away team.
    pub away: TeamSlot,
    /// Current regulation period, starting at 1.
    pub period: u32,
    /// Whether overtime is being played.
    pub in_overtime: bool,
    /// Number of overtime periods entered so far.
    pub overtime_number: u32,
    /// Remaining seconds frozen at the last clock stop or adjustment.
    pub remaining_seconds: u32,
    /// Instant the clock last started counting; `Some` while running.
    pub running_since: Option<SystemTime>,
    /// Regulation period length, at least one second.
    pub period_duration_secs: u32,
    /// Overtime period length.
    pub overtime_duration_secs: u32,
}

impl Scoreboard {
    /// Build a scoreboard at the start of period 1 with a full clock.
    pub fn new(home: TeamSlot, away: TeamSlot, period_secs: u32, overtime_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            home,
            away,
            period: 1,
            in_overtime: false,
            overtime_number: 0,
            remaining_seconds: period_secs,
            running_since: None,
            period_duration_secs: period_secs,
            overtime_duration_secs: overtime_secs,
        }
    }

    /// Borrow the team on `side`.
    pub fn team(&self, side: Side) -> &TeamSlot {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut TeamSlot {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Whether the clock is counting down.
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Length of the period currently being played.
    pub fn current_duration(&self) -> u32 {
        if self.in_overtime {
            self.overtime_duration_secs
        } else {
            self.period_duration_secs
        }
    }

    /// Remaining seconds as seen at `now`, never below zero.
    pub fn remaining_at(&self, now: SystemTime) -> u32 {
        match self.running_since {
            Some(since) => {
                let elapsed = now
                    .duration_since(since)
                    .map(|elapsed| elapsed.as_secs())
                    .unwrap_or(0);
                let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
                self.remaining_seconds.saturating_sub(elapsed)
            }
            None => self.remaining_seconds,
        }
    }

    /// Stop a running clock that has reached zero. Returns whether anything changed.
    pub fn settle(&mut self, now: SystemTime) -> bool {
        if self.is_running() && self.remaining_at(now) == 0 {
            self.remaining_seconds = 0;
            self.running_since = None;
            true
        } else {
            false
        }
    }

    /// Status of the clock at `now`.
    pub fn clock_state(&self, now: SystemTime) -> ClockState {
        if self.is_running() && self.remaining_at(now) > 0 {
            ClockState::Running
        } else if self.remaining_at(now) == self.current_duration() {
            ClockState::Stopped
        } else {
            ClockState::Paused
        }
    }

    /// Copy the state as seen at `now` without changing it.
    pub fn snapshot(&self, now: SystemTime) -> Snapshot {
        let remaining_seconds = self.remaining_at(now);
        Snapshot {
            id: self.id,
            home: self.home.clone(),
            away: self.away.clone(),
            period: self.period,
            in_overtime: self.in_overtime,
            overtime_number: self.overtime_number,
            remaining_seconds,
            clock_running: self.is_running() && remaining_seconds > 0,
            clock_state: self.clock_state(now),
            period_duration_secs: self.period_duration_secs,
            overtime_duration_secs: self.overtime_duration_secs,
        }
    }

    /// Fold elapsed running time into the frozen remaining seconds and stop the clock.
    fn fold_clock(&mut self, now: SystemTime) {
        if self.is_running() {
            self.remaining_seconds = self.remaining_at(now);
            self.running_since = None;
        }
    }

    /// Add points to `side`; negative amounts contribute nothing.
    pub fn add_points(&mut self, side: Side, amount: i32) {
        let amount = u32::try_from(amount.max(0)).unwrap_or(0);
        let team = self.team_mut(side);
        team.points = team.points.saturating_add(amount);
    }

    /// Remove points from `side` without going below zero.
    pub fn subtract_points(&mut self, side: Side, amount: i32) {
        let amount = u32::try_from(amount.max(0)).unwrap_or(0);
        let team = self.team_mut(side);
        team.points = team.points.saturating_sub(amount);
    }

    /// Charge one foul to `side`.
    pub fn register_foul(&mut self, side: Side) {
        let team = self.team_mut(side);
        team.fouls = team.fouls.saturating_add(1);
    }

    /// Start the clock. Returns `false` when it was already running.
    pub fn start_clock(&mut self, now: SystemTime) -> bool {
        if self.is_running() {
            return false;
        }
        self.running_since = Some(now);
        true
    }

    /// Pause the clock. Returns `false` when it was not running.
    pub fn pause_clock(&mut self, now: SystemTime) -> bool {
        if !self.is_running() {
            return false;
        }
        self.fold_clock(now);
        true
    }

    /// Overwrite the remaining time; a running clock keeps running from `now`.
    pub fn set_remaining(&mut self, seconds: i64, now: SystemTime) {
        self.remaining_seconds = clamp_seconds(seconds);
        if self.is_running() {
            self.running_since = Some(now);
        }
    }

    /// Configure a new period length, stop the clock and leave overtime.
    ///
    /// The stored period length never drops below one second.
    pub fn reset_clock(&mut self, seconds: i64) {
        let seconds = clamp_seconds(seconds);
        self.period_duration_secs = seconds.max(1);
        self.running_since = None;
        self.in_overtime = false;
        self.overtime_number = 0;
        self.remaining_seconds = seconds;
    }

    /// Move to the next regulation period, or into overtime after the last one.
    ///
    /// Fouls are cleared for both teams on every transition.
    pub fn advance_quarter(&mut self, now: SystemTime) -> QuarterTransition {
        self.fold_clock(now);

        let transition = if self.period < REGULATION_PERIODS {
            self.period += 1;
            self.in_overtime = false;
            self.overtime_number = 0;
            self.remaining_seconds = self.period_duration_secs;
            QuarterTransition::Period(self.period)
        } else {
            self.in_overtime = true;
            self.overtime_number += 1;
            self.remaining_seconds = self.overtime_duration_secs;
            QuarterTransition::Overtime(self.overtime_number)
        };

        self.home.fouls = 0;
        self.away.fouls = 0;
        transition
    }

    /// Whether regulation is over and no overtime has been started.
    pub fn regulation_over(&self) -> bool {
        self.period >= REGULATION_PERIODS && !self.in_overtime
    }

    /// Rename the cached teams in place; blank names leave that side untouched.
    pub fn rename(&mut self, home: Option<&str>, away: Option<&str>) {
        if let Some(name) = non_blank(home) {
            self.home.name = name;
        }
        if let Some(name) = non_blank(away) {
            self.away.name = name;
        }
    }

    /// Point `side` at a different team record.
    pub fn replace_team(&mut self, side: Side, team: TeamSlot) {
        *self.team_mut(side) = team;
    }

    /// Stop the clock and start over from period 1 with empty tallies.
    pub fn new_match(&mut self) {
        self.running_since = None;
        self.period = 1;
        self.in_overtime = false;
        self.overtime_number = 0;
        self.home.clear();
        self.away.clear();
        self.remaining_seconds = self.period_duration_secs;
    }

    /// Settle the clock at `now`, then behave like [`Scoreboard::new_match`].
    pub fn reset_to_zero(&mut self, now: SystemTime) {
        self.fold_clock(now);
        self.new_match();
    }

    /// Install the teams of a scheduled match and start it from scratch.
    pub fn load_teams(&mut self, home: TeamSlot, away: TeamSlot) {
        self.home = home;
        self.away = away;
        self.new_match();
    }

    /// Stop the clock and capture the closing record.
    pub fn close(&mut self, now: SystemTime, status: CloseStatus, reason: Option<&str>) -> MatchRecord {
        self.fold_clock(now);
        MatchRecord {
            id: Uuid::new_v4(),
            closed_at: now,
            home: self.home.clone(),
            away: self.away.clone(),
            period: self.period,
            in_overtime: self.in_overtime,
            overtime_number: self.overtime_number,
            period_duration_secs: self.period_duration_secs,
            remaining_seconds: self.remaining_seconds,
            status,
            reason: non_blank(reason),
        }
    }

    /// Rebuild a scoreboard from its persisted row and team records.
    ///
    /// The running instant is never persisted, so a row saved while running comes
    /// back stopped.
    pub fn from_entities(row: ScoreboardEntity, home: TeamEntity, away: TeamEntity) -> Self {
        Self {
            id: row.id,
            home: home.into(),
            away: away.into(),
            period: row.period.max(1),
            in_overtime: row.in_overtime,
            overtime_number: row.overtime_number,
            remaining_seconds: row.remaining_seconds,
            running_since: None,
            period_duration_secs: row.period_duration_secs,
            overtime_duration_secs: row.overtime_duration_secs,
        }
    }

    /// Persisted row for this scoreboard.
    pub fn to_entity(&self, updated_at: SystemTime) -> ScoreboardEntity {
        ScoreboardEntity {
            id: self.id,
            home_team_id: self.home.id,
            away_team_id: self.away.id,
            period: self.period,
            remaining_seconds: self.remaining_seconds,
            in_overtime: self.in_overtime,
            overtime_number: self.overtime_number,
            clock_running: self.is_running(),
            period_duration_secs: self.period_duration_secs,
            overtime_duration_secs: self.overtime_duration_secs,
            updated_at,
        }
    }

    /// Persisted team records for both sides.
    pub fn team_entities(&self, updated_at: SystemTime) -> [TeamEntity; 2] {
        [
            team_entity(&self.home, updated_at),
            team_entity(&self.away, updated_at),
        ]
    }
}

fn team_entity(team: &TeamSlot, updated_at: SystemTime) -> TeamEntity {
    TeamEntity {
        id: team.id,
        name: team.name.clone(),
        points: team.points,
        fouls: team.fouls,
        updated_at,
    }
}

fn clamp_seconds(seconds: i64) -> u32 {
    u32::try_from(seconds.max(0)).unwrap_or(u32::MAX)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl From<TeamEntity> for TeamSlot {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            points: value.points,
            fouls: value.fouls,
        }
    }
}

impl From<MatchRecord> for MatchHistoryEntity {
    fn from(value: MatchRecord) -> Self {
        Self {
            id: value.id,
            closed_at: value.closed_at,
            home_team_id: value.home.id,
            home_name: value.home.name,
            home_points: value.home.points,
            home_fouls: value.home.fouls,
            away_team_id: value.away.id,
            away_name: value.away.name,
            away_points: value.away.points,
            away_fouls: value.away.fouls,
            period: value.period,
            in_overtime: value.in_overtime,
            overtime_number: value.overtime_number,
            period_duration_secs: value.period_duration_secs,
            remaining_seconds: value.remaining_seconds,
            status: value.status.label().to_owned(),
            reason: value.reason,
        }
    }
}
