//! Process-local store, used when no database is configured and in tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{MatchEntity, MatchHistoryEntity, ScoreboardEntity, TeamEntity, UnitOfWork},
    scoreboard_store::ScoreboardStore,
    storage::{StorageError, StorageResult},
};

/// Failures the in-memory store can be told to simulate.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// Commits are switched off with [`MemoryScoreboardStore::fail_commits`].
    #[error("commit rejected: store is configured to fail writes")]
    CommitRejected,
    /// Health checks are switched off with [`MemoryScoreboardStore::set_unreachable`].
    #[error("store is configured to report itself unreachable")]
    Unreachable,
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Cloneable handle to a shared in-memory scoreboard store.
#[derive(Clone, Default)]
pub struct MemoryScoreboardStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    data: RwLock<MemoryData>,
    fail_commits: AtomicBool,
    unreachable: AtomicBool,
}

#[derive(Default)]
struct MemoryData {
    scoreboard: Option<ScoreboardEntity>,
    teams: HashMap<Uuid, TeamEntity>,
    matches: HashMap<Uuid, MatchEntity>,
    history: Vec<MatchHistoryEntity>,
}

impl MemoryScoreboardStore {
    /// Empty store: no scoreboard, teams, matches or history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent commit fail (or succeed again) without touching data.
    pub fn fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Make health checks and reconnect attempts fail (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn reachable(&self) -> Result<(), MemoryStoreError> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Unreachable);
        }
        Ok(())
    }

    /// Register a scheduled match so it can be loaded onto the scoreboard.
    pub async fn insert_match(&self, entity: MatchEntity) {
        let mut data = self.inner.data.write().await;
        data.matches.insert(entity.id, entity);
    }

    /// Store a team record outside of a unit of work.
    pub async fn insert_team(&self, entity: TeamEntity) {
        let mut data = self.inner.data.write().await;
        data.teams.insert(entity.id, entity);
    }

    /// Number of team records currently stored.
    pub async fn team_count(&self) -> usize {
        self.inner.data.read().await.teams.len()
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), MemoryStoreError> {
        if self.inner.fail_commits.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::CommitRejected);
        }

        let mut data = self.inner.data.write().await;
        if let Some(scoreboard) = unit.scoreboard {
            data.scoreboard = Some(scoreboard);
        }
        for team in unit.teams {
            data.teams.insert(team.id, team);
        }
        data.history.extend(unit.history);
        Ok(())
    }
}

impl ScoreboardStore for MemoryScoreboardStore {
    fn load_scoreboard(&self) -> BoxFuture<'static, StorageResult<Option<ScoreboardEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.data.read().await.scoreboard.clone()) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.data.read().await.teams.get(&id).cloned()) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.data.read().await.matches.get(&id).cloned()) })
    }

    fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let data = store.inner.data.read().await;
            Ok(data.history.iter().rev().cloned().collect())
        })
    }

    fn commit(&self, unit: UnitOfWork) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.commit(unit).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reachable().map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reachable().map_err(Into::into) })
    }
}
