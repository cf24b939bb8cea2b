pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    MatchEntity, MatchHistoryEntity, ScoreboardEntity, TeamEntity, UnitOfWork,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemoryScoreboardStore;

/// Abstraction over the persistence layer backing the live scoreboard.
///
/// Writes only go through [`ScoreboardStore::commit`], which applies a whole
/// [`UnitOfWork`] atomically.
pub trait ScoreboardStore: Send + Sync {
    /// Load the singleton scoreboard row, if one was ever saved.
    fn load_scoreboard(&self) -> BoxFuture<'static, StorageResult<Option<ScoreboardEntity>>>;
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// Closed matches, most recent first.
    fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>>;
    /// Apply every write in `unit` or none of them.
    fn commit(&self, unit: UnitOfWork) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
