use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        HISTORY_COLLECTION_NAME, MATCH_COLLECTION_NAME, MongoHistoryDocument, MongoMatchDocument,
        MongoScoreboardDocument, MongoTeamDocument, SCOREBOARD_COLLECTION_NAME,
        TEAM_COLLECTION_NAME, doc_id,
    },
};
use crate::dao::{
    models::{MatchEntity, MatchHistoryEntity, ScoreboardEntity, TeamEntity, UnitOfWork},
    scoreboard_store::ScoreboardStore,
    storage::StorageResult,
};

/// MongoDB-backed [`ScoreboardStore`] with transactional commits.
#[derive(Clone)]
pub struct MongoScoreboardStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.state.read().await.database.clone();

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoScoreboardStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let history = self.collection::<Document>(HISTORY_COLLECTION_NAME).await;
        let index = IndexModel::builder()
            .keys(doc! {"closed_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("history_closed_at_idx".to_owned()))
                    .build(),
            )
            .build();

        history
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: HISTORY_COLLECTION_NAME,
                index: "closed_at",
                source,
            })?;

        Ok(())
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn load_scoreboard(&self) -> MongoResult<Option<ScoreboardEntity>> {
        let collection = self
            .collection::<MongoScoreboardDocument>(SCOREBOARD_COLLECTION_NAME)
            .await;

        let document = collection
            .find_one(doc! {})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "scoreboard".into(),
                source,
            })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        let collection = self
            .collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME)
            .await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                what: format!("team `{id}`"),
                source,
            })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        let collection = self
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
            .await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                what: format!("match `{id}`"),
                source,
            })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_history(&self) -> MongoResult<Vec<MatchHistoryEntity>> {
        let collection = self
            .collection::<MongoHistoryDocument>(HISTORY_COLLECTION_NAME)
            .await;
        let load_err = |source| MongoDaoError::Load {
            what: "match history".into(),
            source,
        };

        let documents: Vec<MongoHistoryDocument> = collection
            .find(doc! {})
            .sort(doc! {"closed_at": -1})
            .await
            .map_err(load_err)?
            .try_collect()
            .await
            .map_err(load_err)?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn commit(&self, unit: UnitOfWork) -> MongoResult<()> {
        if unit.is_empty() {
            return Ok(());
        }

        let (client, database) = {
            let guard = self.inner.state.read().await;
            (guard.client.clone(), guard.database.clone())
        };

        let mut session = client
            .start_session()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                step: "starting a session",
                source,
            })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                step: "starting the transaction",
                source,
            })?;

        if let Err(err) = Self::write_unit(&database, &mut session, unit).await {
            if let Err(abort_err) = session.abort_transaction().await {
                warn!(error = %abort_err, "failed to abort MongoDB transaction");
            }
            return Err(err);
        }

        session
            .commit_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                step: "committing",
                source,
            })
    }

    async fn write_unit(
        database: &Database,
        session: &mut ClientSession,
        unit: UnitOfWork,
    ) -> MongoResult<()> {
        let teams = database.collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME);
        for team in unit.teams {
            let id = team.id;
            let document: MongoTeamDocument = team.into();
            teams
                .replace_one(doc_id(id), &document)
                .upsert(true)
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "saving a team",
                    source,
                })?;
        }

        if let Some(scoreboard) = unit.scoreboard {
            let id = scoreboard.id;
            let document: MongoScoreboardDocument = scoreboard.into();
            database
                .collection::<MongoScoreboardDocument>(SCOREBOARD_COLLECTION_NAME)
                .replace_one(doc_id(id), &document)
                .upsert(true)
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "saving the scoreboard",
                    source,
                })?;
        }

        if !unit.history.is_empty() {
            let documents: Vec<MongoHistoryDocument> =
                unit.history.into_iter().map(Into::into).collect();
            database
                .collection::<MongoHistoryDocument>(HISTORY_COLLECTION_NAME)
                .insert_many(documents)
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "recording match history",
                    source,
                })?;
        }

        Ok(())
    }
}

impl ScoreboardStore for MongoScoreboardStore {
    fn load_scoreboard(&self) -> BoxFuture<'static, StorageResult<Option<ScoreboardEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_scoreboard().await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<MatchHistoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_history().await.map_err(Into::into) })
    }

    fn commit(&self, unit: UnitOfWork) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.commit(unit).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
