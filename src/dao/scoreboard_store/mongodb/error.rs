use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// URI as given.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver refused the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// No ping succeeded while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last driver error.
        #[source]
        source: MongoError,
    },
    /// A health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A read failed.
    #[error("failed to load {what}")]
    Load {
        /// What was being read.
        what: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A stored document does not map back to an entity.
    #[error("stored {collection} document `{id}` is malformed: {reason}")]
    CorruptDocument {
        /// Collection the document came from.
        collection: &'static str,
        /// Raw `_id` of the document.
        id: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A step of a commit transaction failed; the transaction was aborted.
    #[error("transaction failed while {step}")]
    Transaction {
        /// Step that failed.
        step: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
