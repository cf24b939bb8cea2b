/// Database model definitions.
pub mod models;
/// Scoreboard persistence backends.
pub mod scoreboard_store;
/// Storage abstraction layer for database operations.
pub mod storage;
