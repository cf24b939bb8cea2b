//! Library crate for courtside-back, exposing modules for the binary and tests.

pub mod config;
/// Persistence models and store backends.
pub mod dao;
mod dto;
mod error;
/// HTTP routes.
pub mod routes;
/// Scoreboard operations and background tasks.
pub mod services;
/// Shared application state and the scoreboard domain.
pub mod state;
