//! Durable, transactional persistence for games, orders, and history.
//!
//! The [`Store`] trait is the contract; [`SqliteStore`] is the shipped
//! implementation. Two promises matter to callers: a game snapshot is
//! saved atomically (no reader sees half a phase transition), and phase
//! history is append-only.

mod sqlite;

pub use self::sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::game::{Game, GameId, PhaseRecord, UserId};
use crate::order::AnyOrder;
use crate::power::Power;
use crate::time::Phase;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// Transient failures are worth retrying after a short backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(e) => match e {
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
                sqlx::Error::Database(db) => {
                    let message = db.message();
                    message.contains("locked") || message.contains("busy")
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// The persistence contract.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new game and return its assigned id.
    async fn create_game(&self, game: &Game) -> Result<GameId, StoreError>;

    /// Read a full game snapshot.
    async fn get_game(&self, id: GameId) -> Result<Game, StoreError>;

    /// Write a full game snapshot atomically.
    async fn save_game(&self, game: &Game) -> Result<(), StoreError>;

    /// Save a game snapshot and append its new history records in one
    /// transaction. This is the commit point of `process_phase`.
    async fn apply_phase(&self, game: &Game, records: &[PhaseRecord]) -> Result<(), StoreError>;

    /// Active games whose deadline has passed, soonest first.
    async fn due_games(&self, now: DateTime<Utc>) -> Result<Vec<GameId>, StoreError>;

    /// Active games whose deadline falls within the threshold and whose
    /// reminder hasn't been sent.
    async fn reminder_games(
        &self,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Result<Vec<GameId>, StoreError>;

    /// Upsert one order; the latest submission for a unit wins.
    async fn submit_order(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        order: &AnyOrder,
    ) -> Result<(), StoreError>;

    /// Drop a power's orders for the given phase.
    async fn clear_orders(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        power: &Power,
    ) -> Result<(), StoreError>;

    /// Read orders for a phase, optionally restricted to one power, in
    /// submission order.
    async fn get_orders(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        power: Option<&Power>,
    ) -> Result<Vec<AnyOrder>, StoreError>;

    /// Read history records, optionally bounded by turn (inclusive).
    async fn get_history(
        &self,
        game: GameId,
        from: Option<u32>,
        to: Option<u32>,
    ) -> Result<Vec<PhaseRecord>, StoreError>;

    /// Record a user the front-end has seen.
    async fn upsert_user(&self, user: UserId, name: &str) -> Result<(), StoreError>;

    /// Link an opaque front-end channel to a game.
    async fn bind_channel(&self, channel: &str, game: GameId) -> Result<(), StoreError>;

    /// Games linked to a channel.
    async fn channel_games(&self, channel: &str) -> Result<Vec<GameId>, StoreError>;
}
