//! The outbound notification hook.
//!
//! The core owns no transport. The embedding layer (chat bot, HTTP API)
//! hands a [`Notifier`] to [`crate::service::Core`] at construction and
//! receives an [`Event`] after every transaction that outside parties care
//! about. Delivery is at-least-once and best-effort: a failing hook is
//! logged and never rolls back the transaction that triggered it, and
//! events carry their (game, turn, phase) keys so receivers can
//! de-duplicate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::game::{GameId, UserId};
use crate::power::Power;
use crate::time::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    GameCreated {
        game: GameId,
    },
    GameJoined {
        game: GameId,
        power: Power,
        user: UserId,
    },
    PlayerReplaced {
        game: GameId,
        power: Power,
        user: UserId,
    },
    TurnProcessed {
        game: GameId,
        turn: u32,
        phase: Phase,
    },
    DeadlineReminder {
        game: GameId,
        turn: u32,
        phase: Phase,
        seconds_left: i64,
    },
    GameCompleted {
        game: GameId,
        winner: Option<Power>,
    },
    /// Free-form broadcast the API layer can fan out to a game's players.
    Message {
        game: GameId,
        body: String,
    },
}

/// Implemented by the embedding layer. Must not assume it holds any game
/// lock, and should return promptly; slow transports belong behind a
/// queue on the implementor's side.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: Event);
}

/// Discards everything. Useful in tests and batch tooling.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: Event) {}
}
