//! Per-game locks.
//!
//! Every mutating operation on a game (order submission, seat changes,
//! phase processing, deadline changes) runs under that game's lock, so
//! games serialize internally while proceeding in parallel with each
//! other. Reads go straight to the store and rely on its transaction
//! boundaries for a consistent snapshot.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::game::GameId;

#[derive(Default)]
pub(crate) struct GameLocks {
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl GameLocks {
    /// The lock for a game, created on first use and shared thereafter.
    /// Locks are never removed; a finished game's lock is a few bytes.
    pub fn for_game(&self, id: GameId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
