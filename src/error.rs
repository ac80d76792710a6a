//! The service-level error taxonomy. Per-order problems are data, not
//! errors, see [`crate::parser::OrderRejection`]; this module covers the
//! failures that abort a whole call.

use thiserror::Error;

use crate::game::{GameId, UserId};
use crate::power::Power;
use crate::store::StoreError;
use crate::time::Phase;

/// A call was refused because the game is not in a state that permits it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateConflict {
    #[error("the game is no longer forming")]
    NotForming,
    #[error("the game is not active")]
    NotActive,
    #[error("{0} is already taken")]
    PowerTaken(Power),
    #[error("that seat is still assigned")]
    SeatAssigned,
    #[error("user {0} is not part of this game")]
    NotInGame(UserId),
    #[error("user {0} already holds a power in this game")]
    AlreadyJoined(UserId),
    #[error("the game has moved on to {current}")]
    PhaseMismatch { expected: Phase, current: Phase },
    #[error("there is no power named {0} on this map")]
    UnknownPower(Power),
}

#[derive(Debug, Error)]
pub enum Error {
    /// The caller's user is not bound to the power it acts for. Identity
    /// resolution is the API layer's job, but the binding is re-verified
    /// on every mutating call.
    #[error("user {user} may not act for game {game}")]
    Unauthorized { game: GameId, user: UserId },

    #[error(transparent)]
    Conflict(#[from] StateConflict),

    /// Storage failure; retryable when the underlying error is.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown map '{0}'")]
    UnknownMap(String),
}

impl Error {
    /// Whether retrying the same call may succeed without operator help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_transient())
    }
}
