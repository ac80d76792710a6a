//! Rule-exact adjudication for the three phase kinds.
//!
//! [`Submission`] resolves a movement phase; [`retreat`] and [`build`]
//! handle the follow-on phases, which have no cyclic dependencies and
//! resolve in a single pass.

pub mod build;
mod convoys;
mod movement;
mod outcome;
mod paths;
mod resolver;
pub mod retreat;
mod rules;
mod strength;
mod supports;

pub use self::convoys::route_may_exist as convoy_plausible;
pub use self::movement::{
    DestStatus, Dislodgement, MovementOutcome, RetreatOption, Submission,
};
pub use self::outcome::{
    ConvoyOutcome, Disposition, HoldOutcome, MoveOutcome, OrderOutcome, OrderState,
    SupportOutcome, VoidReason,
};

/// Index of an order in its resolution slab. Orders reference each other
/// by id, never by pointer.
pub type OrderId = usize;
