//! Per-order outcome types for movement-phase adjudication.

use serde::{Deserialize, Serialize};

use super::OrderId;

/// Whether an order achieved its effect. For moves, success means the unit
/// transitions; for every other command it means the command's effect was
/// not disrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Succeeds,
    Fails,
}

impl From<bool> for OrderState {
    fn from(b: bool) -> Self {
        if b {
            OrderState::Succeeds
        } else {
            OrderState::Fails
        }
    }
}

impl From<OrderState> for bool {
    fn from(os: OrderState) -> Self {
        os == OrderState::Succeeds
    }
}

/// Why an order was excluded from resolution entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoidReason {
    /// No unit stands where the order points.
    NoUnit,
    /// The unit at the addressed location belongs to another power.
    ForeignUnit,
    /// The power issued more than one order to this unit; only the first
    /// fed into resolution.
    DuplicateOrder,
    /// A move whose destination is its own origin province.
    MoveToSelf,
    /// A support aimed at the supporter's own province.
    SupportOnSelf,
    /// No conceivable path: no passable border, and no convoy chain could
    /// be formed even if every fleet on the board were ordered to convoy.
    UnreachableDestination,
}

/// Outcome of a hold (explicit or inserted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldOutcome {
    Stands,
    Dislodged(OrderId),
}

/// Outcome of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Succeeds,
    /// A convoy was needed and no intact chain survived, or the ordered
    /// route evaporated.
    NoPath,
    /// A stronger or equal contender kept the unit out of the destination.
    Prevented(OrderId),
    /// The destination held a unit of the mover's own power; dislodging it
    /// is forbidden.
    FriendlyFire,
    /// The opposing unit in a head-to-head battle overpowered this one.
    LostHeadToHead,
    /// The occupier of the destination withstood the attack.
    Repelled,
}

/// Outcome of a support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportOutcome {
    /// The support held; whether it mattered is the beneficiary's problem.
    NotDisrupted,
    /// The supporter cannot reach the province where help is needed.
    /// Support cannot be convoyed, so this is a plain border check.
    CantReach,
    CutBy(OrderId),
}

/// Outcome of a convoy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvoyOutcome {
    NotDisrupted,
    /// Convoys can only operate from open sea.
    NotAtSea,
    Dislodged(OrderId),
    /// The convoy was failed to break a resolution paradox.
    Paradox,
}

/// The composite per-order outcome. The variant matches the command kind,
/// except for `Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Void(VoidReason),
    Hold(HoldOutcome),
    Move(MoveOutcome),
    Support(SupportOutcome),
    Convoy(ConvoyOutcome),
}

impl OrderOutcome {
    pub fn state(&self) -> OrderState {
        let succeeded = match self {
            OrderOutcome::Void(_) => false,
            OrderOutcome::Hold(o) => matches!(o, HoldOutcome::Stands),
            OrderOutcome::Move(o) => matches!(o, MoveOutcome::Succeeds),
            OrderOutcome::Support(o) => matches!(o, SupportOutcome::NotDisrupted),
            OrderOutcome::Convoy(o) => matches!(o, ConvoyOutcome::NotDisrupted),
        };
        succeeded.into()
    }
}

impl From<HoldOutcome> for OrderOutcome {
    fn from(o: HoldOutcome) -> Self {
        OrderOutcome::Hold(o)
    }
}

impl From<MoveOutcome> for OrderOutcome {
    fn from(o: MoveOutcome) -> Self {
        OrderOutcome::Move(o)
    }
}

impl From<SupportOutcome> for OrderOutcome {
    fn from(o: SupportOutcome) -> Self {
        OrderOutcome::Support(o)
    }
}

impl From<ConvoyOutcome> for OrderOutcome {
    fn from(o: ConvoyOutcome) -> Self {
        OrderOutcome::Convoy(o)
    }
}

impl From<VoidReason> for OrderOutcome {
    fn from(r: VoidReason) -> Self {
        OrderOutcome::Void(r)
    }
}

/// The four-way status a processed phase records for each order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Succeeded,
    Failed,
    Dislodged,
    Void,
}
