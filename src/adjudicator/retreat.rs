//! Retreat-phase resolution.
//!
//! Retreats have no supports and no cycles: a retreat succeeds exactly
//! when its destination was classified available after movement and no
//! other retreat picks the same province. Colliding retreats all fail, and
//! a failed or missing retreat destroys the unit.

use std::collections::HashMap;

use crate::geo::ProvinceId;
use crate::order::{RetreatCommand, RetreatOrder};
use crate::unit::UnitPosition;

use super::movement::{DestStatus, Dislodgement};

/// Outcome of one retreat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatResult {
    /// The unit reaches its destination and rejoins the board.
    Moves,
    /// The unit disbands as instructed.
    DisbandsAsOrdered,
    /// Another dislodged unit retreated to the same province; both are
    /// destroyed.
    Prevented,
    /// The destination was not open to this unit.
    InvalidDestination(DestStatus),
    /// The order addresses a unit that was not dislodged.
    NotDislodged,
    /// A second order to the same dislodged unit.
    Duplicate,
}

impl RetreatResult {
    pub fn unit_survives(self) -> bool {
        matches!(self, RetreatResult::Moves)
    }
}

/// The resolved retreat phase.
pub struct RetreatOutcome {
    results: Vec<(RetreatOrder, RetreatResult)>,
    /// Units destroyed this phase: failed retreats, ordered disbands, and
    /// dislodged units that never received an order.
    destroyed: Vec<UnitPosition>,
    /// Units that retreated successfully, at their new positions.
    rejoined: Vec<UnitPosition>,
}

impl RetreatOutcome {
    pub fn results(&self) -> impl Iterator<Item = (&RetreatOrder, RetreatResult)> {
        self.results.iter().map(|(o, r)| (o, *r))
    }

    pub fn get(&self, order: &RetreatOrder) -> Option<RetreatResult> {
        self.results
            .iter()
            .find(|(o, _)| o == order)
            .map(|(_, r)| *r)
    }

    pub fn destroyed(&self) -> &[UnitPosition] {
        &self.destroyed
    }

    pub fn rejoined(&self) -> &[UnitPosition] {
        &self.rejoined
    }
}

/// Resolve a retreat phase against the dislodgements movement produced.
pub fn resolve(dislodgements: &[Dislodgement], orders: &[RetreatOrder]) -> RetreatOutcome {
    let mut results: Vec<(RetreatOrder, RetreatResult)> = Vec::with_capacity(orders.len());
    // Which dislodged unit (by index) each accepted order belongs to.
    let mut claimed: HashMap<usize, usize> = HashMap::new();
    // Destination province -> index into `results` of the retreat that got
    // there first.
    let mut destinations: HashMap<ProvinceId, usize> = HashMap::new();

    for order in orders {
        let position = order.unit_position();
        let Some(dislodged_idx) = dislodgements.iter().position(|d| d.unit == position) else {
            results.push((order.clone(), RetreatResult::NotDislodged));
            continue;
        };

        if claimed.contains_key(&dislodged_idx) {
            results.push((order.clone(), RetreatResult::Duplicate));
            continue;
        }
        claimed.insert(dislodged_idx, results.len());

        let result = match &order.command {
            RetreatCommand::Disband => RetreatResult::DisbandsAsOrdered,
            RetreatCommand::Move(dest) => {
                let status = dislodgements[dislodged_idx]
                    .retreat_options
                    .iter()
                    .find(|o| &o.location == dest)
                    .map(|o| o.status)
                    .unwrap_or(DestStatus::Unreachable);

                match status {
                    DestStatus::Available => {
                        if let Some(&earlier) = destinations.get(&dest.province) {
                            results[earlier].1 = RetreatResult::Prevented;
                            RetreatResult::Prevented
                        } else {
                            destinations.insert(dest.province.clone(), results.len());
                            RetreatResult::Moves
                        }
                    }
                    blocked => RetreatResult::InvalidDestination(blocked),
                }
            }
        };

        results.push((order.clone(), result));
    }

    let mut destroyed = Vec::new();
    let mut rejoined = Vec::new();

    for (idx, dislodgement) in dislodgements.iter().enumerate() {
        match claimed.get(&idx).map(|&r| &results[r]) {
            Some((order, RetreatResult::Moves)) => {
                let dest = order
                    .command
                    .move_dest()
                    .expect("a moving retreat has a destination");
                rejoined.push(UnitPosition::new(
                    dislodgement.unit.unit.clone(),
                    dest.clone(),
                ));
            }
            // Ordered disbands, failed retreats, and silence all end the
            // same way.
            _ => destroyed.push(dislodgement.unit.clone()),
        }
    }

    RetreatOutcome {
        results,
        destroyed,
        rejoined,
    }
}
