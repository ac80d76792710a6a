//! Applying adjudication results to a game: one `process_phase` call per
//! adjudicated phase, with phase skipping and victory detection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::adjudicator::{
    build, retreat, Disposition, OrderOutcome, OrderState, Submission,
};
use crate::geo::{Map, ProvinceId};
use crate::order::{AdjustOrder, AnyOrder, MainOrder, RetreatOrder};
use crate::power::Power;
use crate::time::{Phase, PhaseKind, Season};
use crate::unit::UnitPosition;

use super::{Game, GameStatus, VICTORY_CENTERS};

/// One order as history remembers it: who gave it, its canonical text,
/// and how it fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedOrder {
    pub power: Power,
    pub text: String,
    pub disposition: Disposition,
}

/// The immutable record of one processed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub turn: u32,
    pub phase: Phase,
    pub orders: Vec<RecordedOrder>,
    /// Unit positions at the end of the phase (dislodged units excluded;
    /// their fate shows in the dispositions).
    pub units: Vec<UnitPosition>,
    pub ownerships: HashMap<ProvinceId, Power>,
}

/// What one `process_phase` call did. Skipped follow-up phases (a retreat
/// nobody needs, an adjustment with all-zero budgets) fold into the same
/// call, so several records can come back at once.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub records: Vec<PhaseRecord>,
    pub completed: bool,
    pub winner: Option<Power>,
}

impl Game {
    /// Adjudicate the current phase with the given orders, mutate the game
    /// into its successor state, and report what happened. The caller is
    /// responsible for persistence and for holding the game's lock.
    pub fn process_phase(&mut self, map: &Map, orders: &[AnyOrder]) -> ProcessOutcome {
        debug_assert_eq!(self.status, GameStatus::Active);

        let mut records = Vec::new();
        match self.phase.kind {
            PhaseKind::Movement => self.process_movement(map, orders, &mut records),
            PhaseKind::Retreat => self.process_retreat(map, orders, &mut records),
            PhaseKind::Adjustment => self.process_adjustment(map, orders, &mut records),
        }

        ProcessOutcome {
            records,
            completed: self.status == GameStatus::Completed,
            winner: self.winner.clone(),
        }
    }

    fn process_movement(&mut self, map: &Map, orders: &[AnyOrder], records: &mut Vec<PhaseRecord>) {
        let main_orders: Vec<MainOrder> = orders
            .iter()
            .filter_map(|o| match o {
                AnyOrder::Movement(order) => Some(order.clone()),
                _ => None,
            })
            .collect();

        let submission = Submission::new(self.deployment.clone(), main_orders);
        let outcome = submission.resolve(map);

        let recorded = outcome
            .all()
            .map(|(order, oo)| {
                let disposition = match oo {
                    OrderOutcome::Void(_) => Disposition::Void,
                    _ if outcome.is_dislodged(&order.unit_position()) => Disposition::Dislodged,
                    _ if oo.state() == OrderState::Succeeds => Disposition::Succeeded,
                    _ => Disposition::Failed,
                };
                RecordedOrder {
                    power: order.power.clone(),
                    text: order.command_text(),
                    disposition,
                }
            })
            .collect();

        self.deployment = outcome.survivors().clone();
        self.pending_retreats = outcome.dislodgements().to_vec();
        self.push_record(records, recorded);

        if !self.pending_retreats.is_empty() {
            self.phase = self.phase.next();
        } else {
            self.after_retreats(map, records);
        }
    }

    fn process_retreat(&mut self, map: &Map, orders: &[AnyOrder], records: &mut Vec<PhaseRecord>) {
        let retreat_orders: Vec<RetreatOrder> = orders
            .iter()
            .filter_map(|o| match o {
                AnyOrder::Retreat(order) => Some(order.clone()),
                _ => None,
            })
            .collect();

        let outcome = retreat::resolve(&self.pending_retreats, &retreat_orders);

        let recorded = outcome
            .results()
            .map(|(order, result)| {
                use crate::adjudicator::retreat::RetreatResult::*;
                let disposition = match result {
                    Moves | DisbandsAsOrdered => Disposition::Succeeded,
                    Prevented | InvalidDestination(_) => Disposition::Failed,
                    NotDislodged | Duplicate => Disposition::Void,
                };
                RecordedOrder {
                    power: order.power.clone(),
                    text: order.command_text(),
                    disposition,
                }
            })
            .collect();

        for unit in outcome.rejoined() {
            self.deployment.place(unit.clone());
        }
        self.pending_retreats.clear();
        self.push_record(records, recorded);

        self.after_retreats(map, records);
    }

    fn process_adjustment(
        &mut self,
        map: &Map,
        orders: &[AnyOrder],
        records: &mut Vec<PhaseRecord>,
    ) {
        let adjust_orders: Vec<AdjustOrder> = orders
            .iter()
            .filter_map(|o| match o {
                AnyOrder::Adjustment(order) => Some(order.clone()),
                _ => None,
            })
            .collect();

        let setup = build::AdjustmentSetup {
            map,
            ownerships: &self.ownerships,
            deployment: &self.deployment,
        };
        let outcome = build::resolve(&setup, &adjust_orders);

        let mut recorded: Vec<RecordedOrder> = outcome
            .results()
            .map(|(order, result)| {
                use crate::adjudicator::build::AdjustResult::*;
                let disposition = match result {
                    Succeeds => Disposition::Succeeded,
                    NoUnit | ForeignUnit => Disposition::Void,
                    _ => Disposition::Failed,
                };
                RecordedOrder {
                    power: order.power.clone(),
                    text: order.command_text(),
                    disposition,
                }
            })
            .collect();

        // Civil-disorder disbands enter the record as the orders the power
        // never gave.
        for unit in outcome.civil_disorder() {
            recorded.push(RecordedOrder {
                power: unit.power().clone(),
                text: format!("DESTROY {} {}", unit.kind(), unit.location),
                disposition: Disposition::Succeeded,
            });
        }

        self.deployment = outcome.final_deployment().clone();
        self.push_record(records, recorded);
        self.conclude_year();
    }

    /// The common tail of a movement or retreat phase: in Fall, ownership
    /// changes hands and the adjustment phase opens (or resolves on the
    /// spot when no power has anything to adjust); in Spring, play moves
    /// straight on to Fall.
    fn after_retreats(&mut self, map: &Map, records: &mut Vec<PhaseRecord>) {
        match self.phase.season {
            Season::Spring => {
                self.phase = Phase::new(self.phase.year, Season::Fall, PhaseKind::Movement);
            }
            Season::Fall => {
                self.recompute_ownerships(map);
                self.phase = Phase::new(self.phase.year, Season::Fall, PhaseKind::Adjustment);

                let setup = build::AdjustmentSetup {
                    map,
                    ownerships: &self.ownerships,
                    deployment: &self.deployment,
                };
                if setup.budgets().is_empty() {
                    // Nothing to build or disband anywhere: the adjustment
                    // is evaluated as a no-op on the spot.
                    self.push_record(records, Vec::new());
                    self.conclude_year();
                }
            }
        }
    }

    /// Close out an adjustment: check for victory, then open next Spring.
    fn conclude_year(&mut self) {
        let solo = self
            .slots
            .iter()
            .map(|s| &s.power)
            .find(|p| self.centers_of(p) >= VICTORY_CENTERS)
            .cloned();

        let winner = solo.or_else(|| {
            let mut standing = self
                .slots
                .iter()
                .map(|s| &s.power)
                .filter(|p| self.deployment.count_of(p) > 0);
            match (standing.next(), standing.next()) {
                (Some(last), None) => Some(last.clone()),
                _ => None,
            }
        });

        if let Some(winner) = winner {
            self.winner = Some(winner);
            self.status = GameStatus::Completed;
            self.deadline = None;
        } else {
            self.phase = self.phase.next();
        }
    }

    /// A supply center belongs to whoever occupies it when Fall closes;
    /// unoccupied centers keep their previous owner.
    fn recompute_ownerships(&mut self, map: &Map) {
        for province in map.provinces().filter(|p| p.is_supply_center()) {
            if let Some(unit) = self.deployment.occupier_of(&province.id) {
                self.ownerships
                    .insert(province.id.clone(), unit.power().clone());
            }
        }
    }

    fn push_record(&mut self, records: &mut Vec<PhaseRecord>, orders: Vec<RecordedOrder>) {
        self.turn += 1;
        records.push(PhaseRecord {
            turn: self.turn,
            phase: self.phase,
            orders,
            units: self.deployment.iter().cloned().collect(),
            ownerships: self.ownerships.clone(),
        });
    }
}
