//! Movement-phase submission and its resolved outcome.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geo::{Location, Map, ProvinceId};
use crate::order::{MainCommand, MainOrder, Order};
use crate::unit::{Deployment, UnitKind, UnitPosition};

use super::outcome::{OrderOutcome, OrderState, VoidReason};
use super::resolver::{Context, ResolverState};
use super::strength::Prevent;
use super::{convoys, paths, rules, OrderId};

/// The orders handed in for one movement phase, plus the board they apply
/// to. Resolution needs both: strengths come from orders, but occupancy
/// and void detection come from the board.
pub struct Submission {
    deployment: Deployment,
    orders: Vec<MainOrder>,
}

impl Submission {
    pub fn new(deployment: Deployment, orders: Vec<MainOrder>) -> Self {
        Submission { deployment, orders }
    }

    /// Infer the board from the orders themselves: every order's unit is
    /// assumed to exist. Convenient for rules tests where the orders tell
    /// the whole story.
    pub fn from_orders(orders: Vec<MainOrder>) -> Self {
        let deployment = orders.iter().map(Order::unit_position).collect();
        Submission { deployment, orders }
    }

    /// Resolve the phase to its unique fixed point.
    pub fn resolve(&self, map: &Map) -> MovementOutcome {
        let mut voided: Vec<(MainOrder, VoidReason)> = Vec::new();
        let mut live: Vec<MainOrder> = Vec::new();
        let mut ordered: HashSet<Location> = HashSet::new();

        for order in &self.orders {
            match self.screen(map, order, &ordered) {
                Some(reason) => voided.push((order.clone(), reason)),
                None => {
                    ordered.insert(order.location.clone());
                    live.push(order.clone());
                }
            }
        }

        // Units left without a live order hold; somebody has to stand in
        // the province when attacks are weighed.
        for unit in self.deployment.iter() {
            if !ordered.contains(&unit.location) {
                live.push(Order::new(
                    unit.power().clone(),
                    unit.kind(),
                    unit.location.clone(),
                    MainCommand::Hold,
                ));
            }
        }

        let ctx = Context::new(map, &live);
        let mut state = ResolverState::new();
        for id in ctx.ids() {
            state.resolve(&ctx, id);
        }

        // With every fate known, replay the judgments to capture the
        // explanations.
        let mut replay = state.clone();
        let outcomes: Vec<OrderOutcome> = ctx
            .ids()
            .map(|id| rules::explain(&ctx, &mut replay, id))
            .collect();

        let dislodgers: Vec<Option<OrderId>> = ctx
            .ids()
            .map(|id| paths::dislodger_of(&ctx, &mut replay, id))
            .collect();

        let survivors: Deployment = ctx
            .ids()
            .filter(|&id| dislodgers[id].is_none())
            .map(|id| {
                let order = ctx.order(id);
                let moved = order.is_move() && bool::from(outcomes[id].state());
                if moved {
                    UnitPosition::new(
                        order.unit_position().unit,
                        order.move_dest().unwrap().clone(),
                    )
                } else {
                    order.unit_position()
                }
            })
            .collect();

        let dislodgements: Vec<Dislodgement> = ctx
            .ids()
            .filter_map(|id| {
                let dislodger = dislodgers[id]?;
                Some(self.survey_retreats(&ctx, &mut replay, &survivors, &dislodgers, id, dislodger))
            })
            .collect();

        MovementOutcome {
            orders: live,
            outcomes,
            voided,
            dislodgements,
            survivors,
        }
    }

    /// Pre-resolution screening: orders that can never participate are
    /// voided with a reason, and their units revert to holding.
    fn screen(
        &self,
        map: &Map,
        order: &MainOrder,
        ordered: &HashSet<Location>,
    ) -> Option<VoidReason> {
        match self.deployment.occupier_of(&order.location.province) {
            None => return Some(VoidReason::NoUnit),
            Some(unit) if unit.power() != &order.power => return Some(VoidReason::ForeignUnit),
            Some(unit) if unit.kind() != order.unit_kind || unit.location != order.location => {
                return Some(VoidReason::NoUnit)
            }
            Some(_) => {}
        }

        if ordered.contains(&order.location) {
            return Some(VoidReason::DuplicateOrder);
        }

        match &order.command {
            MainCommand::Move(dest) => {
                if dest.province == order.location.province {
                    return Some(VoidReason::MoveToSelf);
                }

                let occupiable = map
                    .terrain_of(dest)
                    .is_some_and(|t| order.unit_kind.can_occupy(t));
                let direct = occupiable
                    && map
                        .border_between(&order.location, dest)
                        .is_some_and(|b| b.passable_by(order.unit_kind));
                let sea_borne = occupiable
                    && order.unit_kind == UnitKind::Army
                    && convoys::route_may_exist(map, &self.deployment, order);

                if !(direct || sea_borne) {
                    return Some(VoidReason::UnreachableDestination);
                }
            }
            MainCommand::SupportHold(_, at) if at.province == order.location.province => {
                return Some(VoidReason::SupportOnSelf)
            }
            MainCommand::SupportMove(_, _, to) if to.province == order.location.province => {
                return Some(VoidReason::SupportOnSelf)
            }
            _ => {}
        }

        None
    }

    /// Classify every neighboring site of a dislodged unit.
    fn survey_retreats(
        &self,
        ctx: &Context,
        state: &mut ResolverState,
        survivors: &Deployment,
        dislodgers: &[Option<OrderId>],
        id: OrderId,
        dislodger: OrderId,
    ) -> Dislodgement {
        let order = ctx.order(id);
        let dislodger_order = ctx.order(dislodger);
        let origin_barred = !paths::moved_via_convoy(ctx, state, dislodger);

        let retreat_options = ctx
            .map
            .borders_of(&order.location)
            .into_iter()
            .filter_map(|border| {
                let dest = border.dest_from(&order.location)?;
                let status = if !border.passable_by(order.unit_kind) {
                    DestStatus::Unreachable
                } else if origin_barred && dest.province == dislodger_order.location.province {
                    DestStatus::BlockedByDislodger
                } else if survivors.occupier_of(&dest.province).is_some() {
                    DestStatus::Occupied
                } else if contested(ctx, state, dislodgers, &dest.province) {
                    DestStatus::Contested
                } else {
                    DestStatus::Available
                };
                Some(RetreatOption {
                    location: dest.clone(),
                    status,
                })
            })
            .collect();

        Dislodgement {
            unit: order.unit_position(),
            dislodger_origin: dislodger_order.location.province.clone(),
            retreat_options,
        }
    }
}

/// A province is contested when a standing (non-dislodged) unit applied
/// prevent force there during the movement phase, whether or not the
/// province ended up empty. Units may not retreat into contested ground.
fn contested(
    ctx: &Context,
    state: &mut ResolverState,
    dislodgers: &[Option<OrderId>],
    province: &ProvinceId,
) -> bool {
    paths::prevents_at(ctx, state, province)
        .into_iter()
        .any(|prevent| match prevent {
            Prevent::Prevents(id, _) => dislodgers[id].is_none(),
            _ => false,
        })
}

/// Suitability of a neighboring site as a retreat destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestStatus {
    Available,
    /// No passable border for this unit kind.
    Unreachable,
    /// The dislodger attacked overland from this province.
    BlockedByDislodger,
    /// A surviving unit stands in the province.
    Occupied,
    /// The province was fought over this phase; even if it ended up empty,
    /// nobody may retreat into it.
    Contested,
}

/// One neighboring site of a dislodged unit, with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatOption {
    pub location: Location,
    pub status: DestStatus,
}

/// A unit forced out of its province, and where it may go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dislodgement {
    pub unit: UnitPosition,
    pub dislodger_origin: ProvinceId,
    pub retreat_options: Vec<RetreatOption>,
}

impl Dislodgement {
    pub fn allowed(&self) -> impl Iterator<Item = &Location> {
        self.retreat_options
            .iter()
            .filter(|o| o.status == DestStatus::Available)
            .map(|o| &o.location)
    }

    pub fn has_escape(&self) -> bool {
        self.allowed().next().is_some()
    }
}

/// Everything a movement resolution produced: per-order outcomes, the
/// surviving deployment, and the retreat picture.
pub struct MovementOutcome {
    orders: Vec<MainOrder>,
    outcomes: Vec<OrderOutcome>,
    voided: Vec<(MainOrder, VoidReason)>,
    dislodgements: Vec<Dislodgement>,
    survivors: Deployment,
}

impl MovementOutcome {
    /// Outcome of a specific order, voided ones included. Lookup is by
    /// structural equality, so tests can re-parse the order text.
    pub fn get(&self, order: &MainOrder) -> Option<OrderOutcome> {
        if let Some((_, reason)) = self.voided.iter().find(|(o, _)| o == order) {
            return Some(OrderOutcome::Void(*reason));
        }
        self.orders
            .iter()
            .position(|o| o == order)
            .map(|id| self.outcomes[id])
    }

    pub fn state_of(&self, order: &MainOrder) -> Option<OrderState> {
        self.get(order).map(|o| o.state())
    }

    /// Iterate over every order that fed into or was screened out of the
    /// resolution, with its outcome.
    pub fn all(&self) -> impl Iterator<Item = (&MainOrder, OrderOutcome)> {
        self.orders
            .iter()
            .zip(self.outcomes.iter().copied())
            .chain(
                self.voided
                    .iter()
                    .map(|(o, r)| (o, OrderOutcome::Void(*r))),
            )
    }

    pub fn dislodgements(&self) -> &[Dislodgement] {
        &self.dislodgements
    }

    pub fn has_dislodgements(&self) -> bool {
        !self.dislodgements.is_empty()
    }

    pub fn is_dislodged(&self, unit: &UnitPosition) -> bool {
        self.dislodgements.iter().any(|d| &d.unit == unit)
    }

    /// The non-dislodged units in their post-movement positions.
    pub fn survivors(&self) -> &Deployment {
        &self.survivors
    }
}
