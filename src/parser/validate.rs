//! Validation of parsed orders against a game snapshot.
//!
//! Syntax said what the player wants; this layer decides whether the game
//! accepts it: the unit must exist and be theirs, the command must fit the
//! phase, the geometry must work, and adjustment orders must respect the
//! build budget. Each failure maps to a distinct [`OrderRejection`].

use std::collections::HashMap;

use crate::adjudicator::Dislodgement;
use crate::geo::{Location, Map, ProvinceId};
use crate::order::{
    AdjustCommand, AnyOrder, MainCommand, Order, RetreatCommand,
};
use crate::power::Power;
use crate::time::{Phase, PhaseKind};
use crate::unit::{Deployment, UnitKind, UnitPosition};

use super::error::OrderRejection;
use super::{parse_orders, RawOrder};

/// The slice of game state validation needs.
pub struct Snapshot<'a> {
    pub map: &'a Map,
    pub phase: Phase,
    pub deployment: &'a Deployment,
    pub ownerships: &'a HashMap<ProvinceId, Power>,
    /// Pending dislodgements when the phase is a retreat.
    pub retreats: &'a [Dislodgement],
}

/// The result of parsing and validating one submission string.
pub struct ValidatedOrders {
    /// Per-span acceptance, in input order.
    pub receipts: Vec<(String, Result<AnyOrder, OrderRejection>)>,
}

impl ValidatedOrders {
    pub fn accepted(&self) -> impl Iterator<Item = &AnyOrder> {
        self.receipts.iter().filter_map(|(_, r)| r.as_ref().ok())
    }
}

impl<'a> Snapshot<'a> {
    /// Parse a submission string and validate every order in it on behalf
    /// of `power`.
    pub fn validate_submission(&self, power: &Power, text: &str) -> ValidatedOrders {
        let receipts = parse_orders(text)
            .into_iter()
            .map(|span| {
                let result = span
                    .result
                    .map_err(OrderRejection::from)
                    .and_then(|raw| self.validate(power, raw));
                (span.text, result)
            })
            .collect();

        ValidatedOrders { receipts }
    }

    /// Validate a single parsed order.
    pub fn validate(&self, power: &Power, raw: RawOrder) -> Result<AnyOrder, OrderRejection> {
        match self.phase.kind {
            PhaseKind::Movement => self.validate_movement(power, raw),
            PhaseKind::Retreat => self.validate_retreat(power, raw),
            PhaseKind::Adjustment => self.validate_adjustment(power, raw),
        }
    }

    fn validate_movement(
        &self,
        power: &Power,
        raw: RawOrder,
    ) -> Result<AnyOrder, OrderRejection> {
        let order = match raw {
            RawOrder::Hold { kind, at } => {
                let unit = self.own_unit(power, kind, &at)?;
                Order::new(power.clone(), unit.kind(), unit.location.clone(), MainCommand::Hold)
            }
            RawOrder::Move { kind, from, to } => {
                let unit = self.own_unit(power, kind, &from)?;
                let to = self.known(to)?;
                self.check_reach(&unit, &to)?;
                Order::new(
                    power.clone(),
                    unit.kind(),
                    unit.location.clone(),
                    MainCommand::Move(to),
                )
            }
            RawOrder::SupportHold {
                kind,
                at,
                target_kind,
                target,
            } => {
                let unit = self.own_unit(power, kind, &at)?;
                let target = self.resolve_reference(target_kind, self.known(target)?);
                self.check_support_reach(&unit, &target.1.province)?;
                Order::new(
                    power.clone(),
                    unit.kind(),
                    unit.location.clone(),
                    MainCommand::SupportHold(target.0, target.1),
                )
            }
            RawOrder::SupportMove {
                kind,
                at,
                target_kind,
                from,
                to,
            } => {
                let unit = self.own_unit(power, kind, &at)?;
                let from = self.resolve_reference(target_kind, self.known(from)?);
                let to = self.known(to)?;
                // The supporter must be able to reach the destination; the
                // supported unit's own path is its own problem.
                self.check_support_reach(&unit, &to.province)?;
                Order::new(
                    power.clone(),
                    unit.kind(),
                    unit.location.clone(),
                    MainCommand::SupportMove(from.0, from.1, to),
                )
            }
            RawOrder::Convoy {
                kind,
                at,
                cargo_kind,
                from,
                to,
            } => {
                let unit = self.own_unit(power, kind, &at)?;
                if unit.kind() != UnitKind::Fleet || !self.map.is_open_sea(&unit.location) {
                    return Err(OrderRejection::ConvoyerNotAtSea);
                }
                if cargo_kind != UnitKind::Army {
                    return Err(OrderRejection::ConvoyedNotArmy);
                }
                let from = self.known(from)?;
                let to = self.known(to)?;
                Order::new(
                    power.clone(),
                    unit.kind(),
                    unit.location.clone(),
                    MainCommand::Convoy(from, to),
                )
            }
            RawOrder::Disband { .. } | RawOrder::Build { .. } | RawOrder::Destroy { .. } => {
                return Err(OrderRejection::WrongPhase(self.phase))
            }
        };

        Ok(AnyOrder::Movement(order))
    }

    fn validate_retreat(&self, power: &Power, raw: RawOrder) -> Result<AnyOrder, OrderRejection> {
        let order = match raw {
            RawOrder::Move { kind, from, to } => {
                let dislodged = self.own_dislodged(power, kind, &from)?;
                let to = self.known(to)?;
                let open = dislodged.allowed().any(|loc| loc == &to);
                if !open {
                    return Err(OrderRejection::IllegalRetreat(to));
                }
                Order::new(
                    power.clone(),
                    dislodged.unit.kind(),
                    dislodged.unit.location.clone(),
                    RetreatCommand::Move(to),
                )
            }
            RawOrder::Disband { kind, at } => {
                let dislodged = self.own_dislodged(power, kind, &at)?;
                Order::new(
                    power.clone(),
                    dislodged.unit.kind(),
                    dislodged.unit.location.clone(),
                    RetreatCommand::Disband,
                )
            }
            _ => return Err(OrderRejection::WrongPhase(self.phase)),
        };

        Ok(AnyOrder::Retreat(order))
    }

    fn validate_adjustment(
        &self,
        power: &Power,
        raw: RawOrder,
    ) -> Result<AnyOrder, OrderRejection> {
        let order = match raw {
            RawOrder::Build { kind, at } => {
                let at = self.known(at)?;
                let province = at.province.clone();

                if !self.map.home_centers(power).contains(&province) {
                    return Err(OrderRejection::NotHomeCenter(province));
                }
                if self.ownerships.get(&province) != Some(power) {
                    return Err(OrderRejection::CenterNotOwned(province));
                }
                if self.deployment.occupier_of(&province).is_some() {
                    return Err(OrderRejection::CenterOccupied(province));
                }
                if kind == UnitKind::Fleet
                    && at.coast.is_none()
                    && !self.map.coasts(&province).is_empty()
                {
                    return Err(OrderRejection::BuildNeedsCoast(province));
                }
                let buildable = self
                    .map
                    .terrain_of(&at)
                    .is_some_and(|t| kind.can_occupy(t));
                if !buildable {
                    return Err(OrderRejection::BadBuildSite(at, kind));
                }

                let budget = self.build_budget(power);
                if budget <= 0 {
                    return Err(OrderRejection::NoBuildBudget);
                }

                Order::new(power.clone(), kind, at, AdjustCommand::Build)
            }
            RawOrder::Destroy { kind, at } | RawOrder::Disband { kind, at } => {
                let unit = self.own_unit(power, kind, &at)?;
                Order::new(
                    power.clone(),
                    unit.kind(),
                    unit.location.clone(),
                    AdjustCommand::Disband,
                )
            }
            _ => return Err(OrderRejection::WrongPhase(self.phase)),
        };

        Ok(AnyOrder::Adjustment(order))
    }

    fn build_budget(&self, power: &Power) -> i32 {
        let centers = self.ownerships.values().filter(|&p| p == power).count() as i32;
        let units = self.deployment.count_of(power) as i32;
        centers - units
    }

    /// The location must name a province the map knows; the coast, if any,
    /// must be one of its sites.
    fn known(&self, location: Location) -> Result<Location, OrderRejection> {
        if self.map.province(&location.province).is_none() {
            return Err(OrderRejection::UnknownProvince(
                location.province.to_string(),
            ));
        }
        if self.map.site(&location).is_none() {
            return Err(OrderRejection::UnknownProvince(location.to_string()));
        }
        Ok(location)
    }

    /// Find the submitting power's own unit at a stated position. A stated
    /// location without a coast matches a fleet that carries one, and the
    /// order is normalized to the unit's true position.
    fn own_unit(
        &self,
        power: &Power,
        kind: UnitKind,
        at: &Location,
    ) -> Result<&UnitPosition, OrderRejection> {
        let at = self.known(at.clone())?;
        let unit = self
            .deployment
            .occupier_of(&at.province)
            .ok_or_else(|| OrderRejection::NoUnit(at.clone()))?;

        if unit.power() != power {
            return Err(OrderRejection::ForeignUnit(at.clone()));
        }
        if unit.kind() != kind {
            return Err(OrderRejection::WrongUnit(at.clone(), kind));
        }
        if at.coast.is_some() && unit.location != at {
            return Err(OrderRejection::WrongUnit(at, kind));
        }

        Ok(unit)
    }

    fn own_dislodged(
        &self,
        power: &Power,
        kind: UnitKind,
        at: &Location,
    ) -> Result<&Dislodgement, OrderRejection> {
        let at = self.known(at.clone())?;
        let dislodged = self
            .retreats
            .iter()
            .find(|d| d.unit.province() == &at.province)
            .ok_or_else(|| OrderRejection::NotDislodged(at.clone()))?;

        if dislodged.unit.power() != power {
            return Err(OrderRejection::ForeignUnit(at.clone()));
        }
        if dislodged.unit.kind() != kind {
            return Err(OrderRejection::WrongUnit(at, kind));
        }

        Ok(dislodged)
    }

    /// Normalize a reference to another unit: adopt the referenced unit's
    /// true coast when the reference names only the province. References
    /// to empty provinces pass through untouched; the adjudicator treats
    /// supports of phantom units as inert.
    fn resolve_reference(&self, kind: UnitKind, at: Location) -> (UnitKind, Location) {
        match self.deployment.occupier_of(&at.province) {
            Some(unit) if unit.kind() == kind && at.coast.is_none() => {
                (kind, unit.location.clone())
            }
            _ => (kind, at),
        }
    }

    /// A move must have a passable border. Armies between coastal
    /// provinces may instead rely on a plausible convoy chain through
    /// fleets now at sea.
    fn check_reach(&self, unit: &UnitPosition, to: &Location) -> Result<(), OrderRejection> {
        let occupiable = self
            .map
            .terrain_of(to)
            .is_some_and(|t| unit.kind().can_occupy(t));
        let direct = occupiable && self.map.adjacent(unit.kind(), &unit.location, to);

        if direct {
            return Ok(());
        }

        let order = Order::new(
            unit.power().clone(),
            unit.kind(),
            unit.location.clone(),
            MainCommand::Move(to.clone()),
        );
        let sea_borne = occupiable
            && crate::adjudicator::convoy_plausible(self.map, self.deployment, &order);

        if sea_borne {
            Ok(())
        } else {
            Err(OrderRejection::Unreachable {
                kind: unit.kind(),
                from: unit.location.clone(),
                to: to.clone(),
            })
        }
    }

    fn check_support_reach(
        &self,
        unit: &UnitPosition,
        needed_at: &ProvinceId,
    ) -> Result<(), OrderRejection> {
        let reachable = self
            .map
            .borders_joining(&unit.location, needed_at)
            .iter()
            .any(|b| b.passable_by(unit.kind()));

        if reachable {
            Ok(())
        } else {
            Err(OrderRejection::SupporterCannotReach(needed_at.clone()))
        }
    }
}
