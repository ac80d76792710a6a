//! Adjustment-phase resolution: builds, disbands, and the civil-disorder
//! rule for powers that owe disbands and never said which.

use std::collections::HashMap;

use crate::geo::{Location, Map, ProvinceId};
use crate::order::{AdjustCommand, AdjustOrder};
use crate::power::Power;
use crate::unit::{Deployment, Unit, UnitKind, UnitPosition};

/// The immutable inputs of an adjustment: the map, who controls which
/// supply center, and where the units stand.
pub struct AdjustmentSetup<'a> {
    pub map: &'a Map,
    pub ownerships: &'a HashMap<ProvinceId, Power>,
    pub deployment: &'a Deployment,
}

impl AdjustmentSetup<'_> {
    /// Build budget per power: centers controlled minus units owned.
    /// Powers at exactly zero are omitted.
    pub fn budgets(&self) -> HashMap<Power, i32> {
        let mut interested: Vec<&Power> = self.ownerships.values().collect();
        for unit in self.deployment.iter() {
            interested.push(unit.power());
        }
        interested.sort();
        interested.dedup();

        interested
            .into_iter()
            .filter_map(|power| {
                let centers = self.ownerships.values().filter(|&p| p == power).count() as i32;
                let units = self.deployment.count_of(power) as i32;
                match centers - units {
                    0 => None,
                    delta => Some((power.clone(), delta)),
                }
            })
            .collect()
    }
}

/// Outcome of one build or disband order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustResult {
    Succeeds,
    /// The power has nothing due in this direction: its budget is zero,
    /// or it owes disbands and tried to build (or vice versa).
    NoAdjustmentDue,
    /// Builds must name one of the power's own home supply centers.
    InvalidSite,
    /// The home center is currently controlled by another power.
    ForeignControlled,
    /// The build site already hosts a unit.
    Occupied,
    /// The named site cannot host a unit of that kind: a fleet inland, a
    /// fleet without a coast in a split-coast province, an army at sea.
    InvalidTerrain,
    /// Disband failed: no unit at that location.
    NoUnit,
    /// Disband failed: the unit there belongs to someone else.
    ForeignUnit,
    /// The power already used up its builds or disbands this phase.
    BudgetExhausted,
}

/// The resolved adjustment phase.
pub struct AdjustmentOutcome {
    results: Vec<(AdjustOrder, AdjustResult)>,
    civil_disorder: Vec<UnitPosition>,
    final_deployment: Deployment,
}

impl AdjustmentOutcome {
    pub fn results(&self) -> impl Iterator<Item = (&AdjustOrder, AdjustResult)> {
        self.results.iter().map(|(o, r)| (o, *r))
    }

    pub fn get(&self, order: &AdjustOrder) -> Option<AdjustResult> {
        self.results
            .iter()
            .find(|(o, _)| o == order)
            .map(|(_, r)| *r)
    }

    /// Units removed by the civil-disorder rule, in removal order.
    pub fn civil_disorder(&self) -> &[UnitPosition] {
        &self.civil_disorder
    }

    /// The deployment after all builds and disbands.
    pub fn final_deployment(&self) -> &Deployment {
        &self.final_deployment
    }
}

/// Resolve an adjustment phase. Orders are taken in submission sequence;
/// once a power's budget is spent, later orders bounce off it.
pub fn resolve(setup: &AdjustmentSetup, orders: &[AdjustOrder]) -> AdjustmentOutcome {
    let mut deltas = setup.budgets();
    let mut final_deployment = setup.deployment.clone();
    let mut results = Vec::with_capacity(orders.len());

    for order in orders {
        let result = judge(setup, &mut deltas, &mut final_deployment, order);
        results.push((order.clone(), result));
    }

    // Powers still owing disbands lose units by the book: farthest from
    // any home center first, fleets before armies on ties, then
    // alphabetically.
    let mut civil_disorder = Vec::new();
    for (power, delta) in deltas {
        if delta >= 0 {
            continue;
        }

        let owed = (-delta) as usize;
        for unit in canonical_disbands(setup.map, &power, &final_deployment, owed) {
            final_deployment.remove_from(&unit.location.province);
            civil_disorder.push(unit);
        }
    }

    AdjustmentOutcome {
        results,
        civil_disorder,
        final_deployment,
    }
}

fn judge(
    setup: &AdjustmentSetup,
    deltas: &mut HashMap<Power, i32>,
    final_deployment: &mut Deployment,
    order: &AdjustOrder,
) -> AdjustResult {
    let Some(delta) = deltas.get_mut(&order.power) else {
        return AdjustResult::NoAdjustmentDue;
    };

    match order.command {
        AdjustCommand::Build => {
            if *delta < 0 {
                return AdjustResult::NoAdjustmentDue;
            }

            let province = &order.location.province;
            if !setup.map.home_centers(&order.power).contains(province) {
                return AdjustResult::InvalidSite;
            }
            if setup.ownerships.get(province) != Some(&order.power) {
                return AdjustResult::ForeignControlled;
            }
            if final_deployment.occupier_of(province).is_some() {
                return AdjustResult::Occupied;
            }

            let buildable = setup
                .map
                .terrain_of(&order.location)
                .is_some_and(|t| order.unit_kind.can_occupy(t));
            let needs_coast = order.unit_kind == UnitKind::Fleet
                && order.location.coast.is_none()
                && !setup.map.coasts(province).is_empty();
            if !buildable || needs_coast {
                return AdjustResult::InvalidTerrain;
            }

            if *delta == 0 {
                return AdjustResult::BudgetExhausted;
            }
            *delta -= 1;
            final_deployment.place(UnitPosition::new(
                Unit::new(order.power.clone(), order.unit_kind),
                order.location.clone(),
            ));
            AdjustResult::Succeeds
        }
        AdjustCommand::Disband => {
            if *delta > 0 {
                return AdjustResult::NoAdjustmentDue;
            }

            let province = &order.location.province;
            match final_deployment.occupier_of(province) {
                None => return AdjustResult::NoUnit,
                Some(unit) if unit.power() != &order.power => return AdjustResult::ForeignUnit,
                Some(_) => {}
            }

            if *delta == 0 {
                return AdjustResult::BudgetExhausted;
            }
            *delta += 1;
            final_deployment.remove_from(province);
            AdjustResult::Succeeds
        }
    }
}

/// The canonical disband sequence for a power owing `owed` units.
fn canonical_disbands(
    map: &Map,
    power: &Power,
    deployment: &Deployment,
    owed: usize,
) -> Vec<UnitPosition> {
    let home_centers = map.home_centers(power);
    let graph = map.to_graph();

    let home_sites: Vec<&Location> = map
        .sites()
        .filter(|s| home_centers.contains(&s.location.province))
        .map(|s| &s.location)
        .collect();

    let mut prioritized: Vec<(UnitPosition, i32)> = deployment
        .units_of(power)
        .map(|unit| {
            if home_centers.contains(&unit.location.province) {
                return (unit.clone(), 0);
            }

            // Distance is measured site-by-site so that every coast of a
            // home center counts, and terrain is ignored.
            let Some(start) = map.site(&unit.location) else {
                return (unit.clone(), i32::MAX);
            };
            let distances = petgraph::algo::dijkstra(&graph, &start.location, None, |_| 1);
            let nearest = home_sites
                .iter()
                .filter_map(|site| distances.get(site).copied())
                .min()
                .unwrap_or(i32::MAX);
            (unit.clone(), nearest)
        })
        .collect();

    prioritized.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.0.unit.kind.cmp(&a.0.unit.kind))
            .then_with(|| a.0.location.cmp(&b.0.location))
    });

    prioritized
        .into_iter()
        .take(owed)
        .map(|(unit, _)| unit)
        .collect()
}
