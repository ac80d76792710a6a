//! Adjustment-phase resolution: builds, disbands, civil disorder.

#[path = "./util.rs"]
mod util;

use std::collections::HashMap;

use entente::adjudicator::build::{resolve, AdjustResult, AdjustmentSetup};
use entente::geo::{standard_map, ProvinceId};
use entente::power::Power;
use entente::unit::Deployment;

struct World {
    ownerships: HashMap<ProvinceId, Power>,
    deployment: Deployment,
}

impl World {
    fn new() -> Self {
        World {
            ownerships: HashMap::new(),
            deployment: Deployment::default(),
        }
    }

    fn owns(mut self, power: &str, provinces: &[&str]) -> Self {
        for p in provinces {
            self.ownerships.insert((*p).into(), power.into());
        }
        self
    }

    fn unit(mut self, position: &str) -> Self {
        self.deployment.place(position.parse().unwrap());
        self
    }

    fn setup(&self) -> AdjustmentSetup {
        AdjustmentSetup {
            map: standard_map(),
            ownerships: &self.ownerships,
            deployment: &self.deployment,
        }
    }
}

#[test]
fn build_in_owned_vacant_home_center() {
    let world = World::new().owns("FRA", &["par", "bre", "mar"]).unit("FRA: A mar");
    let order = util::adjust_ord("FRA: BUILD A par");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::Succeeds));
    assert!(outcome
        .final_deployment()
        .occupier_of(&"par".into())
        .is_some());
}

#[test]
fn build_outside_home_centers_fails() {
    let world = World::new().owns("FRA", &["par", "bre", "spa"]).unit("FRA: A par");
    let order = util::adjust_ord("FRA: BUILD A spa");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::InvalidSite));
}

#[test]
fn build_in_foreign_controlled_home_center_fails() {
    let world = World::new()
        .owns("GER", &["bre"])
        .owns("FRA", &["par", "mar"])
        .unit("FRA: A mar");
    let order = util::adjust_ord("FRA: BUILD F bre");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::ForeignControlled));
}

#[test]
fn build_in_occupied_center_fails() {
    let world = World::new()
        .owns("FRA", &["par", "bre"])
        .unit("FRA: A par");
    let order = util::adjust_ord("FRA: BUILD A par");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::Occupied));
}

#[test]
fn fleet_build_inland_fails() {
    let world = World::new().owns("FRA", &["par", "bre"]).unit("FRA: A bre");
    let order = util::adjust_ord("FRA: BUILD F par");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::InvalidTerrain));
}

#[test]
fn fleet_build_in_split_coast_center_needs_a_coast() {
    let world = World::new().owns("RUS", &["stp", "mos", "war"]).unit("RUS: A mos");

    let coastless = util::adjust_ord("RUS: BUILD F stp");
    let outcome = resolve(&world.setup(), &[coastless.clone()]);
    assert_eq!(outcome.get(&coastless), Some(AdjustResult::InvalidTerrain));

    let coastal = util::adjust_ord("RUS: BUILD F stp/nc");
    let outcome = resolve(&world.setup(), &[coastal.clone()]);
    assert_eq!(outcome.get(&coastal), Some(AdjustResult::Succeeds));
}

#[test]
fn builds_stop_at_the_budget() {
    // Budget is 3 - 1 = 2; the third build bounces.
    let world = World::new().owns("FRA", &["par", "bre", "mar"]).unit("FRA: A gas");
    let first = util::adjust_ord("FRA: BUILD A par");
    let second = util::adjust_ord("FRA: BUILD F bre");
    let third = util::adjust_ord("FRA: BUILD A mar");

    let outcome = resolve(
        &world.setup(),
        &[first.clone(), second.clone(), third.clone()],
    );
    assert_eq!(outcome.get(&first), Some(AdjustResult::Succeeds));
    assert_eq!(outcome.get(&second), Some(AdjustResult::Succeeds));
    assert_eq!(outcome.get(&third), Some(AdjustResult::BudgetExhausted));
}

#[test]
fn power_owing_disbands_cannot_build() {
    let world = World::new()
        .owns("FRA", &["par"])
        .unit("FRA: A mar")
        .unit("FRA: A gas");
    let order = util::adjust_ord("FRA: BUILD A par");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::NoAdjustmentDue));
}

#[test]
fn ordered_disband_removes_the_unit() {
    let world = World::new()
        .owns("FRA", &["par"])
        .unit("FRA: A mar")
        .unit("FRA: A gas");
    let order = util::adjust_ord("FRA: DESTROY A gas");
    let outcome = resolve(&world.setup(), &[order.clone()]);

    assert_eq!(outcome.get(&order), Some(AdjustResult::Succeeds));
    assert!(outcome.final_deployment().occupier_of(&"gas".into()).is_none());
    assert!(outcome.civil_disorder().is_empty());
}

#[test]
fn civil_disorder_disbands_farthest_fleets_first_then_alphabetical() {
    // France controls 4 centers and owns 6 units, and says nothing. The
    // two units farthest from any French home center go: the fleet in the
    // Aegean (four steps out) first, then the army in Tyrolia (two steps,
    // farther than Piedmont, Burgundy, and Gascony at one).
    let world = World::new()
        .owns("FRA", &["par", "bre", "mar", "spa"])
        .unit("FRA: A par")
        .unit("FRA: A bur")
        .unit("FRA: A pie")
        .unit("FRA: A tyr")
        .unit("FRA: F aeg")
        .unit("FRA: A gas");

    let outcome = resolve(&world.setup(), &[]);
    let removed: Vec<String> = outcome
        .civil_disorder()
        .iter()
        .map(|u| u.location.to_string())
        .collect();

    assert_eq!(removed, ["aeg", "tyr"]);
    assert_eq!(outcome.final_deployment().len(), 4);
}

#[test]
fn civil_disorder_prefers_fleets_on_ties() {
    // Italy keeps one center (Rome) and owns four units, so three must
    // go. Venice and Naples sit in home centers (distance zero); Tuscany
    // and Apulia are both one step from a home center. On that tie the
    // fleet disbands before the army; among the remaining armies the
    // alphabetically first province goes.
    let world = World::new()
        .owns("ITA", &["rom"])
        .unit("ITA: A ven")
        .unit("ITA: F tus")
        .unit("ITA: A nap")
        .unit("ITA: A apu");

    let outcome = resolve(&world.setup(), &[]);
    let removed: Vec<String> = outcome
        .civil_disorder()
        .iter()
        .map(|u| u.location.to_string())
        .collect();

    assert_eq!(removed, ["tus", "apu", "nap"]);
}
