//! Enumeration of the orders the current phase accepts for one unit.

use std::collections::BTreeSet;

use crate::game::Game;
use crate::geo::{Location, Map, ProvinceId, Terrain};
use crate::time::PhaseKind;
use crate::unit::{UnitKind, UnitPosition};

/// Every order string the current phase would accept for the unit at (or
/// the build site of) `at`. Strings are in the submission grammar, sorted
/// and de-duplicated.
pub(crate) fn legal_orders(game: &Game, map: &Map, at: &Location) -> Vec<String> {
    let mut out = BTreeSet::new();

    match game.phase.kind {
        PhaseKind::Movement => {
            if let Some(unit) = game.deployment.occupier_of(&at.province) {
                movement_orders(game, map, unit, &mut out);
            }
        }
        PhaseKind::Retreat => retreat_orders(game, at, &mut out),
        PhaseKind::Adjustment => adjustment_orders(game, map, at, &mut out),
    }

    out.into_iter().collect()
}

fn movement_orders(game: &Game, map: &Map, unit: &UnitPosition, out: &mut BTreeSet<String>) {
    let me = format!("{} {}", unit.kind(), unit.location);
    out.insert(format!("{me} H"));

    // Direct moves.
    let mut dests: BTreeSet<Location> = map
        .borders_of(&unit.location)
        .into_iter()
        .filter(|b| b.passable_by(unit.kind()))
        .filter_map(|b| b.dest_from(&unit.location).cloned())
        .collect();

    // Convoyed destinations: any other coastal province an army could be
    // carried to by the fleets now at sea.
    if unit.kind() == UnitKind::Army {
        for site in map.sites() {
            let is_coastal_main =
                site.location.coast.is_none() && site.terrain == Terrain::Coast;
            if !is_coastal_main || site.location.province == unit.location.province {
                continue;
            }
            let mv = crate::order::Order::new(
                unit.power().clone(),
                UnitKind::Army,
                unit.location.clone(),
                crate::order::MainCommand::Move(site.location.clone()),
            );
            if crate::adjudicator::convoy_plausible(map, &game.deployment, &mv) {
                dests.insert(site.location.clone());
            }
        }
    }

    for dest in &dests {
        out.insert(format!("{me} - {dest}"));
    }

    // Supports: for every other unit, a hold-support if we can reach its
    // province, and a move-support for every destination both of us can
    // reach.
    for other in game.deployment.iter() {
        if other.province() == unit.province() {
            continue;
        }

        let other_ref = format!("{} {}", other.kind(), other.location);
        if reaches(map, unit, other.province()) {
            out.insert(format!("{me} S {other_ref}"));
        }

        for dest in map
            .borders_of(&other.location)
            .into_iter()
            .filter(|b| b.passable_by(other.kind()))
            .filter_map(|b| b.dest_from(&other.location))
        {
            if dest.province != unit.location.province && reaches(map, unit, &dest.province) {
                out.insert(format!("{me} S {other_ref} - {dest}"));
            }
        }
    }

    // Convoys: a fleet in open sea may offer to carry any army that could
    // travel over a chain passing through it.
    if unit.kind() == UnitKind::Fleet && map.is_open_sea(&unit.location) {
        for army in game
            .deployment
            .iter()
            .filter(|u| u.kind() == UnitKind::Army)
        {
            for site in map.sites() {
                let is_coastal_main =
                    site.location.coast.is_none() && site.terrain == Terrain::Coast;
                if !is_coastal_main || site.location.province == army.location.province {
                    continue;
                }
                if chain_through(game, map, army, &site.location.province, &unit.location) {
                    out.insert(format!(
                        "{me} C A {} - {}",
                        army.location, site.location
                    ));
                }
            }
        }
    }
}

fn retreat_orders(game: &Game, at: &Location, out: &mut BTreeSet<String>) {
    let Some(dislodged) = game
        .pending_retreats
        .iter()
        .find(|d| d.unit.province() == &at.province)
    else {
        return;
    };

    let me = format!("{} {}", dislodged.unit.kind(), dislodged.unit.location);
    out.insert(format!("{me} D"));
    for dest in dislodged.allowed() {
        out.insert(format!("{me} - {dest}"));
    }
}

fn adjustment_orders(game: &Game, map: &Map, at: &Location, out: &mut BTreeSet<String>) {
    let province = &at.province;

    if let Some(unit) = game.deployment.occupier_of(province) {
        let budget = game.centers_of(unit.power()) as i32
            - game.deployment.count_of(unit.power()) as i32;
        if budget < 0 {
            out.insert(format!("DESTROY {} {}", unit.kind(), unit.location));
        }
        return;
    }

    // Vacant: a build site if it's somebody's owned home center and that
    // power has builds coming.
    let Some(owner) = game.ownerships.get(province) else {
        return;
    };
    if !map.home_centers(owner).contains(province) {
        return;
    }
    let budget = game.centers_of(owner) as i32 - game.deployment.count_of(owner) as i32;
    if budget <= 0 {
        return;
    }

    if map
        .terrain_of(&Location::from(province))
        .is_some_and(|t| UnitKind::Army.can_occupy(t))
    {
        out.insert(format!("BUILD A {province}"));
    }

    let coasts = map.coasts(province);
    if coasts.is_empty() {
        if map
            .terrain_of(&Location::from(province))
            .is_some_and(|t| UnitKind::Fleet.can_occupy(t))
        {
            out.insert(format!("BUILD F {province}"));
        }
    } else {
        for coast in coasts {
            out.insert(format!("BUILD F {}", Location::new(province.clone(), coast)));
        }
    }
}

fn reaches(map: &Map, unit: &UnitPosition, province: &ProvinceId) -> bool {
    map.borders_joining(&unit.location, province)
        .iter()
        .any(|b| b.passable_by(unit.kind()))
}

/// Does some simple convoy chain from the army to the destination pass
/// through the given sea site? Depth-first over the fleets now at sea.
fn chain_through(
    game: &Game,
    map: &Map,
    army: &UnitPosition,
    dest: &ProvinceId,
    via: &Location,
) -> bool {
    let fleets: Vec<&Location> = game
        .deployment
        .iter()
        .filter(|u| u.kind() == UnitKind::Fleet && map.is_open_sea(&u.location))
        .map(|u| &u.location)
        .collect();

    fn search(
        map: &Map,
        fleets: &[&Location],
        here: &ProvinceId,
        dest: &ProvinceId,
        via: &Location,
        path: &mut Vec<Location>,
    ) -> bool {
        let neighbors = map.neighbors_of_province(here);
        if !path.is_empty()
            && path.iter().any(|l| l == via)
            && neighbors.iter().any(|l| &l.province == dest)
        {
            return true;
        }

        for &fleet in fleets {
            if path.contains(fleet) || !neighbors.contains(&fleet) {
                continue;
            }
            path.push(fleet.clone());
            if search(map, fleets, &fleet.province, dest, via, path) {
                return true;
            }
            path.pop();
        }

        false
    }

    search(
        map,
        &fleets,
        &army.location.province,
        dest,
        via,
        &mut Vec::new(),
    )
}
