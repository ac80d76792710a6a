//! Convoy matching and sea-route search.

use crate::geo::{Location, Map, ProvinceId};
use crate::order::{MainCommand, MainOrder};
use crate::unit::{Deployment, UnitKind};

use super::resolver::{Context, ResolverState};
use super::OrderId;

/// Does `carrier` offer to ferry exactly the move `mv` makes?
pub(crate) fn is_carrier_for(carrier: &MainOrder, mv: &MainOrder) -> bool {
    if mv.unit_kind != UnitKind::Army {
        return false;
    }

    match (&carrier.command, &mv.command) {
        (MainCommand::Convoy(from, to), MainCommand::Move(dest)) => {
            from == &mv.location && to == dest
        }
        _ => false,
    }
}

/// Depth-first search for a chain of carrier fleets linking `origin` to a
/// province adjacent to `dest`. Carriers are identified by location; a
/// chain never revisits a fleet.
fn chain_exists(
    map: &Map,
    carriers: &[&Location],
    origin: &ProvinceId,
    dest: &ProvinceId,
    visited: &mut Vec<Location>,
) -> bool {
    let neighbors = map.neighbors_of_province(origin);

    if !visited.is_empty() && neighbors.iter().any(|loc| &loc.province == dest) {
        return true;
    }

    for &carrier in carriers {
        if visited.contains(carrier) || !neighbors.contains(&carrier) {
            continue;
        }

        visited.push(carrier.clone());
        if chain_exists(map, carriers, &carrier.province, dest, visited) {
            return true;
        }
        visited.pop();
    }

    false
}

/// Is there an intact convoy route for the move? Carrier fleets are
/// resolved eagerly: a dislodged carrier contributes nothing, and the move
/// survives as long as any chain of surviving carriers connects origin to
/// destination.
pub(crate) fn route_exists(ctx: &Context, state: &mut ResolverState, mv_id: OrderId) -> bool {
    let mv = ctx.order(mv_id);
    let Some(dest) = mv.move_dest() else {
        return false;
    };
    if mv.unit_kind != UnitKind::Army {
        return false;
    }

    // Resolving every matching carrier up front keeps the depth-first
    // search from recursing through half-resolved convoys.
    let mut carriers = Vec::new();
    for id in ctx.ids() {
        if is_carrier_for(ctx.order(id), mv) && bool::from(state.resolve(ctx, id)) {
            carriers.push(&ctx.order(id).location);
        }
    }

    chain_exists(
        ctx.map,
        &carriers,
        &mv.location.province,
        &dest.province,
        &mut Vec::new(),
    )
}

/// Could a convoy route be assembled for this move if every fleet at sea
/// were ordered to carry it? Used before resolution to tell a merely
/// disrupted convoy from a destination no convoy could ever reach, and by
/// the parser to judge a move's plausibility at submission time.
pub fn route_may_exist(map: &Map, deployment: &Deployment, mv: &MainOrder) -> bool {
    if mv.unit_kind != UnitKind::Army {
        return false;
    }
    let Some(dest) = mv.move_dest() else {
        return false;
    };

    let fleets: Vec<&Location> = deployment
        .iter()
        .filter(|u| u.kind() == UnitKind::Fleet && map.is_open_sea(&u.location))
        .map(|u| &u.location)
        .collect();

    chain_exists(
        map,
        &fleets,
        &mv.location.province,
        &dest.province,
        &mut Vec::new(),
    )
}
