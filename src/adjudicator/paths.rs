//! Path, prevent-strength, and dislodgement queries shared by the rules.

use crate::geo::ProvinceId;

use super::resolver::{Context, ResolverState};
use super::strength::{Prevent, Strength};
use super::{convoys, supports, OrderId};

/// True when the move has a way to its destination: a passable border for
/// direct travel, or an intact convoy chain.
pub(crate) fn path_exists(ctx: &Context, state: &mut ResolverState, id: OrderId) -> bool {
    let order = ctx.order(id);
    let Some(dest) = order.move_dest() else {
        return false;
    };

    let Some(terrain) = ctx.map.terrain_of(dest) else {
        return false;
    };
    if !order.unit_kind.can_occupy(terrain) {
        return false;
    }

    let direct = ctx
        .map
        .border_between(&order.location, dest)
        .is_some_and(|b| b.passable_by(order.unit_kind));

    // A direct route short-circuits convoy assessment; assessing anyway
    // would entangle resolutions that have no business depending on the
    // convoy's fate.
    direct || convoys::route_exists(ctx, state, id)
}

/// Did the move actually travel by sea? Only meaningful for successful
/// moves; retreat rules use it to tell whether the dislodger's origin is
/// barred.
pub(crate) fn moved_via_convoy(ctx: &Context, state: &mut ResolverState, id: OrderId) -> bool {
    let order = ctx.order(id);
    let Some(dest) = order.move_dest() else {
        return false;
    };

    let direct = ctx
        .map
        .border_between(&order.location, dest)
        .is_some_and(|b| b.passable_by(order.unit_kind));

    !direct && convoys::route_exists(ctx, state, id)
}

/// Two orders fight head-to-head when their moves mirror each other and no
/// convoy offers either a way around.
pub(crate) fn is_head_to_head(
    ctx: &Context,
    state: &mut ResolverState,
    a: OrderId,
    b: OrderId,
) -> bool {
    let first = ctx.order(a);
    let second = ctx.order(b);

    let mirrored = first.move_dest() != Some(&first.location)
        && first.move_dest().map(|d| &d.province) == Some(&second.location.province)
        && second.move_dest().map(|d| &d.province) == Some(&first.location.province);

    mirrored
        && !convoys::route_exists(ctx, state, a)
        && !convoys::route_exists(ctx, state, b)
}

fn prevent_result(ctx: &Context, state: &mut ResolverState, id: OrderId) -> Option<Prevent> {
    if !ctx.order(id).is_move() {
        return None;
    }

    if !path_exists(ctx, state, id) {
        return Some(Prevent::NoPath);
    }

    // A unit beaten in a head-to-head battle exerts no force at its
    // destination.
    if let Some(winner) = ctx
        .ids()
        .find(|&other| is_head_to_head(ctx, state, other, id))
    {
        if bool::from(state.resolve(ctx, winner)) {
            return Some(Prevent::LostHeadToHead);
        }
    }

    Some(Prevent::Prevents(id, supports::find_for(ctx, state, id)))
}

/// Every prevent force applied at a province, with supporters.
pub(crate) fn prevents_at(
    ctx: &Context,
    state: &mut ResolverState,
    province: &ProvinceId,
) -> Vec<Prevent> {
    ctx.ids()
        .filter(|&id| ctx.order(id).is_move_to_province(province))
        .filter_map(|id| prevent_result(ctx, state, id))
        .collect()
}

/// The strongest competing prevent against `id` at its destination.
pub(crate) fn max_prevent(ctx: &Context, state: &mut ResolverState, id: OrderId) -> Option<Prevent> {
    let dest = &ctx.order(id).move_dest()?.province;

    let mut best = None;
    let mut best_strength = 0;
    for rival in ctx
        .ids()
        .filter(|&r| r != id && ctx.order(r).is_move_to_province(dest))
    {
        if is_head_to_head(ctx, state, rival, id) && bool::from(state.resolve(ctx, rival)) {
            if best.is_none() {
                best = Some(Prevent::LostHeadToHead);
            }
            continue;
        }

        if let Some(prevent) = prevent_result(ctx, state, rival) {
            let strength = prevent.strength();
            if strength >= best_strength {
                best_strength = strength;
                best = Some(prevent);
            }
        }
    }

    best
}

/// The order that dislodges `id`'s unit, if any.
pub(crate) fn dislodger_of(
    ctx: &Context,
    state: &mut ResolverState,
    id: OrderId,
) -> Option<OrderId> {
    let order = ctx.order(id);
    for invader in ctx
        .ids()
        .filter(|&i| ctx.order(i).is_move_to_province(&order.location.province))
    {
        // A unit that vacated its province cannot be dislodged. The check
        // is deferred until an invader shows up so that it doesn't trigger
        // needless resolutions.
        if order.is_move() && bool::from(state.resolve(ctx, id)) {
            return None;
        }

        if bool::from(state.resolve(ctx, invader)) {
            return Some(invader);
        }
    }

    None
}
