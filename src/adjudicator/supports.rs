//! Support matching, reach, and cutting.

use crate::geo::Map;
use crate::order::{MainCommand, MainOrder};

use super::resolver::{Context, ResolverState};
use super::{paths, OrderId};

/// Does `support` name exactly the order `target`? A hold-support covers
/// any unit that stays put (hold, support, convoy); a move-support must
/// match the move's unit, origin, and destination.
pub(crate) fn is_support_for(support: &MainOrder, target: &MainOrder) -> bool {
    match &support.command {
        MainCommand::SupportHold(kind, at) => {
            !target.is_move() && *kind == target.unit_kind && at == &target.location
        }
        MainCommand::SupportMove(kind, from, to) => match &target.command {
            MainCommand::Move(dest) => {
                *kind == target.unit_kind && from == &target.location && to == dest
            }
            _ => false,
        },
        _ => false,
    }
}

/// A support must be able to reach the province where the help lands: the
/// supported unit's own province for hold-supports, the destination for
/// move-supports.
pub(crate) fn can_reach(map: &Map, support: &MainOrder) -> bool {
    let needed_at = match &support.command {
        MainCommand::SupportHold(_, at) => &at.province,
        MainCommand::SupportMove(_, _, to) => &to.province,
        _ => return false,
    };

    map.borders_joining(&support.location, needed_at)
        .iter()
        .any(|b| b.passable_by(support.unit_kind))
}

fn cuts(ctx: &Context, state: &mut ResolverState, support_id: OrderId, cutter_id: OrderId) -> bool {
    let support = ctx.order(support_id);
    let cutter = ctx.order(cutter_id);

    let Some(dest) = cutter.move_dest() else {
        return false;
    };

    // Only attacks on the supporter's own province can cut.
    if dest.province != support.location.province {
        return false;
    }

    // Units cannot cut support offered by their own power.
    if support.power == cutter.power {
        return false;
    }

    // An attack from the very province the support is aimed at only cuts
    // by dislodging the supporter. Resolving the cutter in just this case
    // keeps the dependency cycles small.
    if let MainCommand::SupportMove(_, _, supported_dest) = &support.command {
        if cutter.location.province == supported_dest.province
            && !bool::from(state.resolve(ctx, cutter_id))
        {
            return false;
        }
    }

    // Convoyed attacks cut like any other once their path holds; paradoxes
    // arising from cutting a convoy's protection are settled by the cycle
    // breaker, not here.
    paths::path_exists(ctx, state, cutter_id)
}

/// The first order that cuts this support, if any.
pub(crate) fn find_cutter(
    ctx: &Context,
    state: &mut ResolverState,
    support_id: OrderId,
) -> Option<OrderId> {
    ctx.ids().find(|&id| cuts(ctx, state, support_id, id))
}

/// All successful supports for `target`.
pub(crate) fn find_for(
    ctx: &Context,
    state: &mut ResolverState,
    target_id: OrderId,
) -> Vec<OrderId> {
    let target = ctx.order(target_id);
    ctx.ids()
        .filter(|&id| {
            let candidate = ctx.order(id);
            is_support_for(candidate, target)
                && can_reach(ctx.map, candidate)
                && bool::from(state.resolve(ctx, id))
        })
        .collect()
}
