//! The standard-rulebook judgments for each order kind. These functions
//! answer "does this order achieve its effect, and why", calling back into
//! the resolver for every other order whose fate matters.

use crate::order::MainCommand;

use super::outcome::{ConvoyOutcome, HoldOutcome, MoveOutcome, OrderOutcome, OrderState, SupportOutcome};
use super::resolver::{Context, ResolverState};
use super::strength::{Prevent, Strength};
use super::{paths, supports, OrderId};

/// Determine the success of an order. Must agree with [`explain`].
pub(crate) fn adjudicate(ctx: &Context, state: &mut ResolverState, id: OrderId) -> OrderState {
    explain(ctx, state, id).state()
}

/// Determine the outcome of an order with enough detail to report why.
pub(crate) fn explain(ctx: &Context, state: &mut ResolverState, id: OrderId) -> OrderOutcome {
    match ctx.order(id).command {
        MainCommand::Hold => judge_hold(ctx, state, id).into(),
        MainCommand::Move(_) => judge_move(ctx, state, id).into(),
        MainCommand::SupportHold(..) | MainCommand::SupportMove(..) => {
            judge_support(ctx, state, id).into()
        }
        MainCommand::Convoy(..) => judge_convoy(ctx, state, id).into(),
    }
}

fn judge_hold(ctx: &Context, state: &mut ResolverState, id: OrderId) -> HoldOutcome {
    match paths::dislodger_of(ctx, state, id) {
        Some(dislodger) => HoldOutcome::Dislodged(dislodger),
        None => HoldOutcome::Stands,
    }
}

fn judge_move(ctx: &Context, state: &mut ResolverState, id: OrderId) -> MoveOutcome {
    let order = ctx.order(id);
    let dest = order
        .move_dest()
        .expect("only moves reach the move judgment");

    if !paths::path_exists(ctx, state, id) {
        return MoveOutcome::NoPath;
    }

    let mut atk_supports = supports::find_for(ctx, state, id);
    let mut atk_strength = 1 + atk_supports.len();
    let prevent = paths::max_prevent(ctx, state, id);

    // An attack that cannot beat the strongest rival even in the best case
    // has already failed; stopping here keeps three-way circular bounces
    // from over-resolving.
    if atk_strength <= prevent.strength() {
        return prevented_by(prevent);
    }

    if let Some(occupier) = ctx.order_in_province(&dest.province) {
        let occupier_order = ctx.order(occupier);
        let head_to_head = paths::is_head_to_head(ctx, state, id, occupier);

        // Resistance and head-to-head strength are computed separately:
        // defense counts every support, but a head-to-head blow cannot be
        // dealt with the help of the victim's own power.
        let (resistance, h2h_strength) = if !occupier_order.is_move() || head_to_head {
            let mut resisting = supports::find_for(ctx, state, occupier);
            let resistance = 1 + resisting.len();

            if head_to_head {
                resisting.retain(|&s| ctx.order(s).power != order.power);
                (resistance, 1 + resisting.len())
            } else {
                (resistance, 0)
            }
        } else if !bool::from(state.resolve(ctx, occupier)) {
            // A failed exit leaves the trapped unit resisting with its own
            // weight.
            (1, 0)
        } else {
            // A successful exit mounts no resistance.
            (0, 0)
        };

        if resistance > 0 {
            // A unit may not dislodge a countryman, whatever the strengths.
            if order.power == occupier_order.power {
                return MoveOutcome::FriendlyFire;
            }

            let self_defense = atk_strength;

            // Support donated by the defender's own power cannot help
            // dislodge the defender; discount it and re-test the prevents.
            atk_supports.retain(|&s| ctx.order(s).power != occupier_order.power);
            atk_strength = 1 + atk_supports.len();

            if atk_strength <= prevent.strength() {
                return prevented_by(prevent);
            }

            if self_defense < h2h_strength {
                return MoveOutcome::LostHeadToHead;
            }

            if atk_strength <= resistance {
                return MoveOutcome::Repelled;
            }
        }
    }

    MoveOutcome::Succeeds
}

fn prevented_by(prevent: Option<Prevent>) -> MoveOutcome {
    match prevent {
        Some(Prevent::Prevents(rival, _)) => MoveOutcome::Prevented(rival),
        // Prevents with zero strength never outweigh an attack, so a
        // prevented move always names a real rival.
        _ => unreachable!("a prevented move must have a preventing rival"),
    }
}

fn judge_support(ctx: &Context, state: &mut ResolverState, id: OrderId) -> SupportOutcome {
    if !supports::can_reach(ctx.map, ctx.order(id)) {
        return SupportOutcome::CantReach;
    }

    match supports::find_cutter(ctx, state, id) {
        Some(cutter) => SupportOutcome::CutBy(cutter),
        None => SupportOutcome::NotDisrupted,
    }
}

fn judge_convoy(ctx: &Context, state: &mut ResolverState, id: OrderId) -> ConvoyOutcome {
    let order = ctx.order(id);

    // Convoys only operate from open sea; the coast sites of dual-coast
    // provinces don't qualify even though their terrain reads as sea.
    if !ctx.map.is_open_sea(&order.location) {
        return ConvoyOutcome::NotAtSea;
    }

    if let Some(dislodger) = paths::dislodger_of(ctx, state, id) {
        return ConvoyOutcome::Dislodged(dislodger);
    }

    if state.in_paradox(id) {
        ConvoyOutcome::Paradox
    } else {
        ConvoyOutcome::NotDisrupted
    }
}
