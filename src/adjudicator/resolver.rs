//! The movement-phase fixed-point search.
//!
//! Order outcomes are interdependent, often cyclically: a support counts
//! only while its supporter stands, a convoyed move lives and dies with its
//! chain fleets, and whether a fleet is dislodged can depend on the very
//! move it is carrying. The resolver handles this by guessing: to resolve
//! an order it assumes failure, adjudicates under that assumption while
//! recording which other unresolved orders the answer depended on, and
//! promotes the guess to knowledge when no cycle is found. When a cycle is
//! found it retries with a success guess; agreement means the answer never
//! depended on the guess, disagreement means a genuine dependency cycle,
//! which is settled as circular movement (all moves) or by failing the
//! participating convoys (the Szykman paradox rule).
//!
//! Orders live in a slab and refer to each other by index, so the cyclic
//! dependency graph never needs cross-referencing heap objects.

use std::collections::{HashMap, HashSet};

use crate::geo::Map;
use crate::order::{MainCommand, MainOrder};

use super::outcome::OrderState;
use super::{rules, OrderId};

/// The immutable inputs of one resolution: the map and the live order slab
/// (every unit has exactly one entry; units without valid orders received
/// inserted holds).
pub(crate) struct Context<'a> {
    pub map: &'a Map,
    pub orders: &'a [MainOrder],
}

impl<'a> Context<'a> {
    pub fn new(map: &'a Map, orders: &'a [MainOrder]) -> Self {
        Context { map, orders }
    }

    pub fn order(&self, id: OrderId) -> &'a MainOrder {
        &self.orders[id]
    }

    pub fn ids(&self) -> std::ops::Range<OrderId> {
        0..self.orders.len()
    }

    /// The order issued to the unit in the given province, if any. The slab
    /// holds at most one order per province.
    pub fn order_in_province(&self, province: &crate::geo::ProvinceId) -> Option<OrderId> {
        self.ids()
            .find(|&id| &self.order(id).location.province == province)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Guessing(OrderState),
    Known(OrderState),
}

impl From<Resolution> for OrderState {
    fn from(r: Resolution) -> Self {
        match r {
            Resolution::Guessing(s) | Resolution::Known(s) => s,
        }
    }
}

/// Mutable search state. Cloned freely when speculating; a successful
/// speculation is kept wholesale via [`ResolverState::adopt`].
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolverState {
    resolutions: HashMap<OrderId, Resolution>,
    /// Convoy orders failed to break a paradox. Reported distinctly so the
    /// outcome can say why the convoy failed.
    paradoxes: HashSet<OrderId>,
    /// Guesses that have been revisited, in discovery order. A repeat
    /// appearance of the order currently being resolved signals a cycle.
    dependencies: Vec<OrderId>,
}

impl ResolverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_paradox(&self, id: OrderId) -> bool {
        self.paradoxes.contains(&id)
    }

    fn knows(&self, id: OrderId) -> bool {
        matches!(self.resolutions.get(&id), Some(Resolution::Known(_)))
    }

    /// Clone the state, assume an outcome for `id`, and adjudicate `id`
    /// under that assumption.
    fn with_guess(&self, ctx: &Context, id: OrderId, guess: OrderState) -> (Self, OrderState) {
        let mut speculation = self.clone();
        speculation
            .resolutions
            .insert(id, Resolution::Guessing(guess));
        let result = rules::adjudicate(ctx, &mut speculation, id);
        (speculation, result)
    }

    /// Keep the durable parts of a finished speculation.
    fn adopt(&mut self, speculation: Self) {
        self.resolutions = speculation.resolutions;
        self.paradoxes = speculation.paradoxes;
        self.dependencies = speculation.dependencies;
    }

    /// Settle every order in a detected dependency cycle.
    fn settle_cycle(&mut self, ctx: &Context, cycle: &[OrderId]) {
        // A cycle made entirely of moves is circular movement: everyone
        // advances one step.
        if cycle.iter().all(|&id| ctx.order(id).is_move()) {
            for &id in cycle {
                self.resolutions
                    .insert(id, Resolution::Known(OrderState::Succeeds));
            }
            return;
        }

        for &id in cycle {
            self.dependencies.pop();
            if self.knows(id) {
                continue;
            }

            if matches!(ctx.order(id).command, MainCommand::Convoy(..)) {
                self.paradoxes.insert(id);
                self.resolutions
                    .insert(id, Resolution::Known(OrderState::Fails));
            } else {
                self.resolutions.remove(&id);
            }
        }
    }

    /// Resolve whether an order succeeds or fails, updating the search
    /// state along the way.
    pub(crate) fn resolve(&mut self, ctx: &Context, id: OrderId) -> OrderState {
        match self.resolutions.get(&id) {
            Some(&Resolution::Known(state)) => state,
            Some(&Resolution::Guessing(state)) => {
                // A guess consulted again is a dependency of whatever is
                // currently being resolved.
                if !self.dependencies.contains(&id) {
                    self.dependencies.push(id);
                }
                state
            }
            None => {
                let (fail_state, fail_result) = self.with_guess(ctx, id, OrderState::Fails);

                if fail_state.dependencies.len() == self.dependencies.len() {
                    // Nothing new was depended on, so the result is real.
                    self.adopt(fail_state);
                    self.resolutions.insert(id, Resolution::Known(fail_result));
                    return fail_result;
                }

                let next_dependency = fail_state.dependencies[self.dependencies.len()];
                if next_dependency != id {
                    // The answer leans on someone else's guess. Keep the
                    // speculative state and let the cycle surface higher up.
                    self.adopt(fail_state);
                    self.resolutions
                        .insert(id, Resolution::Guessing(fail_result));
                    self.dependencies.push(id);
                    return fail_result;
                }

                // The answer depends on the guess about this very order.
                let (_, success_result) = self.with_guess(ctx, id, OrderState::Succeeds);
                if fail_result == success_result {
                    // Both guesses agree, so the cycle never mattered.
                    self.resolutions.insert(id, Resolution::Known(fail_result));
                    return fail_result;
                }

                let cycle = fail_state.dependencies[self.dependencies.len()..].to_vec();
                self.settle_cycle(ctx, &cycle);
                self.resolve(ctx, id)
            }
        }
    }
}
