#![allow(dead_code)]
#![cfg(test)]

use entente::adjudicator::{MovementOutcome, Submission};
use entente::geo::standard_map;
use entente::order::{
    AdjustCommand, AdjustOrder, MainCommand, MainOrder, Order, RetreatCommand, RetreatOrder,
};
use entente::parser::{parse_orders, RawOrder};
use entente::unit::Deployment;

fn raw(s: &str) -> (String, RawOrder) {
    let (power, rest) = s.split_once(':').expect("orders start with a power prefix");
    let mut spans = parse_orders(rest);
    assert_eq!(spans.len(), 1, "'{s}' should be exactly one order");
    (
        power.trim().to_string(),
        spans.remove(0).result.unwrap_or_else(|e| panic!("'{s}': {e}")),
    )
}

/// Parse `"ENG: A lon - bel"` into a movement order without touching any
/// game state.
pub fn ord(s: &str) -> MainOrder {
    let (power, raw) = raw(s);
    let (kind, location, command) = match raw {
        RawOrder::Hold { kind, at } => (kind, at, MainCommand::Hold),
        RawOrder::Move { kind, from, to } => (kind, from, MainCommand::Move(to)),
        RawOrder::SupportHold {
            kind,
            at,
            target_kind,
            target,
        } => (kind, at, MainCommand::SupportHold(target_kind, target)),
        RawOrder::SupportMove {
            kind,
            at,
            target_kind,
            from,
            to,
        } => (kind, at, MainCommand::SupportMove(target_kind, from, to)),
        RawOrder::Convoy { kind, at, from, to, .. } => (kind, at, MainCommand::Convoy(from, to)),
        other => panic!("'{s}' is not a movement order: {other:?}"),
    };
    Order::new(power.as_str(), kind, location, command)
}

/// Parse `"FRA: A par - gas"` / `"FRA: A par D"` as a retreat order.
pub fn retreat_ord(s: &str) -> RetreatOrder {
    let (power, raw) = raw(s);
    let (kind, location, command) = match raw {
        RawOrder::Move { kind, from, to } => (kind, from, RetreatCommand::Move(to)),
        RawOrder::Disband { kind, at } => (kind, at, RetreatCommand::Disband),
        other => panic!("'{s}' is not a retreat order: {other:?}"),
    };
    Order::new(power.as_str(), kind, location, command)
}

/// Parse `"FRA: BUILD A par"` / `"FRA: DESTROY F bre"` as an adjustment
/// order.
pub fn adjust_ord(s: &str) -> AdjustOrder {
    let (power, raw) = raw(s);
    let (kind, location, command) = match raw {
        RawOrder::Build { kind, at } => (kind, at, AdjustCommand::Build),
        RawOrder::Destroy { kind, at } | RawOrder::Disband { kind, at } => {
            (kind, at, AdjustCommand::Disband)
        }
        other => panic!("'{s}' is not an adjustment order: {other:?}"),
    };
    Order::new(power.as_str(), kind, location, command)
}

/// Resolve a set of orders with unit positions inferred from the orders
/// themselves.
pub fn resolve(orders: &[&str]) -> MovementOutcome {
    let parsed = orders.iter().map(|s| ord(s)).collect();
    Submission::from_orders(parsed).resolve(standard_map())
}

/// Resolve orders against an explicit board.
pub fn resolve_with_units(units: &[&str], orders: &[&str]) -> MovementOutcome {
    let deployment: Deployment = units
        .iter()
        .map(|s| s.parse().unwrap_or_else(|_| panic!("bad unit '{s}'")))
        .collect();
    let parsed = orders.iter().map(|s| ord(s)).collect();
    Submission::new(deployment, parsed).resolve(standard_map())
}

/// Adjudicate orders and assert the expected outcome of each annotated
/// one. `=> Succeeds` / `=> Fails` follow the order text; unannotated
/// orders participate without assertion.
#[macro_export]
macro_rules! judge {
    ($($order:literal $(=> $expected:expr)?),+ $(,)?) => {{
        let outcome = util::resolve(&[$($order),+]);
        $($(
            assert_eq!(
                outcome.state_of(&util::ord($order)).expect("order should be resolved"),
                $expected,
                "{}",
                $order
            );
        )?)+
        outcome
    }};
}

/// Like [`judge!`] but with an explicit starting board.
#[macro_export]
macro_rules! judge_with_units {
    (units: [$($unit:literal),+ $(,)?], $($order:literal $(=> $expected:expr)?),+ $(,)?) => {{
        let outcome = util::resolve_with_units(&[$($unit),+], &[$($order),+]);
        $($(
            assert_eq!(
                outcome.state_of(&util::ord($order)).expect("order should be resolved"),
                $expected,
                "{}",
                $order
            );
        )?)+
        outcome
    }};
}
