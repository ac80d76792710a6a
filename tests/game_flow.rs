//! The per-game state machine: phase sequencing, supply-center ownership,
//! builds, and victory.

#[path = "./util.rs"]
mod util;

use entente::game::{Game, GameStatus};
use entente::geo::standard_map;
use entente::order::AnyOrder;
use entente::time::Phase;

fn active_game() -> Game {
    let map = standard_map();
    let mut game = Game::forming(1, "standard", map);
    for (i, slot) in game.slots.iter_mut().enumerate() {
        slot.user = Some(i as i64 + 100);
        slot.active = true;
    }
    game.begin(map);
    game
}

fn movement(orders: &[&str]) -> Vec<AnyOrder> {
    orders.iter().map(|s| AnyOrder::Movement(util::ord(s))).collect()
}

#[test]
fn opening_state() {
    let game = active_game();
    assert_eq!(game.status, GameStatus::Active);
    assert_eq!(game.phase, "S1901M".parse::<Phase>().unwrap());
    assert_eq!(game.deployment.len(), 22);
    // Every power starts owning exactly its home centers; 22 of the 34
    // centers are claimed.
    assert_eq!(game.ownerships.len(), 22);
    assert_eq!(game.centers_of(&"RUS".into()), 4);
}

#[test]
fn a_quiet_year_runs_movement_to_movement() {
    let map = standard_map();
    let mut game = active_game();

    // Spring: one army strolls into Spain, everyone else holds.
    let outcome = game.process_phase(map, &movement(&["FRA: A mar - spa"]));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].turn, 1);
    assert_eq!(game.phase, "F1901M".parse::<Phase>().unwrap());
    assert!(game
        .deployment
        .occupier_of(&"spa".into())
        .is_some_and(|u| u.power() == &"FRA".into()));

    // Spain is not owned yet; ownership only moves in Fall.
    assert_eq!(game.centers_of(&"FRA".into()), 3);

    // Fall: hold everywhere. Spain changes hands, France earns a build,
    // and the game waits in the adjustment phase.
    let outcome = game.process_phase(map, &movement(&[]));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(game.phase, "F1901A".parse::<Phase>().unwrap());
    assert_eq!(game.centers_of(&"FRA".into()), 4);

    // Winter: France builds a fleet in the port it vacated.
    let build = vec![AnyOrder::Adjustment(util::adjust_ord("FRA: BUILD F mar"))];
    let outcome = game.process_phase(map, &build);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(game.phase, "S1902M".parse::<Phase>().unwrap());
    assert_eq!(game.turn, 3);
    assert_eq!(game.deployment.count_of(&"FRA".into()), 4);
}

#[test]
fn adjustment_is_a_no_op_when_no_power_has_a_budget() {
    let map = standard_map();
    let mut game = active_game();

    game.process_phase(map, &movement(&[]));
    let outcome = game.process_phase(map, &movement(&[]));

    // Nobody moved all year, so every budget is zero and the adjustment
    // resolves in the same call as the Fall movement.
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        outcome.records[1].phase,
        "F1901A".parse::<Phase>().unwrap()
    );
    assert!(outcome.records[1].orders.is_empty());
    assert_eq!(game.phase, "S1902M".parse::<Phase>().unwrap());
    assert_eq!(game.turn, 3);
}

#[test]
fn dislodgement_inserts_a_retreat_phase() {
    let map = standard_map();
    let mut game = active_game();

    // Spring 1901: Austria walks into Galicia unopposed... except Russia
    // does too, with support, via a pre-arranged position. Use the
    // opening board: Vienna to Galicia vs Warsaw to Galicia bounces, so
    // instead set up a supported attack on Vienna itself in two seasons.
    game.process_phase(
        map,
        &movement(&["RUS: A war - gal", "AUS: A vie - boh", "AUS: A bud H"]),
    );
    assert_eq!(game.phase, "F1901M".parse::<Phase>().unwrap());

    // Fall: Galicia and Warsaw's replacement hit Budapest with support.
    let outcome = game.process_phase(
        map,
        &movement(&[
            "RUS: A gal - bud",
            "RUS: A mos - ukr",
            "AUS: A bud H",
            "RUS: F sev S A gal - bud",
        ]),
    );

    // Sevastopol cannot support into Budapest, so that support is
    // rejected in validation normally; fed directly it still cannot help
    // (unreachable), leaving a 1v1 bounce and no retreat phase.
    assert!(game.pending_retreats.is_empty());
    assert_eq!(outcome.records.len(), 2, "fall + no-op adjustment");

    // Run another year and dislodge Budapest properly.
    game.process_phase(
        map,
        &movement(&["RUS: A ukr - rum", "AUS: A bud H"]),
    );
    assert_eq!(game.phase, "F1902M".parse::<Phase>().unwrap());

    let outcome = game.process_phase(
        map,
        &movement(&[
            "RUS: A gal - bud",
            "RUS: A rum S A gal - bud",
            "AUS: A bud H",
        ]),
    );
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(game.phase, "F1902R".parse::<Phase>().unwrap());
    assert_eq!(game.pending_retreats.len(), 1);

    // The Austrian army has somewhere to go, retreats, and the year then
    // closes through adjustment.
    let retreat = vec![AnyOrder::Retreat(util::retreat_ord("AUS: A bud - ser"))];
    let outcome = game.process_phase(map, &retreat);
    assert!(game.pending_retreats.is_empty());
    assert!(game
        .deployment
        .occupier_of(&"ser".into())
        .is_some_and(|u| u.power() == &"AUS".into()));
    assert_eq!(game.phase, "F1902A".parse::<Phase>().unwrap());
    let _ = outcome;
}

#[test]
fn victory_by_center_count() {
    let map = standard_map();
    let mut game = active_game();

    // Hand France eighteen centers by fiat: every neutral, her own
    // homes, and an overrun Germany (whose armies are gone, so the Fall
    // recount cannot take the centers back).
    for province in ["ber", "kie", "mun"] {
        game.deployment.remove_from(&province.into());
    }
    let centers = [
        "par", "bre", "mar", "spa", "por", "bel", "hol", "den", "nwy", "swe", "bul", "gre", "rum",
        "ser", "tun", "ber", "kie", "mun",
    ];
    for c in centers {
        game.ownerships.insert(c.into(), "FRA".into());
    }

    game.process_phase(map, &movement(&[]));
    let outcome = game.process_phase(map, &movement(&[]));

    // France's build budget keeps the adjustment phase open; missing
    // builds simply skip, and the victory check fires.
    assert_eq!(game.phase, "F1901A".parse::<Phase>().unwrap());
    assert!(!outcome.completed);

    let outcome = game.process_phase(map, &[]);
    assert!(outcome.completed);
    assert_eq!(outcome.winner, Some("FRA".into()));
    assert_eq!(game.status, GameStatus::Completed);
    assert!(game.deadline.is_none());
}

#[test]
fn history_records_are_keyed_by_turn_and_phase() {
    let map = standard_map();
    let mut game = active_game();

    let first = game.process_phase(map, &movement(&["GER: A mun - tyr"]));
    let second = game.process_phase(map, &movement(&["GER: A tyr - vie"]));

    assert_eq!(first.records[0].turn, 1);
    assert_eq!(
        first.records[0].phase,
        "S1901M".parse::<Phase>().unwrap()
    );
    assert_eq!(second.records[0].turn, 2);
    assert_eq!(
        second.records[0].phase,
        "F1901M".parse::<Phase>().unwrap()
    );

    // The record carries the orders verbatim with their dispositions.
    assert!(first.records[0]
        .orders
        .iter()
        .any(|o| o.text == "A mun - tyr"));
}
