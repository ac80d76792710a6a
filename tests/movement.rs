//! Movement-phase adjudication against the standard map.

#[path = "./util.rs"]
#[macro_use]
mod util;

use entente::adjudicator::{
    DestStatus, MoveOutcome, OrderOutcome, OrderState::Fails, OrderState::Succeeds, VoidReason,
};

// ---------------------------------------------------------------------
// Basic legality
// ---------------------------------------------------------------------

#[test]
fn move_to_non_neighbor_fails() {
    judge! { "ENG: F nth - pic" => Fails };
}

#[test]
fn army_cannot_enter_open_sea() {
    judge! { "ENG: A lvp - iri" => Fails };
}

#[test]
fn fleet_cannot_go_inland() {
    judge! { "GER: F kie - mun" => Fails };
}

#[test]
fn move_to_own_province_is_void() {
    let outcome = judge! { "GER: F kie - kie" => Fails };
    assert_eq!(
        outcome.get(&util::ord("GER: F kie - kie")),
        Some(OrderOutcome::Void(VoidReason::MoveToSelf))
    );
}

#[test]
fn ordering_a_foreign_unit_is_void() {
    let outcome = util::resolve_with_units(
        &["ENG: F lon"],
        &["GER: F lon - nth"],
    );
    assert_eq!(
        outcome.get(&util::ord("GER: F lon - nth")),
        Some(OrderOutcome::Void(VoidReason::ForeignUnit))
    );
}

#[test]
fn ordering_an_absent_unit_is_void() {
    let outcome = util::resolve_with_units(&["ENG: F lon"], &["ENG: F edi - nth"]);
    assert_eq!(
        outcome.get(&util::ord("ENG: F edi - nth")),
        Some(OrderOutcome::Void(VoidReason::NoUnit))
    );
}

#[test]
fn only_armies_can_be_convoyed() {
    judge! {
        "ENG: F lon - bel" => Fails,
        "ENG: F nth C A lon - bel",
    };
}

#[test]
fn supporting_yourself_in_place_is_void() {
    judge! {
        "ITA: A ven - tri" => Succeeds,
        "ITA: A tyr S A ven - tri" => Succeeds,
        "AUS: F tri S F tri" => Fails,
    };
}

#[test]
fn fleets_follow_the_coastline() {
    // Rome and Venice touch by land only; fleets cannot slip between the
    // Tyrrhenian and the Adriatic.
    judge! { "ITA: F rom - ven" => Fails };
}

#[test]
fn support_on_unreachable_destination_is_useless() {
    judge! {
        "AUS: A ven H" => Succeeds,
        "ITA: F rom S A apu - ven" => Fails,
        "ITA: A apu - ven" => Fails,
    };
}

#[test]
fn simple_bounce() {
    judge! {
        "AUS: A vie - tyr" => Fails,
        "ITA: A ven - tyr" => Fails,
    };
}

#[test]
fn three_way_bounce() {
    judge! {
        "AUS: A vie - tyr" => Fails,
        "ITA: A ven - tyr" => Fails,
        "GER: A mun - tyr" => Fails,
    };
}

// ---------------------------------------------------------------------
// Coasts
// ---------------------------------------------------------------------

#[test]
fn fleet_must_name_a_coast_when_it_matters() {
    judge! { "FRA: F por - spa" => Fails };
}

#[test]
fn wrong_coast_fails() {
    judge! { "FRA: F gas - spa(sc)" => Fails };
}

#[test]
fn right_coast_succeeds() {
    judge! { "FRA: F gas - spa(nc)" => Succeeds };
}

#[test]
fn support_may_target_an_unreachable_coast() {
    // Marseilles can only reach the south coast, but its support lands on
    // the province, so it still helps the move to the north coast.
    judge! {
        "FRA: F gas - spa(nc)" => Succeeds,
        "FRA: F mar S F gas - spa(nc)" => Succeeds,
        "ITA: F wes - spa(sc)" => Fails,
    };
}

#[test]
fn coastal_battles_are_fought_per_province() {
    // Two fleets to different coasts of Spain still collide.
    judge! {
        "FRA: F gas - spa(nc)" => Fails,
        "ITA: F wes - spa(sc)" => Fails,
    };
}

// ---------------------------------------------------------------------
// Support and cutting
// ---------------------------------------------------------------------

#[test]
fn supported_attack_dislodges() {
    let outcome = judge! {
        "RUS: A pru - ber" => Succeeds,
        "RUS: A sil S A pru - ber" => Succeeds,
        "GER: A ber H" => Fails,
    };
    assert!(outcome.is_dislodged(&"GER: A ber".parse().unwrap()));
}

#[test]
fn supported_hold_prevails() {
    judge! {
        "RUS: A pru - ber" => Fails,
        "RUS: A sil S A pru - ber" => Succeeds,
        "GER: A ber H" => Succeeds,
        "GER: A kie S A ber" => Succeeds,
    };
}

#[test]
fn support_is_cut_by_an_attack_from_elsewhere() {
    judge! {
        "RUS: A pru - ber" => Fails,
        "RUS: A sil S A pru - ber" => Fails,
        "GER: A ber H" => Succeeds,
        "AUS: A gal - sil" => Fails,
    };
}

#[test]
fn support_is_not_cut_from_the_target_province() {
    // An attack out of the province the support is aimed at only cuts by
    // dislodging the supporter.
    judge! {
        "RUS: A pru - ber" => Succeeds,
        "RUS: A sil S A pru - ber" => Succeeds,
        "GER: A ber - sil" => Fails,
    };
}

#[test]
fn own_power_cannot_cut_support() {
    judge! {
        "RUS: A pru - ber" => Succeeds,
        "RUS: A sil S A pru - ber" => Succeeds,
        "RUS: A war - sil" => Fails,
        "GER: A ber H" => Fails,
    };
}

#[test]
fn dislodged_supporter_contributes_nothing() {
    // Silesia's support is cut by the very attack that dislodges it, so
    // Prussia's move is unsupported and bounces off Berlin.
    judge! {
        "RUS: A pru - ber" => Fails,
        "RUS: A sil S A pru - ber" => Fails,
        "GER: A ber H" => Succeeds,
        "AUS: A boh - sil" => Succeeds,
        "AUS: A gal S A boh - sil" => Succeeds,
    };
}

// ---------------------------------------------------------------------
// Self-dislodgement prohibition
// ---------------------------------------------------------------------

#[test]
fn no_power_dislodges_its_own_unit() {
    judge! {
        "GER: A ber H" => Succeeds,
        "GER: A sil - ber" => Fails,
        "GER: A pru S A sil - ber" => Succeeds,
    };
}

#[test]
fn own_support_does_not_help_dislodge_own_unit() {
    // Germany's support cannot be used against the German unit in Berlin.
    judge! {
        "RUS: A pru - ber" => Fails,
        "GER: A sil S A pru - ber" => Succeeds,
        "GER: A ber H" => Succeeds,
    };
}

#[test]
fn self_standoff_keeps_both_units_in_place() {
    judge! {
        "GER: A ber - sil" => Fails,
        "GER: A mun - sil" => Fails,
    };
}

// ---------------------------------------------------------------------
// Head-to-head and swaps
// ---------------------------------------------------------------------

#[test]
fn equal_head_to_head_keeps_both_in_place() {
    judge! {
        "GER: A ber - pru" => Fails,
        "RUS: A pru - ber" => Fails,
    };
}

#[test]
fn stronger_head_to_head_dislodges() {
    let outcome = judge! {
        "GER: A ber - pru" => Succeeds,
        "GER: A sil S A ber - pru" => Succeeds,
        "RUS: A pru - ber" => Fails,
    };
    assert!(outcome.is_dislodged(&"RUS: A pru".parse().unwrap()));
}

#[test]
fn swap_is_legal_with_a_convoy() {
    judge! {
        "ENG: A nwy - swe" => Succeeds,
        "RUS: A swe - nwy" => Succeeds,
        "RUS: F ska C A swe - nwy" => Succeeds,
    };
}

#[test]
fn circular_movement_rotates() {
    judge! {
        "TUR: F ank - con" => Succeeds,
        "TUR: A con - smy" => Succeeds,
        "TUR: A smy - ank" => Succeeds,
    };
}

#[test]
fn circular_movement_bounces_as_a_whole() {
    judge! {
        "TUR: F ank - con" => Fails,
        "TUR: A con - smy" => Fails,
        "TUR: A smy - ank" => Fails,
        "TUR: A bul - con" => Fails,
    };
}

// ---------------------------------------------------------------------
// Convoys
// ---------------------------------------------------------------------

#[test]
fn convoyed_attack_with_support_dislodges() {
    let outcome = judge! {
        "ENG: F eng C A lon - bre" => Succeeds,
        "ENG: A lon - bre" => Succeeds,
        "ENG: F mao S A lon - bre" => Succeeds,
        "FRA: A bre H" => Fails,
    };
    assert!(outcome.is_dislodged(&"FRA: A bre".parse().unwrap()));
    assert!(outcome
        .survivors()
        .occupier_of(&"bre".into())
        .is_some_and(|u| u.power() == &"ENG".into()));
}

#[test]
fn unsupported_convoyed_attack_bounces_off_a_holder() {
    judge! {
        "ENG: F eng C A lon - bre" => Succeeds,
        "ENG: A lon - bre" => Fails,
        "FRA: A bre H" => Succeeds,
    };
}

#[test]
fn dislodging_the_convoy_disrupts_the_move() {
    let outcome = judge! {
        "ENG: F eng C A lon - bel" => Fails,
        "ENG: A lon - bel" => Fails,
        "FRA: F bre - eng" => Succeeds,
        "GER: F nth S F bre - eng" => Succeeds,
    };
    assert!(outcome.is_dislodged(&"ENG: F eng".parse().unwrap()));
    assert!(outcome
        .survivors()
        .occupier_of(&"lon".into())
        .is_some());
}

#[test]
fn an_alternate_chain_saves_the_convoy() {
    judge! {
        "ENG: F eng C A lon - bel" => Fails,
        "ENG: F nth C A lon - bel" => Succeeds,
        "ENG: A lon - bel" => Succeeds,
        "FRA: F bre - eng" => Succeeds,
        "FRA: F mao S F bre - eng" => Succeeds,
    };
}

#[test]
fn multi_hop_convoy_crosses_several_seas() {
    judge! {
        "ENG: A lon - nwy" => Succeeds,
        "ENG: F nth C A lon - nwy",
        "ENG: F nwg C A lon - nwy",
    };
}

#[test]
fn convoy_order_from_a_coastal_province_is_inert() {
    // A "convoy" by a fleet in port carries nobody.
    judge! {
        "ENG: F lon C A yor - bel" => Fails,
        "ENG: A yor - bel" => Fails,
    };
}

#[test]
fn convoy_without_a_matching_move_is_inert() {
    judge! {
        "ENG: F nth C A lon - bel" => Succeeds,
        "ENG: A lon H" => Succeeds,
    };
}

#[test]
fn convoyed_unit_does_not_fight_head_to_head() {
    // The army convoyed out of Norway passes the army walking in.
    judge! {
        "ENG: A nwy - swe" => Succeeds,
        "RUS: A swe - nwy" => Succeeds,
        "RUS: F ska C A swe - nwy" => Succeeds,
        "RUS: F nwg S A swe - nwy" => Succeeds,
    };
}

// ---------------------------------------------------------------------
// Beleaguered garrison
// ---------------------------------------------------------------------

#[test]
fn beleaguered_garrison_survives() {
    judge! {
        "GER: A mun H" => Succeeds,
        "AUS: A boh - mun" => Fails,
        "AUS: A tyr S A boh - mun" => Succeeds,
        "RUS: A sil - mun" => Fails,
        "RUS: A ber S A sil - mun" => Succeeds,
    };
}

// ---------------------------------------------------------------------
// Follow-in and vacated provinces
// ---------------------------------------------------------------------

#[test]
fn follower_takes_a_vacated_province() {
    let outcome = judge! {
        "AUS: A sil - war" => Succeeds,
        "AUS: A boh S A sil - war" => Succeeds,
        "RUS: A war H" => Fails,
        "RUS: A pru - sil" => Succeeds,
    };
    assert!(outcome.is_dislodged(&"RUS: A war".parse().unwrap()));
}

#[test]
fn failed_exit_resists_with_its_own_weight() {
    judge! {
        "AUS: A sil - war" => Fails,
        "RUS: A war - mos" => Fails,
        "RUS: A ukr - mos" => Fails,
    };
}

// ---------------------------------------------------------------------
// Retreat bookkeeping from the movement outcome
// ---------------------------------------------------------------------

#[test]
fn dislodged_unit_may_not_retreat_to_attacker_origin_or_contested_ground() {
    let outcome = judge! {
        "RUS: A pru - ber" => Succeeds,
        "RUS: A sil S A pru - ber" => Succeeds,
        "GER: A ber H" => Fails,
        // A standoff leaves Munich empty but contested.
        "AUS: A tyr - mun" => Fails,
        "FRA: A bur - mun" => Fails,
    };

    let dislodged = &outcome.dislodgements()[0];
    assert_eq!(dislodged.unit, "GER: A ber".parse().unwrap());
    assert_eq!(dislodged.dislodger_origin, "pru".into());

    let status_of = |name: &str| {
        dislodged
            .retreat_options
            .iter()
            .find(|o| o.location == name.parse().unwrap())
            .map(|o| o.status)
    };
    assert_eq!(status_of("pru"), Some(DestStatus::BlockedByDislodger));
    assert_eq!(status_of("sil"), Some(DestStatus::Occupied));
    assert_eq!(status_of("mun"), Some(DestStatus::Contested));
    assert_eq!(status_of("kie"), Some(DestStatus::Available));
}

#[test]
fn retreat_to_convoyed_attacker_origin_is_allowed() {
    let outcome = judge! {
        "ENG: F eng C A lon - bre" => Succeeds,
        "ENG: A lon - bre" => Succeeds,
        "ENG: F mao S A lon - bre" => Succeeds,
        "FRA: A bre H" => Fails,
    };

    let dislodged = &outcome.dislodgements()[0];
    // The attacker came by sea, so its origin province is not barred.
    assert!(dislodged.allowed().any(|l| l == &"par".parse().unwrap()));
}

#[test]
fn move_outcome_names_the_preventer() {
    let outcome = judge! {
        "AUS: A vie - tyr" => Fails,
        "ITA: A ven - tyr" => Fails,
    };
    assert!(matches!(
        outcome.get(&util::ord("AUS: A vie - tyr")),
        Some(OrderOutcome::Move(MoveOutcome::Prevented(_)))
    ));
}
