//! The coordinator surface: lifecycle, order submission, processing,
//! history, and the store invariants behind them.

use std::sync::Arc;

use async_trait::async_trait;
use entente::config::Config;
use entente::error::{Error, StateConflict};
use entente::game::{GameId, GameStatus};
use entente::notify::{Event, Notifier};
use entente::power::Power;
use entente::service::Core;
use entente::store::{SqliteStore, Store};
use entente::time::Phase;
use tokio::sync::Mutex;

struct Recorder(Mutex<Vec<Event>>);

impl Recorder {
    fn new() -> Arc<Self> {
        Arc::new(Recorder(Mutex::new(Vec::new())))
    }

    async fn events(&self) -> Vec<Event> {
        self.0.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for Recorder {
    async fn notify(&self, event: Event) {
        self.0.lock().await.push(event);
    }
}

async fn core_with(config: Config) -> (Arc<Core>, Arc<Recorder>) {
    let store = Arc::new(SqliteStore::in_memory().await.expect("in-memory store"));
    let recorder = Recorder::new();
    let core = Arc::new(Core::new(store, recorder.clone(), config));
    (core, recorder)
}

async fn core() -> (Arc<Core>, Arc<Recorder>) {
    core_with(Config::default()).await
}

const POWERS: [&str; 7] = ["AUS", "ENG", "FRA", "GER", "ITA", "RUS", "TUR"];

/// Create a game and fill all seven seats; users are 100..107.
async fn full_game(core: &Core) -> GameId {
    let id = core.create_game("standard").await.expect("create");
    for (i, power) in POWERS.iter().enumerate() {
        core.join_game(id, 100 + i as i64, &Power::from(*power))
            .await
            .expect("join");
    }
    id
}

fn user_of(power: &str) -> i64 {
    100 + POWERS.iter().position(|p| *p == power).unwrap() as i64
}

#[tokio::test]
async fn create_and_fill_a_game() {
    let (core, recorder) = core().await;
    let id = full_game(&core).await;

    let state = core.get_state(id).await.unwrap();
    assert_eq!(state.status, GameStatus::Active);
    assert_eq!(state.units.len(), 22);
    assert_eq!(state.phase, "S1901M".parse::<Phase>().unwrap());

    let events = recorder.events().await;
    assert!(matches!(events[0], Event::GameCreated { .. }));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::GameJoined { .. }))
            .count(),
        7
    );
}

#[tokio::test]
async fn joining_a_taken_power_is_refused() {
    let (core, _) = core().await;
    let id = core.create_game("standard").await.unwrap();
    core.join_game(id, 1, &Power::from("FRA")).await.unwrap();

    let err = core.join_game(id, 2, &Power::from("FRA")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict(StateConflict::PowerTaken(_))
    ));

    let err = core.join_game(id, 1, &Power::from("GER")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict(StateConflict::AlreadyJoined(1))
    ));
}

#[tokio::test]
async fn joining_a_running_game_is_refused() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let err = core.join_game(id, 999, &Power::from("FRA")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(StateConflict::NotForming)));
}

#[tokio::test]
async fn replace_needs_an_abandoned_seat() {
    let (core, _) = core().await;
    let id = full_game(&core).await;
    let fra = Power::from("FRA");

    let err = core.replace_player(id, &fra, 999).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(StateConflict::SeatAssigned)));

    core.quit_game(id, user_of("FRA")).await.unwrap();
    core.replace_player(id, &fra, 999).await.unwrap();

    let state = core.get_state(id).await.unwrap();
    let slot = state.slots.iter().find(|s| s.power == fra).unwrap();
    assert_eq!(slot.user, Some(999));
    assert!(slot.active);
}

#[tokio::test]
async fn orders_are_validated_and_stored() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let receipts = core
        .submit_orders(
            id,
            user_of("FRA"),
            &["A par - bur, F bre - mao, A mar - gas".to_string()],
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipts.len(), 3);
    assert!(receipts.iter().all(|r| r.result.is_ok()));

    let stored = core
        .get_orders(id, Some(&Power::from("FRA")))
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn rejected_orders_carry_a_reason_and_are_not_stored() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let receipts = core
        .submit_orders(
            id,
            user_of("FRA"),
            &["A par - mun".to_string(), "A lon - wal".to_string()],
            None,
        )
        .await
        .unwrap();

    // Paris cannot reach Munich, and London is not a French unit.
    assert!(receipts.iter().all(|r| r.result.is_err()));
    let stored = core.get_orders(id, Some(&Power::from("FRA"))).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn resubmission_overwrites_per_unit() {
    let (core, _) = core().await;
    let id = full_game(&core).await;
    let user = user_of("FRA");

    core.submit_orders(id, user, &["A par - bur".to_string()], None)
        .await
        .unwrap();
    core.submit_orders(id, user, &["A par - pic".to_string()], None)
        .await
        .unwrap();

    let stored = core.get_orders_for_user(id, user).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text(), "A par - pic");
}

#[tokio::test]
async fn clear_orders_wipes_only_that_power() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    core.submit_orders(id, user_of("FRA"), &["A par - bur".to_string()], None)
        .await
        .unwrap();
    core.submit_orders(id, user_of("GER"), &["A mun - ruh".to_string()], None)
        .await
        .unwrap();

    core.clear_orders(id, user_of("FRA")).await.unwrap();

    assert!(core
        .get_orders(id, Some(&Power::from("FRA")))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(core.get_orders(id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn outsiders_cannot_submit() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let err = core
        .submit_orders(id, 4242, &["A par - bur".to_string()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { user: 4242, .. }));
}

#[tokio::test]
async fn stale_phase_submissions_are_rejected() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let spring: Phase = "S1901M".parse().unwrap();
    core.process_phase(id).await.unwrap();

    let err = core
        .submit_orders(
            id,
            user_of("FRA"),
            &["A par - bur".to_string()],
            Some(spring),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict(StateConflict::PhaseMismatch { .. })
    ));
}

#[tokio::test]
async fn processing_advances_the_game_and_notifies() {
    let (core, recorder) = core().await;
    let id = full_game(&core).await;

    core.submit_orders(id, user_of("FRA"), &["A par - bur".to_string()], None)
        .await
        .unwrap();

    let outcome = core.process_phase(id).await.unwrap();
    assert_eq!(outcome.records.len(), 1);

    let state = core.get_state(id).await.unwrap();
    assert_eq!(state.phase, "F1901M".parse::<Phase>().unwrap());
    assert_eq!(state.turn, 1);
    assert!(state
        .units
        .iter()
        .any(|u| u.location == "bur".parse().unwrap()));

    let events = recorder.events().await;
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::TurnProcessed { turn: 1, .. })));
}

#[tokio::test]
async fn history_is_recorded_and_append_only() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    core.process_phase(id).await.unwrap();
    core.process_phase(id).await.unwrap();

    let history = core.get_phase_history(id, None, None).await.unwrap();
    // Spring, Fall, and the no-op adjustment of a quiet year.
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].turn, 1);
    assert_eq!(history[2].phase, "F1901A".parse::<Phase>().unwrap());

    // Re-recording an already-recorded turn violates the append-only key.
    let game = core.store().get_game(id).await.unwrap();
    let err = core.store().apply_phase(&game, &history[..1]).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn game_state_round_trips_through_the_store() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    core.process_phase(id).await.unwrap();

    let before = core.store().get_game(id).await.unwrap();
    core.store().save_game(&before).await.unwrap();
    let after = core.store().get_game(id).await.unwrap();

    assert_eq!(before.phase, after.phase);
    assert_eq!(before.turn, after.turn);
    assert_eq!(before.deployment, after.deployment);
    assert_eq!(before.ownerships, after.ownerships);
    assert_eq!(before.slots, after.slots);
}

#[tokio::test]
async fn legal_orders_for_an_opening_unit() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    let legal = core
        .get_legal_orders(id, &"par".parse().unwrap())
        .await
        .unwrap();

    assert!(legal.contains(&"A par H".to_string()));
    assert!(legal.contains(&"A par - bur".to_string()));
    assert!(legal.contains(&"A par S A mar - bur".to_string()));
    assert!(!legal.iter().any(|o| o.contains("- mun")));
}

#[tokio::test]
async fn channel_bindings_survive() {
    let (core, _) = core().await;
    let id = full_game(&core).await;

    core.register_user(7, "nibbler").await.unwrap();
    core.bind_channel("chat-42", id).await.unwrap();

    assert_eq!(core.channel_games("chat-42").await.unwrap(), vec![id]);
    assert!(core.channel_games("chat-闇").await.unwrap().is_empty());
}
