//! The game lifecycle coordinator: the programmatic surface the API/bot
//! layer drives.
//!
//! Concurrency model: games are independent. Every mutating call takes the
//! target game's lock, re-reads the game from the store, works on that
//! snapshot, and commits before the lock is released. Notifications go out
//! after commit, without the lock. Reads skip the lock and rely on the
//! store's transactions.

mod legal;
mod locks;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, StateConflict};
use crate::game::{Game, GameId, GameStatus, PhaseRecord, ProcessOutcome, UserId};
use crate::geo::{standard_map, Location, Map};
use crate::notify::{Event, Notifier};
use crate::order::AnyOrder;
use crate::parser::OrderRejection;
use crate::power::Power;
use crate::store::{Store, StoreError};
use crate::time::Phase;
use crate::unit::UnitPosition;

use self::locks::GameLocks;

/// Soft per-game budget for phase processing. Exceeding it is logged, not
/// enforced; adjudication always runs to completion.
const PROCESS_BUDGET: StdDuration = StdDuration::from_secs(5);

/// How one submitted order span fared.
#[derive(Debug)]
pub struct OrderReceipt {
    pub text: String,
    pub result: Result<AnyOrder, OrderRejection>,
}

/// A read-only view of a game for clients.
#[derive(Debug, Clone)]
pub struct GameView {
    pub id: GameId,
    pub status: GameStatus,
    pub phase: Phase,
    pub turn: u32,
    pub units: Vec<UnitPosition>,
    pub supply_centers: std::collections::HashMap<crate::geo::ProvinceId, Power>,
    pub deadline: Option<DateTime<Utc>>,
    /// Powers that have at least one order in for the current phase.
    pub orders_submitted: Vec<Power>,
    pub winner: Option<Power>,
    pub slots: Vec<crate::game::PowerSlot>,
}

/// The core service. Cheap to share behind an [`Arc`]; all methods take
/// `&self`.
pub struct Core {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    config: Config,
    locks: GameLocks,
}

impl Core {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        Core {
            store,
            notifier,
            config,
            locks: GameLocks::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn map_for(&self, name: &str) -> Result<&'static Map, Error> {
        match name {
            "standard" => Ok(standard_map()),
            other => Err(Error::UnknownMap(other.to_string())),
        }
    }

    async fn emit(&self, events: Vec<Event>) {
        for event in events {
            self.notifier.notify(event).await;
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub async fn create_game(&self, map_name: &str) -> Result<GameId, Error> {
        let map = self.map_for(map_name)?;
        let game = Game::forming(0, map_name, map);
        let id = retry(|| self.store.create_game(&game)).await?;
        info!(game = id, map = map_name, "game created");
        self.emit(vec![Event::GameCreated { game: id }]).await;
        Ok(id)
    }

    /// Claim a power in a forming game. When the last seat fills, the game
    /// starts: opening units are placed and the first deadline scheduled.
    pub async fn join_game(&self, id: GameId, user: UserId, power: &Power) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let guard = lock.lock().await;

        let mut game = retry(|| self.store.get_game(id)).await?;
        if game.status != GameStatus::Forming {
            return Err(StateConflict::NotForming.into());
        }
        if game.slot_of_user(user).is_some() {
            return Err(StateConflict::AlreadyJoined(user).into());
        }
        let map = self.map_for(&game.map_name)?;

        {
            let slot = game
                .slot_mut(power)
                .ok_or_else(|| StateConflict::UnknownPower(power.clone()))?;
            if slot.user.is_some() {
                return Err(StateConflict::PowerTaken(power.clone()).into());
            }
            slot.user = Some(user);
            slot.active = true;
        }

        if game.is_full() {
            game.begin(map);
            if let Some(secs) = game
                .turn_length_secs
                .or(self.config.default_turn_deadline_secs)
            {
                game.set_deadline(Some(Utc::now() + Duration::seconds(secs)));
            }
            info!(game = id, "all seats taken; game is under way");
        }

        retry(|| self.store.save_game(&game)).await?;
        drop(guard);

        self.emit(vec![Event::GameJoined {
            game: id,
            power: power.clone(),
            user,
        }])
        .await;
        Ok(())
    }

    /// Seat a new user at an abandoned power. Only unassigned, inactive
    /// seats can be filled this way.
    pub async fn replace_player(
        &self,
        id: GameId,
        power: &Power,
        new_user: UserId,
    ) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let guard = lock.lock().await;

        let mut game = retry(|| self.store.get_game(id)).await?;
        if game.slot_of_user(new_user).is_some() {
            return Err(StateConflict::AlreadyJoined(new_user).into());
        }

        let slot = game
            .slot_mut(power)
            .ok_or_else(|| StateConflict::UnknownPower(power.clone()))?;
        if slot.user.is_some() || slot.active {
            return Err(StateConflict::SeatAssigned.into());
        }
        slot.user = Some(new_user);
        slot.active = true;

        retry(|| self.store.save_game(&game)).await?;
        drop(guard);

        self.emit(vec![Event::PlayerReplaced {
            game: id,
            power: power.clone(),
            user: new_user,
        }])
        .await;
        Ok(())
    }

    /// Give up a seat. The power stays in the game under civil disorder
    /// until somebody takes it over.
    pub async fn quit_game(&self, id: GameId, user: UserId) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let _guard = lock.lock().await;

        let mut game = retry(|| self.store.get_game(id)).await?;
        let power = game
            .slot_of_user(user)
            .map(|s| s.power.clone())
            .ok_or(StateConflict::NotInGame(user))?;

        let slot = game.slot_mut(&power).expect("slot exists");
        slot.user = None;
        slot.active = false;

        retry(|| self.store.save_game(&game)).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Parse, validate, and store a user's orders. Each span of each input
    /// string gets its own receipt; accepted orders overwrite earlier
    /// submissions for the same unit. Pass `expected_phase` to guard
    /// against racing a phase transition: a mismatch rejects the whole
    /// submission with a state conflict.
    pub async fn submit_orders(
        &self,
        id: GameId,
        user: UserId,
        texts: &[String],
        expected_phase: Option<Phase>,
    ) -> Result<Vec<OrderReceipt>, Error> {
        let lock = self.locks.for_game(id);
        let _guard = lock.lock().await;

        let game = retry(|| self.store.get_game(id)).await?;
        if game.status != GameStatus::Active {
            return Err(StateConflict::NotActive.into());
        }
        let power = game
            .slot_of_user(user)
            .map(|s| s.power.clone())
            .ok_or(Error::Unauthorized { game: id, user })?;

        if let Some(expected) = expected_phase {
            if expected != game.phase {
                return Err(StateConflict::PhaseMismatch {
                    expected,
                    current: game.phase,
                }
                .into());
            }
        }

        let map = self.map_for(&game.map_name)?;
        let snapshot = game.snapshot(map);

        let mut receipts = Vec::new();
        for text in texts {
            for (span, result) in snapshot.validate_submission(&power, text).receipts {
                if let Ok(order) = &result {
                    retry(|| self.store.submit_order(id, game.turn, game.phase, order)).await?;
                }
                receipts.push(OrderReceipt { text: span, result });
            }
        }

        Ok(receipts)
    }

    /// Drop the calling user's orders for the current phase.
    pub async fn clear_orders(&self, id: GameId, user: UserId) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let _guard = lock.lock().await;

        let game = retry(|| self.store.get_game(id)).await?;
        let power = game
            .slot_of_user(user)
            .map(|s| s.power.clone())
            .ok_or(Error::Unauthorized { game: id, user })?;

        retry(|| self.store.clear_orders(id, game.turn, game.phase, &power)).await?;
        Ok(())
    }

    /// Current-phase orders, optionally for one power.
    pub async fn get_orders(
        &self,
        id: GameId,
        power: Option<&Power>,
    ) -> Result<Vec<AnyOrder>, Error> {
        let game = retry(|| self.store.get_game(id)).await?;
        Ok(retry(|| self.store.get_orders(id, game.turn, game.phase, power)).await?)
    }

    /// Current-phase orders of the power a user holds.
    pub async fn get_orders_for_user(
        &self,
        id: GameId,
        user: UserId,
    ) -> Result<Vec<AnyOrder>, Error> {
        let game = retry(|| self.store.get_game(id)).await?;
        let power = game
            .slot_of_user(user)
            .map(|s| s.power.clone())
            .ok_or(Error::Unauthorized { game: id, user })?;
        Ok(retry(|| self.store.get_orders(id, game.turn, game.phase, Some(&power))).await?)
    }

    /// Every order string the current phase accepts for the unit at (or
    /// build site of) the given location.
    pub async fn get_legal_orders(&self, id: GameId, at: &Location) -> Result<Vec<String>, Error> {
        let game = retry(|| self.store.get_game(id)).await?;
        let map = self.map_for(&game.map_name)?;
        Ok(legal::legal_orders(&game, map, at))
    }

    // ------------------------------------------------------------------
    // Turn control
    // ------------------------------------------------------------------

    /// Manually process the current phase. Safe to call concurrently; the
    /// game lock makes one caller win and the others process the phases
    /// that follow (or fail with a state conflict once the game ends).
    pub async fn process_phase(&self, id: GameId) -> Result<ProcessOutcome, Error> {
        let lock = self.locks.for_game(id);
        let guard = lock.lock().await;
        let (outcome, events) = self.process_locked(id).await?;
        drop(guard);

        self.emit(events).await;
        Ok(outcome)
    }

    /// Deadline-driven processing: re-checks under the lock that the game
    /// is still overdue, so a racing manual trigger doesn't cause the next
    /// phase to be processed prematurely.
    pub async fn process_if_due(
        &self,
        id: GameId,
        now: DateTime<Utc>,
    ) -> Result<Option<ProcessOutcome>, Error> {
        let lock = self.locks.for_game(id);
        let guard = lock.lock().await;

        let game = retry(|| self.store.get_game(id)).await?;
        let due = game.status == GameStatus::Active
            && game.deadline.is_some_and(|deadline| deadline <= now);
        if !due {
            return Ok(None);
        }

        let (outcome, events) = self.process_locked(id).await?;
        drop(guard);

        self.emit(events).await;
        Ok(Some(outcome))
    }

    async fn process_locked(&self, id: GameId) -> Result<(ProcessOutcome, Vec<Event>), Error> {
        let mut game = retry(|| self.store.get_game(id)).await?;
        if game.status != GameStatus::Active {
            return Err(StateConflict::NotActive.into());
        }
        let map = self.map_for(&game.map_name)?;

        let orders = retry(|| self.store.get_orders(id, game.turn, game.phase, None)).await?;

        let started = Instant::now();
        let phase = game.phase;
        let outcome = game.process_phase(map, &orders);
        let elapsed = started.elapsed();
        if elapsed > PROCESS_BUDGET {
            warn!(game = id, %phase, ?elapsed, "phase processing exceeded its soft budget");
        }

        if game.status == GameStatus::Active {
            let next = game
                .turn_length_secs
                .or(self.config.default_turn_deadline_secs);
            game.set_deadline(next.map(|secs| Utc::now() + Duration::seconds(secs)));
        }

        retry(|| self.store.apply_phase(&game, &outcome.records)).await?;
        info!(
            game = id,
            %phase,
            records = outcome.records.len(),
            "phase processed"
        );

        let mut events: Vec<Event> = outcome
            .records
            .iter()
            .map(|record| Event::TurnProcessed {
                game: id,
                turn: record.turn,
                phase: record.phase,
            })
            .collect();
        if outcome.completed {
            events.push(Event::GameCompleted {
                game: id,
                winner: outcome.winner.clone(),
            });
        }

        Ok((outcome, events))
    }

    pub async fn set_deadline(
        &self,
        id: GameId,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let _guard = lock.lock().await;

        let mut game = retry(|| self.store.get_game(id)).await?;
        game.set_deadline(deadline);
        retry(|| self.store.save_game(&game)).await?;
        Ok(())
    }

    /// Fire the pre-deadline reminder if it is still warranted; at most
    /// one reminder per deadline, surviving restarts.
    pub async fn send_deadline_reminder(
        &self,
        id: GameId,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let lock = self.locks.for_game(id);
        let guard = lock.lock().await;

        let mut game = retry(|| self.store.get_game(id)).await?;
        let Some(deadline) = game.deadline else {
            return Ok(());
        };
        if game.reminder_sent || game.status != GameStatus::Active || deadline <= now {
            return Ok(());
        }

        game.reminder_sent = true;
        retry(|| self.store.save_game(&game)).await?;
        drop(guard);

        self.emit(vec![Event::DeadlineReminder {
            game: id,
            turn: game.turn,
            phase: game.phase,
            seconds_left: (deadline - now).num_seconds(),
        }])
        .await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // State and history
    // ------------------------------------------------------------------

    pub async fn get_state(&self, id: GameId) -> Result<GameView, Error> {
        let game = retry(|| self.store.get_game(id)).await?;
        let orders = retry(|| self.store.get_orders(id, game.turn, game.phase, None)).await?;

        let mut orders_submitted: Vec<Power> =
            orders.iter().map(|o| o.power().clone()).collect();
        orders_submitted.sort();
        orders_submitted.dedup();

        Ok(GameView {
            id: game.id,
            status: game.status,
            phase: game.phase,
            turn: game.turn,
            units: game.deployment.iter().cloned().collect(),
            supply_centers: game.ownerships.clone(),
            deadline: game.deadline,
            orders_submitted,
            winner: game.winner.clone(),
            slots: game.slots.clone(),
        })
    }

    pub async fn get_phase_history(
        &self,
        id: GameId,
        from: Option<u32>,
        to: Option<u32>,
    ) -> Result<Vec<PhaseRecord>, Error> {
        Ok(retry(|| self.store.get_history(id, from, to)).await?)
    }

    /// Past orders with their outcomes, keyed by the phase they were
    /// adjudicated in.
    pub async fn get_order_history(
        &self,
        id: GameId,
    ) -> Result<Vec<(Phase, Vec<crate::game::RecordedOrder>)>, Error> {
        let history = retry(|| self.store.get_history(id, None, None)).await?;
        Ok(history
            .into_iter()
            .map(|record| (record.phase, record.orders))
            .collect())
    }

    /// Broadcast a free-form message to a game's players through the
    /// notification hook.
    pub async fn send_message(&self, id: GameId, body: &str) -> Result<(), Error> {
        // Verify the game exists so callers get a real error instead of a
        // silently dropped event.
        retry(|| self.store.get_game(id)).await?;
        self.emit(vec![Event::Message {
            game: id,
            body: body.to_string(),
        }])
        .await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Front-end bookkeeping
    // ------------------------------------------------------------------

    pub async fn register_user(&self, user: UserId, name: &str) -> Result<(), Error> {
        Ok(retry(|| self.store.upsert_user(user, name)).await?)
    }

    pub async fn bind_channel(&self, channel: &str, id: GameId) -> Result<(), Error> {
        retry(|| self.store.get_game(id)).await?;
        Ok(retry(|| self.store.bind_channel(channel, id)).await?)
    }

    pub async fn channel_games(&self, channel: &str) -> Result<Vec<GameId>, Error> {
        Ok(retry(|| self.store.channel_games(channel)).await?)
    }
}

/// Bounded retry for transient store failures: three attempts with
/// doubling backoff, then the error surfaces to the caller.
async fn retry<T, F, Fut>(mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut delay = StdDuration::from_millis(50);
    let mut attempts = 0;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempts < 3 => {
                warn!(error = %e, attempt = attempts + 1, "transient store failure; retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempts += 1;
            }
            other => return other,
        }
    }
}
