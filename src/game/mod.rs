//! The per-game aggregate and its phase state machine.

mod advance;
mod setup;

pub use self::advance::{PhaseRecord, ProcessOutcome, RecordedOrder};
pub use self::setup::initial_deployment;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adjudicator::Dislodgement;
use crate::geo::{Map, ProvinceId, SupplyCenter};
use crate::parser::Snapshot;
use crate::power::Power;
use crate::time::Phase;
use crate::unit::Deployment;

pub type GameId = i64;
pub type UserId = i64;

/// Number of supply centers that wins the game outright.
pub const VICTORY_CENTERS: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created, collecting players.
    Forming,
    /// Under way; phases process on deadlines or manual triggers.
    Active,
    /// Finished; a winner may be recorded.
    Completed,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Forming => "forming",
            GameStatus::Active => "active",
            GameStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "forming" => Some(GameStatus::Forming),
            "active" => Some(GameStatus::Active),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// One power's seat in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSlot {
    pub power: Power,
    pub user: Option<UserId>,
    /// False while the seat is abandoned; abandoned powers fall under the
    /// civil-disorder rules.
    pub active: bool,
}

/// A running game: board state, seat assignments, clock.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub map_name: String,
    pub status: GameStatus,
    pub phase: Phase,
    /// Monotonic counter, incremented once per processed (recorded) phase.
    pub turn: u32,
    pub slots: Vec<PowerSlot>,
    pub deployment: Deployment,
    pub ownerships: HashMap<ProvinceId, Power>,
    /// Dislodgements awaiting retreat orders; non-empty exactly when the
    /// phase is a retreat.
    pub pending_retreats: Vec<Dislodgement>,
    pub deadline: Option<DateTime<Utc>>,
    /// Set once the pre-deadline reminder for the current deadline went
    /// out; reset whenever the deadline changes.
    pub reminder_sent: bool,
    /// When set, each processed phase schedules the next deadline this
    /// many seconds out.
    pub turn_length_secs: Option<i64>,
    pub winner: Option<Power>,
}

impl Game {
    /// A new game in the forming state, with a seat per power on the map
    /// and an empty board.
    pub fn forming(id: GameId, map_name: impl Into<String>, map: &Map) -> Self {
        let mut powers: Vec<Power> = map
            .provinces()
            .filter_map(|p| match &p.center {
                SupplyCenter::Home(power) => Some(power.clone()),
                _ => None,
            })
            .collect();
        powers.sort();
        powers.dedup();

        Game {
            id,
            map_name: map_name.into(),
            status: GameStatus::Forming,
            phase: Phase::opening(1901),
            turn: 0,
            slots: powers
                .into_iter()
                .map(|power| PowerSlot {
                    power,
                    user: None,
                    active: false,
                })
                .collect(),
            deployment: Deployment::default(),
            ownerships: HashMap::new(),
            pending_retreats: Vec::new(),
            deadline: None,
            reminder_sent: false,
            turn_length_secs: None,
            winner: None,
        }
    }

    /// Move from forming to active: place the opening units and hand each
    /// power its home centers.
    pub fn begin(&mut self, map: &Map) {
        debug_assert_eq!(self.status, GameStatus::Forming);

        self.deployment = setup::initial_deployment(&self.map_name);
        self.ownerships = map
            .provinces()
            .filter_map(|p| match &p.center {
                SupplyCenter::Home(power) => Some((p.id.clone(), power.clone())),
                _ => None,
            })
            .collect();
        self.status = GameStatus::Active;
    }

    pub fn slot(&self, power: &Power) -> Option<&PowerSlot> {
        self.slots.iter().find(|s| &s.power == power)
    }

    pub fn slot_mut(&mut self, power: &Power) -> Option<&mut PowerSlot> {
        self.slots.iter_mut().find(|s| &s.power == power)
    }

    pub fn slot_of_user(&self, user: UserId) -> Option<&PowerSlot> {
        self.slots.iter().find(|s| s.user == Some(user))
    }

    /// All seats taken?
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.user.is_some())
    }

    pub fn centers_of(&self, power: &Power) -> usize {
        self.ownerships.values().filter(|&p| p == power).count()
    }

    /// Out of the game: no units on the board and no centers to build on.
    pub fn is_eliminated(&self, power: &Power) -> bool {
        self.deployment.count_of(power) == 0 && self.centers_of(power) == 0
    }

    /// The state slice the parser validates against.
    pub fn snapshot<'a>(&'a self, map: &'a Map) -> Snapshot<'a> {
        Snapshot {
            map,
            phase: self.phase,
            deployment: &self.deployment,
            ownerships: &self.ownerships,
            retreats: &self.pending_retreats,
        }
    }

    pub fn set_deadline(&mut self, deadline: Option<DateTime<Utc>>) {
        self.deadline = deadline;
        self.reminder_sent = false;
    }
}
