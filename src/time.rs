//! Game time: seasons, phase kinds, and the fixed phase sequence of a
//! standard game year.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The half of the year a movement phase belongs to. Supply-center
/// ownership is only recomputed at the conclusion of Fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    pub fn letter(self) -> char {
        match self {
            Season::Spring => 'S',
            Season::Fall => 'F',
        }
    }
}

/// The kind of orders a phase accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseKind {
    Movement,
    Retreat,
    Adjustment,
}

impl PhaseKind {
    pub fn letter(self) -> char {
        match self {
            PhaseKind::Movement => 'M',
            PhaseKind::Retreat => 'R',
            PhaseKind::Adjustment => 'A',
        }
    }
}

/// A specific point in game time, written `S1901M`, `F1903R`, `F1905A`.
///
/// The standard sequence within a year is Spring Movement, Spring Retreat,
/// Fall Movement, Fall Retreat, Adjustment. The state machine may skip a
/// phase that needs no input (see [`crate::game`]), but skipping never
/// reorders the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phase {
    pub year: u16,
    pub season: Season,
    pub kind: PhaseKind,
}

impl Phase {
    pub fn new(year: u16, season: Season, kind: PhaseKind) -> Self {
        Phase { year, season, kind }
    }

    /// The opening phase of a game starting in the given year.
    pub fn opening(year: u16) -> Self {
        Phase::new(year, Season::Spring, PhaseKind::Movement)
    }

    /// The phase that follows this one in the full (unskipped) sequence.
    pub fn next(self) -> Phase {
        use self::PhaseKind::*;
        use self::Season::*;
        match (self.season, self.kind) {
            (Spring, Movement) => Phase::new(self.year, Spring, Retreat),
            (Spring, Retreat) => Phase::new(self.year, Fall, Movement),
            (Fall, Movement) => Phase::new(self.year, Fall, Retreat),
            (Fall, Retreat) => Phase::new(self.year, Fall, Adjustment),
            (_, Adjustment) => Phase::new(self.year + 1, Spring, Movement),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.season.letter(),
            self.year,
            self.kind.letter()
        )
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("not a phase: '{s}'");
        if s.len() != 6 {
            return Err(bad());
        }

        let season = match &s[0..1] {
            "S" => Season::Spring,
            "F" => Season::Fall,
            _ => return Err(bad()),
        };
        let year = s[1..5].parse().map_err(|_| bad())?;
        let kind = match &s[5..6] {
            "M" => PhaseKind::Movement,
            "R" => PhaseKind::Retreat,
            "A" => PhaseKind::Adjustment,
            _ => return Err(bad()),
        };

        Ok(Phase::new(year, season, kind))
    }
}

// Phases travel through the store and history payloads in their canonical
// string form.

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}
