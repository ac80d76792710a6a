//! The order model: a power's instruction to one of its units (or, for
//! builds, to a province). Each phase kind has its own command enumeration;
//! adjudication branches on the variant tag.

use crate::geo::Location;
use crate::power::Power;
use crate::unit::{Unit, UnitKind, UnitPosition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An order binds a power and an addressed unit to a command.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order<C> {
    pub power: Power,
    pub unit_kind: UnitKind,
    pub location: Location,
    pub command: C,
}

impl<C> Order<C> {
    pub fn new(
        power: impl Into<Power>,
        unit_kind: UnitKind,
        location: Location,
        command: C,
    ) -> Self {
        Order {
            power: power.into(),
            unit_kind,
            location,
            command,
        }
    }

    /// The position the ordered unit must occupy for the order to be valid.
    pub fn unit_position(&self) -> UnitPosition {
        UnitPosition::new(
            Unit::new(self.power.clone(), self.unit_kind),
            self.location.clone(),
        )
    }
}

/// A command issued during a movement phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MainCommand {
    /// Remain in place.
    Hold,
    /// Attempt to move to the destination.
    Move(Location),
    /// Add strength to the named unit's attempt to stay where it is.
    SupportHold(UnitKind, Location),
    /// Add strength to the named unit's move to the destination.
    SupportMove(UnitKind, Location, Location),
    /// Carry the named army from its location to the destination. Only
    /// meaningful for fleets in open sea.
    Convoy(Location, Location),
}

impl MainCommand {
    pub fn is_move(&self) -> bool {
        matches!(self, MainCommand::Move(_))
    }

    pub fn move_dest(&self) -> Option<&Location> {
        match self {
            MainCommand::Move(dest) => Some(dest),
            _ => None,
        }
    }
}

/// A command issued to a dislodged unit during a retreat phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetreatCommand {
    Move(Location),
    Disband,
}

impl RetreatCommand {
    pub fn move_dest(&self) -> Option<&Location> {
        match self {
            RetreatCommand::Move(dest) => Some(dest),
            RetreatCommand::Disband => None,
        }
    }
}

/// A command issued during an adjustment phase. Builds address a vacant
/// home center; disbands address one of the power's own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustCommand {
    Build,
    Disband,
}

pub type MainOrder = Order<MainCommand>;
pub type RetreatOrder = Order<RetreatCommand>;
pub type AdjustOrder = Order<AdjustCommand>;

impl MainOrder {
    pub fn is_move(&self) -> bool {
        self.command.is_move()
    }

    pub fn move_dest(&self) -> Option<&Location> {
        self.command.move_dest()
    }

    pub fn is_move_to_province(&self, province: &crate::geo::ProvinceId) -> bool {
        self.move_dest().is_some_and(|d| &d.province == province)
    }
}

/// Canonical text of a command, given the unit it addresses. This is the
/// grammar the parser accepts, so every order round-trips.
pub trait CommandText {
    fn write_text(&self, kind: UnitKind, location: &Location, f: &mut fmt::Formatter)
        -> fmt::Result;
}

impl CommandText for MainCommand {
    fn write_text(
        &self,
        kind: UnitKind,
        location: &Location,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        use self::MainCommand::*;
        match self {
            Hold => write!(f, "{kind} {location} H"),
            Move(dest) => write!(f, "{kind} {location} - {dest}"),
            SupportHold(k, at) => write!(f, "{kind} {location} S {k} {at}"),
            SupportMove(k, from, to) => write!(f, "{kind} {location} S {k} {from} - {to}"),
            Convoy(from, to) => write!(f, "{kind} {location} C A {from} - {to}"),
        }
    }
}

impl CommandText for RetreatCommand {
    fn write_text(
        &self,
        kind: UnitKind,
        location: &Location,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            RetreatCommand::Move(dest) => write!(f, "{kind} {location} - {dest}"),
            RetreatCommand::Disband => write!(f, "{kind} {location} D"),
        }
    }
}

impl CommandText for AdjustCommand {
    fn write_text(
        &self,
        kind: UnitKind,
        location: &Location,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            AdjustCommand::Build => write!(f, "BUILD {kind} {location}"),
            AdjustCommand::Disband => write!(f, "DESTROY {kind} {location}"),
        }
    }
}

impl<C: CommandText> Order<C> {
    fn write_full(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: ", self.power)?;
        self.command.write_text(self.unit_kind, &self.location, f)
    }

    /// The order text without the power prefix, as accepted by the parser.
    pub fn command_text(&self) -> String {
        struct Body<'a, C>(&'a Order<C>);
        impl<C: CommandText> fmt::Display for Body<'_, C> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.0.command.write_text(self.0.unit_kind, &self.0.location, f)
            }
        }
        Body(self).to_string()
    }
}

impl<C: CommandText> fmt::Display for Order<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_full(f)
    }
}

// Debug shares the canonical form; it reads far better in test output.
impl<C: CommandText> fmt::Debug for Order<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_full(f)
    }
}

/// An order of any phase kind, for storage and transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum AnyOrder {
    Movement(MainOrder),
    Retreat(RetreatOrder),
    Adjustment(AdjustOrder),
}

impl AnyOrder {
    pub fn power(&self) -> &Power {
        match self {
            AnyOrder::Movement(o) => &o.power,
            AnyOrder::Retreat(o) => &o.power,
            AnyOrder::Adjustment(o) => &o.power,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            AnyOrder::Movement(o) => &o.location,
            AnyOrder::Retreat(o) => &o.location,
            AnyOrder::Adjustment(o) => &o.location,
        }
    }

    pub fn text(&self) -> String {
        match self {
            AnyOrder::Movement(o) => o.command_text(),
            AnyOrder::Retreat(o) => o.command_text(),
            AnyOrder::Adjustment(o) => o.command_text(),
        }
    }
}
