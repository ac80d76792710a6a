use crate::geo::{Location, ProvinceId};
use crate::time::Phase;
use crate::unit::UnitKind;
use thiserror::Error;

/// A defect in the order text itself, independent of any game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("nothing to parse")]
    Empty,
    #[error("'{0}' is not a unit kind (expected A or F)")]
    BadUnitKind(String),
    #[error("'{0}' does not name a place")]
    BadPlace(String),
    #[error("'{0}' is not an order keyword")]
    UnknownKeyword(String),
    #[error("unit named without a command near '{0}'")]
    MissingCommand(String),
    #[error("malformed order near '{0}'")]
    Malformed(String),
    #[error("malformed support near '{0}'")]
    MalformedSupport(String),
    #[error("malformed convoy near '{0}'")]
    MalformedConvoy(String),
}

/// Why an order was refused at submission time. Each validation pass has
/// its own kind so the caller can explain the rejection without parsing
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("'{0}' is not a province on this map")]
    UnknownProvince(String),
    #[error("there is no unit in {0}")]
    NoUnit(Location),
    #[error("the unit in {0} belongs to another power")]
    ForeignUnit(Location),
    #[error("the unit in {0} is not {1}")]
    WrongUnit(Location, UnitKind),
    #[error("that order is not accepted during {0}")]
    WrongPhase(Phase),
    #[error("a {kind} cannot get from {from} to {to}")]
    Unreachable {
        kind: UnitKind,
        from: Location,
        to: Location,
    },
    #[error("the supporting unit cannot reach {0}")]
    SupporterCannotReach(ProvinceId),
    #[error("only fleets in open sea can convoy")]
    ConvoyerNotAtSea,
    #[error("only armies can be convoyed")]
    ConvoyedNotArmy,
    #[error("{0} is not one of your home supply centers")]
    NotHomeCenter(ProvinceId),
    #[error("you do not control {0}")]
    CenterNotOwned(ProvinceId),
    #[error("{0} is occupied")]
    CenterOccupied(ProvinceId),
    #[error("a fleet built in {0} must name a coast")]
    BuildNeedsCoast(ProvinceId),
    #[error("a {1} cannot be stationed at {0}")]
    BadBuildSite(Location, UnitKind),
    #[error("you have no builds available")]
    NoBuildBudget,
    #[error("the unit in {0} was not dislodged")]
    NotDislodged(Location),
    #[error("{0} is not a legal retreat destination")]
    IllegalRetreat(Location),
}
