use crate::geo::{Location, ProvinceId, Terrain};
use crate::power::Power;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a military unit. Armies are convoyable land units; fleets
/// are sea units that can carry armies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    #[serde(rename = "A")]
    Army,
    #[serde(rename = "F")]
    Fleet,
}

impl UnitKind {
    pub fn letter(self) -> char {
        match self {
            UnitKind::Army => 'A',
            UnitKind::Fleet => 'F',
        }
    }

    pub fn can_occupy(self, terrain: Terrain) -> bool {
        match terrain {
            Terrain::Coast => true,
            Terrain::Land => self == UnitKind::Army,
            Terrain::Sea => self == UnitKind::Fleet,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for UnitKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "army" => Ok(UnitKind::Army),
            "f" | "fleet" => Ok(UnitKind::Fleet),
            _ => Err(()),
        }
    }
}

/// A unit owned by a power. Diplomacy does not track unit identity across
/// turns; one French fleet is interchangeable with another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub power: Power,
    pub kind: UnitKind,
}

impl Unit {
    pub fn new(power: impl Into<Power>, kind: UnitKind) -> Self {
        Unit {
            power: power.into(),
            kind,
        }
    }
}

/// A unit standing at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitPosition {
    pub unit: Unit,
    pub location: Location,
}

impl UnitPosition {
    pub fn new(unit: Unit, location: Location) -> Self {
        UnitPosition { unit, location }
    }

    pub fn power(&self) -> &Power {
        &self.unit.power
    }

    pub fn kind(&self) -> UnitKind {
        self.unit.kind
    }

    pub fn province(&self) -> &ProvinceId {
        &self.location.province
    }
}

impl fmt::Display for UnitPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.unit.power, self.unit.kind, self.location
        )
    }
}

impl FromStr for UnitPosition {
    type Err = ();

    /// Parses the `FRA: F bre` form used in tests and logs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let power = words.next().ok_or(())?.trim_end_matches(':');
        let kind: UnitKind = words.next().ok_or(())?.parse()?;
        let location: Location = words.next().ok_or(())?.parse()?;
        Ok(UnitPosition::new(Unit::new(power, kind), location))
    }
}

/// The full set of units on the board at a point in time.
///
/// Invariant: at most one unit per province. Dislodged units are not part
/// of a deployment; they live in the retreat bookkeeping until they retreat
/// (rejoining the next deployment) or disband.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployment(Vec<UnitPosition>);

impl Deployment {
    pub fn new(units: Vec<UnitPosition>) -> Self {
        Deployment(units)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitPosition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The unit occupying any site of the given province.
    pub fn occupier_of(&self, province: &ProvinceId) -> Option<&UnitPosition> {
        self.0.iter().find(|u| u.province() == province)
    }

    /// The unit standing at exactly the given location (coast included).
    pub fn unit_at(&self, location: &Location) -> Option<&UnitPosition> {
        self.0.iter().find(|u| &u.location == location)
    }

    pub fn units_of<'a>(&'a self, power: &'a Power) -> impl Iterator<Item = &'a UnitPosition> {
        self.0.iter().filter(move |u| u.power() == power)
    }

    pub fn count_of(&self, power: &Power) -> usize {
        self.units_of(power).count()
    }

    pub fn powers(&self) -> impl Iterator<Item = &Power> {
        let mut seen = Vec::new();
        self.0.iter().for_each(|u| {
            if !seen.contains(&u.power()) {
                seen.push(u.power());
            }
        });
        seen.into_iter()
    }

    pub fn place(&mut self, position: UnitPosition) {
        self.0.push(position);
    }

    /// Remove and return the unit in the given province, if any.
    pub fn remove_from(&mut self, province: &ProvinceId) -> Option<UnitPosition> {
        let idx = self.0.iter().position(|u| u.province() == province)?;
        Some(self.0.remove(idx))
    }
}

impl FromIterator<UnitPosition> for Deployment {
    fn from_iter<I: IntoIterator<Item = UnitPosition>>(iter: I) -> Self {
        Deployment(iter.into_iter().collect())
    }
}
