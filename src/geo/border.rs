use super::{Location, ProvinceId, Terrain};
use crate::unit::UnitKind;

/// An undirected edge between two sites. The border's terrain decides who
/// may cross: land borders pass armies, sea borders pass fleets, coast
/// borders pass both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border(Location, Location, Terrain);

impl Border {
    pub fn new(a: Location, b: Location, terrain: Terrain) -> Self {
        Border(a, b, terrain)
    }

    pub fn terrain(&self) -> Terrain {
        self.2
    }

    pub fn sides(&self) -> (&Location, &Location) {
        (&self.0, &self.1)
    }

    pub fn contains(&self, loc: &Location) -> bool {
        &self.0 == loc || &self.1 == loc
    }

    pub fn connects(&self, a: &Location, b: &Location) -> bool {
        self.contains(a) && self.contains(b)
    }

    /// True when one side is `loc` and the other side lies in province `p`.
    pub fn joins_province(&self, loc: &Location, p: &ProvinceId) -> bool {
        (&self.0 == loc && &self.1.province == p) || (&self.1 == loc && &self.0.province == p)
    }

    /// If the border contains `loc`, the opposite side.
    pub fn dest_from(&self, loc: &Location) -> Option<&Location> {
        if &self.0 == loc {
            Some(&self.1)
        } else if &self.1 == loc {
            Some(&self.0)
        } else {
            None
        }
    }

    /// Does one side of the border lie in the given province?
    pub fn touches_province(&self, p: &ProvinceId) -> bool {
        &self.0.province == p || &self.1.province == p
    }

    /// The side opposite to province `p`, if one side lies in it.
    pub fn dest_from_province(&self, p: &ProvinceId) -> Option<&Location> {
        if &self.0.province == p {
            Some(&self.1)
        } else if &self.1.province == p {
            Some(&self.0)
        } else {
            None
        }
    }

    pub fn passable_by(&self, kind: UnitKind) -> bool {
        kind.can_occupy(self.2)
    }
}
