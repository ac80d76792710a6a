use super::ProvinceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Differentiates the sites of a dual-coast province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coast {
    North,
    East,
    South,
    West,
}

impl Coast {
    pub fn code(self) -> &'static str {
        match self {
            Coast::North => "nc",
            Coast::East => "ec",
            Coast::South => "sc",
            Coast::West => "wc",
        }
    }
}

impl FromStr for Coast {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nc" => Ok(Coast::North),
            "ec" => Ok(Coast::East),
            "sc" => Ok(Coast::South),
            "wc" => Ok(Coast::West),
            _ => Err(()),
        }
    }
}

/// The environment of a site. Armies cannot operate at sea; fleets cannot
/// operate inland.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terrain {
    Land,
    Coast,
    Sea,
}

/// Address of a site: a province plus, when the province has split coasts,
/// the coast being referred to. Written `par`, `stp(nc)`.
///
/// Orders, unit positions, and borders all speak in locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub province: ProvinceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coast: Option<Coast>,
}

impl Location {
    pub fn new(province: impl Into<ProvinceId>, coast: impl Into<Option<Coast>>) -> Self {
        Location {
            province: province.into(),
            coast: coast.into(),
        }
    }

    /// The same province with no coast qualifier.
    pub fn main(&self) -> Location {
        Location::new(self.province.clone(), None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.coast {
            Some(c) => write!(f, "{}({})", self.province, c.code()),
            None => write!(f, "{}", self.province),
        }
    }
}

impl From<&ProvinceId> for Location {
    fn from(p: &ProvinceId) -> Self {
        Location::new(p.clone(), None)
    }
}

impl FromStr for Location {
    type Err = ();

    /// Accepts `bre`, `stp(sc)`, and the slash spelling `stp/sc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((prov, rest)) = s.split_once('(') {
            let coast = rest.strip_suffix(')').ok_or(())?;
            Ok(Location::new(prov, Coast::from_str(&coast.to_lowercase())?))
        } else if let Some((prov, coast)) = s.split_once('/') {
            Ok(Location::new(prov, Coast::from_str(&coast.to_lowercase())?))
        } else if s.is_empty() {
            Err(())
        } else {
            Ok(Location::new(s, None))
        }
    }
}

/// A place a unit can stand: a location plus its terrain.
///
/// The coast sites of a dual-coast province are marked [`Terrain::Sea`] so
/// armies can never be placed on them; an army in such a province always
/// stands on the main (coast-terrain) site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub location: Location,
    pub terrain: Terrain,
}
