use crate::power::Power;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a province: the canonical three-letter lower-case code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceId(String);

impl ProvinceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvinceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProvinceId {
    fn from(s: &str) -> Self {
        ProvinceId(s.to_lowercase())
    }
}

impl From<String> for ProvinceId {
    fn from(s: String) -> Self {
        ProvinceId::from(s.as_str())
    }
}

/// Whether a province counts toward victory, and for whom it is a build
/// site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplyCenter {
    /// Not a supply center.
    None,
    /// A supply center that starts the game unowned.
    Neutral,
    /// A home center of the named power.
    Home(Power),
}

impl SupplyCenter {
    pub fn is_center(&self) -> bool {
        !matches!(self, SupplyCenter::None)
    }
}

/// A controllable area of the map. Provinces are the unit of occupancy and
/// supply-center ownership; movement happens between their sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Province {
    pub id: ProvinceId,
    pub full_name: String,
    pub center: SupplyCenter,
}

impl Province {
    pub fn is_supply_center(&self) -> bool {
        self.center.is_center()
    }
}
