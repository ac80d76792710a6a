use serde::{Deserialize, Serialize};
use std::fmt;

/// An actor in the game. Powers own supply centers and issue orders to
/// their units.
///
/// The standard map defines the seven classic powers, but nothing in the
/// core assumes that set: structurally identical variants supply their own
/// power names through their map data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Power(String);

impl Power {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Power {
    fn from(s: &str) -> Self {
        Power(s.to_uppercase())
    }
}

impl From<String> for Power {
    fn from(s: String) -> Self {
        Power::from(s.as_str())
    }
}
