//! Static topology: provinces, their sites (main area plus named coasts),
//! and the borders units move across. The map is pure data, assembled once
//! per process and never mutated afterwards.

mod border;
mod builder;
mod map;
mod province;
mod site;
mod standard;

pub use self::border::Border;
pub use self::builder::{BorderRegistry, BuildError, ProvinceRegistry, SiteRegistry};
pub use self::map::Map;
pub use self::province::{Province, ProvinceId, SupplyCenter};
pub use self::site::{Coast, Location, Site, Terrain};
pub use self::standard::standard_map;
