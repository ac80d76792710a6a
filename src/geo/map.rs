use std::collections::{HashMap, HashSet};

use petgraph::graphmap::UnGraphMap;

use super::{Border, Coast, Location, Province, ProvinceId, Site, SupplyCenter, Terrain};
use crate::power::Power;
use crate::unit::UnitKind;

/// The assembled topology: provinces, their sites, and the borders between
/// sites. Immutable once built; freely shared across games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    pub(super) provinces: HashMap<ProvinceId, Province>,
    pub(super) sites: HashMap<Location, Site>,
    pub(super) borders: Vec<Border>,
}

impl Map {
    /// Iterate over the provinces. Order is unspecified.
    pub fn provinces(&self) -> impl Iterator<Item = &Province> {
        self.provinces.values()
    }

    /// Iterate over the sites. Order is unspecified.
    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn province(&self, id: &ProvinceId) -> Option<&Province> {
        self.provinces.get(id)
    }

    pub fn site(&self, loc: &Location) -> Option<&Site> {
        self.sites.get(loc)
    }

    pub fn terrain_of(&self, loc: &Location) -> Option<Terrain> {
        self.site(loc).map(|s| s.terrain)
    }

    /// True when `loc` names a sea site a convoying fleet can operate from:
    /// open sea, not the fleet site of a dual-coast province.
    pub fn is_open_sea(&self, loc: &Location) -> bool {
        loc.coast.is_none() && self.terrain_of(loc) == Some(Terrain::Sea)
    }

    pub fn is_supply_center(&self, id: &ProvinceId) -> bool {
        self.province(id).is_some_and(Province::is_supply_center)
    }

    /// The home supply centers of a power.
    pub fn home_centers(&self, power: &Power) -> HashSet<&ProvinceId> {
        self.provinces()
            .filter(|p| matches!(&p.center, SupplyCenter::Home(owner) if owner == power))
            .map(|p| &p.id)
            .collect()
    }

    /// The coast qualifiers a fleet may use in the given province.
    pub fn coasts(&self, id: &ProvinceId) -> Vec<Coast> {
        let mut coasts: Vec<Coast> = self
            .sites
            .keys()
            .filter(|loc| &loc.province == id)
            .filter_map(|loc| loc.coast)
            .collect();
        coasts.sort();
        coasts
    }

    /// All borders one of whose sides is `loc`.
    pub fn borders_of(&self, loc: &Location) -> Vec<&Border> {
        self.borders.iter().filter(|b| b.contains(loc)).collect()
    }

    pub fn border_between(&self, a: &Location, b: &Location) -> Option<&Border> {
        self.borders.iter().find(|border| border.connects(a, b))
    }

    /// Borders joining `loc` to any site of province `p`. Supports and
    /// convoys care about provinces, not specific coasts.
    pub fn borders_joining(&self, loc: &Location, p: &ProvinceId) -> Vec<&Border> {
        self.borders
            .iter()
            .filter(|b| b.joins_province(loc, p))
            .collect()
    }

    /// The sites adjacent to any site of province `p`.
    pub fn neighbors_of_province(&self, p: &ProvinceId) -> Vec<&Location> {
        self.borders
            .iter()
            .filter_map(|b| b.dest_from_province(p))
            .collect()
    }

    /// True when a unit of the given kind may move directly from `from` to
    /// `to` (exact locations, coast included).
    pub fn adjacent(&self, kind: UnitKind, from: &Location, to: &Location) -> bool {
        self.borders
            .iter()
            .any(|b| b.connects(from, to) && b.passable_by(kind))
    }

    /// An undirected site graph with unit edge weights, used for the
    /// distance calculation in civil-disorder disbands. Terrain is ignored.
    pub fn to_graph(&self) -> UnGraphMap<&Location, ()> {
        let mut graph = UnGraphMap::new();
        for site in self.sites.values() {
            graph.add_node(&site.location);
        }
        for border in &self.borders {
            let (a, b) = border.sides();
            graph.add_edge(a, b, ());
        }
        graph
    }
}
