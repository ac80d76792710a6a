//! The standard map, compiled into the binary from CSV tables.

use lazy_static::lazy_static;

use super::builder::ProvinceRegistry;
use super::{Coast, Map, Province, SupplyCenter, Terrain};

lazy_static! {
    static ref STANDARD_MAP: Map = load_standard();
}

/// The standard seven-power map. Built on first use, shared for the life of
/// the process.
pub fn standard_map() -> &'static Map {
    &STANDARD_MAP
}

fn load_standard() -> Map {
    let mut provinces = ProvinceRegistry::default();
    for line in include_str!("provinces.csv").lines().skip(1) {
        let province = province_from_line(line)
            .unwrap_or_else(|| panic!("bad province row in standard map: {line}"));
        provinces
            .register(province)
            .expect("standard map provinces are unique");
    }

    let mut sites = provinces.finish();
    for line in include_str!("sites.csv").lines().skip(1) {
        let (province, coast, terrain) = site_from_line(line)
            .unwrap_or_else(|| panic!("bad site row in standard map: {line}"));
        sites
            .register(province, coast, terrain)
            .expect("standard map sites reference known provinces");
    }

    let mut borders = sites.finish();
    for line in include_str!("borders.csv").lines().skip(1) {
        let cells: Vec<&str> = line.split(',').collect();
        let terrain = terrain_from_word(cells[2])
            .unwrap_or_else(|| panic!("bad border row in standard map: {line}"));
        borders
            .register(cells[0], cells[1], terrain)
            .unwrap_or_else(|e| panic!("bad border {line}: {e:?}"));
    }

    borders.finish()
}

fn province_from_line(line: &str) -> Option<Province> {
    let cells: Vec<&str> = line.split(',').collect();
    if cells.len() != 3 {
        return None;
    }

    Some(Province {
        id: cells[0].into(),
        full_name: cells[1].to_string(),
        center: match cells[2] {
            "" => SupplyCenter::None,
            "neutral" => SupplyCenter::Neutral,
            power => SupplyCenter::Home(power.into()),
        },
    })
}

fn site_from_line(line: &str) -> Option<(&str, Option<Coast>, Terrain)> {
    let cells: Vec<&str> = line.split(',').collect();
    if cells.len() != 3 {
        return None;
    }

    let coast = match cells[1] {
        "" => None,
        code => Some(code.parse().ok()?),
    };

    Some((cells[0], coast, terrain_from_word(cells[2])?))
}

fn terrain_from_word(word: &str) -> Option<Terrain> {
    match word {
        "land" => Some(Terrain::Land),
        "coast" => Some(Terrain::Coast),
        "sea" => Some(Terrain::Sea),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Location;
    use crate::unit::UnitKind;

    #[test]
    fn census() {
        let map = standard_map();
        assert_eq!(map.provinces().count(), 75);
        assert_eq!(
            map.provinces().filter(|p| p.is_supply_center()).count(),
            34
        );
        for power in ["AUS", "ENG", "FRA", "GER", "ITA", "TUR"] {
            assert_eq!(map.home_centers(&power.into()).len(), 3, "{power}");
        }
        assert_eq!(map.home_centers(&"RUS".into()).len(), 4);
    }

    #[test]
    fn dual_coast_adjacency() {
        let map = standard_map();
        let loc = |s: &str| s.parse::<Location>().unwrap();

        // A fleet on the north coast of St. Petersburg cannot reach the
        // Gulf of Bothnia, but one on the south coast can.
        assert!(!map.adjacent(UnitKind::Fleet, &loc("stp(nc)"), &loc("bot")));
        assert!(map.adjacent(UnitKind::Fleet, &loc("stp(sc)"), &loc("bot")));
        assert!(map.adjacent(UnitKind::Fleet, &loc("stp(nc)"), &loc("bar")));

        // Armies address the province itself.
        assert!(map.adjacent(UnitKind::Army, &loc("mos"), &loc("stp")));
        assert!(!map.adjacent(UnitKind::Army, &loc("mos"), &loc("stp(nc)")));

        assert_eq!(map.coasts(&"spa".into()), vec![Coast::North, Coast::South]);
        assert_eq!(map.coasts(&"par".into()), vec![]);
    }

    #[test]
    fn passability() {
        let map = standard_map();
        let loc = |s: &str| s.parse::<Location>().unwrap();

        // Coast borders pass both kinds; land borders pass armies only.
        assert!(map.adjacent(UnitKind::Fleet, &loc("bre"), &loc("gas")));
        assert!(map.adjacent(UnitKind::Army, &loc("bre"), &loc("gas")));
        assert!(map.adjacent(UnitKind::Army, &loc("ven"), &loc("rom")));
        assert!(!map.adjacent(UnitKind::Fleet, &loc("ven"), &loc("rom")));

        // Armies never enter open sea; fleets never go inland.
        assert!(!map.adjacent(UnitKind::Army, &loc("lvp"), &loc("iri")));
        assert!(!map.adjacent(UnitKind::Fleet, &loc("kie"), &loc("mun")));
    }
}
