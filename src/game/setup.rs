//! Opening positions.

use crate::unit::{Deployment, Unit, UnitKind, UnitPosition};

const STANDARD_OPENING: &[(&str, UnitKind, &str)] = &[
    ("AUS", UnitKind::Army, "bud"),
    ("AUS", UnitKind::Army, "vie"),
    ("AUS", UnitKind::Fleet, "tri"),
    ("ENG", UnitKind::Fleet, "edi"),
    ("ENG", UnitKind::Fleet, "lon"),
    ("ENG", UnitKind::Army, "lvp"),
    ("FRA", UnitKind::Fleet, "bre"),
    ("FRA", UnitKind::Army, "mar"),
    ("FRA", UnitKind::Army, "par"),
    ("GER", UnitKind::Army, "ber"),
    ("GER", UnitKind::Fleet, "kie"),
    ("GER", UnitKind::Army, "mun"),
    ("ITA", UnitKind::Fleet, "nap"),
    ("ITA", UnitKind::Army, "rom"),
    ("ITA", UnitKind::Army, "ven"),
    ("RUS", UnitKind::Army, "mos"),
    ("RUS", UnitKind::Fleet, "sev"),
    ("RUS", UnitKind::Fleet, "stp(sc)"),
    ("RUS", UnitKind::Army, "war"),
    ("TUR", UnitKind::Fleet, "ank"),
    ("TUR", UnitKind::Army, "con"),
    ("TUR", UnitKind::Army, "smy"),
];

/// The opening deployment for a map. Only the standard arrangement is
/// known; structurally identical variants reuse it.
pub fn initial_deployment(map_name: &str) -> Deployment {
    let _ = map_name;
    STANDARD_OPENING
        .iter()
        .map(|(power, kind, location)| {
            UnitPosition::new(
                Unit::new(*power, *kind),
                location.parse().expect("opening positions are well-formed"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::standard_map;

    #[test]
    fn opening_units_stand_on_real_sites() {
        let map = standard_map();
        let deployment = initial_deployment("standard");

        assert_eq!(deployment.len(), 22);
        for unit in deployment.iter() {
            let site = map
                .site(&unit.location)
                .unwrap_or_else(|| panic!("{} is not a site", unit.location));
            assert!(
                unit.kind().can_occupy(site.terrain),
                "{unit} cannot stand there"
            );
        }
    }
}
