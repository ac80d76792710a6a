//! Staged, validating assembly of a [`Map`].
//!
//! Registration happens in three passes that each unlock the next: register
//! every province, then every site, then every border. Each pass can only
//! reference names introduced by the previous one, so a finished map is
//! internally consistent by construction.

use std::collections::HashMap;

use super::{Border, Coast, Location, Map, Province, Site, Terrain};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    DuplicateProvince(String),
    UnknownProvince(String),
    UnknownSite(String),
    /// The border's terrain is incompatible with the terrain of its sites:
    /// sea sites take sea borders, land sites take land borders, and land
    /// never borders sea directly.
    IncompatibleTerrain(String, String),
}

/// First stage: collects provinces.
#[derive(Debug, Clone, Default)]
pub struct ProvinceRegistry {
    provinces: HashMap<String, Province>,
}

impl ProvinceRegistry {
    pub fn register(&mut self, province: Province) -> Result<(), BuildError> {
        let key = province.id.as_str().to_string();
        if self.provinces.insert(key.clone(), province).is_some() {
            return Err(BuildError::DuplicateProvince(key));
        }
        Ok(())
    }

    pub fn finish(self) -> SiteRegistry {
        SiteRegistry {
            provinces: self.provinces,
            sites: HashMap::new(),
        }
    }
}

/// Second stage: collects sites, which must belong to known provinces.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    provinces: HashMap<String, Province>,
    sites: HashMap<Location, Site>,
}

impl SiteRegistry {
    pub fn register(
        &mut self,
        province: &str,
        coast: impl Into<Option<Coast>>,
        terrain: Terrain,
    ) -> Result<(), BuildError> {
        if !self.provinces.contains_key(province) {
            return Err(BuildError::UnknownProvince(province.to_string()));
        }

        let location = Location::new(province, coast);
        self.sites.insert(
            location.clone(),
            Site { location, terrain },
        );
        Ok(())
    }

    pub fn finish(self) -> BorderRegistry {
        BorderRegistry {
            provinces: self.provinces,
            sites: self.sites,
            borders: Vec::new(),
        }
    }
}

/// Final stage: collects borders between known sites and produces the map.
#[derive(Debug, Clone)]
pub struct BorderRegistry {
    provinces: HashMap<String, Province>,
    sites: HashMap<Location, Site>,
    borders: Vec<Border>,
}

impl BorderRegistry {
    pub fn register(&mut self, a: &str, b: &str, terrain: Terrain) -> Result<(), BuildError> {
        let side_a = self.find(a)?;
        let side_b = self.find(b)?;
        Self::check_terrain(&side_a, &side_b, terrain)?;

        self.borders
            .push(Border::new(side_a.location, side_b.location, terrain));
        Ok(())
    }

    fn find(&self, name: &str) -> Result<Site, BuildError> {
        let location: Location = name
            .parse()
            .map_err(|_| BuildError::UnknownSite(name.to_string()))?;
        self.sites
            .get(&location)
            .cloned()
            .ok_or_else(|| BuildError::UnknownSite(name.to_string()))
    }

    fn check_terrain(a: &Site, b: &Site, border: Terrain) -> Result<(), BuildError> {
        use super::Terrain::*;
        let incompatible = ((a.terrain == Sea || b.terrain == Sea) && border != Sea)
            || ((a.terrain == Land || b.terrain == Land) && border != Land)
            || (a.terrain == Sea && b.terrain == Land)
            || (a.terrain == Land && b.terrain == Sea);

        if incompatible {
            Err(BuildError::IncompatibleTerrain(
                a.location.to_string(),
                b.location.to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn finish(self) -> Map {
        Map {
            provinces: self
                .provinces
                .into_values()
                .map(|p| (p.id.clone(), p))
                .collect(),
            sites: self.sites,
            borders: self.borders,
        }
    }
}
