use std::collections::BTreeSet;

use bevy::log::{info, warn};
use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::constants::{CITY_CORE_CLAIM, CITY_CORE_RADIUS, CITY_WATER_CLAIM, CITY_WATER_RADIUS};
use crate::economy::laborer::LaborerId;
use crate::economy::nation::NationId;
use crate::error::GameError;
use crate::faction::FactionId;
use crate::messages::GameEvent;
use crate::state::GameState;
use crate::units::UnitKind;

/// Index of a city in the world's city list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityId(pub u32);

/// A unit a faction ordered from a city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub faction: FactionId,
    pub unit_kind: UnitKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub hex: Hex,
    pub nation: NationId,
    pub level: u32,
    queue: Vec<ProductionOrder>,
    pub laborers: BTreeSet<LaborerId>,
}

impl City {
    pub fn new(id: CityId, hex: Hex, nation: NationId, level: u32) -> Self {
        Self {
            id,
            hex,
            nation,
            level,
            queue: Vec::new(),
            laborers: BTreeSet::new(),
        }
    }

    pub fn queue(&self) -> &[ProductionOrder] {
        &self.queue
    }

    /// Queues a unit by catalog key. Unknown keys are logged and ignored.
    pub fn add_to_queue(&mut self, faction: FactionId, unit_kind: &str) -> bool {
        match unit_kind.parse::<UnitKind>() {
            Ok(unit_kind) => {
                self.queue.push(ProductionOrder { faction, unit_kind });
                true
            }
            Err(err) => {
                warn!("City production queue: {err}");
                false
            }
        }
    }
}

impl GameState {
    /// Founds a city: razes the cell's improvement and lays the founding
    /// nation's claims on the surrounding territory
    pub fn found_city(
        &mut self,
        hex: Hex,
        nation: NationId,
        level: u32,
    ) -> Result<CityId, GameError> {
        if self.nation(nation).is_none() {
            return Err(GameError::UnknownNation(nation));
        }
        let cell = self.grid.get(hex).ok_or(GameError::InvalidCell(hex))?;
        if cell.tile.city.is_some() {
            return Err(GameError::CityAlreadyPresent(hex));
        }

        let id = CityId(self.cities.len() as u32);
        self.emit(GameEvent::CityFounded {
            city: id,
            hex,
            nation,
        });
        self.cities.push(City::new(id, hex, nation, level));

        if let Some(cell) = self.grid.get_mut(hex) {
            cell.tile.clear_improvement();
            cell.tile.city = Some(id);
        }

        for claimed in self.grid.spiral(hex, CITY_CORE_RADIUS) {
            if let Some(cell) = self.grid.get_mut(claimed) {
                cell.tile.nation_claims.claim(nation, CITY_CORE_CLAIM as i64);
            }
        }
        for claimed in self.grid.ring(hex, CITY_WATER_RADIUS) {
            let is_water = self
                .grid
                .get(claimed)
                .and_then(|cell| self.config.terrain(cell.terrain))
                .is_some_and(|stats| stats.is_water);
            if is_water && let Some(cell) = self.grid.get_mut(claimed) {
                cell.tile.nation_claims.claim(nation, CITY_WATER_CLAIM as i64);
            }
        }

        info!("City #{} founded at {:?} for nation #{}", id.0, hex, nation.0);
        Ok(id)
    }

    /// Nearest city to `hex` by hex distance; the first city in founding
    /// order wins a tie
    pub fn nearest_city(&self, hex: Hex) -> Option<&City> {
        let mut nearest: Option<(&City, u32)> = None;
        for city in &self.cities {
            let distance = self.grid.distance(hex, city.hex);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((city, distance));
            }
        }
        nearest.map(|(city, _)| city)
    }
}
