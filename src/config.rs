//! Static world catalog: terrain, unit, improvement and goods stats.
//!
//! The catalog is read-only during play. The built-in [`WorldConfig::default`]
//! mirrors the shipped world data; [`WorldConfig::from_json`] loads a replacement
//! authored outside the core.

use std::collections::BTreeMap;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::map::terrain::{Terrain, TerrainStats};
use crate::map::tile::Improvement;
use crate::movement::MovementProfile;
use crate::units::{GoodsKind, UnitKind};

/// Movement profile plus capability flags for one unit kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub movement: MovementProfile,
    #[serde(default)]
    pub attack: bool,
    /// Allows entering cities of other nations (requires `attack` too)
    #[serde(default)]
    pub attack_cities: bool,
}

impl UnitProfile {
    fn civilian(movement_points: u32) -> Self {
        Self {
            movement: MovementProfile::new(movement_points),
            attack: false,
            attack_cities: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementStats {
    /// Food added to the terrain's own yield when the cell is worked
    pub food: u32,
    /// Terrains the improvement can be built on
    pub terrains: Vec<Terrain>,
}

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub terrains: BTreeMap<Terrain, TerrainStats>,
    pub units: BTreeMap<UnitKind, UnitProfile>,
    pub improvements: BTreeMap<Improvement, ImprovementStats>,
    /// Treasury value of one unit of goods delivered to a city
    pub goods_values: BTreeMap<GoodsKind, u32>,
    /// Movement profile of goods moving across the board
    pub standard_movable: MovementProfile,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let terrains = BTreeMap::from([
            (Terrain::Grassland, TerrainStats::land(1, 2)),
            (Terrain::Plains, TerrainStats::land(1, 1)),
            (Terrain::Forest, TerrainStats::land(2, 1)),
            (Terrain::Hills, TerrainStats::land(2, 0)),
            (Terrain::Mountains, TerrainStats::land(3, 0)),
            (Terrain::Marsh, TerrainStats::land(2, 1)),
            (Terrain::Lake, TerrainStats::water(1)),
            (Terrain::Ocean, TerrainStats::water(1)),
        ]);

        let mut miner = UnitProfile::civilian(2);
        miner.movement.terrain_costs.insert(Terrain::Hills, 1);
        let mut builder = UnitProfile::civilian(2);
        builder.movement.terrain_costs.insert(Terrain::Forest, 1);
        let legion = UnitProfile {
            movement: MovementProfile::new(2),
            attack: true,
            attack_cities: true,
        };

        let units = BTreeMap::from([
            (UnitKind::Rancher, UnitProfile::civilian(2)),
            (UnitKind::Farmer, UnitProfile::civilian(2)),
            (UnitKind::Miner, miner),
            (UnitKind::Settler, UnitProfile::civilian(2)),
            (UnitKind::Builder, builder),
            (UnitKind::Legion, legion),
        ]);

        let improvements = BTreeMap::from([
            (
                Improvement::Farm,
                ImprovementStats {
                    food: 2,
                    terrains: vec![Terrain::Grassland, Terrain::Plains],
                },
            ),
            (
                Improvement::Pasture,
                ImprovementStats {
                    food: 1,
                    terrains: vec![Terrain::Grassland, Terrain::Plains, Terrain::Hills],
                },
            ),
            (
                Improvement::Mine,
                ImprovementStats {
                    food: 0,
                    terrains: vec![Terrain::Hills, Terrain::Mountains],
                },
            ),
        ]);

        let goods_values = BTreeMap::from([
            (GoodsKind::Food, 1),
            (GoodsKind::Wool, 2),
            (GoodsKind::Timber, 2),
            (GoodsKind::Ore, 3),
        ]);

        Self {
            terrains,
            units,
            improvements,
            goods_values,
            standard_movable: MovementProfile::new(2),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a catalog
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every terrain and unit kind must be described, and every cost must be
    /// at least one so that hex distance stays an admissible heuristic.
    pub fn validate(&self) -> Result<(), GameError> {
        for terrain in Terrain::ALL {
            let stats = self
                .terrains
                .get(&terrain)
                .ok_or_else(|| GameError::Config(format!("missing terrain `{terrain}`")))?;
            if stats.movement_cost == Some(0) {
                return Err(GameError::Config(format!(
                    "terrain `{terrain}` has a zero movement cost"
                )));
            }
        }
        for kind in UnitKind::ALL {
            let profile = self
                .units
                .get(&kind)
                .ok_or_else(|| GameError::Config(format!("missing unit kind `{kind}`")))?;
            validate_profile(&profile.movement, kind.key())?;
        }
        validate_profile(&self.standard_movable, "standard movable")
    }

    pub fn terrain(&self, terrain: Terrain) -> Option<&TerrainStats> {
        self.terrains.get(&terrain)
    }

    pub fn unit(&self, kind: UnitKind) -> Option<&UnitProfile> {
        self.units.get(&kind)
    }

    pub fn improvement_food(&self, improvement: Option<Improvement>) -> u32 {
        improvement
            .and_then(|improvement| self.improvements.get(&improvement))
            .map_or(0, |stats| stats.food)
    }

    pub fn terrain_food(&self, terrain: Terrain) -> u32 {
        self.terrain(terrain).map_or(0, |stats| stats.food)
    }

    pub fn goods_value(&self, kind: GoodsKind) -> u32 {
        self.goods_values.get(&kind).copied().unwrap_or(0)
    }

    pub fn improvement_allowed(&self, improvement: Improvement, terrain: Terrain) -> bool {
        self.improvements
            .get(&improvement)
            .is_some_and(|stats| stats.terrains.contains(&terrain))
    }
}

fn validate_profile(profile: &MovementProfile, name: &str) -> Result<(), GameError> {
    if profile.movement_points == 0 {
        return Err(GameError::Config(format!("`{name}` has no movement points")));
    }
    if let Some((terrain, _)) = profile.terrain_costs.iter().find(|(_, cost)| **cost == 0) {
        return Err(GameError::Config(format!(
            "`{name}` has a zero movement cost on `{terrain}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let config = WorldConfig::default();
        let json = config.to_json().expect("serialize");
        assert_eq!(WorldConfig::from_json(&json), Ok(config));
    }

    #[test]
    fn zero_costs_are_rejected() {
        let mut config = WorldConfig::default();
        config
            .units
            .get_mut(&UnitKind::Farmer)
            .unwrap()
            .movement
            .terrain_costs
            .insert(Terrain::Marsh, 0);
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn missing_terrain_is_rejected() {
        let mut config = WorldConfig::default();
        config.terrains.remove(&Terrain::Lake);
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn farm_only_on_farmland() {
        let config = WorldConfig::default();
        assert!(config.improvement_allowed(Improvement::Farm, Terrain::Grassland));
        assert!(!config.improvement_allowed(Improvement::Farm, Terrain::Mountains));
        assert_eq!(config.improvement_food(Some(Improvement::Farm)), 2);
        assert_eq!(config.improvement_food(None), 0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(GameError::Config(_))
        ));
    }
}
