use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Terrain assigned to a cell at world generation. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Terrain {
    Grassland, // Best farmland
    Plains,
    Forest,
    Hills,
    Mountains,
    Marsh,
    Lake,
    Ocean,
}

impl Terrain {
    pub const ALL: [Terrain; 8] = [
        Terrain::Grassland,
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Hills,
        Terrain::Mountains,
        Terrain::Marsh,
        Terrain::Lake,
        Terrain::Ocean,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Terrain::Grassland => "grassland",
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Hills => "hills",
            Terrain::Mountains => "mountains",
            Terrain::Marsh => "marsh",
            Terrain::Lake => "lake",
            Terrain::Ocean => "ocean",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Terrain {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::ALL
            .into_iter()
            .find(|terrain| terrain.key() == s)
            .ok_or_else(|| GameError::Config(format!("unknown terrain `{s}`")))
    }
}

/// Catalog stats for one terrain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainStats {
    /// Cost to enter the cell. `None` means no mover can enter it unless its
    /// own profile carries an override for this terrain.
    pub movement_cost: Option<u32>,
    /// Food produced per round when the cell is worked
    pub food: u32,
    pub is_water: bool,
}

impl TerrainStats {
    pub fn land(movement_cost: u32, food: u32) -> Self {
        Self {
            movement_cost: Some(movement_cost),
            food,
            is_water: false,
        }
    }

    pub fn water(food: u32) -> Self {
        Self {
            movement_cost: Some(1),
            food,
            is_water: true,
        }
    }
}
