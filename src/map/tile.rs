use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::constants::FOOD_CONSUMPTION_PER_LABORER;
use crate::economy::city::CityId;
use crate::economy::laborer::LaborerId;
use crate::economy::nation::NationId;
use crate::faction::FactionId;
use crate::map::claims::ClaimTable;
use crate::map::terrain::Terrain;

/// Improvement a laborer can work on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Improvement {
    Farm,
    Pasture,
    Mine,
}

impl Improvement {
    pub const ALL: [Improvement; 3] = [Improvement::Farm, Improvement::Pasture, Improvement::Mine];
}

/// Mutable per-cell state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    improvement: Option<Improvement>,
    pub laborers: BTreeSet<LaborerId>,
    /// Food stock for the laborers working the cell. Goes negative when the
    /// laborers ate more than was delivered.
    pub food: i32,
    pub nation_claims: ClaimTable<NationId>,
    pub faction_claims: ClaimTable<FactionId>,
    pub city: Option<CityId>,
}

impl Tile {
    pub fn improvement(&self) -> Option<Improvement> {
        self.improvement
    }

    pub fn set_improvement(&mut self, improvement: Improvement) {
        self.improvement = Some(improvement);
    }

    /// Razes the current improvement, e.g. when a city is founded on top of it
    pub fn clear_improvement(&mut self) {
        self.improvement = None;
    }

    /// An improvement can go on an unimproved cell without a city, on a
    /// terrain the catalog allows it on
    pub fn is_valid_improvement(
        &self,
        improvement: Improvement,
        terrain: Terrain,
        config: &WorldConfig,
    ) -> bool {
        self.improvement.is_none()
            && self.city.is_none()
            && config.improvement_allowed(improvement, terrain)
    }

    /// Nation holding the cell's territorial effects
    pub fn nation(&self) -> Option<NationId> {
        self.nation_claims.holder()
    }

    /// Faction holding the cell's territorial effects
    pub fn faction(&self) -> Option<FactionId> {
        self.faction_claims.holder()
    }

    pub fn has_laborers(&self) -> bool {
        !self.laborers.is_empty()
    }

    /// Food the laborers on this cell eat per round
    pub fn food_needed(&self) -> i32 {
        self.laborers.len() as i32 * FOOD_CONSUMPTION_PER_LABORER
    }

    /// Food still missing before the laborers are fed this round
    pub fn food_shortfall(&self) -> u32 {
        (self.food_needed() - self.food).max(0) as u32
    }
}
