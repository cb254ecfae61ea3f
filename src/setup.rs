//! Builds the starting world: generated terrain, two nations with a capital
//! each, their starting units and a first laborer.

use bevy::log::info;
use hexx::Hex;

use crate::config::WorldConfig;
use crate::constants::{CITY_CORE_CLAIM, CITY_CORE_RADIUS, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use crate::error::GameError;
use crate::map::terrain_gen::TerrainGenerator;
use crate::state::GameState;
use crate::units::UnitKind;

/// Radius around a capital in which starting units are placed
const START_RADIUS: u32 = 2;

struct StartingFaction {
    nation: &'static str,
    faction: &'static str,
    /// Offset cell the capital is placed nearest to
    capital: (u32, u32),
    units: &'static [UnitKind],
}

const STARTING_FACTIONS: [StartingFaction; 2] = [
    StartingFaction {
        nation: "Rome",
        faction: "Legio IX Hispana",
        capital: (3, 2),
        units: &[
            UnitKind::Rancher,
            UnitKind::Farmer,
            UnitKind::Miner,
            UnitKind::Settler,
            UnitKind::Builder,
        ],
    },
    StartingFaction {
        nation: "Britons",
        faction: "Iceni",
        capital: (11, 3),
        units: &[UnitKind::Legion, UnitKind::Farmer],
    },
];

fn is_land(state: &GameState, hex: Hex) -> bool {
    state.grid().get(hex).is_some_and(|cell| {
        state
            .config()
            .terrain(cell.terrain)
            .is_some_and(|stats| !stats.is_water)
    })
}

/// Land cell without a city closest to `target`; ties go to the first cell
/// in grid order
fn capital_site(state: &GameState, target: Hex) -> Option<Hex> {
    state
        .grid()
        .iter()
        .filter(|cell| cell.tile.city.is_none() && is_land(state, cell.hex))
        .min_by_key(|cell| state.grid().distance(cell.hex, target))
        .map(|cell| cell.hex)
}

/// Generates the default-sized world from `seed` and starts the first round
pub fn standard_world(config: WorldConfig, seed: u32) -> Result<GameState, GameError> {
    config.validate()?;
    let grid = TerrainGenerator::new(seed).generate_grid(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT);
    let mut state = GameState::new(config, grid).with_seed(u64::from(seed));

    for start in &STARTING_FACTIONS {
        let nation = state.add_nation(start.nation);
        let faction = state.add_faction(nation, start.faction)?;

        let (col, row) = start.capital;
        let target = state
            .grid()
            .hex_at(col, row)
            .ok_or_else(|| GameError::Config(format!("capital target ({col}, {row}) is off the map")))?;
        let capital = capital_site(&state, target)
            .ok_or_else(|| GameError::Config(format!("no land left for {}", start.nation)))?;
        let city = state.found_city(capital, nation, 1)?;

        let core = state.grid().spiral(capital, CITY_CORE_RADIUS);
        for hex in core {
            state.claim_for_faction(hex, faction, i64::from(CITY_CORE_CLAIM))?;
        }

        let mut spots: Vec<Hex> = state
            .grid()
            .spiral(capital, START_RADIUS)
            .into_iter()
            .filter(|hex| *hex != capital && is_land(&state, *hex))
            .collect();
        if spots.is_empty() {
            spots.push(capital);
        }

        for (index, kind) in start.units.iter().enumerate() {
            state.spawn_unit(faction, *kind, spots[index % spots.len()])?;
        }
        state.add_laborer(spots[0], UnitKind::Farmer, Some(city))?;

        info!(
            "{} founded their capital at {:?} with {} units",
            start.nation,
            capital,
            start.units.len()
        );
    }

    state.start_round()?;
    Ok(state)
}
