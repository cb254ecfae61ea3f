#![allow(dead_code)]

use hexx::Hex;
use rust_britannia::config::WorldConfig;
use rust_britannia::faction::FactionId;
use rust_britannia::map::grid::HexGrid;
use rust_britannia::map::terrain::Terrain;
use rust_britannia::state::GameState;

/// All-plains state with two nations and one faction each
pub fn two_faction_state(width: u32, height: u32) -> (GameState, FactionId, FactionId) {
    let grid = HexGrid::uniform(width, height, Terrain::Plains);
    let mut state = GameState::new(WorldConfig::default(), grid);
    let rome = state.add_nation("Rome");
    let britons = state.add_nation("Britons");
    let first = state.add_faction(rome, "Legio IX").unwrap();
    let second = state.add_faction(britons, "Iceni").unwrap();
    (state, first, second)
}

pub fn hex_at(grid: &HexGrid, col: u32, row: u32) -> Hex {
    grid.hex_at(col, row)
        .unwrap_or_else(|| panic!("({col}, {row}) is off the grid"))
}
