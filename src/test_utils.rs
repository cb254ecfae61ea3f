//! Testing utilities for Rust Britannia
//!
//! Small fixtures that build a `GameState` without the world generator, so
//! unit tests control every cell they touch.

use hexx::Hex;

use crate::config::WorldConfig;
use crate::faction::FactionId;
use crate::map::grid::HexGrid;
use crate::map::terrain::Terrain;
use crate::messages::GameEvent;
use crate::state::GameState;

/// State over a `width` × `height` grid whose terrain comes from `terrain(col, row)`
pub fn state_with_terrain(
    width: u32,
    height: u32,
    terrain: impl FnMut(u32, u32) -> Terrain,
) -> GameState {
    GameState::new(WorldConfig::default(), HexGrid::new(width, height, terrain))
}

/// State over an all-plains grid with no parties
pub fn plains_state(width: u32, height: u32) -> GameState {
    state_with_terrain(width, height, |_, _| Terrain::Plains)
}

/// All-plains state with two nations, one faction each, in turn order
pub fn two_faction_state(width: u32, height: u32) -> (GameState, FactionId, FactionId) {
    let mut state = plains_state(width, height);
    let rome = state.add_nation("Rome");
    let britons = state.add_nation("Britons");
    let first = state.add_faction(rome, "Legio IX").unwrap();
    let second = state.add_faction(britons, "Iceni").unwrap();
    (state, first, second)
}

/// Axial coordinates of an offset cell, panicking when it is off the grid
pub fn hex_at(state: &GameState, col: u32, row: u32) -> Hex {
    state
        .grid()
        .hex_at(col, row)
        .unwrap_or_else(|| panic!("({col}, {row}) is off the grid"))
}

/// Number of pending notifications for which `predicate` holds
pub fn count_events(state: &GameState, predicate: impl Fn(&GameEvent) -> bool) -> usize {
    state.events().iter().filter(|event| predicate(event)).count()
}

/// Asserts that two cells are adjacent (distance = 1)
pub fn assert_adjacent(a: Hex, b: Hex) {
    let distance = a.distance_to(b);
    assert_eq!(
        distance, 1,
        "Cells {:?} and {:?} are not adjacent (distance: {})",
        a, b, distance
    );
}

/// Asserts that a path is a chain of adjacent cells starting next to `start`
pub fn assert_valid_path(start: Hex, path: &[Hex]) {
    let mut previous = start;
    for &hex in path {
        assert_adjacent(previous, hex);
        previous = hex;
    }
}
