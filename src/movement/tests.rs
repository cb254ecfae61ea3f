use super::*;
use crate::config::WorldConfig;
use crate::map::grid::HexGrid;
use crate::pathfinding::CityAccess;

const CIVILIAN: MoverTraits = MoverTraits {
    nation: None,
    cities: CityAccess::Avoid,
};

fn plains(width: u32, height: u32) -> (HexGrid, WorldConfig) {
    (
        HexGrid::uniform(width, height, Terrain::Plains),
        WorldConfig::default(),
    )
}

fn movable(grid: &HexGrid, col: u32, row: u32, points: u32) -> Movable {
    let hex = grid.hex_at(col, row).unwrap();
    Movable::new(grid, hex, None, MovementProfile::new(points)).unwrap()
}

#[test]
fn test_new_movable_starts_with_full_budget() {
    let (grid, _) = plains(3, 3);
    let unit = movable(&grid, 1, 1, 2);
    assert_eq!(unit.moves(), 2);
    assert_eq!(unit.state(), MovementState::Idle);
    assert!(unit.remaining_path().is_empty());
}

#[test]
fn test_new_movable_rejects_off_grid_cell() {
    let (grid, _) = plains(3, 3);
    let result = Movable::new(&grid, Hex::new(7, 7), None, MovementProfile::new(2));
    assert_eq!(result, Err(GameError::InvalidCell(Hex::new(7, 7))));
}

#[test]
fn test_two_point_unit_walks_two_plains_cells() {
    let (grid, config) = plains(3, 3);
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 2);
    let target = Hex::new(2, 0);

    assert!(unit.set_path(&board, target, CIVILIAN));
    assert_eq!(unit.remaining_path().len(), 2);
    assert_eq!(unit.state(), MovementState::PathQueued);

    let outcomes = unit.move_one_turn(&board, CIVILIAN);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(unit.hex(), target);
    assert_eq!(unit.moves(), 0);
    assert!(unit.remaining_path().is_empty());
    assert_eq!(unit.state(), MovementState::Idle);
}

#[test]
fn test_path_is_kept_across_turns() {
    let (grid, config) = plains(3, 3);
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 1);
    let target = Hex::new(2, 1);

    assert!(unit.set_path(&board, target, CIVILIAN));
    assert_eq!(unit.remaining_path().len(), 3);

    unit.move_one_turn(&board, CIVILIAN);
    assert_eq!(unit.remaining_path().len(), 2);
    assert_eq!(unit.moves(), 0);
    assert!(!unit.can_continue_on_path());

    unit.prepare_for_new_turn();
    assert!(unit.can_continue_on_path());
    unit.move_one_turn(&board, CIVILIAN);
    assert_eq!(unit.remaining_path().len(), 1);
    assert_eq!(unit.state(), MovementState::Moving);

    unit.prepare_for_new_turn();
    unit.move_one_turn(&board, CIVILIAN);
    assert_eq!(unit.hex(), target);
}

#[test]
fn test_insufficient_budget_spends_budget_in_place() {
    let mut grid = HexGrid::uniform(3, 1, Terrain::Plains);
    let forest = grid.hex_at(2, 0).unwrap();
    grid.get_mut(forest).unwrap().terrain = Terrain::Forest;
    let config = WorldConfig::default();
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 2);

    assert!(unit.set_path(&board, forest, CIVILIAN));
    let start = unit.hex();
    assert!(matches!(
        unit.move_one_step(&board, CIVILIAN),
        StepOutcome::Moved { from, cost: 1, .. } if from == start
    ));
    assert_eq!(unit.move_one_step(&board, CIVILIAN), StepOutcome::Exhausted);
    assert_eq!(unit.moves(), 0);
    assert_eq!(unit.hex(), grid.hex_at(1, 0).unwrap());
    // The path survives for the next turn
    assert_eq!(unit.remaining_path(), &[forest]);
}

#[test]
fn test_step_into_newly_illegal_cell_drops_path() {
    let mut grid = HexGrid::uniform(3, 1, Terrain::Plains);
    let config = WorldConfig::default();
    let target = grid.hex_at(2, 0).unwrap();
    let mut unit = movable(&grid, 0, 0, 2);
    {
        let board = Board::new(&grid, &[], &config);
        assert!(unit.set_path(&board, target, CIVILIAN));
    }

    let middle = grid.hex_at(1, 0).unwrap();
    grid.get_mut(middle).unwrap().terrain = Terrain::Ocean;
    let board = Board::new(&grid, &[], &config);

    assert_eq!(unit.move_one_step(&board, CIVILIAN), StepOutcome::Blocked);
    assert!(unit.remaining_path().is_empty());
    assert_eq!(unit.moves(), 2);
}

#[test]
fn test_failed_search_clears_previous_path() {
    let mut grid = HexGrid::uniform(3, 1, Terrain::Plains);
    let lake = grid.hex_at(2, 0).unwrap();
    grid.get_mut(lake).unwrap().terrain = Terrain::Lake;
    let config = WorldConfig::default();
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 2);

    assert!(unit.set_path(&board, grid.hex_at(1, 0).unwrap(), CIVILIAN));
    assert!(!unit.set_path(&board, lake, CIVILIAN));
    assert!(unit.remaining_path().is_empty());
    assert_eq!(unit.state(), MovementState::Idle);
}

#[test]
fn test_destroyed_movable_stays_inert() {
    let (grid, config) = plains(3, 3);
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 2);
    assert!(unit.set_path(&board, Hex::new(2, 0), CIVILIAN));

    unit.destroy();
    assert!(unit.is_destroyed());
    assert_eq!(unit.moves(), 0);
    assert!(unit.remaining_path().is_empty());

    unit.prepare_for_new_turn();
    assert_eq!(unit.moves(), 0);
    assert!(!unit.set_path(&board, Hex::new(2, 0), CIVILIAN));
    assert_eq!(unit.move_one_step(&board, CIVILIAN), StepOutcome::Idle);
}

#[test]
fn test_end_moves_keeps_path() {
    let (grid, config) = plains(3, 3);
    let board = Board::new(&grid, &[], &config);
    let mut unit = movable(&grid, 0, 0, 2);
    assert!(unit.set_path(&board, Hex::new(2, 0), CIVILIAN));

    unit.end_moves();
    assert!(!unit.can_move());
    assert_eq!(unit.remaining_path().len(), 2);
    assert!(unit.move_one_turn(&board, CIVILIAN).is_empty());
}
