use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use hexx::Hex;

use crate::config::WorldConfig;
use crate::economy::city::City;
use crate::economy::nation::NationId;
use crate::map::grid::HexGrid;
use crate::movement::MovementProfile;


/// Read-only view of everything a path search looks at
#[derive(Clone, Copy)]
pub struct Board<'a> {
    pub grid: &'a HexGrid,
    pub cities: &'a [City],
    pub config: &'a WorldConfig,
}

impl<'a> Board<'a> {
    pub fn new(grid: &'a HexGrid, cities: &'a [City], config: &'a WorldConfig) -> Self {
        Self {
            grid,
            cities,
            config,
        }
    }

    /// City standing on `hex`, if any
    pub fn city_at(&self, hex: Hex) -> Option<&'a City> {
        let city_id = self.grid.get(hex)?.tile.city?;
        self.cities.get(city_id.0 as usize)
    }
}

/// How a mover treats cities of other nations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityAccess {
    /// Goods pass through any city
    Ignore,
    /// Hostile cities are closed
    Avoid,
    /// May enter hostile cities (units able to attack cities)
    Attack,
}

/// The entity a path is searched for
#[derive(Debug, Clone, Copy)]
pub struct Mover<'a> {
    pub profile: &'a MovementProfile,
    pub nation: Option<NationId>,
    pub cities: CityAccess,
}

/// Cost for `mover` to enter `to`, `None` when it cannot enter at all.
///
/// Water is closed to movers without water movement unless their profile
/// overrides the terrain cost. Costs never drop below one.
pub fn movement_cost(board: &Board, mover: &Mover, to: Hex) -> Option<u32> {
    let cell = board.grid.get(to)?;
    let stats = board.config.terrain(cell.terrain)?;
    let own_cost = mover.profile.terrain_costs.get(&cell.terrain).copied();

    let cost = if stats.is_water && !mover.profile.move_on_water {
        own_cost?
    } else {
        own_cost.or(stats.movement_cost)?
    };
    Some(cost.max(1))
}

/// Whether `mover` may ever step onto `to`
pub fn is_legal_move(board: &Board, mover: &Mover, to: Hex) -> bool {
    entry_cost(board, mover, to).is_some()
}

/// Movement cost of a legal step into `to`
pub fn entry_cost(board: &Board, mover: &Mover, to: Hex) -> Option<u32> {
    if mover.cities == CityAccess::Avoid
        && let Some(city) = board.city_at(to)
        && Some(city.nation) != mover.nation
    {
        return None;
    }

    let cost = movement_cost(board, mover, to)?;
    // A cell costing more than a full turn's budget can never be entered
    (cost <= mover.profile.movement_points).then_some(cost)
}

#[derive(Debug, Clone)]
struct PathfindingNode {
    position: Hex,
    cost: u32,
    heuristic: u32,
    sequence: u64,
}

impl PathfindingNode {
    fn total_cost(&self) -> u32 {
        self.cost + self.heuristic
    }
}

impl PartialEq for PathfindingNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathfindingNode {}

impl PartialOrd for PathfindingNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathfindingNode {
    // Lowest f first, then lowest h, then first discovered
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cost()
            .cmp(&other.total_cost())
            .then(self.heuristic.cmp(&other.heuristic))
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Cheapest legal route from `start` to `goal` for `mover`.
///
/// The result excludes `start` and ends with `goal`. It is empty when no
/// route exists, when either end is off the grid, or when `start == goal`;
/// callers treat an empty path as "stay in place".
pub fn find_path(board: &Board, start: Hex, goal: Hex, mover: &Mover) -> Vec<Hex> {
    let grid = board.grid;
    if start == goal || !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }

    let mut open_set = BinaryHeap::new();
    let mut closed_set = HashSet::new();
    let mut came_from = HashMap::new();
    let mut cost_so_far = HashMap::new();
    let mut sequence = 0u64;

    open_set.push(Reverse(PathfindingNode {
        position: start,
        cost: 0,
        heuristic: grid.distance(start, goal),
        sequence,
    }));
    cost_so_far.insert(start, 0);

    while let Some(Reverse(current)) = open_set.pop() {
        if current.position == goal {
            return reconstruct_path(&came_from, start, goal);
        }

        if !closed_set.insert(current.position) {
            continue;
        }

        for neighbor in grid.neighbors(current.position) {
            if closed_set.contains(&neighbor) {
                continue;
            }

            let Some(step_cost) = entry_cost(board, mover, neighbor) else {
                continue;
            };

            let tentative_cost = current.cost + step_cost;
            if let Some(&existing_cost) = cost_so_far.get(&neighbor)
                && tentative_cost >= existing_cost
            {
                continue;
            }

            cost_so_far.insert(neighbor, tentative_cost);
            came_from.insert(neighbor, current.position);

            sequence += 1;
            open_set.push(Reverse(PathfindingNode {
                position: neighbor,
                cost: tentative_cost,
                heuristic: grid.distance(neighbor, goal),
                sequence,
            }));
        }
    }

    Vec::new()
}

fn reconstruct_path(came_from: &HashMap<Hex, Hex>, start: Hex, goal: Hex) -> Vec<Hex> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&parent) = came_from.get(&current) {
        if parent == start {
            break;
        }
        path.push(parent);
        current = parent;
    }

    path.reverse();
    path
}

/// Total entry cost of a path, `None` if any step is illegal for `mover`
pub fn path_cost(board: &Board, mover: &Mover, path: &[Hex]) -> Option<u32> {
    path.iter()
        .map(|hex| entry_cost(board, mover, *hex))
        .sum()
}

/// A path is valid when it is non-empty and every step, starting from
/// `start`, moves to an adjacent cell of the grid
pub fn is_valid_path(grid: &HexGrid, start: Hex, path: &[Hex]) -> bool {
    if path.is_empty() {
        return false;
    }
    let mut previous = start;
    for hex in path {
        if !grid.contains(*hex) || grid.distance(previous, *hex) != 1 {
            return false;
        }
        previous = *hex;
    }
    true
}
