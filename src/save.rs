//! Serializable snapshot of a whole game and its reconstruction.
//!
//! Writing snapshots to disk is left to the host; the core only turns a
//! `GameState` into a [`GameSnapshot`] and back, checking every reference on
//! the way in.

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::economy::city::City;
use crate::economy::laborer::Laborer;
use crate::economy::nation::Nation;
use crate::error::GameError;
use crate::faction::Faction;
use crate::map::grid::{Cell, HexGrid};
use crate::pathfinding::is_valid_path;
use crate::state::GameState;
use crate::turn_system::TurnState;
use crate::units::{Goods, MobileEntity, Unit, UnitId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: u32,
    pub height: u32,
    /// Row-major, as laid out by the grid
    pub cells: Vec<Cell>,
    pub nations: Vec<Nation>,
    pub factions: Vec<Faction>,
    pub cities: Vec<City>,
    pub units: Vec<Unit>,
    pub goods: Vec<Goods>,
    pub laborers: Vec<Laborer>,
    pub turn: TurnState,
    pub active: Option<UnitId>,
    pub next_goods_id: u32,
    pub seed: u64,
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|err| GameError::Snapshot(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|err| GameError::Snapshot(err.to_string()))
    }
}

fn invalid(message: impl Into<String>) -> GameError {
    GameError::Snapshot(message.into())
}

/// Ids of a list must be its indices
fn check_indices<T>(
    items: &[T],
    what: &str,
    id_of: impl Fn(&T) -> u32,
) -> Result<(), GameError> {
    for (index, item) in items.iter().enumerate() {
        if id_of(item) as usize != index {
            return Err(invalid(format!(
                "{what} at position {index} has id {}",
                id_of(item)
            )));
        }
    }
    Ok(())
}

impl GameState {
    /// Everything needed to resume the game. Queued actions and unpublished
    /// notifications are not part of it.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.iter().cloned().collect(),
            nations: self.nations.clone(),
            factions: self.factions.clone(),
            cities: self.cities.clone(),
            units: self.units.clone(),
            goods: self.goods.clone(),
            laborers: self.laborers.clone(),
            turn: self.turn.clone(),
            active: self.active,
            next_goods_id: self.next_goods_id,
            seed: self.seed,
        }
    }

    /// Rebuilds a game, rejecting snapshots whose references do not line up
    pub fn from_snapshot(snapshot: GameSnapshot, config: WorldConfig) -> Result<Self, GameError> {
        config.validate()?;
        let grid = HexGrid::from_cells(snapshot.width, snapshot.height, snapshot.cells)?;

        check_indices(&snapshot.nations, "nation", |nation| nation.id.0)?;
        check_indices(&snapshot.factions, "faction", |faction| faction.id.0)?;
        check_indices(&snapshot.cities, "city", |city| city.id.0)?;
        check_indices(&snapshot.units, "unit", |unit| unit.id.0)?;
        check_indices(&snapshot.laborers, "laborer", |laborer| laborer.id.0)?;

        let nation_count = snapshot.nations.len() as u32;
        let faction_count = snapshot.factions.len() as u32;
        let unit_count = snapshot.units.len() as u32;

        for faction in &snapshot.factions {
            if faction.nation.0 >= nation_count {
                return Err(GameError::UnknownNation(faction.nation));
            }
            if let Some(unit) = faction.units().iter().find(|unit| unit.0 >= unit_count) {
                return Err(invalid(format!(
                    "faction #{} lists missing unit #{}",
                    faction.id.0, unit.0
                )));
            }
        }

        for city in &snapshot.cities {
            if city.nation.0 >= nation_count {
                return Err(GameError::UnknownNation(city.nation));
            }
            let cell = grid.get(city.hex).ok_or(GameError::InvalidCell(city.hex))?;
            if cell.tile.city != Some(city.id) {
                return Err(invalid(format!(
                    "city #{} is not recorded on its cell {:?}",
                    city.id.0, city.hex
                )));
            }
            if let Some(laborer) = city
                .laborers
                .iter()
                .find(|laborer| laborer.0 as usize >= snapshot.laborers.len())
            {
                return Err(invalid(format!(
                    "city #{} lists missing laborer #{}",
                    city.id.0, laborer.0
                )));
            }
        }

        for cell in grid.iter() {
            if let Some(city) = cell.tile.city
                && snapshot
                    .cities
                    .get(city.0 as usize)
                    .is_none_or(|record| record.hex != cell.hex)
            {
                return Err(invalid(format!(
                    "cell {:?} points at city #{} which is not there",
                    cell.hex, city.0
                )));
            }
            if let Some(laborer) = cell.tile.laborers.iter().find(|laborer| {
                snapshot
                    .laborers
                    .get(laborer.0 as usize)
                    .is_none_or(|record| record.hex != cell.hex)
            }) {
                return Err(invalid(format!(
                    "cell {:?} lists laborer #{} who works elsewhere",
                    cell.hex, laborer.0
                )));
            }
        }

        let mobiles = snapshot
            .units
            .iter()
            .map(|unit| unit as &dyn MobileEntity)
            .chain(snapshot.goods.iter().map(|goods| goods as &dyn MobileEntity));
        for mobile in mobiles {
            let movable = mobile.movable();
            if !grid.contains(movable.hex()) {
                return Err(GameError::InvalidCell(movable.hex()));
            }
            if let Some(faction) = movable.faction()
                && faction.0 >= faction_count
            {
                return Err(GameError::UnknownFaction(faction));
            }
            let path = movable.remaining_path();
            if !path.is_empty() && !is_valid_path(&grid, movable.hex(), path) {
                return Err(invalid(format!(
                    "{} has a broken path",
                    mobile.entity_ref()
                )));
            }
        }

        let mut goods_ids = BTreeSet::new();
        for goods in &snapshot.goods {
            if goods.id.0 >= snapshot.next_goods_id || !goods_ids.insert(goods.id) {
                return Err(invalid(format!("goods id #{} is reused", goods.id.0)));
            }
        }

        for laborer in &snapshot.laborers {
            if !grid.contains(laborer.hex) {
                return Err(GameError::InvalidCell(laborer.hex));
            }
            if let Some(city) = laborer.city
                && city.0 as usize >= snapshot.cities.len()
            {
                return Err(GameError::UnknownCity(city));
            }
        }

        if !snapshot.factions.is_empty() && snapshot.turn.current >= snapshot.factions.len() {
            return Err(GameError::InvalidTurnIndex {
                index: snapshot.turn.current,
                factions: snapshot.factions.len(),
            });
        }
        if let Some(active) = snapshot.active
            && snapshot
                .units
                .get(active.0 as usize)
                .is_none_or(|unit| unit.movable().is_destroyed())
        {
            return Err(invalid(format!("active unit #{} cannot act", active.0)));
        }

        let mut state = GameState::new(config, grid).with_seed(snapshot.seed);
        state.nations = snapshot.nations;
        state.factions = snapshot.factions;
        state.cities = snapshot.cities;
        state.units = snapshot.units;
        state.goods = snapshot.goods;
        state.laborers = snapshot.laborers;
        state.turn = snapshot.turn;
        state.active = snapshot.active;
        state.next_goods_id = snapshot.next_goods_id;
        Ok(state)
    }
}

/// Asks for a snapshot of the running game
#[derive(Message, Clone, Debug, Default)]
pub struct SnapshotRequest;

/// A snapshot taken after this tick's mutations
#[derive(Message, Clone, Debug)]
pub struct SnapshotTaken {
    pub snapshot: GameSnapshot,
}

fn take_snapshots(
    state: Option<Res<GameState>>,
    mut requests: MessageReader<SnapshotRequest>,
    mut taken: MessageWriter<SnapshotTaken>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    let Some(state) = state else {
        warn!("Snapshot requested before the game started");
        return;
    };
    info!("Taking snapshot of round {}", state.round());
    taken.write(SnapshotTaken {
        snapshot: state.snapshot(),
    });
}

pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SnapshotRequest>()
            .add_message::<SnapshotTaken>()
            .add_systems(PostUpdate, take_snapshots);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::economy::city::CityId;
    use crate::economy::laborer::LaborerId;
    use crate::units::{GoodsKind, UnitKind};

    fn played_state() -> GameState {
        let (mut state, first, second) = two_faction_state(6, 4);
        let nation = state.faction(first).unwrap().nation;
        let city_hex = hex_at(&state, 1, 1);
        let city = state.found_city(city_hex, nation, 1).unwrap();
        state.add_laborer(hex_at(&state, 2, 1), UnitKind::Farmer, Some(city)).unwrap();
        state.spawn_unit(first, UnitKind::Farmer, hex_at(&state, 3, 2)).unwrap();
        state.spawn_unit(second, UnitKind::Legion, hex_at(&state, 5, 3)).unwrap();
        state
            .spawn_goods(GoodsKind::Wool, 3, hex_at(&state, 4, 0), Some(first))
            .unwrap();
        state.start_round().unwrap();
        state
    }

    #[test]
    fn test_snapshot_restores_same_game() {
        let state = played_state();
        let json = state.snapshot().to_json().unwrap();

        let restored =
            GameState::from_snapshot(GameSnapshot::from_json(&json).unwrap(), WorldConfig::default())
                .unwrap();

        assert_eq!(restored.snapshot(), state.snapshot());
        assert_eq!(restored.active_unit(), state.active_unit());
        assert_eq!(restored.round(), 1);
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_snapshot_rejects_dangling_faction() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        snapshot.factions.pop();

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::UnknownFaction(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_city_missing_from_cell() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        for cell in &mut snapshot.cells {
            cell.tile.city = None;
        }

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_cell_pointing_at_missing_city() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        let cell = snapshot
            .cells
            .iter_mut()
            .find(|cell| cell.tile.city.is_none())
            .unwrap();
        cell.tile.city = Some(CityId(42));

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_cell_pointing_at_city_elsewhere() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        let cell = snapshot
            .cells
            .iter_mut()
            .find(|cell| cell.tile.city.is_none())
            .unwrap();
        cell.tile.city = Some(CityId(0));

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_unknown_laborer_on_cell() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        snapshot.cells[0].tile.laborers.insert(LaborerId(99));

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_unknown_laborer_in_city() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        snapshot.cities[0].laborers.insert(LaborerId(99));

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_bad_turn_index() {
        let state = played_state();
        let mut snapshot = state.snapshot();
        snapshot.turn.current = 7;

        assert!(matches!(
            GameState::from_snapshot(snapshot, WorldConfig::default()),
            Err(GameError::InvalidTurnIndex {
                index: 7,
                factions: 2
            })
        ));
    }

    #[test]
    fn test_malformed_json_is_a_snapshot_error() {
        assert!(matches!(
            GameSnapshot::from_json("{\"width\": 3"),
            Err(GameError::Snapshot(_))
        ));
    }
}
