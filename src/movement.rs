use std::collections::BTreeMap;

use bevy::log::{debug, warn};
use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::economy::nation::NationId;
use crate::error::GameError;
use crate::faction::FactionId;
use crate::map::grid::HexGrid;
use crate::map::terrain::Terrain;
use crate::messages::GameEvent;
use crate::pathfinding::{Board, CityAccess, Mover, entry_cost, find_path};
use crate::state::GameState;
use crate::units::{EntityRef, MobileEntity};

#[cfg(test)]
mod tests;

/// How far an entity gets per turn and what the terrain costs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementProfile {
    pub movement_points: u32,
    /// Per-terrain costs replacing the terrain's own cost for this mover
    #[serde(default)]
    pub terrain_costs: BTreeMap<Terrain, u32>,
    #[serde(default)]
    pub move_on_water: bool,
}

impl MovementProfile {
    pub fn new(movement_points: u32) -> Self {
        Self {
            movement_points,
            terrain_costs: BTreeMap::new(),
            move_on_water: false,
        }
    }
}

/// Everything about a mover that is not part of its own movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverTraits {
    pub nation: Option<NationId>,
    pub cities: CityAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    /// A path is set but no step was taken along it yet
    PathQueued,
    Moving,
    Destroyed,
}

/// Result of trying to take one step along the stored path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: Hex, to: Hex, cost: u32 },
    /// The next cell costs more than what is left; the budget is spent and
    /// the entity stays put
    Exhausted,
    /// The next cell became illegal; the path was dropped
    Blocked,
    /// Nothing to do: no path, or the entity is destroyed
    Idle,
}

/// Position, per-turn budget and queued path of a unit or goods stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movable {
    hex: Hex,
    faction: Option<FactionId>,
    profile: MovementProfile,
    moves: u32,
    path: Vec<Hex>,
    cursor: usize,
    state: MovementState,
}

impl Movable {
    /// New movables start with a full budget
    pub fn new(
        grid: &HexGrid,
        hex: Hex,
        faction: Option<FactionId>,
        profile: MovementProfile,
    ) -> Result<Self, GameError> {
        if !grid.contains(hex) {
            return Err(GameError::InvalidCell(hex));
        }
        Ok(Self {
            hex,
            faction,
            moves: profile.movement_points,
            profile,
            path: Vec::new(),
            cursor: 0,
            state: MovementState::Idle,
        })
    }

    pub fn hex(&self) -> Hex {
        self.hex
    }

    pub fn faction(&self) -> Option<FactionId> {
        self.faction
    }

    pub fn profile(&self) -> &MovementProfile {
        &self.profile
    }

    /// Movement points left this turn
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == MovementState::Destroyed
    }

    /// Cells still ahead on the stored path
    pub fn remaining_path(&self) -> &[Hex] {
        &self.path[self.cursor..]
    }

    pub fn can_move(&self) -> bool {
        !self.is_destroyed() && self.moves > 0
    }

    pub fn can_continue_on_path(&self) -> bool {
        self.can_move() && !self.remaining_path().is_empty()
    }

    pub fn mover(&self, traits: MoverTraits) -> Mover<'_> {
        Mover {
            profile: &self.profile,
            nation: traits.nation,
            cities: traits.cities,
        }
    }

    /// Searches a path to `target` and stores it. Returns whether a non-empty
    /// path was found; on failure the previous path is dropped.
    pub fn set_path(&mut self, board: &Board, target: Hex, traits: MoverTraits) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let path = find_path(board, self.hex, target, &self.mover(traits));
        self.cursor = 0;
        if path.is_empty() {
            self.path.clear();
            self.state = MovementState::Idle;
            return false;
        }
        self.path = path;
        self.state = MovementState::PathQueued;
        true
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
        self.cursor = 0;
        if !self.is_destroyed() {
            self.state = MovementState::Idle;
        }
    }

    pub fn move_one_step(&mut self, board: &Board, traits: MoverTraits) -> StepOutcome {
        if self.is_destroyed() {
            return StepOutcome::Idle;
        }
        let Some(&next) = self.remaining_path().first() else {
            self.state = MovementState::Idle;
            return StepOutcome::Idle;
        };

        let Some(cost) = entry_cost(board, &self.mover(traits), next) else {
            self.clear_path();
            return StepOutcome::Blocked;
        };

        if self.moves < cost {
            self.moves = 0;
            self.state = MovementState::Idle;
            return StepOutcome::Exhausted;
        }

        let from = self.hex;
        self.moves -= cost;
        self.hex = next;
        self.cursor += 1;
        if self.remaining_path().is_empty() {
            self.clear_path();
        } else {
            self.state = MovementState::Moving;
        }
        StepOutcome::Moved {
            from,
            to: next,
            cost,
        }
    }

    /// Steps along the path while budget and path remain
    pub fn move_one_turn(&mut self, board: &Board, traits: MoverTraits) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();
        while self.can_continue_on_path() {
            outcomes.push(self.move_one_step(board, traits));
        }
        outcomes
    }

    pub fn prepare_for_new_turn(&mut self) {
        if !self.is_destroyed() {
            self.moves = self.profile.movement_points;
        }
    }

    /// Spends what is left of this turn's budget
    pub fn end_moves(&mut self) {
        self.moves = 0;
    }

    pub fn destroy(&mut self) {
        self.moves = 0;
        self.path.clear();
        self.cursor = 0;
        self.state = MovementState::Destroyed;
    }
}

impl GameState {
    /// Board view, mover traits and movement state of one entity, borrowed
    /// side by side
    fn mobile_parts(&mut self, entity: EntityRef) -> Option<(Board<'_>, MoverTraits, &mut Movable)> {
        let Self {
            grid,
            cities,
            config,
            factions,
            units,
            goods,
            ..
        } = self;

        let mobile: &mut dyn MobileEntity = match entity {
            EntityRef::Unit(id) => units.get_mut(id.0 as usize)?,
            EntityRef::Goods(id) => goods.iter_mut().find(|goods| goods.id == id)?,
        };

        let nation = mobile
            .movable()
            .faction()
            .and_then(|faction| factions.get(faction.0 as usize))
            .map(|faction| faction.nation);
        let traits = MoverTraits {
            nation,
            cities: mobile.city_access(),
        };

        Some((Board::new(grid, cities, config), traits, mobile.movable_mut()))
    }

    /// Nation and city access of an entity, as the pathfinder sees them
    pub fn mover_traits(&self, entity: EntityRef) -> Option<MoverTraits> {
        let (movable, cities) = match entity {
            EntityRef::Unit(id) => {
                let unit = self.units.get(id.0 as usize)?;
                (unit.movable(), unit.city_access())
            }
            EntityRef::Goods(id) => {
                let goods = self.goods_item(id)?;
                (goods.movable(), goods.city_access())
            }
        };
        let nation = movable
            .faction()
            .and_then(|faction| self.faction(faction))
            .map(|faction| faction.nation);
        Some(MoverTraits { nation, cities })
    }

    pub fn movable(&self, entity: EntityRef) -> Option<&Movable> {
        match entity {
            EntityRef::Unit(id) => self.units.get(id.0 as usize).map(|unit| unit.movable()),
            EntityRef::Goods(id) => self.goods_item(id).map(|goods| goods.movable()),
        }
    }

    pub fn set_path(&mut self, entity: EntityRef, target: Hex) -> bool {
        let Some((board, traits, movable)) = self.mobile_parts(entity) else {
            return false;
        };
        if !movable.set_path(&board, target, traits) {
            warn!("{entity}: no route to {:?}", target);
            return false;
        }
        let path = movable.remaining_path().to_vec();
        self.emit(GameEvent::MovementStarted { entity, path });
        true
    }

    pub fn move_one_step(&mut self, entity: EntityRef) -> StepOutcome {
        let Some((board, traits, movable)) = self.mobile_parts(entity) else {
            return StepOutcome::Idle;
        };
        let outcome = movable.move_one_step(&board, traits);
        self.record_step(entity, outcome);
        outcome
    }

    /// Moves the entity as far as this turn's budget allows; returns the
    /// number of cells entered
    pub fn move_one_turn(&mut self, entity: EntityRef) -> usize {
        let Some((board, traits, movable)) = self.mobile_parts(entity) else {
            return 0;
        };
        let outcomes = movable.move_one_turn(&board, traits);
        let mut steps = 0;
        for outcome in outcomes {
            if matches!(outcome, StepOutcome::Moved { .. }) {
                steps += 1;
            }
            self.record_step(entity, outcome);
        }
        steps
    }

    fn record_step(&mut self, entity: EntityRef, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Moved { from, to, .. } => {
                self.emit(GameEvent::EntityMoved { entity, from, to });
            }
            StepOutcome::Blocked => debug!("{entity}: path blocked, dropped"),
            StepOutcome::Exhausted | StepOutcome::Idle => {}
        }
    }

    pub fn prepare_for_new_turn(&mut self, entity: EntityRef) {
        if let Some((_, _, movable)) = self.mobile_parts(entity) {
            movable.prepare_for_new_turn();
        }
    }

    /// Marks the entity destroyed. Destroyed units keep their slot, goods are
    /// swept at the end of the round.
    pub fn destroy(&mut self, entity: EntityRef) {
        let Some((_, _, movable)) = self.mobile_parts(entity) else {
            return;
        };
        if movable.is_destroyed() {
            return;
        }
        movable.destroy();
        if let EntityRef::Unit(unit) = entity
            && self.active == Some(unit)
        {
            self.active = None;
        }
        self.emit(GameEvent::EntityDestroyed { entity });
    }
}
