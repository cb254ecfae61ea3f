//! Command table of everything a player can ask a unit or a cell to do.
//!
//! Each entry pairs a validity predicate with an executor. Requests are
//! checked when handled, queued, and executed on the following tick after a
//! second validity check, so observers see the `ActionQueued` notification
//! before any side effect lands.

use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::constants::IMPROVEMENT_CLAIM;
use crate::error::GameError;
use crate::faction::FactionId;
use crate::map::tile::Improvement;
use crate::messages::{ActionRequest, GameEvent, View};
use crate::pathfinding::is_legal_move;
use crate::state::GameState;
use crate::turn_system::LogicSet;
use crate::units::{EntityRef, MobileEntity, UnitId, UnitKind};


/// Implements `key()`, `Display` and `FromStr` for a closed set of
/// kebab-case catalog names
macro_rules! catalog_keys {
    ($name:ident, $error:ident, { $($variant:ident => $key:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $name {
            type Err = GameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.key() == s)
                    .ok_or_else(|| GameError::$error(s.to_string()))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKey {
    Wait,
    Skip,
    EndTurn,
    MoveTo,
    BuildFarm,
    CityView,
    TileView,
}

catalog_keys!(ActionKey, UnknownAction, {
    Wait => "wait",
    Skip => "skip",
    EndTurn => "end-turn",
    MoveTo => "move-to",
    BuildFarm => "build-farm",
    CityView => "city-view",
    TileView => "tile-view",
});

/// UI menu an action is offered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Menu {
    TileMenu,
    UnitMenu,
}

catalog_keys!(Menu, UnknownMenu, {
    TileMenu => "tile-menu",
    UnitMenu => "unit-menu",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    CurrentPlayerTurn,
    HexTileValid,
    IsCityTile,
    IsFarmBuildable,
    IsHexControlled,
    IsLegalMove,
}

catalog_keys!(ValidatorKind, UnknownValidator, {
    CurrentPlayerTurn => "current-player-turn",
    HexTileValid => "hex-tile-valid",
    IsCityTile => "is-city-tile",
    IsFarmBuildable => "is-farm-buildable",
    IsHexControlled => "is-hex-controlled",
    IsLegalMove => "is-legal-move",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorKind {
    BuildFarm,
    EndTurn,
    Skip,
    Wait,
    StartMoveTo,
    StartCityView,
    StartTileView,
}

catalog_keys!(ExecutorKind, UnknownExecutor, {
    BuildFarm => "build-farm",
    EndTurn => "end-turn",
    Skip => "skip",
    Wait => "wait",
    StartMoveTo => "start-move-to",
    StartCityView => "start-city-view",
    StartTileView => "start-tile-view",
});

/// Who asks, about which cell, from where
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub unit: Option<UnitId>,
    pub hex: Hex,
    pub faction: FactionId,
    pub menu: Option<Menu>,
}

impl ActionContext {
    pub fn at(hex: Hex, faction: FactionId) -> Self {
        Self {
            unit: None,
            hex,
            faction,
            menu: None,
        }
    }

    pub fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Context of a unit acting on its own cell, as for a key press
    pub fn for_unit(state: &GameState, unit: UnitId) -> Option<Self> {
        let movable = state.unit(unit)?.movable();
        let faction = movable.faction()?;
        Some(Self::at(movable.hex(), faction).with_unit(unit))
    }

    pub fn for_active_unit(state: &GameState) -> Option<Self> {
        Self::for_unit(state, state.active_unit()?)
    }
}

impl ValidatorKind {
    pub fn check(self, state: &GameState, context: &ActionContext) -> bool {
        match self {
            ValidatorKind::CurrentPlayerTurn => {
                state.current_faction() == Some(context.faction)
            }
            ValidatorKind::HexTileValid => state.grid().contains(context.hex),
            ValidatorKind::IsCityTile => state
                .grid()
                .get(context.hex)
                .is_some_and(|cell| cell.tile.city.is_some()),
            ValidatorKind::IsFarmBuildable => {
                let Some(unit) = context.unit.and_then(|unit| state.unit(unit)) else {
                    return false;
                };
                let Some(cell) = state.grid().get(context.hex) else {
                    return false;
                };
                unit.kind == UnitKind::Farmer
                    && !unit.movable().is_destroyed()
                    && unit.movable().hex() == context.hex
                    && cell
                        .tile
                        .is_valid_improvement(Improvement::Farm, cell.terrain, state.config())
            }
            ValidatorKind::IsHexControlled => state
                .grid()
                .get(context.hex)
                .is_some_and(|cell| cell.tile.faction() == Some(context.faction)),
            ValidatorKind::IsLegalMove => {
                let Some(unit) = context.unit else {
                    return false;
                };
                let entity = EntityRef::Unit(unit);
                let (Some(movable), Some(traits)) =
                    (state.movable(entity), state.mover_traits(entity))
                else {
                    return false;
                };
                !movable.is_destroyed()
                    && movable.hex() != context.hex
                    && is_legal_move(&state.board(), &movable.mover(traits), context.hex)
            }
        }
    }
}

impl ExecutorKind {
    pub fn run(self, state: &mut GameState, context: &ActionContext) {
        match self {
            ExecutorKind::BuildFarm => {
                let Some(unit) = context.unit else {
                    return;
                };
                let hex = context.hex;
                if let Some(cell) = state.grid_mut().get_mut(hex) {
                    cell.tile.set_improvement(Improvement::Farm);
                    cell.tile
                        .faction_claims
                        .claim(context.faction, IMPROVEMENT_CLAIM as i64);
                }
                let city = state.nearest_city(hex).map(|city| city.id);
                if let Err(err) = state.add_laborer(hex, UnitKind::Farmer, city) {
                    warn!("Farm at {:?} has no laborer: {err}", hex);
                }
                state.destroy(EntityRef::Unit(unit));
                state.check_end_turn(context.faction);
            }
            ExecutorKind::EndTurn => {
                if let Err(err) = state.end_turn() {
                    warn!("Cannot end turn: {err}");
                }
            }
            ExecutorKind::Skip => {
                if let Some(unit) = context.unit {
                    state.deactivate(unit, true);
                    state.check_end_turn(context.faction);
                }
            }
            ExecutorKind::Wait => {
                if let Some(unit) = context.unit {
                    state.deactivate(unit, false);
                    state.check_end_turn(context.faction);
                }
            }
            ExecutorKind::StartMoveTo => {
                let Some(unit) = context.unit else {
                    return;
                };
                let entity = EntityRef::Unit(unit);
                if state.set_path(entity, context.hex) {
                    state.move_one_turn(entity);
                    state.check_end_turn(context.faction);
                }
            }
            ExecutorKind::StartCityView => state.emit(GameEvent::ViewRequested {
                view: View::City,
                hex: context.hex,
            }),
            ExecutorKind::StartTileView => state.emit(GameEvent::ViewRequested {
                view: View::Tile,
                hex: context.hex,
            }),
        }
    }
}

/// One resolved entry of the action table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDef {
    pub key: ActionKey,
    pub label: String,
    /// Menus the action is offered in; `None` for actions triggered directly
    pub menus: Option<Vec<Menu>>,
    /// Unit kinds allowed to perform the action; `None` for any or no unit
    pub unit_kinds: Option<Vec<UnitKind>>,
    pub validator: Option<ValidatorKind>,
    pub executor: ExecutorKind,
}

impl ActionDef {
    pub fn is_valid(&self, state: &GameState, context: &ActionContext) -> bool {
        if state.is_between_rounds() {
            return false;
        }
        if let (Some(menu), Some(menus)) = (context.menu, &self.menus)
            && !menus.contains(&menu)
        {
            return false;
        }
        if let Some(kinds) = &self.unit_kinds {
            let kind = context.unit.and_then(|unit| state.unit(unit)).map(|unit| unit.kind);
            if !kind.is_some_and(|kind| kinds.contains(&kind)) {
                return false;
            }
        }
        self.validator
            .is_none_or(|validator| validator.check(state, context))
    }
}

/// Name-based action definition as authored in world data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub show_in: Option<Vec<String>>,
    #[serde(default)]
    pub unit_types: Option<Vec<String>>,
    #[serde(default)]
    pub is_valid: Option<String>,
    pub execute: String,
}

impl ActionDefinition {
    /// Resolves every name, failing on the first unknown one
    pub fn resolve(&self) -> Result<ActionDef, GameError> {
        let menus = self
            .show_in
            .as_ref()
            .map(|menus| menus.iter().map(|menu| menu.parse()).collect::<Result<Vec<Menu>, _>>())
            .transpose()?;
        let unit_kinds = self
            .unit_types
            .as_ref()
            .map(|kinds| {
                kinds
                    .iter()
                    .map(|kind| kind.parse())
                    .collect::<Result<Vec<UnitKind>, _>>()
            })
            .transpose()?;
        let validator = self
            .is_valid
            .as_deref()
            .map(str::parse::<ValidatorKind>)
            .transpose()?;

        Ok(ActionDef {
            key: self.key.parse()?,
            label: self.label.clone(),
            menus,
            unit_kinds,
            validator,
            executor: self.execute.parse()?,
        })
    }
}

/// An accepted request waiting for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    pub key: ActionKey,
    pub context: ActionContext,
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ActionRegistry {
    actions: Vec<ActionDef>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        let action = |key, label: &str, validator, executor| ActionDef {
            key,
            label: label.to_string(),
            menus: None,
            unit_kinds: None,
            validator: Some(validator),
            executor,
        };

        let mut move_to = action(
            ActionKey::MoveTo,
            "Move here",
            ValidatorKind::IsLegalMove,
            ExecutorKind::StartMoveTo,
        );
        move_to.menus = Some(vec![Menu::TileMenu]);

        let mut build_farm = action(
            ActionKey::BuildFarm,
            "Build farm",
            ValidatorKind::IsFarmBuildable,
            ExecutorKind::BuildFarm,
        );
        build_farm.menus = Some(vec![Menu::TileMenu, Menu::UnitMenu]);
        build_farm.unit_kinds = Some(vec![UnitKind::Farmer]);

        let mut city_view = action(
            ActionKey::CityView,
            "Enter city",
            ValidatorKind::IsCityTile,
            ExecutorKind::StartCityView,
        );
        city_view.menus = Some(vec![Menu::TileMenu]);

        let mut tile_view = action(
            ActionKey::TileView,
            "View tile",
            ValidatorKind::HexTileValid,
            ExecutorKind::StartTileView,
        );
        tile_view.menus = Some(vec![Menu::TileMenu]);

        Self {
            actions: vec![
                action(
                    ActionKey::Wait,
                    "Wait",
                    ValidatorKind::CurrentPlayerTurn,
                    ExecutorKind::Wait,
                ),
                action(
                    ActionKey::Skip,
                    "Skip",
                    ValidatorKind::CurrentPlayerTurn,
                    ExecutorKind::Skip,
                ),
                action(
                    ActionKey::EndTurn,
                    "End turn",
                    ValidatorKind::CurrentPlayerTurn,
                    ExecutorKind::EndTurn,
                ),
                move_to,
                build_farm,
                city_view,
                tile_view,
            ],
        }
    }
}

impl ActionRegistry {
    pub fn from_definitions(definitions: &[ActionDefinition]) -> Result<Self, GameError> {
        let actions = definitions
            .iter()
            .map(ActionDefinition::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { actions })
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let definitions: Vec<ActionDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(&definitions)
    }

    pub fn get(&self, key: ActionKey) -> Option<&ActionDef> {
        self.actions.iter().find(|action| action.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.actions.iter()
    }

    /// Validates a request and queues it for the next tick
    pub fn handle(&self, state: &mut GameState, key: &str, context: ActionContext) -> bool {
        let key = match key.parse::<ActionKey>() {
            Ok(key) => key,
            Err(err) => {
                warn!("{err}");
                return false;
            }
        };
        let Some(action) = self.get(key) else {
            debug!("Action `{key}` is not in the registry");
            return false;
        };
        if !action.is_valid(state, &context) {
            return false;
        }

        state.emit(GameEvent::ActionQueued {
            action: key,
            context,
        });
        state.pending_actions.push_back(PendingAction { key, context });
        true
    }

    /// Runs an action right away if it is still valid
    pub fn execute(&self, state: &mut GameState, key: ActionKey, context: &ActionContext) -> bool {
        let Some(action) = self.get(key) else {
            return false;
        };
        if !action.is_valid(state, context) {
            debug!("Dropping stale `{key}` action");
            return false;
        }
        state.emit(GameEvent::ActionStarted {
            action: key,
            context: *context,
        });
        action.executor.run(state, context);
        true
    }

    /// Executes queued actions in the order they were accepted; returns how
    /// many ran
    pub fn run_pending(&self, state: &mut GameState) -> usize {
        let mut executed = 0;
        while let Some(pending) = state.pending_actions.pop_front() {
            if self.execute(state, pending.key, &pending.context) {
                executed += 1;
            }
        }
        executed
    }

    /// Actions valid for `context`, in registry order
    pub fn available_actions(&self, state: &GameState, context: &ActionContext) -> Vec<&ActionDef> {
        self.actions
            .iter()
            .filter(|action| action.is_valid(state, context))
            .collect()
    }
}

/// Executes what was queued on the previous tick
pub fn run_pending_actions(registry: Res<ActionRegistry>, state: Option<ResMut<GameState>>) {
    let Some(mut state) = state else {
        return;
    };
    if state.pending_actions.is_empty() {
        return;
    }
    registry.run_pending(&mut state);
}

/// Accepts this tick's requests; they run on the next tick
pub fn queue_action_requests(
    registry: Res<ActionRegistry>,
    state: Option<ResMut<GameState>>,
    mut requests: MessageReader<ActionRequest>,
) {
    let Some(mut state) = state else {
        requests.clear();
        return;
    };
    for request in requests.read() {
        registry.handle(&mut state, &request.key, request.context);
    }
}

pub struct ActionPlugin;

impl Plugin for ActionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionRegistry>()
            .add_message::<ActionRequest>()
            .add_systems(
                Update,
                (run_pending_actions, queue_action_requests)
                    .chain()
                    .in_set(LogicSet::Actions),
            );
    }
}
