//! The single owner of all mutable simulation state.
//!
//! Every mutation goes through `&mut GameState`; under Bevy it lives as a
//! [`Resource`] written only by this crate's chained systems.

use std::collections::VecDeque;

use bevy::log::info;
use bevy::prelude::Resource;
use hexx::Hex;

use crate::actions::PendingAction;
use crate::config::WorldConfig;
use crate::economy::city::{City, CityId};
use crate::economy::laborer::Laborer;
use crate::economy::nation::{Nation, NationId};
use crate::error::GameError;
use crate::faction::{Faction, FactionId};
use crate::map::claims::ClaimTable;
use crate::map::grid::HexGrid;
use crate::messages::GameEvent;
use crate::movement::Movable;
use crate::pathfinding::Board;
use crate::turn_system::TurnState;
use crate::units::{EntityRef, Goods, GoodsId, GoodsKind, Unit, UnitId, UnitKind};

/// Whole simulation state.
///
/// Notifications collect in an outbox until drained. Under Bevy the
/// `NotificationPlugin` drains it every tick; plain callers must call
/// [`GameState::drain_events`] themselves or it keeps growing.
#[derive(Resource, Debug, Clone)]
pub struct GameState {
    pub(crate) config: WorldConfig,
    pub(crate) grid: HexGrid,
    pub(crate) nations: Vec<Nation>,
    /// Turn order
    pub(crate) factions: Vec<Faction>,
    pub(crate) cities: Vec<City>,
    pub(crate) units: Vec<Unit>,
    pub(crate) goods: Vec<Goods>,
    pub(crate) laborers: Vec<Laborer>,
    pub(crate) turn: TurnState,
    /// At most one entity is active game-wide
    pub(crate) active: Option<UnitId>,
    pub(crate) next_goods_id: u32,
    pub(crate) seed: u64,
    pub(crate) pending_actions: VecDeque<PendingAction>,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: WorldConfig, grid: HexGrid) -> Self {
        Self {
            config,
            grid,
            nations: Vec::new(),
            factions: Vec::new(),
            cities: Vec::new(),
            units: Vec::new(),
            goods: Vec::new(),
            laborers: Vec::new(),
            turn: TurnState::default(),
            active: None,
            next_goods_id: 0,
            seed: 0,
            pending_actions: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Seed for everything the world draws at random (laborer names)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    pub fn board(&self) -> Board<'_> {
        Board::new(&self.grid, &self.cities, &self.config)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub fn add_nation(&mut self, name: impl Into<String>) -> NationId {
        let id = NationId(self.nations.len() as u32);
        self.nations.push(Nation::new(id, name));
        id
    }

    pub fn nations(&self) -> &[Nation] {
        &self.nations
    }

    pub fn nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.get(id.0 as usize)
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.0 as usize)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(id.0 as usize)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id.0 as usize)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(id.0 as usize)
    }

    pub fn laborers(&self) -> &[Laborer] {
        &self.laborers
    }

    // ------------------------------------------------------------------
    // Scheduler queries
    // ------------------------------------------------------------------

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn round(&self) -> u32 {
        self.turn.round
    }

    /// Faction whose turn it is; `None` before any faction joined
    pub fn current_faction(&self) -> Option<FactionId> {
        self.factions.get(self.turn.current).map(|faction| faction.id)
    }

    pub fn is_between_rounds(&self) -> bool {
        self.turn.between_rounds
    }

    pub fn active_unit(&self) -> Option<UnitId> {
        self.active
    }

    /// Accepted actions waiting for the next tick
    pub fn pending_actions(&self) -> usize {
        self.pending_actions.len()
    }

    // ------------------------------------------------------------------
    // Territory
    // ------------------------------------------------------------------

    /// Nation and faction claim tables of a cell
    pub fn claims(
        &self,
        hex: Hex,
    ) -> Option<(&ClaimTable<NationId>, &ClaimTable<FactionId>)> {
        self.grid
            .get(hex)
            .map(|cell| (&cell.tile.nation_claims, &cell.tile.faction_claims))
    }

    pub fn claim_for_nation(
        &mut self,
        hex: Hex,
        nation: NationId,
        delta: i64,
    ) -> Result<(), GameError> {
        if self.nation(nation).is_none() {
            return Err(GameError::UnknownNation(nation));
        }
        let cell = self.grid.get_mut(hex).ok_or(GameError::InvalidCell(hex))?;
        cell.tile.nation_claims.claim(nation, delta);
        Ok(())
    }

    pub fn claim_for_faction(
        &mut self,
        hex: Hex,
        faction: FactionId,
        delta: i64,
    ) -> Result<(), GameError> {
        if self.faction(faction).is_none() {
            return Err(GameError::UnknownFaction(faction));
        }
        let cell = self.grid.get_mut(hex).ok_or(GameError::InvalidCell(hex))?;
        cell.tile.faction_claims.claim(faction, delta);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mobile entities
    // ------------------------------------------------------------------

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0 as usize)
    }

    pub fn goods(&self) -> &[Goods] {
        &self.goods
    }

    pub fn goods_item(&self, id: GoodsId) -> Option<&Goods> {
        self.goods.iter().find(|goods| goods.id == id)
    }

    pub(crate) fn goods_item_mut(&mut self, id: GoodsId) -> Option<&mut Goods> {
        self.goods.iter_mut().find(|goods| goods.id == id)
    }

    /// Creates a unit for `faction`; nothing is registered on error
    pub fn spawn_unit(
        &mut self,
        faction: FactionId,
        kind: UnitKind,
        hex: Hex,
    ) -> Result<UnitId, GameError> {
        if self.faction(faction).is_none() {
            return Err(GameError::UnknownFaction(faction));
        }
        let profile = self
            .config
            .unit(kind)
            .ok_or_else(|| GameError::Config(format!("no profile for unit kind `{kind}`")))?;
        let movable = Movable::new(&self.grid, hex, Some(faction), profile.movement.clone())?;

        let id = UnitId(self.units.len() as u32);
        let unit = Unit::new(id, kind, profile, movable);
        self.units.push(unit);
        if let Some(record) = self.faction_mut(faction) {
            record.push_unit(id);
        }
        self.emit(GameEvent::EntityCreated {
            entity: EntityRef::Unit(id),
            hex,
        });
        info!("Spawned {kind} #{} for faction #{} at {:?}", id.0, faction.0, hex);
        Ok(id)
    }

    /// Same as [`GameState::spawn_unit`] with the kind given by catalog key
    pub fn spawn_unit_by_key(
        &mut self,
        faction: FactionId,
        kind: &str,
        hex: Hex,
    ) -> Result<UnitId, GameError> {
        let kind = kind.parse::<UnitKind>()?;
        self.spawn_unit(faction, kind, hex)
    }

    /// Puts goods on the board. Goods produced on unowned land have no faction.
    pub fn spawn_goods(
        &mut self,
        kind: GoodsKind,
        quantity: u32,
        hex: Hex,
        faction: Option<FactionId>,
    ) -> Result<GoodsId, GameError> {
        if let Some(faction) = faction
            && self.faction(faction).is_none()
        {
            return Err(GameError::UnknownFaction(faction));
        }
        let movable = Movable::new(
            &self.grid,
            hex,
            faction,
            self.config.standard_movable.clone(),
        )?;

        let id = GoodsId(self.next_goods_id);
        self.next_goods_id += 1;
        self.emit(GameEvent::GoodsCreated {
            goods: id,
            kind,
            quantity,
            hex,
        });
        self.goods.push(Goods {
            id,
            kind,
            quantity,
            rounds: 0,
            movable,
        });
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Notifications not yet published, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Takes the outbox; callers driving the game without Bevy call this
    /// after each step they observe
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
