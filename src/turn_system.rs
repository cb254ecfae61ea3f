use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::FOOD_GOODS_MAX_AGE;
use crate::error::GameError;
use crate::faction::Activation;
use crate::messages::GameEvent;
use crate::state::GameState;
use crate::units::{EntityRef, GoodsId, GoodsKind};

#[cfg(test)]
mod tests;

/// Round counter and whose turn it is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub round: u32,
    /// Index into the faction turn order
    pub current: usize,
    /// Set while the end of round is being settled; turns are refused
    pub between_rounds: bool,
    /// The current faction has no movable unit left
    pub pending_end_turn: bool,
}

impl GameState {
    /// Begins a new round: settles claims, feeds production, then hands the
    /// first turn to the first faction
    pub fn start_round(&mut self) -> Result<(), GameError> {
        for index in 0..self.factions.len() {
            let units = self.factions[index].units().to_vec();
            let all_units = &self.units;
            self.factions[index].set_units(units, |unit| {
                all_units
                    .get(unit.0 as usize)
                    .is_none_or(|unit| unit.movable.is_destroyed())
            });
        }

        let mut produced = Vec::new();
        for cell in self.grid.iter_mut() {
            cell.tile.nation_claims.settle_round();
            cell.tile.faction_claims.settle_round();
            cell.tile.food = 0;

            if cell.tile.has_laborers() {
                let food = self.config.terrain_food(cell.terrain)
                    + self.config.improvement_food(cell.tile.improvement());
                if food > 0 {
                    produced.push((cell.hex, food, cell.tile.faction()));
                }
            }
        }
        for (hex, food, faction) in produced {
            if let Err(err) = self.spawn_goods(GoodsKind::Food, food, hex, faction) {
                warn!("Skipping food production at {:?}: {err}", hex);
            }
        }

        self.turn.round += 1;
        self.emit(GameEvent::RoundStarted {
            round: self.turn.round,
        });
        info!("=== Round {} ===", self.turn.round);
        self.start_turn(0)
    }

    /// Hands the turn to the faction at `index` in turn order
    pub fn start_turn(&mut self, index: usize) -> Result<(), GameError> {
        if self.turn.between_rounds {
            return Err(GameError::BetweenRounds);
        }
        if index >= self.factions.len() {
            return Err(GameError::InvalidTurnIndex {
                index,
                factions: self.factions.len(),
            });
        }

        self.turn.current = index;
        self.turn.pending_end_turn = false;
        self.active = None;

        let faction = self.factions[index].id;
        self.factions[index].reset_activation();
        let units = self.factions[index].units().to_vec();
        for unit in units {
            self.prepare_for_new_turn(EntityRef::Unit(unit));
        }

        self.emit(GameEvent::TurnStarted {
            faction,
            round: self.turn.round,
        });
        info!(
            "Round {}: turn of {}",
            self.turn.round, self.factions[index].name
        );

        match self.activate_unit(faction, 0) {
            Activation::Activated { resumed: true, .. } | Activation::Refused => {
                self.check_end_turn(faction);
            }
            Activation::Activated { resumed: false, .. } | Activation::NoUnits => {}
        }
        Ok(())
    }

    /// Ends the current faction's turn; the last faction's turn closes the
    /// round
    pub fn end_turn(&mut self) -> Result<(), GameError> {
        if self.turn.between_rounds {
            return Err(GameError::BetweenRounds);
        }
        let faction = self
            .current_faction()
            .ok_or(GameError::InvalidTurnIndex {
                index: self.turn.current,
                factions: self.factions.len(),
            })?;

        if let Some(unit) = self.active.take() {
            self.emit(GameEvent::EntityDeactivated {
                entity: EntityRef::Unit(unit),
            });
        }
        self.turn.pending_end_turn = false;
        self.emit(GameEvent::TurnEnded { faction });

        let next = self.turn.current + 1;
        if next >= self.factions.len() {
            self.end_round()
        } else {
            self.start_turn(next)
        }
    }

    /// Settles the round: food goods first, then what the laborers eat, then
    /// the board is cleaned up and the next round starts
    pub fn end_round(&mut self) -> Result<(), GameError> {
        if self.turn.between_rounds {
            return Err(GameError::BetweenRounds);
        }
        self.turn.between_rounds = true;
        self.emit(GameEvent::RoundEnded {
            round: self.turn.round,
        });

        self.distribute_food_goods();
        self.consume_food();
        self.goods.retain(|goods| !goods.movable.is_destroyed());

        self.turn.between_rounds = false;
        self.start_round()
    }

    /// Performs the end of turn the current faction signalled, if any
    pub fn resolve_turn_signal(&mut self) -> Result<bool, GameError> {
        if !self.turn.pending_end_turn {
            return Ok(false);
        }
        self.turn.pending_end_turn = false;
        self.end_turn()?;
        Ok(true)
    }

    /// Feeds laborers from the food lying on their cell and sends the rest
    /// toward the nearest city
    pub fn distribute_food_goods(&mut self) {
        let food: Vec<GoodsId> = self
            .goods
            .iter()
            .filter(|goods| goods.kind == GoodsKind::Food && !goods.movable.is_destroyed())
            .map(|goods| goods.id)
            .collect();

        for id in food {
            self.settle_food_goods(id);
        }
    }

    fn settle_food_goods(&mut self, id: GoodsId) {
        let entity = EntityRef::Goods(id);
        let Some(goods) = self.goods_item(id) else {
            return;
        };
        let hex = goods.movable.hex();
        let mut quantity = goods.quantity;

        if quantity == 0 {
            self.destroy(entity);
            return;
        }

        if let Some(cell) = self.grid.get_mut(hex)
            && cell.tile.has_laborers()
        {
            let taken = cell.tile.food_shortfall().min(quantity);
            if taken > 0 {
                cell.tile.food += taken as i32;
                let stock = cell.tile.food;
                quantity -= taken;
                if let Some(goods) = self.goods_item_mut(id) {
                    goods.quantity = quantity;
                }
                self.emit(GameEvent::FoodStocked {
                    hex,
                    amount: taken,
                    stock,
                });
                if quantity == 0 {
                    self.destroy(entity);
                    return;
                }
            }
        }

        if let Some(city_hex) = self.nearest_city(hex).map(|city| city.hex)
            && city_hex != hex
        {
            if self.set_path(entity, city_hex) {
                self.prepare_for_new_turn(entity);
                self.move_one_turn(entity);
            } else {
                warn!("{entity} has no route to the city at {:?}", city_hex);
            }
        }

        if self.deliver_goods(id) {
            return;
        }

        if let Some(goods) = self.goods_item_mut(id) {
            goods.rounds += 1;
            if goods.rounds > FOOD_GOODS_MAX_AGE {
                debug!("{entity} spoiled after {} rounds", goods.rounds);
                self.destroy(entity);
            }
        }
    }

    /// Goods standing on a city are sold to their faction's treasury.
    /// Goods without a faction stay on the board.
    pub fn deliver_goods(&mut self, id: GoodsId) -> bool {
        let Some(goods) = self.goods_item(id) else {
            return false;
        };
        if goods.movable.is_destroyed() {
            return false;
        }
        let Some(faction) = goods.movable.faction() else {
            return false;
        };
        let Some(city) = self
            .grid
            .get(goods.movable.hex())
            .and_then(|cell| cell.tile.city)
        else {
            return false;
        };

        let value = self
            .config
            .goods_value(goods.kind)
            .saturating_mul(goods.quantity);
        let Some(record) = self.faction_mut(faction) else {
            return false;
        };
        record.credit(value);

        self.emit(GameEvent::GoodsDelivered {
            goods: id,
            city,
            faction,
            value,
        });
        self.destroy(EntityRef::Goods(id));
        true
    }

    fn consume_food(&mut self) {
        let mut shortages = Vec::new();
        for cell in self.grid.iter_mut() {
            if !cell.tile.has_laborers() {
                continue;
            }
            cell.tile.food -= cell.tile.food_needed();
            if cell.tile.food < 0 {
                shortages.push((cell.hex, cell.tile.food.unsigned_abs()));
            }
        }
        for (hex, deficit) in shortages {
            debug!("Laborers at {:?} are short of {deficit} food", hex);
            self.emit(GameEvent::FoodShortage { hex, deficit });
        }
    }
}

/// Ordering of the crate's systems within `Update`
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum LogicSet {
    /// Queued actions run, then new requests are accepted
    Actions,
    /// Pending end-of-turn signals are resolved
    Turns,
}

/// Resolves at most one end-of-turn signal per tick, so a faction without
/// units hands over without recursing through the whole round
pub fn resolve_turn_signals(state: Option<ResMut<GameState>>) {
    let Some(mut state) = state else {
        return;
    };
    if !state.turn().pending_end_turn {
        return;
    }
    if let Err(err) = state.resolve_turn_signal() {
        error!("Failed to end turn: {err}");
    }
}

pub struct TurnSystemPlugin;

impl Plugin for TurnSystemPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, (LogicSet::Actions, LogicSet::Turns).chain())
            .add_systems(Update, resolve_turn_signals.in_set(LogicSet::Turns));
    }
}
