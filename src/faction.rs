use bevy::log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::party_color;
use crate::economy::nation::NationId;
use crate::error::GameError;
use crate::messages::GameEvent;
use crate::state::GameState;
use crate::units::{EntityRef, UnitId};


/// Index of a faction in turn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// A player of the game, human or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub nation: NationId,
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
    money: u32,
    units: Vec<UnitId>,
    /// Where the next activation scan starts from
    active_index: Option<usize>,
}

impl Faction {
    pub fn new(id: FactionId, nation: NationId, name: impl Into<String>) -> Self {
        Self {
            id,
            nation,
            name: name.into(),
            color: party_color(id.0 as usize),
            money: 0,
            units: Vec::new(),
            active_index: None,
        }
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    /// Treasury can never go negative
    pub fn set_money(&mut self, amount: i64) -> Result<(), GameError> {
        self.money = u32::try_from(amount).map_err(|_| GameError::NegativeCurrency(amount))?;
        Ok(())
    }

    pub fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub(crate) fn reset_activation(&mut self) {
        self.active_index = None;
    }

    pub(crate) fn push_unit(&mut self, unit: UnitId) {
        self.units.push(unit);
    }

    /// Replaces the unit list, dropping units for which `is_destroyed` holds
    pub(crate) fn set_units(
        &mut self,
        units: Vec<UnitId>,
        is_destroyed: impl Fn(UnitId) -> bool,
    ) {
        self.units = units.into_iter().filter(|unit| !is_destroyed(*unit)).collect();
        if self.active_index.is_some_and(|index| index >= self.units.len()) {
            self.active_index = None;
        }
    }
}

/// Index of the next unit that can still move, scanning cyclically from the
/// slot after `current` and wrapping once, so the current unit comes last.
/// Without a current index the scan starts at the first unit.
pub fn next_movable_index(
    len: usize,
    current: Option<usize>,
    is_movable: impl Fn(usize) -> bool,
) -> Option<usize> {
    let start = current.map_or(0, |index| index + 1);
    (0..len)
        .map(|offset| (start + offset) % len)
        .find(|index| is_movable(*index))
}

/// Result of asking a faction to activate one of its units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The unit got its turn slot; with `resumed` it carried on along a
    /// queued path instead of becoming active
    Activated { unit: UnitId, resumed: bool },
    /// Missing or destroyed unit; nothing changed
    Refused,
    /// The faction has no units; an end of turn was signalled
    NoUnits,
}

impl GameState {
    pub fn add_faction(
        &mut self,
        nation: NationId,
        name: impl Into<String>,
    ) -> Result<FactionId, GameError> {
        if self.nation(nation).is_none() {
            return Err(GameError::UnknownNation(nation));
        }
        let id = FactionId(self.factions.len() as u32);
        self.factions.push(Faction::new(id, nation, name));
        Ok(id)
    }

    /// Makes `unit` the globally active entity. With `resume`, a unit that
    /// still has a path and budget carries on along it instead and is not
    /// marked active. Returns whether the unit resumed its path.
    pub fn activate(&mut self, unit: UnitId, resume: bool) -> bool {
        let entity = EntityRef::Unit(unit);
        let Some(movable) = self.movable(entity) else {
            return false;
        };
        if movable.is_destroyed() {
            return false;
        }
        if resume && movable.can_continue_on_path() {
            self.move_one_turn(entity);
            return true;
        }

        if let Some(previous) = self.active.filter(|previous| *previous != unit) {
            self.emit(GameEvent::EntityDeactivated {
                entity: EntityRef::Unit(previous),
            });
        }
        self.active = Some(unit);
        self.emit(GameEvent::EntityActivated { entity });
        false
    }

    /// Gives up the active slot. `end_moves` also spends the unit's
    /// remaining budget for this turn.
    pub fn deactivate(&mut self, unit: UnitId, end_moves: bool) {
        if end_moves
            && let Some(unit) = self.units.get_mut(unit.0 as usize)
        {
            unit.movable.end_moves();
        }
        if self.active == Some(unit) {
            self.active = None;
        }
        self.emit(GameEvent::EntityDeactivated {
            entity: EntityRef::Unit(unit),
        });
    }

    pub fn activate_unit(&mut self, faction: FactionId, index: usize) -> Activation {
        let Some(record) = self.factions.get(faction.0 as usize) else {
            return Activation::Refused;
        };
        if record.units.is_empty() {
            self.signal_end_turn(faction);
            return Activation::NoUnits;
        }
        let Some(&unit) = record.units.get(index) else {
            return Activation::Refused;
        };
        if self
            .movable(EntityRef::Unit(unit))
            .is_none_or(|movable| movable.is_destroyed())
        {
            return Activation::Refused;
        }

        if let Some(record) = self.factions.get_mut(faction.0 as usize) {
            record.active_index = Some(index);
        }
        let resumed = self.activate(unit, true);
        Activation::Activated { unit, resumed }
    }

    /// Activates the next unit that can still move this turn
    pub fn activate_next(&mut self, faction: FactionId) -> Option<UnitId> {
        self.activate_next_unit(faction).map(|(unit, _)| unit)
    }

    fn activate_next_unit(&mut self, faction: FactionId) -> Option<(UnitId, bool)> {
        let record = self.factions.get(faction.0 as usize)?;
        let units = &record.units;
        let index = next_movable_index(units.len(), record.active_index, |index| {
            self.movable(EntityRef::Unit(units[index]))
                .is_some_and(|movable| movable.can_move())
        })?;
        let unit = units[index];

        if let Some(record) = self.factions.get_mut(faction.0 as usize) {
            record.active_index = Some(index);
        }
        let resumed = self.activate(unit, true);
        Some((unit, resumed))
    }

    /// Hands control to the next movable unit, or signals the end of the
    /// faction's turn when none is left. Units that resume a queued path
    /// move on their own, and the cycle keeps going after them.
    pub fn check_end_turn(&mut self, faction: FactionId) -> bool {
        loop {
            match self.activate_next_unit(faction) {
                None => {
                    self.signal_end_turn(faction);
                    return false;
                }
                Some((_, true)) => continue,
                Some((_, false)) => return true,
            }
        }
    }

    /// Records that `faction` is done. Only the faction whose turn it is can
    /// end it; the signal is resolved later by `resolve_turn_signal`.
    pub fn signal_end_turn(&mut self, faction: FactionId) {
        if self.turn.between_rounds || self.current_faction() != Some(faction) {
            debug!("Ignoring end of turn signal from faction #{}", faction.0);
            return;
        }
        self.turn.pending_end_turn = true;
    }
}
