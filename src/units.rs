use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::UnitProfile;
use crate::error::GameError;
use crate::movement::Movable;
use crate::pathfinding::CityAccess;

/// Index of a unit in the world's unit list; units are never removed, only
/// destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Goods are swept after every round, so their ids are handed out
/// monotonically instead of by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoodsId(pub u32);

/// Anything with a position that moves over the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Unit(UnitId),
    Goods(GoodsId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Unit(id) => write!(f, "unit #{}", id.0),
            EntityRef::Goods(id) => write!(f, "goods #{}", id.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    Rancher,
    Farmer,
    Miner,
    Settler,
    Builder,
    Legion,
}

impl UnitKind {
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Rancher,
        UnitKind::Farmer,
        UnitKind::Miner,
        UnitKind::Settler,
        UnitKind::Builder,
        UnitKind::Legion,
    ];

    pub fn key(self) -> &'static str {
        match self {
            UnitKind::Rancher => "rancher",
            UnitKind::Farmer => "farmer",
            UnitKind::Miner => "miner",
            UnitKind::Settler => "settler",
            UnitKind::Builder => "builder",
            UnitKind::Legion => "legion",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UnitKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| GameError::UnknownUnitKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoodsKind {
    Food,
    Wool,
    Timber,
    Ore,
}

impl GoodsKind {
    pub const ALL: [GoodsKind; 4] = [
        GoodsKind::Food,
        GoodsKind::Wool,
        GoodsKind::Timber,
        GoodsKind::Ore,
    ];

    pub fn key(self) -> &'static str {
        match self {
            GoodsKind::Food => "food",
            GoodsKind::Wool => "wool",
            GoodsKind::Timber => "timber",
            GoodsKind::Ore => "ore",
        }
    }
}

impl fmt::Display for GoodsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GoodsKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoodsKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| GameError::UnknownGoodsKind(s.to_string()))
    }
}

/// Shared access to the movement state of units and goods
pub trait MobileEntity {
    fn entity_ref(&self) -> EntityRef;
    fn movable(&self) -> &Movable;
    fn movable_mut(&mut self) -> &mut Movable;
    fn city_access(&self) -> CityAccess;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub(crate) movable: Movable,
    pub attack: bool,
    pub attack_cities: bool,
}

impl Unit {
    pub fn new(id: UnitId, kind: UnitKind, profile: &UnitProfile, movable: Movable) -> Self {
        Self {
            id,
            kind,
            movable,
            attack: profile.attack,
            attack_cities: profile.attack_cities,
        }
    }
}

impl MobileEntity for Unit {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Unit(self.id)
    }

    fn movable(&self) -> &Movable {
        &self.movable
    }

    fn movable_mut(&mut self) -> &mut Movable {
        &mut self.movable
    }

    fn city_access(&self) -> CityAccess {
        if self.attack && self.attack_cities {
            CityAccess::Attack
        } else {
            CityAccess::Avoid
        }
    }
}

/// A stack of one kind of goods on its way to a city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goods {
    pub id: GoodsId,
    pub kind: GoodsKind,
    pub quantity: u32,
    /// Rounds spent on the board without being delivered
    pub rounds: u32,
    pub(crate) movable: Movable,
}

impl MobileEntity for Goods {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Goods(self.id)
    }

    fn movable(&self) -> &Movable {
        &self.movable
    }

    fn movable_mut(&mut self) -> &mut Movable {
        &mut self.movable
    }

    fn city_access(&self) -> CityAccess {
        CityAccess::Ignore
    }
}
