//! Rust Britannia - simulation core of a turn-based hex strategy game
//!
//! Tracks where units and goods stand, finds cost-optimal paths across
//! terrain, budgets movement per turn and sequences faction turns, including
//! the end-of-round settlement of territorial claims and food logistics.
//!
//! The whole game lives in one [`state::GameState`]. Plain Rust callers
//! mutate it directly; under Bevy it is a resource driven by [`LogicPlugins`].

use bevy::app::PluginGroup;

use crate::actions::ActionPlugin;
use crate::messages::NotificationPlugin;
use crate::save::SnapshotPlugin;
use crate::turn_system::TurnSystemPlugin;

pub mod actions;
pub mod config;
pub mod constants;
pub mod economy;
pub mod error;
pub mod faction;
pub mod map;
pub mod messages;
pub mod movement;
pub mod pathfinding;
pub mod save;
pub mod setup;
pub mod state;
pub mod turn_system;
pub mod units;

/// Plugin group for core game logic (headless-compatible)
///
/// Insert a [`state::GameState`] resource to start playing; every system
/// skips its work while none is present.
pub struct LogicPlugins;

impl PluginGroup for LogicPlugins {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(TurnSystemPlugin)
            .add(ActionPlugin)
            .add(NotificationPlugin)
            .add(SnapshotPlugin)
    }
}

#[cfg(test)]
pub mod test_utils;
