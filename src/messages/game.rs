use bevy::prelude::*;
use hexx::Hex;

use crate::actions::{ActionContext, ActionKey};
use crate::economy::city::CityId;
use crate::economy::nation::NationId;
use crate::faction::FactionId;
use crate::state::GameState;
use crate::units::{EntityRef, GoodsId, GoodsKind};

/// Screen an action asks the presentation layer to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    City,
    Tile,
}

/// Notifications observed by rendering and UI collaborators, in the order
/// the core emitted them
#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameEvent {
    EntityCreated {
        entity: EntityRef,
        hex: Hex,
    },
    EntityDestroyed {
        entity: EntityRef,
    },
    EntityActivated {
        entity: EntityRef,
    },
    EntityDeactivated {
        entity: EntityRef,
    },
    MovementStarted {
        entity: EntityRef,
        path: Vec<Hex>,
    },
    EntityMoved {
        entity: EntityRef,
        from: Hex,
        to: Hex,
    },
    TurnStarted {
        faction: FactionId,
        round: u32,
    },
    TurnEnded {
        faction: FactionId,
    },
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    GoodsCreated {
        goods: GoodsId,
        kind: GoodsKind,
        quantity: u32,
        hex: Hex,
    },
    GoodsDelivered {
        goods: GoodsId,
        city: CityId,
        faction: FactionId,
        value: u32,
    },
    /// Food left on a worked cell for its laborers
    FoodStocked {
        hex: Hex,
        amount: u32,
        stock: i32,
    },
    /// Laborers ate more than the cell had in stock
    FoodShortage {
        hex: Hex,
        deficit: u32,
    },
    CityFounded {
        city: CityId,
        hex: Hex,
        nation: NationId,
    },
    ActionQueued {
        action: ActionKey,
        context: ActionContext,
    },
    ActionStarted {
        action: ActionKey,
        context: ActionContext,
    },
    ViewRequested {
        view: View,
        hex: Hex,
    },
}

/// Publishes the notifications collected by the core during this tick
pub fn publish_game_events(state: Option<ResMut<GameState>>, mut events: MessageWriter<GameEvent>) {
    let Some(mut state) = state else {
        return;
    };
    if state.events().is_empty() {
        return;
    }
    for event in state.drain_events() {
        events.write(event);
    }
}

pub struct NotificationPlugin;

impl Plugin for NotificationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GameEvent>()
            .add_systems(PostUpdate, publish_game_events);
    }
}
