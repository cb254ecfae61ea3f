//! Headless run of the standard world with every unit on autopilot.
//! Run with: cargo run --bin simulate -- [rounds] [seed]

use bevy::log::LogPlugin;
use bevy::prelude::*;
use hexx::Hex;
use rust_britannia::LogicPlugins;
use rust_britannia::actions::{ActionContext, ActionKey, ActionRegistry};
use rust_britannia::config::WorldConfig;
use rust_britannia::constants::TERRAIN_SEED;
use rust_britannia::messages::{ActionRequest, GameEvent};
use rust_britannia::setup::standard_world;
use rust_britannia::state::GameState;
use rust_britannia::turn_system::LogicSet;

const DEFAULT_ROUNDS: u32 = 10;

/// Safety net against a game that stops advancing
const MAX_TICKS: u32 = 100_000;

fn main() {
    let mut args = std::env::args().skip(1);
    let rounds = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_ROUNDS);
    let seed = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(TERRAIN_SEED);

    let state = match standard_world(WorldConfig::default(), seed) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Cannot build the world: {err}");
            std::process::exit(1);
        }
    };

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), LogicPlugins))
        .insert_resource(state)
        .add_systems(Update, autopilot.before(LogicSet::Actions))
        .add_systems(Last, report_events);

    let mut ticks = 0;
    while app.world().resource::<GameState>().round() <= rounds && ticks < MAX_TICKS {
        app.update();
        ticks += 1;
    }

    let state = app.world().resource::<GameState>();
    println!("Finished after {ticks} ticks in round {}", state.round());
    for faction in state.factions() {
        println!("  {}: {} denarii", faction.name, faction.money());
    }
}

/// Builds a farm when the active unit can, otherwise skips it
fn autopilot(
    state: Res<GameState>,
    registry: Res<ActionRegistry>,
    mut requests: MessageWriter<ActionRequest>,
) {
    if state.pending_actions() > 0 || state.turn().pending_end_turn || state.is_between_rounds() {
        return;
    }

    let Some(context) = ActionContext::for_active_unit(&state) else {
        if let Some(faction) = state.current_faction() {
            let hex = state.grid().hexes().next().unwrap_or(Hex::ZERO);
            requests.write(ActionRequest::new(
                ActionKey::EndTurn.key(),
                ActionContext::at(hex, faction),
            ));
        }
        return;
    };

    let build_farm = registry
        .get(ActionKey::BuildFarm)
        .is_some_and(|action| action.is_valid(&state, &context));
    let key = if build_farm {
        ActionKey::BuildFarm
    } else {
        ActionKey::Skip
    };
    requests.write(ActionRequest::new(key.key(), context));
}

fn report_events(mut events: MessageReader<GameEvent>) {
    for event in events.read() {
        match event {
            GameEvent::RoundStarted { round } => info!("Round {round} started"),
            GameEvent::GoodsDelivered {
                goods,
                faction,
                value,
                ..
            } => info!(
                "Goods #{} sold for {value} to faction #{}",
                goods.0, faction.0
            ),
            GameEvent::FoodShortage { hex, deficit } => {
                warn!("Laborers at {:?} lack {deficit} food", hex)
            }
            _ => debug!("{event:?}"),
        }
    }
}
