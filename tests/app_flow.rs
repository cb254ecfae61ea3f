//! Tick-level behavior of the logic plugins inside a headless Bevy app

mod common;

use bevy::prelude::*;
use common::{hex_at, two_faction_state};
use rust_britannia::LogicPlugins;
use rust_britannia::actions::{ActionContext, ActionKey};
use rust_britannia::messages::{ActionRequest, GameEvent};
use rust_britannia::save::{SnapshotRequest, SnapshotTaken};
use rust_britannia::state::GameState;
use rust_britannia::units::UnitKind;

#[derive(Resource, Default)]
struct Seen {
    events: Vec<GameEvent>,
    snapshots: usize,
}

fn collect(
    mut seen: ResMut<Seen>,
    mut events: MessageReader<GameEvent>,
    mut snapshots: MessageReader<SnapshotTaken>,
) {
    seen.events.extend(events.read().cloned());
    seen.snapshots += snapshots.read().count();
}

fn create_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogicPlugins))
        .init_resource::<Seen>()
        .add_systems(Last, collect);
    app
}

fn seen(app: &App) -> &Seen {
    app.world().resource::<Seen>()
}

#[test]
fn test_requested_action_runs_on_next_tick() {
    let (mut state, first, second) = two_faction_state(4, 4);
    let farmer = state
        .spawn_unit(first, UnitKind::Farmer, hex_at(state.grid(), 1, 1))
        .unwrap();
    state
        .spawn_unit(first, UnitKind::Legion, hex_at(state.grid(), 0, 0))
        .unwrap();
    state
        .spawn_unit(second, UnitKind::Legion, hex_at(state.grid(), 3, 3))
        .unwrap();
    state.start_round().unwrap();
    assert_eq!(state.active_unit(), Some(farmer));

    let context = ActionContext::for_active_unit(&state).unwrap();
    let mut app = create_app();
    app.insert_resource(state);
    app.world_mut()
        .write_message(ActionRequest::new(ActionKey::Wait.key(), context));

    app.update();
    let state = app.world().resource::<GameState>();
    assert_eq!(state.pending_actions(), 1);
    assert_eq!(state.active_unit(), Some(farmer));
    assert!(seen(&app).events.contains(&GameEvent::ActionQueued {
        action: ActionKey::Wait,
        context,
    }));

    app.update();
    let state = app.world().resource::<GameState>();
    assert_eq!(state.pending_actions(), 0);
    assert_ne!(state.active_unit(), Some(farmer));
    assert!(seen(&app).events.contains(&GameEvent::ActionStarted {
        action: ActionKey::Wait,
        context,
    }));
}

#[test]
fn test_factions_without_units_hand_over_one_per_tick() {
    let (mut state, first, second) = two_faction_state(3, 3);
    state.start_round().unwrap();
    let mut app = create_app();
    app.insert_resource(state);

    app.update();
    let state = app.world().resource::<GameState>();
    assert_eq!(state.current_faction(), Some(second));
    assert_eq!(state.round(), 1);

    app.update();
    let state = app.world().resource::<GameState>();
    assert_eq!(state.current_faction(), Some(first));
    assert_eq!(state.round(), 2);
    assert!(
        seen(&app)
            .events
            .contains(&GameEvent::RoundStarted { round: 2 })
    );
}

#[test]
fn test_plugins_idle_without_game_state() {
    let mut app = create_app();
    app.world_mut().write_message(ActionRequest::new(
        ActionKey::EndTurn.key(),
        ActionContext::at(hexx::Hex::ZERO, rust_britannia::faction::FactionId(0)),
    ));
    app.world_mut().write_message(SnapshotRequest);

    app.update();
    app.update();

    assert!(!app.world().contains_resource::<GameState>());
    assert!(seen(&app).events.is_empty());
    assert_eq!(seen(&app).snapshots, 0);
}

#[test]
fn test_snapshot_request_is_answered_same_tick() {
    let (mut state, first, _) = two_faction_state(3, 3);
    state
        .spawn_unit(first, UnitKind::Farmer, hex_at(state.grid(), 1, 1))
        .unwrap();
    state.start_round().unwrap();
    let mut app = create_app();
    app.insert_resource(state);

    app.world_mut().write_message(SnapshotRequest);
    app.update();

    assert_eq!(seen(&app).snapshots, 1);
}
