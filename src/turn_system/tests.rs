use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use super::*;
use crate::faction::FactionId;
use crate::map::terrain::Terrain;
use crate::map::tile::Improvement;
use crate::test_utils::*;
use crate::units::{MobileEntity, UnitKind};

/// One row of plains, so column order is also path order, with a city of
/// the first faction's nation at the east end
fn road_to_city(length: u32) -> (GameState, FactionId) {
    let (mut state, first, _) = two_faction_state(length, 1);
    let nation = state.faction(first).unwrap().nation;
    state
        .found_city(hex_at(&state, length - 1, 0), nation, 1)
        .unwrap();
    state.drain_events();
    (state, first)
}

#[test]
fn test_start_round_adjusts_claims() {
    let (mut state, first, second) = two_faction_state(3, 3);
    let rome = state.faction(first).unwrap().nation;
    let britons = state.faction(second).unwrap().nation;
    let contested = hex_at(&state, 1, 1);
    state.claim_for_nation(contested, rome, 5).unwrap();
    state.claim_for_nation(contested, britons, 3).unwrap();
    state.claim_for_faction(contested, second, 1).unwrap();

    state.start_round().unwrap();

    let (nations, factions) = state.claims(contested).unwrap();
    assert_eq!(nations.strength(rome), 6);
    assert_eq!(nations.strength(britons), 2);
    assert_eq!(factions.strength(second), 2);
    assert!(state.claims(hex_at(&state, 0, 0)).unwrap().0.is_empty());
}

#[test]
fn test_start_round_produces_food_on_worked_cells() {
    let mut state = state_with_terrain(3, 1, |col, _| match col {
        0 => Terrain::Grassland,
        1 => Terrain::Hills,
        _ => Terrain::Plains,
    });
    let nation = state.add_nation("Rome");
    let faction = state.add_faction(nation, "Legio IX").unwrap();
    let grassland = hex_at(&state, 0, 0);
    let hills = hex_at(&state, 1, 0);
    state.add_laborer(grassland, UnitKind::Farmer, None).unwrap();
    state.add_laborer(hills, UnitKind::Miner, None).unwrap();
    state.claim_for_faction(grassland, faction, 4).unwrap();
    state
        .grid_mut()
        .get_mut(grassland)
        .unwrap()
        .tile
        .set_improvement(Improvement::Farm);

    state.start_round().unwrap();

    // Grassland yields 2, the farm 2 more; bare hills and the unworked
    // plains yield nothing
    assert_eq!(state.goods().len(), 1);
    let goods = &state.goods()[0];
    assert_eq!(goods.kind, GoodsKind::Food);
    assert_eq!(goods.quantity, 4);
    assert_eq!(goods.movable().hex(), grassland);
    assert_eq!(goods.movable().faction(), Some(faction));
    assert_eq!(state.round(), 1);
}

#[test]
fn test_start_round_resets_food_stock() {
    let (mut state, _, _) = two_faction_state(2, 2);
    let hex = hex_at(&state, 0, 0);
    state.grid_mut().get_mut(hex).unwrap().tile.food = -3;

    state.start_round().unwrap();
    assert_eq!(state.grid().get(hex).unwrap().tile.food, 0);
}

#[test]
fn test_start_turn_rejects_bad_index() {
    let (mut state, _, _) = two_faction_state(2, 2);
    assert_eq!(
        state.start_turn(5),
        Err(GameError::InvalidTurnIndex {
            index: 5,
            factions: 2
        })
    );
}

#[test]
fn test_turns_rejected_between_rounds() {
    let (mut state, _, _) = two_faction_state(2, 2);
    state.turn.between_rounds = true;

    assert_eq!(state.end_turn(), Err(GameError::BetweenRounds));
    assert_eq!(state.start_turn(0), Err(GameError::BetweenRounds));
}

#[test]
fn test_end_turn_advances_factions_then_round() {
    let (mut state, first, second) = two_faction_state(4, 4);
    let legion = state
        .spawn_unit(first, UnitKind::Legion, hex_at(&state, 0, 0))
        .unwrap();
    state
        .spawn_unit(second, UnitKind::Farmer, hex_at(&state, 3, 3))
        .unwrap();
    state.start_round().unwrap();
    state.deactivate(legion, true);
    state.drain_events();

    state.end_turn().unwrap();
    assert_eq!(state.current_faction(), Some(second));
    assert_eq!(state.round(), 1);
    assert_eq!(state.events()[0], GameEvent::TurnEnded { faction: first });

    state.end_turn().unwrap();
    assert_eq!(state.current_faction(), Some(first));
    assert_eq!(state.round(), 2);
    // Budgets are refilled for the new turn
    assert_eq!(state.unit(legion).unwrap().movable().moves(), 2);
    assert_eq!(state.active_unit(), Some(legion));
}

#[test]
fn test_food_goods_stock_cell_then_head_to_city() {
    let (mut state, _) = road_to_city(6);
    let field = hex_at(&state, 0, 0);
    state.add_laborer(field, UnitKind::Farmer, None).unwrap();
    let goods = state.spawn_goods(GoodsKind::Food, 6, field, None).unwrap();

    state.distribute_food_goods();

    assert_eq!(state.grid().get(field).unwrap().tile.food, 2);
    let goods = state.goods_item(goods).unwrap();
    assert_eq!(goods.quantity, 4);
    assert_eq!(goods.rounds, 1);
    assert_eq!(goods.movable().hex(), hex_at(&state, 2, 0));
    assert_eq!(goods.movable().remaining_path().last(), Some(&hex_at(&state, 5, 0)));
    assert!(state.events().contains(&GameEvent::FoodStocked {
        hex: field,
        amount: 2,
        stock: 2
    }));
}

#[test]
fn test_food_goods_consumed_on_cell_are_destroyed() {
    let (mut state, _) = road_to_city(4);
    let field = hex_at(&state, 0, 0);
    state.add_laborer(field, UnitKind::Farmer, None).unwrap();
    state.add_laborer(field, UnitKind::Farmer, None).unwrap();
    let goods = state.spawn_goods(GoodsKind::Food, 3, field, None).unwrap();

    state.distribute_food_goods();

    assert_eq!(state.grid().get(field).unwrap().tile.food, 3);
    assert!(state.goods_item(goods).unwrap().movable().is_destroyed());
}

#[test]
fn test_goods_reaching_city_are_sold() {
    let (mut state, faction) = road_to_city(3);
    let goods = state
        .spawn_goods(GoodsKind::Food, 3, hex_at(&state, 1, 0), Some(faction))
        .unwrap();

    state.distribute_food_goods();

    assert_eq!(state.faction(faction).unwrap().money(), 3);
    assert!(state.goods_item(goods).unwrap().movable().is_destroyed());
    assert!(state.events().iter().any(|event| matches!(
        event,
        GameEvent::GoodsDelivered { value: 3, .. }
    )));
}

#[test]
fn test_goods_without_faction_are_not_sold() {
    let (mut state, _) = road_to_city(2);
    let goods = state
        .spawn_goods(GoodsKind::Wool, 1, hex_at(&state, 1, 0), None)
        .unwrap();

    assert!(!state.deliver_goods(goods));
    assert!(!state.goods_item(goods).unwrap().movable().is_destroyed());
}

#[test]
fn test_unrouted_food_spoils() {
    let mut state = plains_state(3, 3);
    let goods = state
        .spawn_goods(GoodsKind::Food, 2, hex_at(&state, 1, 1), None)
        .unwrap();

    for _ in 0..FOOD_GOODS_MAX_AGE {
        state.distribute_food_goods();
    }
    assert!(!state.goods_item(goods).unwrap().movable().is_destroyed());

    state.distribute_food_goods();
    assert!(state.goods_item(goods).unwrap().movable().is_destroyed());
}

#[test]
fn test_end_round_reports_shortage_and_sweeps_goods() {
    let (mut state, _, _) = two_faction_state(3, 3);
    let field = hex_at(&state, 1, 1);
    state.add_laborer(field, UnitKind::Farmer, None).unwrap();
    let empty = state.spawn_goods(GoodsKind::Food, 0, field, None).unwrap();
    state.drain_events();

    state.end_round().unwrap();

    assert!(state.goods_item(empty).is_none());
    assert!(state.events().contains(&GameEvent::FoodShortage {
        hex: field,
        deficit: 2
    }));
    assert_eq!(state.round(), 1);
    assert!(!state.is_between_rounds());
}

#[test]
fn test_resolve_turn_signal_ends_turn_once() {
    let (mut state, _, second) = two_faction_state(2, 2);
    assert_eq!(state.resolve_turn_signal(), Ok(false));

    state.start_turn(0).unwrap();
    assert!(state.turn().pending_end_turn);
    assert_eq!(state.resolve_turn_signal(), Ok(true));

    // The second faction has no units either and signalled straight away
    assert_eq!(state.current_faction(), Some(second));
    assert!(state.turn().pending_end_turn);
}

#[test]
fn test_resolve_turn_signals_system() {
    let (mut state, _, second) = two_faction_state(2, 2);
    state.start_turn(0).unwrap();

    let mut world = World::new();
    world.insert_resource(state);
    world.run_system_once(resolve_turn_signals).unwrap();

    let state = world.resource::<GameState>();
    assert_eq!(state.current_faction(), Some(second));
}

#[test]
fn test_resolve_turn_signals_without_state_is_noop() {
    let mut world = World::new();
    world.run_system_once(resolve_turn_signals).unwrap();
    assert!(!world.contains_resource::<GameState>());
}

#[test]
fn test_goods_value_saturates_instead_of_overflowing() {
    let (mut state, faction) = road_to_city(3);
    state.config.goods_values.insert(GoodsKind::Ore, u32::MAX);
    let goods = state
        .spawn_goods(GoodsKind::Ore, 2, hex_at(&state, 2, 0), Some(faction))
        .unwrap();

    assert!(state.deliver_goods(goods));
    assert_eq!(state.faction(faction).unwrap().money(), u32::MAX);
    assert!(state.events().iter().any(|event| matches!(
        event,
        GameEvent::GoodsDelivered { value: u32::MAX, .. }
    )));
}

#[test]
fn test_draining_each_turn_keeps_outbox_bounded() {
    let (mut state, first, second) = two_faction_state(4, 4);
    state
        .spawn_unit(first, UnitKind::Farmer, hex_at(&state, 0, 0))
        .unwrap();
    state
        .spawn_unit(second, UnitKind::Legion, hex_at(&state, 3, 3))
        .unwrap();
    state.start_round().unwrap();
    state.drain_events();

    let mut largest = 0;
    while state.round() <= 20 {
        state.end_turn().unwrap();
        largest = largest.max(state.drain_events().len());
        assert!(state.events().is_empty());
    }
    assert!(largest > 0);
    // One turn hand-over never publishes more than a round's worth
    assert!(largest < 20);
}
