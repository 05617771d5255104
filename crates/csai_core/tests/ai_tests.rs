//! End-to-end tests for the AI driver.
//!
//! These feed host callbacks through `Ai::handle` and check the registry,
//! the controllers and the orders the host received.

use csai_core::ai::{Ai, AiEvent};
use csai_core::chat::help_text;
use csai_core::command::{Order, CMD_ATTACK, CMD_GUARD};
use csai_core::config::{AiConfig, TankConfig};
use csai_core::error::AiError;
use csai_core::math::Position;
use csai_core::tanks::Mission;
use csai_test_utils::fixtures::FakeHost;

const COM: i32 = 1;
const PLANT: i32 = 5;
const CV: i32 = 6;
const COM_POS: Position = Position::new(500.0, 0.0, 500.0);
const PLANT_POS: Position = Position::new(560.0, 0.0, 500.0);

fn start() -> (Ai, FakeHost) {
    let mut host = FakeHost::new()
        .with_unit(COM, "armcom", COM_POS)
        .with_metal_spot(Position::new(700.0, 0.0, 500.0));
    let mut ai = Ai::new(AiConfig::default());
    ai.init(&mut host).unwrap();
    (ai, host)
}

fn finish(ai: &mut Ai, host: &mut FakeHost, unit: i32) {
    ai.handle(host, AiEvent::UnitCreated { unit }).unwrap();
    ai.handle(host, AiEvent::UnitFinished { unit }).unwrap();
}

#[test]
fn test_commander_orders_first_factory() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();

    assert!(ai.units().contains(COM));
    assert!(ai.constructors().constructors().contains(COM));
    assert_eq!(ai.factories().pending(), 1);
    assert_eq!(host.orders_for(COM), vec![&host.build_order("armvp", COM_POS)]);
}

#[test]
fn test_finished_factory_builds_constructor() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();

    host.insert_unit(PLANT, "armvp", PLANT_POS);
    finish(&mut ai, &mut host, PLANT);

    assert_eq!(ai.factories().pending(), 0);
    assert!(ai.factories().factories().contains(PLANT));
    assert_eq!(host.orders_for(PLANT), vec![&host.build_order("armcv", PLANT_POS)]);
}

#[test]
fn test_destroyed_before_completion_releases_request() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    assert_eq!(ai.factories().pending(), 1);

    host.insert_unit(PLANT, "armvp", PLANT_POS);
    ai.handle(&mut host, AiEvent::UnitCreated { unit: PLANT }).unwrap();
    ai.handle(&mut host, AiEvent::UnitDestroyed { unit: PLANT }).unwrap();

    assert_eq!(ai.factories().pending(), 0);
    assert!(!ai.units().contains(PLANT));
}

#[test]
fn test_destroyed_unit_leaves_every_registry() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.insert_unit(CV, "armcv", COM_POS);
    finish(&mut ai, &mut host, CV);
    assert!(ai.constructors().constructors().contains(CV));

    ai.handle(&mut host, AiEvent::UnitDestroyed { unit: CV }).unwrap();
    assert!(!ai.units().contains(CV));
    assert!(!ai.constructors().constructors().contains(CV));
}

#[test]
fn test_duplicate_finish_is_ignored() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();

    assert_eq!(ai.units().len(), 1);
    assert_eq!(host.orders.len(), 1);
}

#[test]
fn test_idle_constructor_put_back_to_work() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.resources.energy = 100.0;

    ai.handle(&mut host, AiEvent::UnitIdle { unit: COM }).unwrap();
    assert_eq!(host.last_order().unwrap().1, host.build_order("armsolar", COM_POS));
}

#[test]
fn test_idle_sweep_restarts_idle_builders() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.resources.energy = 100.0;

    ai.handle(&mut host, AiEvent::Update { frame: 900 }).unwrap();
    assert_eq!(host.orders.len(), 1, "busy commander is left alone");

    host.set_busy(COM, false);
    ai.handle(&mut host, AiEvent::Update { frame: 1799 }).unwrap();
    assert_eq!(host.orders.len(), 1, "no sweep between intervals");

    ai.handle(&mut host, AiEvent::Update { frame: 1800 }).unwrap();
    assert_eq!(host.orders.len(), 2);
    assert_eq!(host.last_order().unwrap().1, host.build_order("armsolar", COM_POS));
}

#[test]
fn test_unknown_unit_is_reported() {
    let (mut ai, mut host) = start();
    let result = ai.handle(&mut host, AiEvent::UnitFinished { unit: 99 });
    assert!(matches!(result, Err(AiError::UnknownUnit(99))));

    // Still usable afterwards
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    assert!(ai.units().contains(COM));
}

#[test]
fn test_move_failed_nudges_constructor() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.frame = 100;

    ai.handle(&mut host, AiEvent::UnitMoveFailed { unit: COM }).unwrap();
    assert_eq!(host.orders.len(), 2);
}

// =============================================================================
// Tanks
// =============================================================================

const TANK_A: i32 = 20;
const TANK_B: i32 = 21;

fn pack_config(min_tanks_for_attack: usize) -> AiConfig {
    AiConfig {
        tanks: TankConfig {
            min_tanks_for_attack,
            ..TankConfig::default()
        },
        ..AiConfig::default()
    }
}

#[test]
fn test_factory_keeps_producing_after_constructor_quota() {
    let (mut ai, mut host) = start();
    host.allow_build("armvp", &["armstump", "armsam"]);
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.insert_unit(CV, "armcv", COM_POS);
    finish(&mut ai, &mut host, CV);
    assert_eq!(ai.constructors().constructors().len(), 2);

    host.insert_unit(PLANT, "armvp", PLANT_POS);
    finish(&mut ai, &mut host, PLANT);
    host.set_busy(PLANT, false);
    ai.handle(&mut host, AiEvent::UnitIdle { unit: PLANT }).unwrap();

    let stumpy = host.build_order("armstump", PLANT_POS);
    let samson = host.build_order("armsam", PLANT_POS);
    let orders = host.orders_for(PLANT);
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|order| **order == stumpy || **order == samson));
}

#[test]
fn test_factory_without_combat_options_idles_after_quota() {
    let (mut ai, mut host) = start();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    host.insert_unit(CV, "armcv", COM_POS);
    finish(&mut ai, &mut host, CV);

    host.insert_unit(PLANT, "armvp", PLANT_POS);
    finish(&mut ai, &mut host, PLANT);
    assert!(host.orders_for(PLANT).is_empty());
}

#[test]
fn test_tanks_outrank_constructors_below_attack_size() {
    let (mut ai, mut host) = start();
    host.allow_build("armvp", &["armstump"]);
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();

    host.insert_unit(PLANT, "armvp", PLANT_POS);
    finish(&mut ai, &mut host, PLANT);
    assert_eq!(host.orders_for(PLANT), vec![&host.build_order("armstump", PLANT_POS)]);
}

#[test]
fn test_pack_guards_commander_then_attacks_nearest_enemy() {
    let mut host = FakeHost::new()
        .with_unit(COM, "armcom", COM_POS)
        .with_unit(TANK_A, "armstump", PLANT_POS)
        .with_unit(TANK_B, "armstump", PLANT_POS)
        .with_enemy(90, Position::new(900.0, 0.0, 500.0))
        .with_enemy(91, Position::new(600.0, 0.0, 500.0));
    let mut ai = Ai::new(pack_config(2));
    ai.init(&mut host).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_A }).unwrap();

    ai.handle(&mut host, AiEvent::Update { frame: 30 }).unwrap();
    assert_eq!(ai.tanks().mission(), Some(Mission::Guard(COM)));
    let guard = Order::Guard { target: COM }.to_wire();
    assert_eq!(host.orders_for(TANK_A), vec![&guard]);

    // Joins the current mission straight away
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_B }).unwrap();
    assert_eq!(host.orders_for(TANK_B), vec![&guard]);

    ai.handle(&mut host, AiEvent::Update { frame: 60 }).unwrap();
    assert_eq!(ai.tanks().mission(), Some(Mission::Attack(91)));
    let attack = Order::Attack { target: 91 }.to_wire();
    assert_eq!(host.orders_for(TANK_A).last(), Some(&&attack));
    assert_eq!(host.orders_for(TANK_B).last(), Some(&&attack));

    // Unchanged mission is not reissued
    let issued = host.orders.len();
    ai.handle(&mut host, AiEvent::Update { frame: 90 }).unwrap();
    assert_eq!(host.orders.len(), issued);

    host.enemies.retain(|(enemy, _)| *enemy != 91);
    ai.handle(&mut host, AiEvent::Update { frame: 120 }).unwrap();
    assert_eq!(ai.tanks().mission(), Some(Mission::Attack(90)));
    assert_eq!(host.orders.len(), issued + 2);
}

#[test]
fn test_pack_falls_back_to_guard_without_enemies() {
    let mut host = FakeHost::new()
        .with_unit(COM, "armcom", COM_POS)
        .with_unit(TANK_A, "armstump", PLANT_POS);
    let mut ai = Ai::new(pack_config(1));
    ai.init(&mut host).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_A }).unwrap();

    ai.handle(&mut host, AiEvent::Update { frame: 30 }).unwrap();
    assert_eq!(ai.tanks().mission(), Some(Mission::Guard(COM)));
    assert_eq!(host.orders_for(TANK_A)[0].id, CMD_GUARD);
}

#[test]
fn test_idle_tank_rejoins_mission() {
    let mut host = FakeHost::new()
        .with_unit(COM, "armcom", COM_POS)
        .with_unit(TANK_A, "armstump", PLANT_POS)
        .with_enemy(90, Position::new(900.0, 0.0, 500.0));
    let mut ai = Ai::new(pack_config(1));
    ai.init(&mut host).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_A }).unwrap();
    ai.handle(&mut host, AiEvent::Update { frame: 30 }).unwrap();

    host.set_busy(TANK_A, false);
    ai.handle(&mut host, AiEvent::UnitIdle { unit: TANK_A }).unwrap();
    let orders = host.orders_for(TANK_A);
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|order| order.id == CMD_ATTACK));
}

#[test]
fn test_destroyed_tank_leaves_pack() {
    let mut host = FakeHost::new().with_unit(TANK_A, "armstump", PLANT_POS);
    let mut ai = Ai::new(AiConfig::default());
    ai.init(&mut host).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_A }).unwrap();
    assert!(ai.tanks().tanks().contains(TANK_A));

    ai.handle(&mut host, AiEvent::UnitDestroyed { unit: TANK_A }).unwrap();
    assert!(ai.tanks().tanks().is_empty());
}

// =============================================================================
// Chat
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let (mut ai, mut host) = start();
    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai help".to_string(),
            player: 0,
        },
    )
    .unwrap();
    assert_eq!(host.messages, help_text(0));
}

#[test]
fn test_unknown_command_shows_help() {
    let (mut ai, mut host) = start();
    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai* dance".to_string(),
            player: 0,
        },
    )
    .unwrap();
    assert_eq!(host.messages, help_text(0));
}

#[test]
fn test_other_team_and_plain_chat_ignored() {
    let (mut ai, mut host) = start();
    for text in [".csai3 help", "gg", ".csaihelp"] {
        ai.handle(
            &mut host,
            AiEvent::ChatMessage {
                text: text.to_string(),
                player: 1,
            },
        )
        .unwrap();
    }
    assert!(host.messages.is_empty());
}

#[test]
fn test_debug_toggle_draws_reclaim_markers() {
    let (mut ai, mut host) = start();
    host.frame = 10;
    host.resources.metal = 100.0;
    host.features.clear();
    let mut host = host.with_feature(1, Position::new(520.0, 0.0, 500.0), 30.0);

    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai0 debugon".to_string(),
            player: 0,
        },
    )
    .unwrap();
    assert!(ai.config().debug);

    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    assert_eq!(host.markers.len(), 1);
    assert_eq!(host.markers[0].position, Position::new(520.0, 0.0, 500.0));

    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai0 debugoff".to_string(),
            player: 0,
        },
    )
    .unwrap();
    host.set_busy(COM, false);
    ai.handle(&mut host, AiEvent::UnitIdle { unit: COM }).unwrap();
    assert_eq!(host.markers.len(), 1);
}

#[test]
fn test_build_site_toggle_draws_markers() {
    let (mut ai, mut host) = start();
    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai constructorshownextbuildsiteon".to_string(),
            player: 0,
        },
    )
    .unwrap();

    ai.handle(&mut host, AiEvent::UnitFinished { unit: COM }).unwrap();
    assert_eq!(host.markers.len(), 1);
    assert_eq!(host.markers[0].unit_name, "armvp");
}

#[test]
fn test_tanks_count_reply() {
    let mut host = FakeHost::new().with_unit(TANK_A, "armstump", PLANT_POS);
    let mut ai = Ai::new(AiConfig::default());
    ai.init(&mut host).unwrap();
    ai.handle(&mut host, AiEvent::UnitFinished { unit: TANK_A }).unwrap();

    ai.handle(
        &mut host,
        AiEvent::ChatMessage {
            text: ".csai* tankscount".to_string(),
            player: 0,
        },
    )
    .unwrap();
    assert_eq!(host.messages, vec!["Number tanks: 1".to_string()]);
}
