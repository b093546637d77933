//! Сценарии поверх публичного API: TOML tuning + demo уровень + SahurController
//!
//! Без Bevy App — контроллер тикается напрямую, мир шагает SandboxWorld.

use bevy::prelude::*;
use brainrot_simulation::ai::ActionKind;
use brainrot_simulation::sandbox::{demo_level, SandboxWorld};
use brainrot_simulation::*;

const DT: f32 = 1.0 / 60.0;

const TUNING: &str = r#"
idle_duration = 1.0
min_patrol_duration = 2.0

[hiding]
time_to_wait_at_spot = 2.0
"#;

fn setup() -> (SahurController, SandboxWorld) {
    let config = SahurConfig::from_toml_str(TUNING).expect("tuning parses");
    let (mut world, layout) = demo_level(&config.layers);

    let mut controller = SahurController::new(config, layout, 99);
    controller.initialize(&mut world.context()).expect("demo level is valid");
    (controller, world)
}

fn tick_until(
    controller: &mut SahurController,
    world: &mut SandboxWorld,
    max_frames: u32,
    mut done: impl FnMut(&SahurController) -> bool,
) -> Option<u32> {
    for frame in 1..=max_frames {
        controller.update(DT, &mut world.context());
        world.step(DT);
        if done(controller) {
            return Some(frame);
        }
    }
    None
}

#[test]
fn test_player_escapes_world_event_chase_by_hiding() {
    let (mut controller, mut world) = setup();
    let player = world.player.as_ref().expect("player").pose.position;

    controller.on_world_event(WorldEvent::CreatureBurned);
    tick_until(&mut controller, &mut world, 1, |c| c.state() == AgentState::ChasingPlayer)
        .expect("world event must start a chase");

    // Полсекунды погони, потом игрок лезет в шкаф на своём месте
    tick_until(&mut controller, &mut world, 30, |_| false);
    controller.on_world_event(WorldEvent::PlayerEnteredHidingSpot { spot: player });

    tick_until(&mut controller, &mut world, 300, |c| {
        c.action_kind() == Some(ActionKind::WaitAtHidingSpot)
    })
    .expect("agent never reached the wardrobe");

    let waited = tick_until(&mut controller, &mut world, 300, |c| c.state() == AgentState::Patrolling)
        .expect("agent never gave up");
    assert!((waited as f32 * DT - 2.0).abs() < 2.0 * DT);

    let signals = controller.drain_signals();
    assert!(signals.contains(&SahurSignal::HidingSpotAbandoned));
    assert!(!signals.contains(&SahurSignal::PlayerCaught));
    assert_eq!(controller.chase_reason(), None);
}

#[test]
fn test_unnoticed_hiding_survives_world_event_chase() {
    let (mut controller, mut world) = setup();
    let player = world.player.as_ref().expect("player").pose.position;

    // Агент в Idle далеко (12m+) — укрытие ему неизвестно
    controller.on_world_event(WorldEvent::PlayerEnteredHidingSpot { spot: player });
    tick_until(&mut controller, &mut world, 1, |_| false);
    assert!(!controller.hiding().state().known_by_seeker);

    controller.on_world_event(WorldEvent::CreatureBurned);
    tick_until(&mut controller, &mut world, 600, |_| false);

    // Погоня по событию не бросается, но спрятавшегося не ловят
    assert_eq!(controller.chase_reason(), Some(ChaseReason::WorldEvent));
    assert!(!controller.drain_signals().contains(&SahurSignal::PlayerCaught));
    assert!(world.player.as_ref().expect("player").movement_enabled);
}

#[test]
fn test_tuning_reaches_the_agent() {
    let (controller, _) = setup();
    assert_eq!(controller.config().idle_duration, 1.0);
    assert_eq!(controller.config().hiding.time_to_wait_at_spot, 2.0);
    // Не указанное в TOML — из Default
    assert_eq!(controller.config().catch_distance, SahurConfig::default().catch_distance);
    assert_eq!(controller.layout().patrol_points.len(), 5);
}
