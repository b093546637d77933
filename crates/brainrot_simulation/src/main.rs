//! Headless симуляция Escape The Brainrot
//!
//! Sandbox уровень + один агент Sahur, 1000 тиков без рендера.
//! На 300-м тике сжигаем существо — агент обязан погнаться за игроком.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use brainrot_simulation::ai::{AgentBackend, SahurAgent};
use brainrot_simulation::sandbox::{demo_level, SandboxHost};
use brainrot_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting Escape The Brainrot headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    let config = SahurConfig::default();
    let (world, layout) = demo_level(&config.layers);

    let agent_seed = app.world_mut().resource_mut::<DeterministicRng>().next_seed();
    let agent = app
        .world_mut()
        .spawn(SahurAgent::new(SahurController::new(config, layout, agent_seed)))
        .id();

    let mut host = SandboxHost::default();
    host.insert(agent, world);
    app.insert_resource(AgentBackend::new(host));

    for tick in 0..1000 {
        if tick == 300 {
            app.world_mut().send_event(WorldEvent::CreatureBurned);
        }

        app.update();

        if tick % 100 == 0 {
            let state = app
                .world()
                .get::<SahurAgent>(agent)
                .map(|agent| agent.controller.state().as_str())
                .unwrap_or("despawned");
            let position = app
                .world()
                .resource::<AgentBackend>()
                .downcast_ref::<SandboxHost>()
                .and_then(|host| host.world(agent))
                .map(|world| world.nav.position);
            println!("Tick {}: Sahur {} at {:?}", tick, state, position);
        }
    }

    let session = app.world().resource::<SessionCoordinator>();
    println!(
        "Simulation complete! burned: {}/{}, caught: {}",
        session.burned_creatures, session.required_burns, session.times_caught
    );
}
