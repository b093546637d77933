//! AI module — агент Sahur
//!
//! Plain-Rust ядро (SahurController + подсистемы) и Bevy glue поверх него.
//!
//! # Submodules
//!
//! - `components`: состояния FSM, причины погони, tuning
//! - `patrol`: PatrolPlanner + RecentDestinationHistory
//! - `chase`: ChaseTrigger (vision / hazard / world event + cooldowns)
//! - `hiding`: HidingInteraction (укрытия)
//! - `controller`: SahurController (top-level FSM)
//! - `events`: WorldEvent (вход), SahurSignal / AgentSignalEvent (выход)
//! - `systems`: SahurAgent, AgentBackend, FixedUpdate системы

use bevy::prelude::*;

pub mod chase;
pub mod components;
pub mod controller;
pub mod events;
pub mod hiding;
pub mod patrol;
pub mod systems;


pub use chase::ChaseTrigger;
pub use components::*;
pub use controller::SahurController;
pub use events::{AgentSignalEvent, SahurSignal, WorldEvent};
pub use hiding::{HidingExit, HidingInteraction, HidingState};
pub use patrol::{PatrolPlanner, RecentDestinationHistory};
pub use systems::{AgentBackend, SahurAgent, SahurHost};

/// AI Plugin
///
/// Регистрирует события и системы в FixedUpdate (детерминизм).
/// Порядок выполнения:
/// 1. initialize_pending_agents — setup новых агентов
/// 2. forward_world_events — WorldEvent → inbox подписанных агентов
/// 3. tick_agents — один кадр FSM
/// 4. publish_agent_signals — SahurSignal → AgentSignalEvent
/// 5. step_agent_host — движение/анимации в мире хоста
///
/// `AgentBackend` вставляет хост (движок или SandboxHost).
pub struct SahurAIPlugin;

impl Plugin for SahurAIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WorldEvent>()
            .add_event::<AgentSignalEvent>()
            .add_systems(
                FixedUpdate,
                (
                    systems::initialize_pending_agents,
                    systems::forward_world_events,
                    systems::tick_agents,
                    systems::publish_agent_signals,
                    systems::step_agent_host,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
