//! Escape The Brainrot — simulation core
//!
//! AI агента Sahur на Bevy 0.16: патруль, зрение, погоня, укрытия,
//! stuck recovery и скриптовая сцена поимки.
//!
//! Движок (рендер, физика, navmesh, аниматоры) — внешний хост.
//! Ядро видит его только через узкие traits (`world`, `navigation`, `vision`)
//! и получает ссылки через `AgentContext` на время одного кадра.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod catch;
pub mod components;
pub mod error;
pub mod logger;
pub mod navigation;
pub mod sandbox;
pub mod session;
pub mod vision;
pub mod world;

// Re-export основных типов
pub use ai::{
    AgentBackend, AgentSignalEvent, AgentState, ChaseReason, SahurAIPlugin, SahurAgent, SahurConfig,
    SahurController, SahurHost, SahurSignal, WorldEvent,
};
pub use components::*;
pub use error::SetupError;
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter,
    MemoryLogger,
};
pub use session::SessionCoordinator;

/// Главный plugin симуляции (AI + session)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionCoordinator>()
            .add_plugins(SahurAIPlugin)
            .add_systems(
                FixedUpdate,
                session::track_session_progress.after(ai::systems::publish_agent_signals),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Из него берутся seed'ы патрульных планировщиков новых агентов.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed для нового агента
    pub fn next_seed(&mut self) -> u64 {
        use rand::RngCore;
        self.rng.next_u64()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}
