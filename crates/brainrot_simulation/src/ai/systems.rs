//! Bevy glue: SahurAgent component + AgentBackend resource + FixedUpdate systems
//!
//! Контроллер — обычная Rust-структура. Коллабораторов (navmesh, физика,
//! аниматоры, HUD) одалживает хост через `SahurHost::context(entity)` на время
//! одного вызова. Хост — движок (или SandboxHost в тестах/headless).

use std::any::Any;

use bevy::prelude::*;

use super::{AgentSignalEvent, SahurController, WorldEvent};
use crate::world::AgentContext;

/// Агент на entity
#[derive(Component, Debug)]
pub struct SahurAgent {
    pub controller: SahurController,
}

impl SahurAgent {
    pub fn new(controller: SahurController) -> Self {
        Self { controller }
    }
}

/// Хост коллабораторов агента
pub trait SahurHost: Send + Sync + 'static {
    /// Ссылки на коллабораторов агента. None — хост агента не знает
    fn context(&mut self, agent: Entity) -> Option<AgentContext<'_>>;

    /// Продвинуть симуляцию мира хоста (после тиков агентов)
    fn step(&mut self, delta: f32);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Resource)]
pub struct AgentBackend {
    host: Box<dyn SahurHost>,
}

impl AgentBackend {
    pub fn new(host: impl SahurHost) -> Self {
        Self { host: Box::new(host) }
    }

    pub fn host_mut(&mut self) -> &mut dyn SahurHost {
        self.host.as_mut()
    }

    pub fn downcast_ref<T: SahurHost>(&self) -> Option<&T> {
        self.host.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: SahurHost>(&mut self) -> Option<&mut T> {
        self.host.as_any_mut().downcast_mut::<T>()
    }
}

/// Система: initialize для агентов, которые ещё не пробовали стартовать
///
/// Ошибка конфигурации → агент остаётся выключенным (повторно не пробуем).
pub fn initialize_pending_agents(
    mut agents: Query<(Entity, &mut SahurAgent)>,
    backend: Option<ResMut<AgentBackend>>,
) {
    let Some(mut backend) = backend else {
        return;
    };

    for (entity, mut agent) in agents.iter_mut() {
        if agent.controller.setup_attempted() {
            continue;
        }

        let Some(mut ctx) = backend.host_mut().context(entity) else {
            crate::log_warning(&format!("⚠️ No host context for agent {:?}, retry next tick", entity));
            continue;
        };

        if let Err(error) = agent.controller.initialize(&mut ctx) {
            crate::log_error(&format!("❌ Agent {:?} disabled: {}", entity, error));
        }
    }
}

/// Система: WorldEvent → inbox всех подписанных агентов
pub fn forward_world_events(mut events: EventReader<WorldEvent>, mut agents: Query<&mut SahurAgent>) {
    for event in events.read() {
        for mut agent in agents.iter_mut() {
            agent.controller.on_world_event(*event);
        }
    }
}

/// Система: один кадр FSM для каждого агента
pub fn tick_agents(
    time: Res<Time<Fixed>>,
    mut agents: Query<(Entity, &mut SahurAgent)>,
    backend: Option<ResMut<AgentBackend>>,
) {
    let Some(mut backend) = backend else {
        return;
    };
    let delta = time.delta_secs();

    for (entity, mut agent) in agents.iter_mut() {
        if !agent.controller.is_enabled() {
            continue;
        }
        let Some(mut ctx) = backend.host_mut().context(entity) else {
            continue;
        };
        agent.controller.update(delta, &mut ctx);
    }
}

/// Система: SahurSignal → AgentSignalEvent
pub fn publish_agent_signals(mut agents: Query<(Entity, &mut SahurAgent)>, mut writer: EventWriter<AgentSignalEvent>) {
    for (entity, mut agent) in agents.iter_mut() {
        for signal in agent.controller.drain_signals() {
            writer.write(AgentSignalEvent { agent: entity, signal });
        }
    }
}

/// Система: шаг мира хоста (движение, анимации урона)
pub fn step_agent_host(time: Res<Time<Fixed>>, backend: Option<ResMut<AgentBackend>>) {
    if let Some(mut backend) = backend {
        backend.host_mut().step(time.delta_secs());
    }
}
