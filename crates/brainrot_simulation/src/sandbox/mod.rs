//! Sandbox — reference реализации всех внешних коллабораторов
//!
//! Используется headless binary, unit и integration тестами.
//! Кинематика примитивная: агент едет по прямой, коллайдеры — сферы.
//!
//! # Submodules
//!
//! - `nav`: SandboxNav (NavigationPort)
//! - `physics`: сферические коллайдеры (ObstructionQuery) + двери (DoorDirectory)
//! - `presentation`: recording animator / player / HUD / health

pub mod nav;
pub mod physics;
pub mod presentation;

use std::collections::HashMap;

use bevy::prelude::*;

pub use nav::{SandboxNav, Zone};
pub use physics::{SandboxDoors, SandboxObstacles, SphereCollider};
pub use presentation::{RecordingAnimator, SandboxHealth, SandboxHud, SandboxPlayer};

use crate::ai::{CollisionLayers, SahurHost};
use crate::components::{LevelLayout, PatrolPoint, Pose};
use crate::vision::Interactable;
use crate::world::{AgentContext, AnimationPort, DoorId, HealthPort, HudPort, PlayerPort, SimpleDoor};

/// Мир одного агента
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    pub nav: SandboxNav,
    pub obstacles: SandboxObstacles,
    pub doors: SandboxDoors,
    pub animator: Option<RecordingAnimator>,
    pub player: Option<SandboxPlayer>,
    pub hud: Option<SandboxHud>,
    pub health: Option<SandboxHealth>,
}

impl SandboxWorld {
    /// Агент в `agent_position`, аниматор/HUD/здоровье на месте, игрока нет
    pub fn new(agent_position: Vec3) -> Self {
        Self {
            nav: SandboxNav::new(agent_position),
            obstacles: SandboxObstacles::default(),
            doors: SandboxDoors::default(),
            animator: Some(RecordingAnimator::default()),
            player: None,
            hud: Some(SandboxHud::default()),
            health: Some(SandboxHealth::new(3, 0.4)),
        }
    }

    pub fn with_player(mut self, position: Vec3) -> Self {
        self.player = Some(SandboxPlayer::new(position));
        self
    }

    /// Стена (перекрывает взгляд)
    pub fn with_wall(mut self, center: Vec3, radius: f32, layers: &CollisionLayers) -> Self {
        self.obstacles
            .add(SphereCollider::new(center, radius, layers.obstruction_group().difference(layers.door_group())));
        self
    }

    /// Закрытая дверь: коллайдер на door-слое + запись в directory
    pub fn with_door(mut self, id: DoorId, center: Vec3, radius: f32, layers: &CollisionLayers) -> Self {
        let mut collider = SphereCollider::new(center, radius, layers.door_group());
        collider.interactable = Some(Interactable::Door(id));
        self.obstacles.add(collider);
        self.doors.insert(id, SimpleDoor::default());
        self.obstacles.sync_doors(&self.doors);
        self
    }

    /// Одолжить ссылки на один вызов контроллера
    pub fn context(&mut self) -> AgentContext<'_> {
        AgentContext {
            nav: &mut self.nav,
            obstruction: &self.obstacles,
            doors: &mut self.doors,
            animator: self.animator.as_mut().map(|a| a as &mut dyn AnimationPort),
            player: self.player.as_mut().map(|p| p as &mut dyn PlayerPort),
            hud: self.hud.as_mut().map(|h| h as &mut dyn HudPort),
            health: self.health.as_mut().map(|h| h as &mut dyn HealthPort),
        }
    }

    /// Продвинуть симуляцию мира (после update контроллера)
    pub fn step(&mut self, delta: f32) {
        self.nav.step(delta);
        if let Some(health) = self.health.as_mut() {
            health.step(delta);
        }
        self.obstacles.sync_doors(&self.doors);
    }

    pub fn player_mut(&mut self) -> Option<&mut SandboxPlayer> {
        self.player.as_mut()
    }

    pub fn set_player_position(&mut self, position: Vec3) {
        if let Some(player) = self.player.as_mut() {
            player.pose.position = position;
        }
    }

    pub fn agent_animator(&self) -> Option<&RecordingAnimator> {
        self.animator.as_ref()
    }
}

/// SahurHost поверх набора SandboxWorld (по одному на агента)
#[derive(Default)]
pub struct SandboxHost {
    worlds: HashMap<Entity, SandboxWorld>,
}

impl SandboxHost {
    pub fn insert(&mut self, agent: Entity, world: SandboxWorld) {
        self.worlds.insert(agent, world);
    }

    pub fn world(&self, agent: Entity) -> Option<&SandboxWorld> {
        self.worlds.get(&agent)
    }

    pub fn world_mut(&mut self, agent: Entity) -> Option<&mut SandboxWorld> {
        self.worlds.get_mut(&agent)
    }
}

impl SahurHost for SandboxHost {
    fn context(&mut self, agent: Entity) -> Option<AgentContext<'_>> {
        self.worlds.get_mut(&agent).map(SandboxWorld::context)
    }

    fn step(&mut self, delta: f32) {
        for world in self.worlds.values_mut() {
            world.step(delta);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Демо уровень: комната 20x20, 5 патрульных точек, дверь в коридор
pub fn demo_level(layers: &CollisionLayers) -> (SandboxWorld, LevelLayout) {
    let layout = LevelLayout::with_patrol_points([
        PatrolPoint::new("hall_north", Vec3::new(0.0, 0.0, -8.0)),
        PatrolPoint::new("hall_south", Vec3::new(0.0, 0.0, 8.0)),
        PatrolPoint::new("kitchen", Vec3::new(8.0, 0.0, 0.0)),
        PatrolPoint::new("bedroom", Vec3::new(-8.0, 0.0, 0.0)),
        PatrolPoint::new("corridor", Vec3::new(8.0, 0.0, 8.0)),
    ])
    .catch_anchor(Pose::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z))
    .respawn_point(Pose::new(Vec3::new(-9.0, 0.0, 9.0), Vec3::NEG_Z));

    let world = SandboxWorld::new(Vec3::ZERO)
        .with_player(Vec3::new(-9.0, 0.0, 9.0))
        .with_wall(Vec3::new(-4.0, 1.0, 4.0), 1.0, layers)
        .with_door(DoorId(1), Vec3::new(8.0, 1.0, 4.0), 0.6, layers);

    (world, layout)
}
