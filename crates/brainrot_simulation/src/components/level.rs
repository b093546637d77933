//! Level layout: патрульные точки и якоря catch-сцены

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::Pose;

/// Патрульная точка (immutable в runtime)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct PatrolPoint {
    pub name: String,
    pub position: Vec3,
}

impl PatrolPoint {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Per-level ссылки, которые раньше назначались в инспекторе сцены
///
/// `catch_anchor` / `respawn_point` опциональны: без них catch-сцена
/// пропускает соответствующий шаг (лог + продолжаем).
#[derive(Resource, Debug, Clone, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub patrol_points: Vec<PatrolPoint>,
    pub catch_anchor: Option<Pose>,
    pub respawn_point: Option<Pose>,
}

impl LevelLayout {
    pub fn with_patrol_points(points: impl IntoIterator<Item = PatrolPoint>) -> Self {
        Self {
            patrol_points: points.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn catch_anchor(mut self, pose: Pose) -> Self {
        self.catch_anchor = Some(pose);
        self
    }

    pub fn respawn_point(mut self, pose: Pose) -> Self {
        self.respawn_point = Some(pose);
        self
    }
}
