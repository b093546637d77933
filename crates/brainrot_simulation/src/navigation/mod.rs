//! Navigation domain — контракт над pathfinding агентом + stuck recovery
//!
//! # Architecture
//!
//! Сам pathfinding (navmesh, steering, avoidance) живёт во внешнем движке.
//! AI видит его только через узкий `NavigationPort`:
//! - destination / path status / remaining distance / velocity
//! - teleport + sampling ближайшей navigable точки
//! - stop/resume и motion profile (speed, angular, acceleration, stopping distance)
//!
//! # Submodules
//!
//! - `stuck`: StuckTracker + staged recovery (teleport/escape/nudge)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod stuck;

#[cfg(test)]
mod stuck_tests;

pub use stuck::{RecoveryOutcome, RecoveryStage, StuckRecovery, StuckTracker};

/// Статус текущего пути агента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PathStatus {
    /// Путь доходит до destination
    Complete,
    /// Путь обрывается (цель за препятствием)
    Partial,
    /// Пути нет
    Invalid,
}

/// Параметры движения агента для текущего состояния
///
/// Инвариант: профиль всегда соответствует состоянию FSM
/// (walk при патруле, chase при погоне, frozen в скриптовой сцене).
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct MotionProfile {
    /// м/с
    pub speed: f32,
    /// градусы/с
    pub angular_speed: f32,
    /// м/с²
    pub acceleration: f32,
    /// м
    pub stopping_distance: f32,
}

impl MotionProfile {
    pub const fn new(speed: f32, angular_speed: f32, acceleration: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            angular_speed,
            acceleration,
            stopping_distance,
        }
    }

    /// Профиль для скриптовых сцен: агент стоит
    pub fn frozen(stopping_distance: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, stopping_distance)
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Контракт над pathfinding/movement агентом движка
pub trait NavigationPort {
    /// Агент стоит на navmesh (без этого AI не стартует)
    fn is_on_navmesh(&self) -> bool;

    fn position(&self) -> Vec3;
    fn forward(&self) -> Vec3;

    /// Запросить путь к target. false — движок отказал сразу
    fn set_destination(&mut self, target: Vec3) -> bool;
    fn destination(&self) -> Option<Vec3>;
    /// Ближайший угол пути (куда агент рулит прямо сейчас)
    fn steering_target(&self) -> Option<Vec3>;

    fn remaining_distance(&self) -> f32;
    fn velocity(&self) -> Vec3;
    fn has_path(&self) -> bool;
    fn path_pending(&self) -> bool;
    fn path_status(&self) -> PathStatus;

    /// Синхронный расчёт пути без изменения текущего (проверка reachability)
    fn calculate_path(&self, target: Vec3) -> PathStatus;
    /// Ближайшая navigable точка в радиусе `max_distance`
    fn sample_position(&self, near: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Warp агента. false — точка вне navmesh
    fn teleport(&mut self, position: Vec3) -> bool;

    fn stop(&mut self);
    fn resume(&mut self);
    fn is_stopped(&self) -> bool;
    fn reset_path(&mut self);
    fn set_enabled(&mut self, enabled: bool);

    fn set_speed(&mut self, speed: f32);
    fn set_angular_speed(&mut self, degrees_per_second: f32);
    fn set_acceleration(&mut self, acceleration: f32);
    fn set_stopping_distance(&mut self, distance: f32);
    fn stopping_distance(&self) -> f32;

    fn apply_profile(&mut self, profile: &MotionProfile) {
        self.set_speed(profile.speed);
        self.set_angular_speed(profile.angular_speed);
        self.set_acceleration(profile.acceleration);
        self.set_stopping_distance(profile.stopping_distance);
    }

    /// Агент дошёл: путь посчитан, осталось ≤ stopping distance и почти не двигается
    fn has_reached_destination(&self) -> bool {
        !self.path_pending()
            && self.remaining_distance() <= self.stopping_distance()
            && (!self.has_path() || self.velocity().length_squared() < 0.01)
    }
}
