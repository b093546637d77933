//! SandboxNav — прямолинейный navigation agent без navmesh
//!
//! Агент едет по прямой к destination со скоростью профиля.
//! Настраиваемые сбои: недостижимые зоны (Partial path), зоны где
//! teleport/sampling запрещены, "замороженный" агент и вечный path_pending.

use bevy::prelude::*;

use crate::navigation::{NavigationPort, PathStatus};

/// Сфера на полу (XZ + радиус)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Zone {
    pub center: Vec3,
    pub radius: f32,
}

impl Zone {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let flat = Vec3::new(point.x - self.center.x, 0.0, point.z - self.center.z);
        flat.length() <= self.radius
    }
}

#[derive(Debug, Clone)]
pub struct SandboxNav {
    pub position: Vec3,
    pub forward: Vec3,
    pub velocity: Vec3,
    pub on_navmesh: bool,
    pub enabled: bool,
    pub stopped: bool,
    /// Агент не двигается, даже если путь есть (stall)
    pub frozen: bool,
    /// Пути считаются "вечно" (path_pending не снимается)
    pub stall_path_pending: bool,
    /// Сколько шагов path_pending после set_destination
    pub path_latency_steps: u32,
    pub unreachable: Vec<Zone>,
    pub teleport_blocked: Vec<Zone>,

    destination: Option<Vec3>,
    pending_steps: u32,
    speed: f32,
    angular_speed: f32,
    acceleration: f32,
    stopping_distance: f32,

    /// История teleport'ов (для тестов recovery)
    pub teleports: Vec<Vec3>,
    pub destination_requests: u32,
}

impl SandboxNav {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::NEG_Z,
            velocity: Vec3::ZERO,
            on_navmesh: true,
            enabled: true,
            stopped: false,
            frozen: false,
            stall_path_pending: false,
            path_latency_steps: 0,
            unreachable: Vec::new(),
            teleport_blocked: Vec::new(),
            destination: None,
            pending_steps: 0,
            speed: 0.0,
            angular_speed: 0.0,
            acceleration: 0.0,
            stopping_distance: 0.0,
            teleports: Vec::new(),
            destination_requests: 0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    fn is_reachable(&self, target: Vec3) -> bool {
        !self.unreachable.iter().any(|zone| zone.contains(target))
    }

    fn can_stand_at(&self, point: Vec3) -> bool {
        self.on_navmesh && !self.teleport_blocked.iter().any(|zone| zone.contains(point))
    }

    /// Один шаг кинематики
    pub fn step(&mut self, delta: f32) {
        self.velocity = Vec3::ZERO;

        if self.pending_steps > 0 {
            self.pending_steps -= 1;
            return;
        }

        if !self.enabled || self.stopped || self.frozen || self.stall_path_pending || delta <= 0.0 {
            return;
        }

        let Some(destination) = self.destination else {
            return;
        };
        if !self.is_reachable(destination) {
            return;
        }

        let to_target = Vec3::new(destination.x - self.position.x, 0.0, destination.z - self.position.z);
        let distance = to_target.length();
        if distance <= self.stopping_distance || distance <= f32::EPSILON {
            return;
        }

        let advance = (self.speed * delta).min(distance);
        let direction = to_target / distance;
        self.position += direction * advance;
        self.velocity = direction * (advance / delta);
        self.forward = direction;
    }
}

impl NavigationPort for SandboxNav {
    fn is_on_navmesh(&self) -> bool {
        self.on_navmesh
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn set_destination(&mut self, target: Vec3) -> bool {
        if !self.enabled || !self.on_navmesh {
            return false;
        }
        self.destination_requests += 1;

        // Тот же destination — путь не пересчитываем
        if self.destination != Some(target) {
            self.pending_steps = self.path_latency_steps;
        }
        self.destination = Some(target);
        true
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn steering_target(&self) -> Option<Vec3> {
        if self.path_pending() {
            return None;
        }
        self.destination
    }

    fn remaining_distance(&self) -> f32 {
        if self.path_pending() {
            return f32::INFINITY;
        }
        match self.destination {
            Some(destination) => {
                Vec3::new(destination.x - self.position.x, 0.0, destination.z - self.position.z).length()
            }
            None => 0.0,
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn has_path(&self) -> bool {
        self.destination.is_some() && !self.path_pending()
    }

    fn path_pending(&self) -> bool {
        self.destination.is_some() && (self.stall_path_pending || self.pending_steps > 0)
    }

    fn path_status(&self) -> PathStatus {
        match self.destination {
            Some(destination) if self.is_reachable(destination) => PathStatus::Complete,
            Some(_) => PathStatus::Partial,
            None => PathStatus::Complete,
        }
    }

    fn calculate_path(&self, target: Vec3) -> PathStatus {
        if !self.enabled || !self.on_navmesh {
            PathStatus::Invalid
        } else if self.is_reachable(target) {
            PathStatus::Complete
        } else {
            PathStatus::Partial
        }
    }

    fn sample_position(&self, near: Vec3, _max_distance: f32) -> Option<Vec3> {
        let snapped = Vec3::new(near.x, self.position.y, near.z);
        self.can_stand_at(snapped).then_some(snapped)
    }

    fn teleport(&mut self, position: Vec3) -> bool {
        if !self.can_stand_at(position) {
            return false;
        }
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.destination = None;
        self.pending_steps = 0;
        self.teleports.push(position);
        true
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn reset_path(&mut self) {
        self.destination = None;
        self.pending_steps = 0;
        self.velocity = Vec3::ZERO;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn set_angular_speed(&mut self, degrees_per_second: f32) {
        self.angular_speed = degrees_per_second;
    }

    fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration;
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance;
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }
}

