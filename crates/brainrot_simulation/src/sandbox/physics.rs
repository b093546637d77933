//! Сферические коллайдеры + двери для sandbox уровня

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;

use crate::vision::{Interactable, ObstructionQuery, RayHit};
use crate::world::{DoorDirectory, DoorGate, DoorId, SimpleDoor};

#[derive(Debug, Clone, PartialEq)]
pub struct SphereCollider {
    pub center: Vec3,
    pub radius: f32,
    pub groups: Group,
    pub interactable: Option<Interactable>,
    /// Выключенный коллайдер не ловит лучи (открытая дверь)
    pub enabled: bool,
}

impl SphereCollider {
    pub fn new(center: Vec3, radius: f32, groups: Group) -> Self {
        Self {
            center,
            radius,
            groups,
            interactable: None,
            enabled: true,
        }
    }

    /// Дистанция до первого пересечения луча со сферой
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let offset = origin - self.center;
        let b = offset.dot(direction);
        let c = offset.length_squared() - self.radius * self.radius;

        // Старт внутри сферы
        if c <= 0.0 {
            return Some(0.0);
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        (t >= 0.0 && t <= max_distance).then_some(t)
    }
}

/// Статическая геометрия + коллайдеры дверей
#[derive(Debug, Clone, Default)]
pub struct SandboxObstacles {
    pub colliders: Vec<SphereCollider>,
}

impl SandboxObstacles {
    pub fn add(&mut self, collider: SphereCollider) {
        self.colliders.push(collider);
    }

    /// Открытые двери не перекрывают лучи
    pub fn sync_doors(&mut self, doors: &SandboxDoors) {
        for collider in self.colliders.iter_mut() {
            if let Some(Interactable::Door(id)) = collider.interactable {
                if let Some(door) = doors.get(id) {
                    collider.enabled = !door.is_open();
                }
            }
        }
    }
}

impl ObstructionQuery for SandboxObstacles {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: Group) -> Option<RayHit> {
        let direction = direction.try_normalize()?;

        self.colliders
            .iter()
            .filter(|collider| collider.enabled && collider.groups.intersects(filter))
            .filter_map(|collider| {
                collider
                    .intersect(origin, direction, max_distance)
                    .map(|distance| RayHit {
                        point: origin + direction * distance,
                        distance,
                        interactable: collider.interactable,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SandboxDoors {
    doors: Vec<(DoorId, SimpleDoor)>,
    /// Сколько раз AI запрашивал дверь по ID
    pub lookups: u32,
}

impl SandboxDoors {
    pub fn insert(&mut self, id: DoorId, door: SimpleDoor) {
        self.doors.retain(|(existing, _)| *existing != id);
        self.doors.push((id, door));
    }

    pub fn get(&self, id: DoorId) -> Option<&SimpleDoor> {
        self.doors.iter().find(|(existing, _)| *existing == id).map(|(_, door)| door)
    }
}

impl DoorDirectory for SandboxDoors {
    fn door_mut(&mut self, id: DoorId) -> Option<&mut dyn DoorGate> {
        let door = self
            .doors
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .map(|(_, door)| door)?;
        self.lookups += 1;
        Some(door as &mut dyn DoorGate)
    }
}
