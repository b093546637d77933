//! Pose — позиция и направление взгляда

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Позиция + forward вектор (world coordinates, Y вверх)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or(Vec3::NEG_Z),
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Pose в `position`, смотрящая на `target` (по горизонтали)
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self::new(position, flat_direction(position, target).unwrap_or(Vec3::NEG_Z))
    }

    /// Правый вектор в горизонтальной плоскости
    pub fn right(&self) -> Vec3 {
        let flat = Vec3::new(self.forward.x, 0.0, self.forward.z).normalize_or(Vec3::NEG_Z);
        flat.cross(Vec3::Y)
    }
}

/// Горизонтальное направление from → to (None если точки совпадают по XZ)
pub fn flat_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let delta = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    delta.try_normalize()
}

/// Дистанция по полу (без учёта высоты)
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(b.x - a.x, 0.0, b.z - a.z).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_is_perpendicular_to_forward() {
        let pose = Pose::new(Vec3::ZERO, Vec3::NEG_Z);
        // forward = -Z → right = +X
        assert!((pose.right() - Vec3::X).length() < 1e-5);
        assert!(pose.right().dot(pose.forward).abs() < 1e-5);
    }

    #[test]
    fn test_looking_at_ignores_height() {
        let pose = Pose::looking_at(Vec3::ZERO, Vec3::new(0.0, 5.0, 3.0));
        assert!((pose.forward - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_zero_forward_falls_back() {
        let pose = Pose::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(pose.forward, Vec3::NEG_Z);
    }
}
