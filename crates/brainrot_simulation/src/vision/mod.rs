//! Vision — конус зрения + line-of-sight проверка
//!
//! Порядок проверок (дешёвые первыми):
//! 1. игрок прячется → не видим
//! 2. дистанция > vision distance → не видим
//! 3. угол между forward и направлением на игрока > половины конуса → не видим
//! 4. луч от глаз агента до середины тела игрока во что-то упёрся → не видим

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;

use crate::ai::{SahurConfig, VisionTuning};
use crate::components::Pose;
use crate::world::DoorId;

/// Capability объекта, в который попал луч
///
/// Резолвится один раз на стороне хоста — AI не пробует типы на лету.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Interactable {
    Door(DoorId),
    Drawer(u32),
    Stick(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub interactable: Option<Interactable>,
}

/// Ray-style запрос к физике: ближайшая поверхность в пределах max_distance
pub trait ObstructionQuery {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: Group) -> Option<RayHit>;
}

/// Результат проверки видимости (для логов и тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Sighting {
    Visible,
    PlayerHidden,
    TooFar,
    OutsideCone,
    Obstructed,
}

/// Проверка "видит ли агент игрока"
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct PerceptionService {
    pub tuning: VisionTuning,
    pub obstruction_filter: u32,
}

impl PerceptionService {
    pub fn new(tuning: VisionTuning, obstruction_filter: Group) -> Self {
        Self {
            tuning,
            obstruction_filter: obstruction_filter.bits(),
        }
    }

    pub fn from_config(config: &SahurConfig) -> Self {
        Self::new(config.vision.clone(), config.layers.obstruction_group())
    }

    pub fn can_see_player(
        &self,
        self_pose: &Pose,
        player_pose: &Pose,
        player_hiding: bool,
        obstruction: &dyn ObstructionQuery,
    ) -> bool {
        self.evaluate(self_pose, player_pose, player_hiding, obstruction) == Sighting::Visible
    }

    pub fn evaluate(
        &self,
        self_pose: &Pose,
        player_pose: &Pose,
        player_hiding: bool,
        obstruction: &dyn ObstructionQuery,
    ) -> Sighting {
        if player_hiding {
            return Sighting::PlayerHidden;
        }

        let to_player = player_pose.position - self_pose.position;
        let distance = to_player.length();
        if distance > self.tuning.distance {
            return Sighting::TooFar;
        }

        // Стоим вплотную — направление не определено, считаем что в конусе
        if let Some(direction) = to_player.try_normalize() {
            let angle = self_pose.forward.angle_between(direction).to_degrees();
            if angle > self.tuning.angle * 0.5 {
                return Sighting::OutsideCone;
            }
        }

        let eye = self_pose.position + Vec3::Y * self.tuning.eye_height;
        let body = player_pose.position + Vec3::Y * self.tuning.player_mid_height;
        let ray = body - eye;
        let ray_length = ray.length();

        if let Some(direction) = ray.try_normalize() {
            let filter = Group::from_bits_truncate(self.obstruction_filter);
            if obstruction.cast_ray(eye, direction, ray_length, filter).is_some() {
                return Sighting::Obstructed;
            }
        }

        Sighting::Visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Пустой мир — ничего не перекрывает
    struct OpenField;

    impl ObstructionQuery for OpenField {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Group) -> Option<RayHit> {
            None
        }
    }

    /// Стена, перекрывающая всё (если фильтр её включает)
    struct Wall {
        layer: Group,
    }

    impl ObstructionQuery for Wall {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: Group) -> Option<RayHit> {
            filter.intersects(self.layer).then(|| RayHit {
                point: origin + direction * max_distance * 0.5,
                distance: max_distance * 0.5,
                interactable: None,
            })
        }
    }

    fn service(distance: f32) -> PerceptionService {
        PerceptionService::new(
            VisionTuning {
                distance,
                angle: 90.0,
                ..Default::default()
            },
            Group::GROUP_1,
        )
    }

    fn agent() -> Pose {
        Pose::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn test_sees_player_in_range_then_loses_beyond() {
        let vision = service(5.0);
        let near = Pose::at(Vec3::new(0.0, 0.0, -2.0));
        let far = Pose::at(Vec3::new(0.0, 0.0, -6.0));

        assert!(vision.can_see_player(&agent(), &near, false, &OpenField));
        assert_eq!(vision.evaluate(&agent(), &far, false, &OpenField), Sighting::TooFar);
    }

    #[test]
    fn test_hiding_player_never_visible() {
        let vision = service(50.0);
        for z in [-0.5, -2.0, -10.0] {
            let player = Pose::at(Vec3::new(0.0, 0.0, z));
            assert_eq!(vision.evaluate(&agent(), &player, true, &OpenField), Sighting::PlayerHidden);
        }
    }

    #[test]
    fn test_outside_half_angle() {
        let vision = service(10.0);
        // 90° конус → половина 45°. Игрок строго сбоку (90°)
        let side = Pose::at(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(vision.evaluate(&agent(), &side, false, &OpenField), Sighting::OutsideCone);

        // ~30° от forward — внутри
        let slight = Pose::at(Vec3::new(1.0, 0.0, -2.0));
        assert!(vision.can_see_player(&agent(), &slight, false, &OpenField));
    }

    #[test]
    fn test_obstruction_respects_layer_filter() {
        let vision = service(10.0);
        let player = Pose::at(Vec3::new(0.0, 0.0, -3.0));

        let wall = Wall { layer: Group::GROUP_1 };
        assert_eq!(vision.evaluate(&agent(), &player, false, &wall), Sighting::Obstructed);

        // Стена на другом слое — не мешает
        let glass = Wall { layer: Group::GROUP_5 };
        assert!(vision.can_see_player(&agent(), &player, false, &glass));
    }
}
