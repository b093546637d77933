//! Presentation коллабораторы: аниматоры, игрок, HUD, здоровье

use bevy::prelude::*;

use crate::components::Pose;

/// Boolean/trigger параметры аниматора
pub trait AnimationPort {
    fn set_bool(&mut self, param: &str, value: bool);
    fn set_trigger(&mut self, param: &str);
    fn set_enabled(&mut self, enabled: bool);
}

/// Игрок с точки зрения агента
pub trait PlayerPort {
    fn pose(&self) -> Pose;
    fn set_movement_enabled(&mut self, enabled: bool);
    fn teleport(&mut self, pose: Pose);
    /// Развернуть камеру/тело к точке (forced look-at)
    fn face_towards(&mut self, target: Vec3);
    fn animator(&mut self) -> Option<&mut dyn AnimationPort>;
}

/// Full-screen overlay слои
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ScreenOverlay {
    /// Красная вспышка удара
    BloodFlash,
    /// Чёрный экран "глаза закрыты"
    EyesClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SoundCue {
    Capture,
}

pub trait HudPort {
    fn set_main_ui_visible(&mut self, visible: bool);
    /// false — overlay image не назначен (шаг пропускается)
    fn set_overlay_alpha(&mut self, overlay: ScreenOverlay, alpha: f32) -> bool;
    /// false — звук не назначен
    fn play_sound(&mut self, cue: SoundCue) -> bool;
}

/// Сердечки игрока
///
/// Урон может анимироваться несколько кадров — вызывающий ждёт
/// пока `is_damage_in_progress` не станет false.
pub trait HealthPort {
    fn set_hearts_visible(&mut self, visible: bool);
    fn begin_damage(&mut self, amount: u32);
    fn is_damage_in_progress(&self) -> bool;
    fn current_hearts(&self) -> u32;
}
