//! Recording fakes: аниматор, игрок, HUD, здоровье
//!
//! Ничего не рисуют — только запоминают, что им сказали.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::components::{flat_direction, Pose};
use crate::world::{AnimationPort, HealthPort, HudPort, PlayerPort, ScreenOverlay, SoundCue};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordingAnimator {
    pub bools: HashMap<String, bool>,
    pub triggers: Vec<String>,
    pub enabled: bool,
}

impl Default for RecordingAnimator {
    fn default() -> Self {
        Self {
            bools: HashMap::new(),
            triggers: Vec::new(),
            enabled: true,
        }
    }
}

impl RecordingAnimator {
    pub fn bool(&self, param: &str) -> bool {
        self.bools.get(param).copied().unwrap_or(false)
    }

    pub fn trigger_count(&self, param: &str) -> usize {
        self.triggers.iter().filter(|t| t.as_str() == param).count()
    }
}

impl AnimationPort for RecordingAnimator {
    fn set_bool(&mut self, param: &str, value: bool) {
        self.bools.insert(param.to_string(), value);
    }

    fn set_trigger(&mut self, param: &str) {
        self.triggers.push(param.to_string());
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxPlayer {
    pub pose: Pose,
    pub movement_enabled: bool,
    pub teleports: Vec<Pose>,
    /// Сколько кадров игрока принудительно разворачивали
    pub forced_look_frames: u32,
    pub animator: Option<RecordingAnimator>,
}

impl SandboxPlayer {
    pub fn new(position: Vec3) -> Self {
        Self {
            pose: Pose::at(position),
            movement_enabled: true,
            teleports: Vec::new(),
            forced_look_frames: 0,
            animator: Some(RecordingAnimator::default()),
        }
    }
}

impl PlayerPort for SandboxPlayer {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    fn teleport(&mut self, pose: Pose) {
        self.pose = pose;
        self.teleports.push(pose);
    }

    fn face_towards(&mut self, target: Vec3) {
        self.forced_look_frames += 1;
        if let Some(direction) = flat_direction(self.pose.position, target) {
            self.pose.forward = direction;
        }
    }

    fn animator(&mut self) -> Option<&mut dyn AnimationPort> {
        self.animator.as_mut().map(|animator| animator as &mut dyn AnimationPort)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxHud {
    pub main_ui_visible: bool,
    /// Назначенные overlay images
    pub available_overlays: HashSet<ScreenOverlay>,
    pub overlay_alpha: HashMap<ScreenOverlay, f32>,
    /// Максимальная alpha, которую overlay когда-либо получал
    pub overlay_peak: HashMap<ScreenOverlay, f32>,
    pub capture_sound_assigned: bool,
    pub sounds: Vec<SoundCue>,
}

impl Default for SandboxHud {
    fn default() -> Self {
        Self {
            main_ui_visible: true,
            available_overlays: [ScreenOverlay::BloodFlash, ScreenOverlay::EyesClosed].into_iter().collect(),
            overlay_alpha: HashMap::new(),
            overlay_peak: HashMap::new(),
            capture_sound_assigned: true,
            sounds: Vec::new(),
        }
    }
}

impl SandboxHud {
    pub fn alpha(&self, overlay: ScreenOverlay) -> f32 {
        self.overlay_alpha.get(&overlay).copied().unwrap_or(0.0)
    }

    pub fn peak(&self, overlay: ScreenOverlay) -> f32 {
        self.overlay_peak.get(&overlay).copied().unwrap_or(0.0)
    }
}

impl HudPort for SandboxHud {
    fn set_main_ui_visible(&mut self, visible: bool) {
        self.main_ui_visible = visible;
    }

    fn set_overlay_alpha(&mut self, overlay: ScreenOverlay, alpha: f32) -> bool {
        if !self.available_overlays.contains(&overlay) {
            return false;
        }
        self.overlay_alpha.insert(overlay, alpha);
        let peak = self.overlay_peak.entry(overlay).or_insert(0.0);
        *peak = peak.max(alpha);
        true
    }

    fn play_sound(&mut self, cue: SoundCue) -> bool {
        if !self.capture_sound_assigned {
            return false;
        }
        self.sounds.push(cue);
        true
    }
}

/// Сердечки с анимацией урона
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxHealth {
    pub current: u32,
    pub max: u32,
    pub hearts_visible: bool,
    /// Длительность анимации потери сердца (секунды)
    pub damage_animation: f32,
    damage_timer: f32,
}

impl SandboxHealth {
    pub fn new(max: u32, damage_animation: f32) -> Self {
        Self {
            current: max,
            max,
            hearts_visible: false,
            damage_animation,
            damage_timer: 0.0,
        }
    }

    pub fn step(&mut self, delta: f32) {
        self.damage_timer = (self.damage_timer - delta).max(0.0);
    }
}

impl HealthPort for SandboxHealth {
    fn set_hearts_visible(&mut self, visible: bool) {
        self.hearts_visible = visible;
    }

    fn begin_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
        self.damage_timer = self.damage_animation;
    }

    fn is_damage_in_progress(&self) -> bool {
        self.damage_timer > 0.0
    }

    fn current_hearts(&self) -> u32 {
        self.current
    }
}
