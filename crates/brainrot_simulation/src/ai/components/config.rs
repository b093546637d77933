//! Tuning агента (все числа — конфигурация, не поведенческий контракт)
//!
//! Загружается из TOML через `SahurConfig::from_toml_str`; отсутствующие поля
//! берутся из Default (serde(default) на каждой секции).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::navigation::MotionProfile;

/// Параметры одной причины погони
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ChaseTuning {
    /// Скорость погони (м/с)
    pub speed: f32,
    /// Дистанция, после которой агент бросает погоню. None — не бросает никогда
    pub break_off_distance: Option<f32>,
    /// Cooldown после break-off (секунды)
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolTuning {
    /// Сколько последних destination помнить
    pub max_recent_destinations: usize,
    /// Новая точка не ближе этого к недавним
    pub min_distance_to_recent_target: f32,
    /// Лимит path-запросов на один выбор точки
    pub max_destination_find_attempts: usize,
}

impl Default for PatrolTuning {
    fn default() -> Self {
        Self {
            max_recent_destinations: 3,
            min_distance_to_recent_target: 0.5,
            max_destination_find_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorTuning {
    pub interaction_distance: f32,
    pub open_wait_time: f32,
    /// Высота луча-пробы над ногами агента
    pub probe_height: f32,
}

impl Default for DoorTuning {
    fn default() -> Self {
        Self {
            interaction_distance: 1.5,
            open_wait_time: 1.2,
            probe_height: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionTuning {
    pub distance: f32,
    /// Полный угол конуса (градусы)
    pub angle: f32,
    pub eye_height: f32,
    /// Куда целимся лучом на теле игрока
    pub player_mid_height: f32,
}

impl Default for VisionTuning {
    fn default() -> Self {
        Self {
            distance: 10.0,
            angle: 110.0,
            eye_height: 1.6,
            player_mid_height: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct HidingTuning {
    /// Если игрок прячется ближе этого — агент знает где
    pub awareness_radius: f32,
    pub time_to_wait_at_spot: f32,
}

impl Default for HidingTuning {
    fn default() -> Self {
        Self {
            awareness_radius: 8.0,
            time_to_wait_at_spot: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StuckTuning {
    /// Ниже этой скорости (м/с) агент считается стоящим
    pub velocity_threshold: f32,
    pub max_path_pending_duration: f32,
    pub max_stuck_duration: f32,
    pub behind_player_distance: f32,
    pub escape_distance: f32,
    pub nudge_distance: f32,
    /// Радиус поиска navigable точки для teleport-кандидатов
    pub sample_radius: f32,
}

impl Default for StuckTuning {
    fn default() -> Self {
        Self {
            velocity_threshold: 0.1,
            max_path_pending_duration: 2.0,
            max_stuck_duration: 3.0,
            behind_player_distance: 1.5,
            escape_distance: 2.0,
            nudge_distance: 0.5,
            sample_radius: 1.5,
        }
    }
}

/// Тайминги catch-сцены (секунды)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchTimings {
    pub hit_delay: f32,
    pub blood_flash_fade_in: f32,
    pub blood_flash_hold: f32,
    pub blood_flash_fade_out: f32,
    /// Альфа blood overlay на пике
    pub blood_flash_alpha: f32,
    pub fall_animation_duration: f32,
    pub post_fall_delay: f32,
    pub eye_close_duration: f32,
    pub black_screen_hold: f32,
    pub player_animator_reenable_delay: f32,
    pub post_respawn_hold: f32,
    pub eye_open_duration: f32,
    pub damage_amount: u32,
}

impl Default for CatchTimings {
    fn default() -> Self {
        Self {
            hit_delay: 0.6,
            blood_flash_fade_in: 0.1,
            blood_flash_hold: 0.15,
            blood_flash_fade_out: 0.5,
            blood_flash_alpha: 0.8,
            fall_animation_duration: 1.5,
            post_fall_delay: 0.5,
            eye_close_duration: 1.0,
            black_screen_hold: 1.5,
            player_animator_reenable_delay: 0.3,
            post_respawn_hold: 1.0,
            eye_open_duration: 1.0,
            damage_amount: 1,
        }
    }
}

impl CatchTimings {
    /// Сумма всех timed-ожиданий сцены (без settle-кадра и ожидания урона)
    pub fn total_duration(&self) -> f32 {
        self.hit_delay
            + self.fall_animation_duration
            + self.post_fall_delay
            + self.eye_close_duration
            + self.black_screen_hold
            + self.player_animator_reenable_delay
            + self.post_respawn_hold
            + self.eye_open_duration
    }
}

/// Имена параметров аниматоров (агент + игрок)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub is_walking: String,
    pub is_running: String,
    pub attack: String,
    pub player_fall: String,
    pub player_idle: String,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            is_walking: "IsWalking".to_string(),
            is_running: "IsRunning".to_string(),
            attack: "Attack".to_string(),
            player_fall: "Fall".to_string(),
            player_idle: "Idle".to_string(),
        }
    }
}

/// Collision layers для raycast-фильтров (bits `Group`)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionLayers {
    /// Что перекрывает взгляд (стены, мебель, двери)
    pub obstruction: u32,
    /// Слой дверей для door-пробы
    pub doors: u32,
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self {
            obstruction: (Group::GROUP_1 | Group::GROUP_3).bits(),
            doors: Group::GROUP_3.bits(),
        }
    }
}

impl CollisionLayers {
    pub fn obstruction_group(&self) -> Group {
        Group::from_bits_truncate(self.obstruction)
    }

    pub fn door_group(&self) -> Group {
        Group::from_bits_truncate(self.doors)
    }
}

/// Полный tuning агента
#[derive(Component, Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SahurConfig {
    pub walk: MotionProfile,
    /// Поворот, ускорение и stopping distance погони. Скорость берётся из `*_chase.speed`
    pub chase: MotionProfile,
    pub idle_duration: f32,
    pub min_patrol_duration: f32,
    /// Дистанция поимки
    pub catch_distance: f32,
    pub patrol: PatrolTuning,
    pub door: DoorTuning,
    pub vision: VisionTuning,
    pub vision_chase: ChaseTuning,
    pub hazard_chase: ChaseTuning,
    pub world_event_chase: ChaseTuning,
    pub hiding: HidingTuning,
    pub stuck: StuckTuning,
    pub catch: CatchTimings,
    pub animation: AnimationParams,
    pub layers: CollisionLayers,
}

impl Default for SahurConfig {
    fn default() -> Self {
        Self {
            walk: MotionProfile::new(2.5, 240.0, 8.0, 0.5),
            chase: MotionProfile::new(4.5, 540.0, 16.0, 0.5),
            idle_duration: 3.0,
            min_patrol_duration: 5.0,
            catch_distance: 1.2,
            patrol: PatrolTuning::default(),
            door: DoorTuning::default(),
            vision: VisionTuning::default(),
            vision_chase: ChaseTuning {
                speed: 4.5,
                break_off_distance: Some(25.0),
                cooldown: 5.0,
            },
            hazard_chase: ChaseTuning {
                speed: 5.0,
                break_off_distance: Some(20.0),
                cooldown: 8.0,
            },
            world_event_chase: ChaseTuning {
                speed: 5.5,
                break_off_distance: None,
                cooldown: 0.0,
            },
            hiding: HidingTuning::default(),
            stuck: StuckTuning::default(),
            catch: CatchTimings::default(),
            animation: AnimationParams::default(),
            layers: CollisionLayers::default(),
        }
    }
}

impl SahurConfig {
    /// Парсинг + валидация TOML tuning файла
    pub fn from_toml_str(source: &str) -> Result<Self, SetupError> {
        let config: SahurConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        positive("walk.speed", self.walk.speed)?;
        non_negative("walk.stopping_distance", self.walk.stopping_distance)?;
        non_negative("idle_duration", self.idle_duration)?;
        non_negative("min_patrol_duration", self.min_patrol_duration)?;
        positive("catch_distance", self.catch_distance)?;
        positive("vision.distance", self.vision.distance)?;

        if !(self.vision.angle > 0.0 && self.vision.angle <= 360.0) {
            return Err(SetupError::invalid(
                "vision.angle",
                format!("must be in (0, 360], got {}", self.vision.angle),
            ));
        }

        if self.patrol.max_recent_destinations == 0 {
            return Err(SetupError::invalid("patrol.max_recent_destinations", "must be at least 1"));
        }
        if self.patrol.max_destination_find_attempts == 0 {
            return Err(SetupError::invalid("patrol.max_destination_find_attempts", "must be at least 1"));
        }

        for (field, tuning) in [
            ("vision_chase", &self.vision_chase),
            ("hazard_chase", &self.hazard_chase),
            ("world_event_chase", &self.world_event_chase),
        ] {
            positive(field, tuning.speed)?;
            non_negative(field, tuning.cooldown)?;
            if let Some(distance) = tuning.break_off_distance {
                positive(field, distance)?;
            }
        }

        if self.world_event_chase.break_off_distance.is_some() {
            return Err(SetupError::invalid(
                "world_event_chase.break_off_distance",
                "world-event chase only ends by capture",
            ));
        }

        positive("stuck.max_path_pending_duration", self.stuck.max_path_pending_duration)?;
        positive("stuck.max_stuck_duration", self.stuck.max_stuck_duration)?;

        Ok(())
    }

    pub fn chase_tuning(&self, reason: crate::ai::ChaseReason) -> &ChaseTuning {
        use crate::ai::ChaseReason;
        match reason {
            ChaseReason::VisionDetected => &self.vision_chase,
            ChaseReason::HazardTriggered => &self.hazard_chase,
            ChaseReason::WorldEvent => &self.world_event_chase,
        }
    }

    /// Chase профиль со скоростью конкретной причины
    pub fn chase_profile(&self, reason: crate::ai::ChaseReason) -> MotionProfile {
        self.chase.with_speed(self.chase_tuning(reason).speed)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SetupError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SetupError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SetupError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SetupError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}
