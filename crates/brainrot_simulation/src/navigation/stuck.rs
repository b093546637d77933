//! Stuck detection + staged recovery
//!
//! Агент "застрял" если:
//! - path_pending висит дольше `max_path_pending_duration` при ~нулевой скорости
//! - или скорость ~0, путь есть, но прогресса нет (или путь Partial/Invalid)
//!   дольше `max_stuck_duration`
//!
//! Recovery идёт по стадиям, до первого успеха:
//! 1. teleport за спину игрока (по направлению агент → игрок)
//! 2. первый валидный из escape-кандидатов (назад, влево, вправо, дальше за игроком)
//! 3. маленький nudge вперёд + snap на ближайшую navigable точку
//!
//! Провал всех стадий не фатален: таймеры перевзводятся, пробуем снова позже.

use bevy::prelude::*;

use super::{NavigationPort, PathStatus};
use crate::ai::StuckTuning;
use crate::components::flat_direction;

/// Таймеры застревания
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct StuckTracker {
    pub stuck_timer: f32,
    pub path_pending_timer: f32,
}

/// Почему сработала recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum StallKind {
    PathPending,
    NoProgress,
}

impl StuckTracker {
    pub fn reset(&mut self) {
        self.stuck_timer = 0.0;
        self.path_pending_timer = 0.0;
    }

    /// Накопить таймеры за кадр. Some — пора запускать recovery
    pub fn observe(&mut self, delta: f32, nav: &dyn NavigationPort, tuning: &StuckTuning) -> Option<StallKind> {
        let slow = nav.velocity().length() < tuning.velocity_threshold;

        if nav.path_pending() {
            self.stuck_timer = 0.0;
            if slow {
                self.path_pending_timer += delta;
            } else {
                self.path_pending_timer = 0.0;
            }

            if self.path_pending_timer >= tuning.max_path_pending_duration {
                return Some(StallKind::PathPending);
            }
            return None;
        }

        self.path_pending_timer = 0.0;

        let bad_path = matches!(nav.path_status(), PathStatus::Partial | PathStatus::Invalid);
        let not_arrived = nav.has_path() && nav.remaining_distance() > nav.stopping_distance();

        if slow && (not_arrived || bad_path) {
            self.stuck_timer += delta;
        } else {
            // Реальный прогресс (или стоим у цели)
            self.stuck_timer = 0.0;
        }

        if self.stuck_timer >= tuning.max_stuck_duration {
            Some(StallKind::NoProgress)
        } else {
            None
        }
    }
}

/// Escape направления стадии 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum EscapeDirection {
    Backward,
    Left,
    Right,
    FurtherBehindPlayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum RecoveryStage {
    BehindPlayer,
    Escape(EscapeDirection),
    NudgeAndSnap,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum RecoveryOutcome {
    Recovered { stage: RecoveryStage, position: Vec3 },
    Failed,
}

/// StuckTracker + staged recovery
#[derive(Debug, Clone, Default, Reflect)]
pub struct StuckRecovery {
    pub tracker: StuckTracker,
    /// Сколько раз recovery запускалась (успешно или нет)
    pub attempts: u32,
    pub failures: u32,
}

impl StuckRecovery {
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Вызывается каждый кадр пока агент должен двигаться.
    ///
    /// `player` — позиция игрока, если агент его преследует (включает стадию 1).
    pub fn tick(
        &mut self,
        delta: f32,
        nav: &mut dyn NavigationPort,
        player: Option<Vec3>,
        tuning: &StuckTuning,
    ) -> Option<RecoveryOutcome> {
        let stall = self.tracker.observe(delta, nav, tuning)?;

        self.attempts += 1;
        crate::log_warning(&format!(
            "🧱 Stuck detected ({:?}) at {:?}, attempt #{}",
            stall,
            nav.position(),
            self.attempts
        ));

        let outcome = recover(nav, player, tuning);

        // Перевзводим таймеры в любом случае
        self.tracker.reset();

        match outcome {
            RecoveryOutcome::Recovered { stage, position } => {
                crate::log_info(&format!("✅ Stuck recovery succeeded: {:?} → {:?}", stage, position));
            }
            RecoveryOutcome::Failed => {
                self.failures += 1;
                crate::log_warning("❌ Stuck recovery: all stages failed, will retry");
            }
        }

        Some(outcome)
    }
}

/// Стадии recovery (стоп на первом успехе)
pub fn recover(nav: &mut dyn NavigationPort, player: Option<Vec3>, tuning: &StuckTuning) -> RecoveryOutcome {
    let origin = nav.position();
    let forward = flat_direction(Vec3::ZERO, nav.forward()).unwrap_or(Vec3::NEG_Z);
    let right = forward.cross(Vec3::Y);
    let destination = nav.destination();

    let toward_player = player.map(|p| flat_direction(origin, p).unwrap_or(forward));

    // 1. За спину игрока
    if let (Some(player_pos), Some(dir)) = (player, toward_player) {
        let candidate = player_pos + dir * tuning.behind_player_distance;
        if let Some(position) = try_teleport(nav, candidate, tuning.sample_radius) {
            reissue(nav, destination);
            return RecoveryOutcome::Recovered {
                stage: RecoveryStage::BehindPlayer,
                position,
            };
        }
    }

    // 2. Escape кандидаты
    let mut candidates = vec![
        (EscapeDirection::Backward, origin - forward * tuning.escape_distance),
        (EscapeDirection::Left, origin - right * tuning.escape_distance),
        (EscapeDirection::Right, origin + right * tuning.escape_distance),
    ];
    if let (Some(player_pos), Some(dir)) = (player, toward_player) {
        candidates.push((
            EscapeDirection::FurtherBehindPlayer,
            player_pos + dir * (tuning.behind_player_distance + tuning.escape_distance),
        ));
    }

    for (direction, candidate) in candidates {
        if let Some(position) = try_teleport(nav, candidate, tuning.sample_radius) {
            reissue(nav, destination);
            return RecoveryOutcome::Recovered {
                stage: RecoveryStage::Escape(direction),
                position,
            };
        }
    }

    // 3. Nudge + snap
    let nudged = origin + forward * tuning.nudge_distance;
    if let Some(position) = try_teleport(nav, nudged, tuning.sample_radius * 2.0) {
        reissue(nav, destination);
        return RecoveryOutcome::Recovered {
            stage: RecoveryStage::NudgeAndSnap,
            position,
        };
    }

    RecoveryOutcome::Failed
}

fn try_teleport(nav: &mut dyn NavigationPort, candidate: Vec3, radius: f32) -> Option<Vec3> {
    let sampled = nav.sample_position(candidate, radius)?;
    if nav.teleport(sampled) {
        Some(sampled)
    } else {
        None
    }
}

fn reissue(nav: &mut dyn NavigationPort, destination: Option<Vec3>) {
    if let Some(target) = destination {
        nav.set_destination(target);
    }
}
