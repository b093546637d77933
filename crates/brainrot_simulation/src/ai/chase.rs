//! ChaseTrigger — кто и почему начинает/прекращает погоню
//!
//! Три независимых источника, у каждого свой cooldown:
//! - Vision: видим игрока, cooldown не активен, игрок не прячется
//! - Hazard: игрок влез в грязь (event), агент не занят, cooldown не активен
//! - WorldEvent: сожгли существо (event) — безусловно, break-off по дистанции нет
//!
//! Активна максимум одна причина. Более приоритетная перебивает текущую.

use bevy::prelude::*;

use super::{ChaseReason, SahurConfig};

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct ChaseTrigger {
    active: Option<ChaseReason>,
    vision_cooldown: f32,
    hazard_cooldown: f32,
}

impl ChaseTrigger {
    pub fn active(&self) -> Option<ChaseReason> {
        self.active
    }

    pub fn is_chasing(&self) -> bool {
        self.active.is_some()
    }

    pub fn vision_cooldown(&self) -> f32 {
        self.vision_cooldown
    }

    pub fn hazard_cooldown(&self) -> f32 {
        self.hazard_cooldown
    }

    pub fn cooldown(&self, reason: ChaseReason) -> f32 {
        match reason {
            ChaseReason::VisionDetected => self.vision_cooldown,
            ChaseReason::HazardTriggered => self.hazard_cooldown,
            ChaseReason::WorldEvent => 0.0,
        }
    }

    /// Cooldowns тикают каждый кадр независимо от состояния
    pub fn tick(&mut self, delta: f32) {
        self.vision_cooldown = (self.vision_cooldown - delta).max(0.0);
        self.hazard_cooldown = (self.hazard_cooldown - delta).max(0.0);
    }

    pub fn can_start_vision(&self, sees_player: bool, player_hiding: bool) -> bool {
        sees_player && !player_hiding && self.vision_cooldown <= 0.0 && self.active.is_none()
    }

    pub fn can_start_hazard(&self, busy: bool, player_hiding: bool) -> bool {
        !busy
            && !player_hiding
            && self.hazard_cooldown <= 0.0
            && self.outranks_active(ChaseReason::HazardTriggered)
    }

    /// WorldEvent стартует всегда (кроме уже идущей WorldEvent погони)
    pub fn can_start_world_event(&self) -> bool {
        self.active != Some(ChaseReason::WorldEvent)
    }

    fn outranks_active(&self, reason: ChaseReason) -> bool {
        self.active
            .map_or(true, |current| reason.priority() > current.priority())
    }

    /// Начать погоню. Возвращает перебитую причину (если была)
    ///
    /// Перебитая причина не взводит свой cooldown — она не "потеряла" игрока.
    pub fn begin(&mut self, reason: ChaseReason) -> Option<ChaseReason> {
        let previous = self.active.replace(reason);

        if let Some(previous) = previous.filter(|p| *p != reason) {
            self.clear_cooldown(previous);
        }
        self.clear_cooldown(reason);

        previous
    }

    pub fn break_off_distance(&self, config: &SahurConfig) -> Option<f32> {
        self.active
            .and_then(|reason| config.chase_tuning(reason).break_off_distance)
    }

    pub fn should_break_off(&self, distance: f32, config: &SahurConfig) -> bool {
        self.break_off_distance(config)
            .is_some_and(|limit| distance > limit)
    }

    /// Бросить погоню с взведением cooldown причины. Возвращает (причина, cooldown)
    pub fn break_off(&mut self, config: &SahurConfig) -> Option<(ChaseReason, f32)> {
        let reason = self.active.take()?;
        let cooldown = config.chase_tuning(reason).cooldown;

        match reason {
            ChaseReason::VisionDetected => self.vision_cooldown = cooldown,
            ChaseReason::HazardTriggered => self.hazard_cooldown = cooldown,
            ChaseReason::WorldEvent => {}
        }

        Some((reason, cooldown))
    }

    /// Закончить погоню без cooldown (поимка, отказ у укрытия, потеря игрока)
    pub fn end(&mut self) -> Option<ChaseReason> {
        self.active.take()
    }

    fn clear_cooldown(&mut self, reason: ChaseReason) {
        match reason {
            ChaseReason::VisionDetected => self.vision_cooldown = 0.0,
            ChaseReason::HazardTriggered => self.hazard_cooldown = 0.0,
            ChaseReason::WorldEvent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_break_off_arms_cooldown() {
        let config = SahurConfig::default();
        let mut trigger = ChaseTrigger::default();

        assert!(trigger.can_start_vision(true, false));
        trigger.begin(ChaseReason::VisionDetected);

        assert!(!trigger.should_break_off(24.0, &config));
        assert!(trigger.should_break_off(26.0, &config));

        let (reason, cooldown) = trigger.break_off(&config).expect("active chase");
        assert_eq!(reason, ChaseReason::VisionDetected);
        assert_eq!(cooldown, config.vision_chase.cooldown);

        // Повторное обнаружение внутри cooldown — не стартует
        assert!(!trigger.can_start_vision(true, false));
        trigger.tick(config.vision_chase.cooldown + 0.01);
        assert!(trigger.can_start_vision(true, false));
    }

    #[test]
    fn test_world_event_never_breaks_off_by_distance() {
        let config = SahurConfig::default();
        let mut trigger = ChaseTrigger::default();
        trigger.begin(ChaseReason::WorldEvent);

        for distance in [10.0, 100.0, 10_000.0] {
            assert!(!trigger.should_break_off(distance, &config));
        }
    }

    #[test]
    fn test_world_event_overrides_vision_and_hazard_cannot_override_world_event() {
        let mut trigger = ChaseTrigger::default();
        trigger.begin(ChaseReason::VisionDetected);

        assert!(trigger.can_start_hazard(false, false));
        assert!(trigger.can_start_world_event());

        let previous = trigger.begin(ChaseReason::WorldEvent);
        assert_eq!(previous, Some(ChaseReason::VisionDetected));
        assert_eq!(trigger.active(), Some(ChaseReason::WorldEvent));

        assert!(!trigger.can_start_hazard(false, false));
        assert!(!trigger.can_start_world_event());
    }

    #[test]
    fn test_hazard_blocked_when_busy_hiding_or_cooling_down() {
        let config = SahurConfig::default();
        let mut trigger = ChaseTrigger::default();

        assert!(!trigger.can_start_hazard(true, false));
        assert!(!trigger.can_start_hazard(false, true));

        trigger.begin(ChaseReason::HazardTriggered);
        trigger.break_off(&config);
        assert!(trigger.hazard_cooldown() > 0.0);
        assert!(!trigger.can_start_hazard(false, false));
    }

    #[test]
    fn test_override_clears_previous_cooldown_bookkeeping() {
        let config = SahurConfig::default();
        let mut trigger = ChaseTrigger::default();

        trigger.begin(ChaseReason::HazardTriggered);
        trigger.break_off(&config);
        assert!(trigger.hazard_cooldown() > 0.0);

        trigger.begin(ChaseReason::WorldEvent);
        trigger.end();
        assert_eq!(trigger.vision_cooldown(), 0.0);
        // WorldEvent не трогает чужой cooldown, только при override активной причины
        assert!(trigger.hazard_cooldown() > 0.0);
    }
}
