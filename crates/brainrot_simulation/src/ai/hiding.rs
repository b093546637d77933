//! Hiding interaction — реакция на укрытия (шкафы)
//!
//! Игрок залез в укрытие:
//! - если агент гонится или стоит ближе `awareness_radius` — он знает где (known_by_seeker),
//!   навигация перенаправляется на укрытие
//! - по прибытии агент стоит `time_to_wait_at_spot` и сдаётся → Patrolling
//!
//! Игрок вылез: если агент целился в укрытие — продолжаем погоню (если она шла), иначе Idle.

use bevy::prelude::*;

use super::HidingTuning;

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct HidingState {
    pub is_player_hiding: bool,
    pub hiding_spot_location: Option<Vec3>,
    pub known_by_seeker: bool,
    pub has_reached_spot: bool,
    pub wait_timer: f32,
}

/// Что сделать после выхода игрока из укрытия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HidingExit {
    /// Агент в укрытие не целился — ничего не меняем
    Ignored,
    /// Агент целился и ещё преследует — продолжаем погоню за игроком
    ResumeChase,
    /// Агент целился, но погони нет — Idle
    ReturnToIdle,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct HidingInteraction {
    state: HidingState,
}

impl HidingInteraction {
    pub fn state(&self) -> &HidingState {
        &self.state
    }

    pub fn is_player_hiding(&self) -> bool {
        self.state.is_player_hiding
    }

    /// Укрытие, к которому агент должен идти (игрок внутри и агент знает)
    pub fn target(&self) -> Option<Vec3> {
        if self.state.is_player_hiding && self.state.known_by_seeker {
            self.state.hiding_spot_location
        } else {
            None
        }
    }

    pub fn has_reached_spot(&self) -> bool {
        self.state.has_reached_spot
    }

    /// Игрок залез в укрытие. true — агент знает где
    pub fn on_player_entered(
        &mut self,
        spot: Vec3,
        agent_position: Vec3,
        chasing: bool,
        tuning: &HidingTuning,
    ) -> bool {
        let within_awareness = agent_position.distance(spot) <= tuning.awareness_radius;

        self.state = HidingState {
            is_player_hiding: true,
            hiding_spot_location: Some(spot),
            known_by_seeker: chasing || within_awareness,
            has_reached_spot: false,
            wait_timer: 0.0,
        };

        self.state.known_by_seeker
    }

    /// Игрок вылез
    pub fn on_player_exited(&mut self, still_pursuing: bool) -> HidingExit {
        let was_targeted = self.state.known_by_seeker;
        self.state = HidingState::default();

        match (was_targeted, still_pursuing) {
            (false, _) => HidingExit::Ignored,
            (true, true) => HidingExit::ResumeChase,
            (true, false) => HidingExit::ReturnToIdle,
        }
    }

    /// Агент дошёл до укрытия — стартуем ожидание
    ///
    /// Повторное прибытие (новая погоня прямо у укрытия) таймер не перезапускает.
    pub fn mark_reached(&mut self, tuning: &HidingTuning) {
        if self.state.has_reached_spot {
            return;
        }
        self.state.has_reached_spot = true;
        self.state.wait_timer = tuning.time_to_wait_at_spot;
    }

    /// true — ждать больше нечего
    pub fn tick_wait(&mut self, delta: f32) -> bool {
        self.state.wait_timer = (self.state.wait_timer - delta).max(0.0);
        self.state.wait_timer <= 0.0
    }

    /// Агент сдался: забываем про укрытие (игрок всё ещё внутри)
    pub fn give_up(&mut self) {
        self.state.known_by_seeker = false;
        self.state.has_reached_spot = false;
        self.state.wait_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> HidingTuning {
        HidingTuning {
            awareness_radius: 5.0,
            time_to_wait_at_spot: 2.0,
        }
    }

    #[test]
    fn test_known_when_chasing_even_if_far() {
        let mut hiding = HidingInteraction::default();
        let known = hiding.on_player_entered(Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, true, &tuning());
        assert!(known);
        assert_eq!(hiding.target(), Some(Vec3::new(50.0, 0.0, 0.0)));
    }

    #[test]
    fn test_unknown_when_far_and_not_chasing() {
        let mut hiding = HidingInteraction::default();
        let known = hiding.on_player_entered(Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, false, &tuning());
        assert!(!known);
        assert!(hiding.is_player_hiding());
        assert_eq!(hiding.target(), None);
    }

    #[test]
    fn test_wait_timer_and_give_up() {
        let mut hiding = HidingInteraction::default();
        hiding.on_player_entered(Vec3::X, Vec3::ZERO, false, &tuning());
        hiding.mark_reached(&tuning());

        assert!(!hiding.tick_wait(1.0));
        assert!(hiding.tick_wait(1.0));

        hiding.give_up();
        assert!(hiding.is_player_hiding());
        assert_eq!(hiding.target(), None);
    }

    #[test]
    fn test_second_arrival_keeps_wait_running() {
        let mut hiding = HidingInteraction::default();
        hiding.on_player_entered(Vec3::X, Vec3::ZERO, true, &tuning());
        hiding.mark_reached(&tuning());
        assert!(!hiding.tick_wait(1.5));

        hiding.mark_reached(&tuning());
        assert!((hiding.state().wait_timer - 0.5).abs() < 1e-5);
        assert!(hiding.tick_wait(0.5));
    }

    #[test]
    fn test_exit_outcomes() {
        let mut hiding = HidingInteraction::default();
        hiding.on_player_entered(Vec3::X, Vec3::ZERO, true, &tuning());
        assert_eq!(hiding.on_player_exited(true), HidingExit::ResumeChase);

        hiding.on_player_entered(Vec3::X, Vec3::ZERO, false, &tuning());
        assert_eq!(hiding.on_player_exited(false), HidingExit::ReturnToIdle);

        hiding.on_player_entered(Vec3::splat(100.0), Vec3::ZERO, false, &tuning());
        assert_eq!(hiding.on_player_exited(false), HidingExit::Ignored);
        assert!(!hiding.is_player_hiding());
    }
}
