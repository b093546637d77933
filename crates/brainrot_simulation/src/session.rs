//! Session coordinator — прогресс текущей игровой сессии
//!
//! Владеет тем, что раньше жило в глобальных счётчиках UI:
//! сколько существ сожжено, сколько раз игрока поймали, стоит ли он в грязи.

use bevy::prelude::*;

use crate::ai::{AgentSignalEvent, SahurSignal, WorldEvent};

#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SessionCoordinator {
    pub burned_creatures: u32,
    /// Сколько существ нужно сжечь для победы
    pub required_burns: u32,
    pub times_caught: u32,
    pub player_in_hazard: bool,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl SessionCoordinator {
    pub fn new(required_burns: u32) -> Self {
        Self {
            burned_creatures: 0,
            required_burns,
            times_caught: 0,
            player_in_hazard: false,
        }
    }

    pub fn all_creatures_burned(&self) -> bool {
        self.burned_creatures >= self.required_burns
    }

    pub fn record_world_event(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::CreatureBurned => {
                self.burned_creatures += 1;
                crate::log_info(&format!(
                    "🔥 Creatures burned: {}/{}",
                    self.burned_creatures, self.required_burns
                ));
            }
            WorldEvent::PlayerEnteredHazard => self.player_in_hazard = true,
            WorldEvent::PlayerExitedHazard => self.player_in_hazard = false,
            WorldEvent::PlayerEnteredHidingSpot { .. } | WorldEvent::PlayerExitedHidingSpot => {}
        }
    }

    pub fn record_signal(&mut self, signal: &SahurSignal) {
        if let SahurSignal::PlayerCaught = signal {
            self.times_caught += 1;
        }
    }
}

/// Система: обновление SessionCoordinator из событий мира и сигналов агентов
pub fn track_session_progress(
    mut session: ResMut<SessionCoordinator>,
    mut world_events: EventReader<WorldEvent>,
    mut signals: EventReader<AgentSignalEvent>,
) {
    for event in world_events.read() {
        session.record_world_event(event);
    }
    for event in signals.read() {
        session.record_signal(&event.signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burn_progress_completes() {
        let mut session = SessionCoordinator::new(2);
        session.record_world_event(&WorldEvent::CreatureBurned);
        assert!(!session.all_creatures_burned());
        session.record_world_event(&WorldEvent::CreatureBurned);
        assert!(session.all_creatures_burned());
    }

    #[test]
    fn test_hazard_flag_and_catches() {
        let mut session = SessionCoordinator::default();
        session.record_world_event(&WorldEvent::PlayerEnteredHazard);
        assert!(session.player_in_hazard);
        session.record_world_event(&WorldEvent::PlayerExitedHazard);
        assert!(!session.player_in_hazard);

        session.record_signal(&SahurSignal::PlayerCaught);
        session.record_signal(&SahurSignal::CatchSequenceFinished);
        assert_eq!(session.times_caught, 1);
    }
}
