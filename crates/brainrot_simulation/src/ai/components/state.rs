//! FSM состояния агента и причины погони

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Состояние агента (ровно одно активно)
///
/// Меняется только через `SahurController::switch_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AgentState {
    /// До успешного initialize (или после ошибки конфигурации)
    #[default]
    Initializing,
    Idle,
    Patrolling,
    OpeningDoor,
    ChasingPlayer,
    /// Скриптовое действие: catch-сцена или ожидание у укрытия
    ActionInProgress,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Initializing => "Initializing",
            AgentState::Idle => "Idle",
            AgentState::Patrolling => "Patrolling",
            AgentState::OpeningDoor => "OpeningDoor",
            AgentState::ChasingPlayer => "ChasingPlayer",
            AgentState::ActionInProgress => "ActionInProgress",
        }
    }

    /// Ожидается ли движение (для stuck detection)
    pub fn expects_motion(&self) -> bool {
        matches!(self, AgentState::Patrolling | AgentState::ChasingPlayer)
    }
}

/// Почему началась погоня — определяет скорость, break-off дистанцию и cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ChaseReason {
    VisionDetected,
    HazardTriggered,
    WorldEvent,
}

impl ChaseReason {
    /// Чем больше — тем сильнее (WorldEvent перебивает всё)
    pub fn priority(&self) -> u8 {
        match self {
            ChaseReason::VisionDetected => 0,
            ChaseReason::HazardTriggered => 1,
            ChaseReason::WorldEvent => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChaseReason::VisionDetected => "vision",
            ChaseReason::HazardTriggered => "hazard",
            ChaseReason::WorldEvent => "world-event",
        }
    }
}

/// Что именно выполняется в ActionInProgress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ActionKind {
    /// Catch-сцена (не прерывается)
    Capture,
    /// Ждём у укрытия, где спрятался игрок
    WaitAtHidingSpot,
}
