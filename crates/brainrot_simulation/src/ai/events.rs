//! AI Events — world event bus (вход) и сигналы агента (выход)
//!
//! Мир → WorldEvent → подписанные SahurController'ы (fire-and-forget, без ack)
//! SahurController → SahurSignal → AgentSignalEvent (session, UI, аналитика)

use bevy::prelude::*;

use super::{AgentState, ChaseReason};
use crate::navigation::RecoveryStage;

/// События мира, на которые реагирует агент
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    /// Игрок сжёг существо (BabySahur) — агент бежит за игроком без break-off
    CreatureBurned,
    /// Игрок вошёл в ловушку (грязь)
    PlayerEnteredHazard,
    PlayerExitedHazard,
    /// Игрок залез в укрытие
    PlayerEnteredHidingSpot {
        /// Позиция укрытия
        spot: Vec3,
    },
    PlayerExitedHidingSpot,
}

/// Что агент сообщает наружу
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SahurSignal {
    StateChanged { from: AgentState, to: AgentState },
    ChaseStarted { reason: ChaseReason },
    ChaseEnded {
        reason: ChaseReason,
        /// Cooldown, взведённый при break-off (0 — без cooldown)
        cooldown: f32,
    },
    PlayerCaught,
    CatchSequenceFinished,
    StuckRecovery {
        /// None — все стадии провалились
        stage: Option<RecoveryStage>,
    },
    /// Агент дождался у укрытия и ушёл
    HidingSpotAbandoned,
}

/// SahurSignal + entity агента (Bevy event)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AgentSignalEvent {
    pub agent: Entity,
    pub signal: SahurSignal,
}
