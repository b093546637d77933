//! Мини-sequencer: шаг = ожидание, проверяемое раз в кадр
//!
//! Вместо корутин — явный clock, который копит delta и отдаёт остаток
//! (carry) следующему шагу, чтобы суммарная длительность не плыла.

use bevy::prelude::*;

/// Условие завершения шага
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum Wait {
    /// N полных кадров, их delta переносится в следующий шаг
    Frames(u32),
    Seconds(f32),
    /// Пока внешнее условие не выполнено (например, анимация урона).
    /// Время ожидания не переносится — только carry, с которым шаг начался
    UntilReady,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct StepClock {
    elapsed: f32,
    frames: u32,
    carried: f32,
}

impl StepClock {
    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta;
        self.frames += 1;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Some(carry) — шаг завершён, carry уходит в следующий
    pub fn poll(&self, wait: Wait, ready: bool) -> Option<f32> {
        match wait {
            Wait::Frames(count) => (self.frames >= count).then_some(self.elapsed),
            Wait::Seconds(duration) => (self.elapsed >= duration).then(|| self.elapsed - duration),
            Wait::UntilReady => ready.then_some(self.carried),
        }
    }

    pub fn restart(&mut self, carry: f32) {
        self.elapsed = carry;
        self.carried = carry;
        self.frames = 0;
    }
}
