//! Catch sequence — scripted поимка игрока
//!
//! Фазы идут строго по порядку, каждая — одно ожидание (`Wait`).
//! Entry actions фазы выполняются при входе, exit actions — при выходе.
//! Прервать сцену нельзя: controller просто тикает её до `CatchStatus::Finished`.
//!
//! Отсутствующие ссылки (anchor, respawn, overlay, health) → warning и шаг пропускается.

pub mod overlay;
pub mod sequencer;


use bevy::prelude::*;

pub use overlay::OverlayEnvelope;
pub use sequencer::{StepClock, Wait};

use crate::ai::{AnimationParams, CatchTimings};
use crate::components::{LevelLayout, Pose};
use crate::world::{AgentContext, ScreenOverlay, SoundCue};

/// Фазы сцены поимки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CatchPhase {
    /// Ввод и UI заморожены, ждём один кадр пока transform'ы осядут
    Settle,
    /// Игрок на anchor, агент бьёт
    Attack,
    /// Blood flash + падение игрока
    Fall,
    PostFall,
    /// Экран темнеет ("глаза закрываются")
    EyesClosing,
    BlackHold,
    /// Ждём анимацию урона
    Damage,
    /// Игрок на respawn, аниматор игрока выключен
    Respawn,
    PostRespawnHold,
    EyesOpening,
    Done,
}

impl CatchPhase {
    pub fn next(self) -> Self {
        match self {
            CatchPhase::Settle => CatchPhase::Attack,
            CatchPhase::Attack => CatchPhase::Fall,
            CatchPhase::Fall => CatchPhase::PostFall,
            CatchPhase::PostFall => CatchPhase::EyesClosing,
            CatchPhase::EyesClosing => CatchPhase::BlackHold,
            CatchPhase::BlackHold => CatchPhase::Damage,
            CatchPhase::Damage => CatchPhase::Respawn,
            CatchPhase::Respawn => CatchPhase::PostRespawnHold,
            CatchPhase::PostRespawnHold => CatchPhase::EyesOpening,
            CatchPhase::EyesOpening | CatchPhase::Done => CatchPhase::Done,
        }
    }

    fn wait(self, timings: &CatchTimings) -> Wait {
        match self {
            CatchPhase::Settle => Wait::Frames(1),
            CatchPhase::Attack => Wait::Seconds(timings.hit_delay),
            CatchPhase::Fall => Wait::Seconds(timings.fall_animation_duration),
            CatchPhase::PostFall => Wait::Seconds(timings.post_fall_delay),
            CatchPhase::EyesClosing => Wait::Seconds(timings.eye_close_duration),
            CatchPhase::BlackHold => Wait::Seconds(timings.black_screen_hold),
            CatchPhase::Damage => Wait::UntilReady,
            CatchPhase::Respawn => Wait::Seconds(timings.player_animator_reenable_delay),
            CatchPhase::PostRespawnHold => Wait::Seconds(timings.post_respawn_hold),
            CatchPhase::EyesOpening => Wait::Seconds(timings.eye_open_duration),
            CatchPhase::Done => Wait::UntilReady,
        }
    }

    /// Игрок принудительно смотрит на агента (Attack..=EyesOpening)
    fn forces_look_at(self) -> bool {
        !matches!(self, CatchPhase::Settle | CatchPhase::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchStatus {
    Running,
    Finished,
}

/// Шаг, пропущенный из-за отсутствующей ссылки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SkippedStep {
    Player,
    Hud,
    CaptureSound,
    CatchAnchor,
    BloodOverlay,
    EyesOverlay,
    PlayerAnimator,
    Health,
    RespawnPoint,
}

/// CatchContext: всё, что живёт только пока идёт поимка
#[derive(Debug, Clone)]
pub struct CatchSequence {
    phase: CatchPhase,
    clock: StepClock,
    timings: CatchTimings,
    params: AnimationParams,
    catch_anchor: Option<Pose>,
    respawn_point: Option<Pose>,
    blood: Option<OverlayEnvelope>,
    eyes: Option<OverlayEnvelope>,
    /// Время с начала сцены (без кадра старта)
    elapsed: f32,
    skipped: Vec<SkippedStep>,
}

impl CatchSequence {
    /// Старт сцены: фазы 1-2 (freeze ввода/UI, звук) выполняются сразу
    pub fn start(
        layout: &LevelLayout,
        timings: CatchTimings,
        params: AnimationParams,
        ctx: &mut AgentContext,
    ) -> Self {
        let mut sequence = Self {
            phase: CatchPhase::Settle,
            clock: StepClock::default(),
            timings,
            params,
            catch_anchor: layout.catch_anchor,
            respawn_point: layout.respawn_point,
            blood: None,
            eyes: None,
            elapsed: 0.0,
            skipped: Vec::new(),
        };

        match ctx.player.as_deref_mut() {
            Some(player) => player.set_movement_enabled(false),
            None => sequence.skip(SkippedStep::Player),
        }

        match ctx.hud.as_deref_mut() {
            Some(hud) => {
                hud.set_main_ui_visible(false);
                if !hud.play_sound(SoundCue::Capture) {
                    sequence.skip(SkippedStep::CaptureSound);
                }
            }
            None => sequence.skip(SkippedStep::Hud),
        }

        crate::log("💀 Catch sequence started (player frozen)");
        sequence
    }

    pub fn phase(&self) -> CatchPhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn skipped_steps(&self) -> &[SkippedStep] {
        &self.skipped
    }

    pub fn is_finished(&self) -> bool {
        self.phase == CatchPhase::Done
    }

    /// Текущая alpha overlay (None — overlay не активен)
    pub fn overlay_alpha(&self, overlay: ScreenOverlay) -> Option<f32> {
        let envelope = match overlay {
            ScreenOverlay::BloodFlash => self.blood.as_ref(),
            ScreenOverlay::EyesClosed => self.eyes.as_ref(),
        };
        envelope.map(OverlayEnvelope::alpha)
    }

    /// Один кадр сцены
    pub fn tick(&mut self, delta: f32, ctx: &mut AgentContext) -> CatchStatus {
        if self.is_finished() {
            return CatchStatus::Finished;
        }

        self.elapsed += delta;
        self.clock.advance(delta);

        // Несколько фаз могут закончиться в одном кадре (большой delta / нулевые тайминги)
        loop {
            let ready = self.is_step_ready(ctx);
            let Some(carry) = self.clock.poll(self.phase.wait(&self.timings), ready) else {
                break;
            };

            self.exit_phase(ctx);
            self.phase = self.phase.next();
            self.clock.restart(carry);

            if self.phase == CatchPhase::Done {
                crate::log(&format!("💀 Catch sequence finished ({:.2}s)", self.elapsed));
                return CatchStatus::Finished;
            }

            crate::log(&format!("💀 Catch phase → {:?}", self.phase));
            self.enter_phase(ctx);
        }

        self.tick_overlays(delta, ctx);

        if self.phase.forces_look_at() {
            let agent_position = ctx.nav.position();
            if let Some(player) = ctx.player.as_deref_mut() {
                player.face_towards(agent_position);
            }
        }

        CatchStatus::Running
    }

    fn is_step_ready(&self, ctx: &AgentContext) -> bool {
        match self.phase {
            CatchPhase::Damage => ctx
                .health
                .as_deref()
                .map_or(true, |health| !health.is_damage_in_progress()),
            _ => true,
        }
    }

    fn enter_phase(&mut self, ctx: &mut AgentContext) {
        match self.phase {
            CatchPhase::Attack => {
                match (self.catch_anchor, ctx.player.as_deref_mut()) {
                    (Some(anchor), Some(player)) => player.teleport(anchor),
                    (None, _) => self.skip(SkippedStep::CatchAnchor),
                    (Some(_), None) => self.skip(SkippedStep::Player),
                }
                ctx.set_anim_trigger(&self.params.attack);
            }
            CatchPhase::Fall => {
                let blood = OverlayEnvelope::flash(
                    ScreenOverlay::BloodFlash,
                    self.timings.blood_flash_alpha,
                    self.timings.blood_flash_fade_in,
                    self.timings.blood_flash_hold,
                    self.timings.blood_flash_fade_out,
                );
                self.blood = Some(blood);

                let fall = self.params.player_fall.clone();
                match player_animator(ctx) {
                    Some(animator) => animator.set_trigger(&fall),
                    None => self.skip(SkippedStep::PlayerAnimator),
                }
            }
            CatchPhase::EyesClosing => {
                self.eyes = Some(OverlayEnvelope::fade(
                    ScreenOverlay::EyesClosed,
                    0.0,
                    1.0,
                    self.timings.eye_close_duration,
                ));
            }
            CatchPhase::Damage => match ctx.health.as_deref_mut() {
                Some(health) => health.begin_damage(self.timings.damage_amount),
                None => self.skip(SkippedStep::Health),
            },
            CatchPhase::Respawn => {
                match (self.respawn_point, ctx.player.as_deref_mut()) {
                    (Some(respawn), Some(player)) => player.teleport(respawn),
                    (None, _) => self.skip(SkippedStep::RespawnPoint),
                    (Some(_), None) => self.skip(SkippedStep::Player),
                }

                let idle = self.params.player_idle.clone();
                if let Some(animator) = player_animator(ctx) {
                    animator.set_trigger(&idle);
                    animator.set_enabled(false);
                }
            }
            CatchPhase::EyesOpening => {
                self.eyes = Some(OverlayEnvelope::fade(
                    ScreenOverlay::EyesClosed,
                    1.0,
                    0.0,
                    self.timings.eye_open_duration,
                ));
            }
            CatchPhase::Settle
            | CatchPhase::PostFall
            | CatchPhase::BlackHold
            | CatchPhase::PostRespawnHold
            | CatchPhase::Done => {}
        }
    }

    fn exit_phase(&mut self, ctx: &mut AgentContext) {
        match self.phase {
            CatchPhase::EyesClosing => {
                // Экран полностью чёрный → показываем сердечки
                if let Some(eyes) = self.eyes.as_mut() {
                    eyes.finish(ctx.hud.as_deref_mut());
                    if eyes.is_missing() {
                        self.skip(SkippedStep::EyesOverlay);
                    }
                }
                if let Some(health) = ctx.health.as_deref_mut() {
                    health.set_hearts_visible(true);
                }
            }
            CatchPhase::Respawn => {
                if let Some(animator) = player_animator(ctx) {
                    animator.set_enabled(true);
                }
            }
            CatchPhase::PostRespawnHold => {
                if let Some(health) = ctx.health.as_deref_mut() {
                    health.set_hearts_visible(false);
                }
                if let Some(player) = ctx.player.as_deref_mut() {
                    player.set_movement_enabled(true);
                }
                if let Some(hud) = ctx.hud.as_deref_mut() {
                    hud.set_main_ui_visible(true);
                }
            }
            CatchPhase::EyesOpening => {
                if let Some(eyes) = self.eyes.as_mut() {
                    eyes.finish(ctx.hud.as_deref_mut());
                }
            }
            _ => {}
        }
    }

    fn tick_overlays(&mut self, delta: f32, ctx: &mut AgentContext) {
        if let Some(blood) = self.blood.as_mut() {
            if !blood.is_finished() && !blood.is_missing() {
                blood.tick(delta, ctx.hud.as_deref_mut());
                if blood.is_missing() {
                    self.skip(SkippedStep::BloodOverlay);
                }
            }
        }

        if let Some(eyes) = self.eyes.as_mut() {
            if !eyes.is_finished() && !eyes.is_missing() {
                eyes.tick(delta, ctx.hud.as_deref_mut());
                if eyes.is_missing() {
                    self.skip(SkippedStep::EyesOverlay);
                }
            }
        }
    }

    fn skip(&mut self, step: SkippedStep) {
        if self.skipped.contains(&step) {
            return;
        }
        self.skipped.push(step);
        crate::log_warning(&format!("💀 Catch step skipped: {:?} unavailable", step));
    }
}

fn player_animator<'c>(ctx: &'c mut AgentContext) -> Option<&'c mut dyn crate::world::AnimationPort> {
    ctx.player.as_deref_mut().and_then(|player| player.animator())
}
