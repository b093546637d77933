//! Full-screen overlay fades (blood flash, eyes closed)
//!
//! Piecewise-linear alpha envelope, пишется в HUD каждый кадр.
//! Если overlay image не назначен — один warning, дальше envelope молчит.

use crate::world::{HudPort, ScreenOverlay};

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEnvelope {
    pub overlay: ScreenOverlay,
    /// (время, alpha), время по возрастанию
    keys: Vec<(f32, f32)>,
    elapsed: f32,
    alpha: f32,
    missing: bool,
}

impl OverlayEnvelope {
    pub fn new(overlay: ScreenOverlay, keys: Vec<(f32, f32)>) -> Self {
        let alpha = keys.first().map(|(_, a)| *a).unwrap_or(0.0);
        Self {
            overlay,
            keys,
            elapsed: 0.0,
            alpha,
            missing: false,
        }
    }

    /// Линейный fade from → to
    pub fn fade(overlay: ScreenOverlay, from: f32, to: f32, duration: f32) -> Self {
        Self::new(overlay, vec![(0.0, from), (duration.max(0.0), to)])
    }

    /// fade-in → hold → fade-out
    pub fn flash(overlay: ScreenOverlay, peak: f32, fade_in: f32, hold: f32, fade_out: f32) -> Self {
        Self::new(
            overlay,
            vec![
                (0.0, 0.0),
                (fade_in, peak),
                (fade_in + hold, peak),
                (fade_in + hold + fade_out, 0.0),
            ],
        )
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn duration(&self) -> f32 {
        self.keys.last().map(|(t, _)| *t).unwrap_or(0.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration()
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn sample(&self, time: f32) -> f32 {
        let Some(&(first_t, first_a)) = self.keys.first() else {
            return 0.0;
        };
        if time <= first_t {
            return first_a;
        }
        if let Some(&(last_t, last_a)) = self.keys.last() {
            if time >= last_t {
                return last_a;
            }
        }

        for pair in self.keys.windows(2) {
            let (t0, a0) = pair[0];
            let (t1, a1) = pair[1];
            if time <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return a1;
                }
                return a0 + (a1 - a0) * ((time - t0) / span);
            }
        }

        self.keys.last().map(|(_, a)| *a).unwrap_or(0.0)
    }

    /// Продвинуть и записать alpha в HUD
    pub fn tick(&mut self, delta: f32, hud: Option<&mut (dyn HudPort + '_)>) {
        self.elapsed = (self.elapsed + delta).min(self.duration());
        self.alpha = self.sample(self.elapsed);
        self.write(hud);
    }

    /// Дожать до конца envelope (финальная alpha)
    pub fn finish(&mut self, hud: Option<&mut (dyn HudPort + '_)>) {
        self.elapsed = self.duration();
        self.alpha = self.sample(self.elapsed);
        self.write(hud);
    }

    fn write(&mut self, hud: Option<&mut (dyn HudPort + '_)>) {
        if self.missing {
            return;
        }

        let applied = hud.is_some_and(|hud| hud.set_overlay_alpha(self.overlay, self.alpha));
        if !applied {
            self.missing = true;
            crate::log_warning(&format!("🖼️ Overlay {:?} not available, skipping fade", self.overlay));
        }
    }
}
