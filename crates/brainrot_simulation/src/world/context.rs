//! AgentContext — ссылки на коллабораторов на время одного вызова

use bevy::prelude::*;

use super::{AnimationPort, DoorDirectory, HealthPort, HudPort, PlayerPort};
use crate::components::Pose;
use crate::navigation::NavigationPort;
use crate::vision::ObstructionQuery;

/// Всё, до чего агент дотягивается за кадр
///
/// Обязательные ссылки — навигация и obstruction query.
/// Остальные опциональны: отсутствие проверяется при initialize (animator)
/// или деградирует в runtime (player, hud, health).
pub struct AgentContext<'a> {
    pub nav: &'a mut dyn NavigationPort,
    pub obstruction: &'a dyn ObstructionQuery,
    pub doors: &'a mut dyn DoorDirectory,
    pub animator: Option<&'a mut dyn AnimationPort>,
    pub player: Option<&'a mut dyn PlayerPort>,
    pub hud: Option<&'a mut dyn HudPort>,
    pub health: Option<&'a mut dyn HealthPort>,
}

impl<'a> AgentContext<'a> {
    pub fn player_pose(&self) -> Option<Pose> {
        self.player.as_deref().map(|player| player.pose())
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.player_pose().map(|pose| pose.position)
    }

    pub fn agent_pose(&self) -> Pose {
        Pose::new(self.nav.position(), self.nav.forward())
    }

    pub fn set_anim_bool(&mut self, param: &str, value: bool) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.set_bool(param, value);
        }
    }

    pub fn set_anim_trigger(&mut self, param: &str) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.set_trigger(param);
        }
    }
}
