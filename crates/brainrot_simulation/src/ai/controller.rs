//! SahurController — top-level FSM агента
//!
//! Один вызов `update(delta, ctx)` = один кадр:
//! 1. world events из inbox (подписка активна только между enable/disable)
//! 2. cooldowns погони
//! 3. логика активного состояния (perception → переходы → навигация)
//! 4. stuck recovery, если состояние ожидает движения
//!
//! Переходы только через `switch_to`: exit старого → enter нового.
//! Enter hook может вернуть follow-up состояние (например, Patrolling без
//! точки → Idle) — `switch_to` прокручивает цепочку циклом, без рекурсии.

use std::collections::VecDeque;

use bevy::prelude::*;

use super::{
    ActionKind, AgentState, ChaseReason, ChaseTrigger, HidingExit, HidingInteraction, PatrolPlanner,
    SahurConfig, SahurSignal, WorldEvent,
};
use crate::catch::{CatchSequence, CatchStatus};
use crate::components::{flat_distance, LevelLayout};
use crate::error::SetupError;
use crate::navigation::{MotionProfile, RecoveryOutcome, StuckRecovery};
use crate::vision::{Interactable, PerceptionService};
use crate::world::{AgentContext, DoorId};

/// Защита от зацикливания enter-hook цепочек
const MAX_CHAINED_TRANSITIONS: u32 = 4;

/// Текущее скриптовое действие (ActionInProgress)
#[derive(Debug)]
enum Action {
    Capture(CatchSequence),
    WaitAtHidingSpot,
}

impl Action {
    fn kind(&self) -> ActionKind {
        match self {
            Action::Capture(_) => ActionKind::Capture,
            Action::WaitAtHidingSpot => ActionKind::WaitAtHidingSpot,
        }
    }
}

/// FSM агента + все его подсистемы
#[derive(Debug)]
pub struct SahurController {
    config: SahurConfig,
    layout: LevelLayout,
    state: AgentState,

    enabled: bool,
    initialized: bool,
    subscribed: bool,
    setup_attempted: bool,
    setup_error: Option<String>,

    perception: PerceptionService,
    patrol: PatrolPlanner,
    chase: ChaseTrigger,
    hiding: HidingInteraction,
    stuck: StuckRecovery,

    // Per-state таймеры (сбрасываются enter hooks)
    idle_timer: f32,
    patrol_timer: f32,
    door_wait: f32,
    door_target: Option<DoorId>,
    pending_action: Option<ActionKind>,
    action: Option<Action>,

    last_known_player: Option<Vec3>,
    player_in_hazard: bool,

    inbox: VecDeque<WorldEvent>,
    signals: Vec<SahurSignal>,
    /// Сколько раз реально выполнялся enter hook
    transitions: u32,
}

impl SahurController {
    pub fn new(config: SahurConfig, layout: LevelLayout, seed: u64) -> Self {
        let perception = PerceptionService::from_config(&config);
        let patrol = PatrolPlanner::new(layout.patrol_points.clone(), config.patrol.clone(), seed);

        Self {
            config,
            layout,
            state: AgentState::Initializing,
            enabled: false,
            initialized: false,
            subscribed: false,
            setup_attempted: false,
            setup_error: None,
            perception,
            patrol,
            chase: ChaseTrigger::default(),
            hiding: HidingInteraction::default(),
            stuck: StuckRecovery::default(),
            idle_timer: 0.0,
            patrol_timer: 0.0,
            door_wait: 0.0,
            door_target: None,
            pending_action: None,
            action: None,
            last_known_player: None,
            player_in_hazard: false,
            inbox: VecDeque::new(),
            signals: Vec::new(),
            transitions: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Проверка обязательных ссылок и старт в Idle
    ///
    /// При ошибке агент остаётся в Initializing и выключен (update — no-op).
    pub fn initialize(&mut self, ctx: &mut AgentContext) -> Result<(), SetupError> {
        self.setup_attempted = true;

        if let Err(error) = self.check_setup(ctx) {
            crate::log_error(&format!("❌ Sahur setup failed: {} (agent disabled)", error));
            self.enabled = false;
            self.unsubscribe();
            self.setup_error = Some(error.to_string());
            ctx.nav.set_enabled(false);
            return Err(error);
        }

        if self.layout.catch_anchor.is_none() {
            crate::log_warning("⚠️ Sahur: no catch anchor, capture will not reposition the player");
        }
        if self.layout.respawn_point.is_none() {
            crate::log_warning("⚠️ Sahur: no respawn point, captured player stays in place");
        }
        if ctx.player.is_none() {
            crate::log_warning("⚠️ Sahur: player reference missing at startup");
        }

        self.setup_error = None;
        self.initialized = true;
        self.enabled = true;
        self.subscribe();
        ctx.nav.set_enabled(true);

        crate::log_info(&format!(
            "✅ Sahur initialized: {} patrol points",
            self.layout.patrol_points.len()
        ));
        self.switch_to(AgentState::Idle, ctx);
        Ok(())
    }

    fn check_setup(&self, ctx: &AgentContext) -> Result<(), SetupError> {
        self.config.validate()?;

        if self.layout.patrol_points.is_empty() {
            return Err(SetupError::NoPatrolPoints);
        }
        if ctx.animator.is_none() {
            return Err(SetupError::MissingAnimator);
        }
        if !ctx.nav.is_on_navmesh() {
            return Err(SetupError::AgentNotOnNavMesh);
        }
        Ok(())
    }

    /// Включить агента после disable (подписка восстанавливается)
    pub fn enable(&mut self) {
        if !self.initialized {
            crate::log_warning("⚠️ Sahur: enable() before successful initialize, ignored");
            return;
        }
        self.enabled = true;
        self.subscribe();
    }

    /// Выключить агента: отписка безусловна, очередь событий сбрасывается
    pub fn disable(&mut self) {
        self.enabled = false;
        self.unsubscribe();
    }

    fn subscribe(&mut self) {
        if !self.subscribed {
            self.subscribed = true;
            crate::log("🔌 Sahur subscribed to world events");
        }
    }

    fn unsubscribe(&mut self) {
        if self.subscribed {
            crate::log("🔌 Sahur unsubscribed from world events");
        }
        self.subscribed = false;
        self.inbox.clear();
    }

    /// Доставка события с шины. false — агент не подписан, событие отброшено
    pub fn on_world_event(&mut self, event: WorldEvent) -> bool {
        if !self.subscribed {
            return false;
        }
        self.inbox.push_back(event);
        true
    }

    pub fn drain_signals(&mut self) -> Vec<SahurSignal> {
        std::mem::take(&mut self.signals)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn config(&self) -> &SahurConfig {
        &self.config
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn setup_attempted(&self) -> bool {
        self.setup_attempted
    }

    pub fn setup_error(&self) -> Option<&str> {
        self.setup_error.as_deref()
    }

    pub fn chase(&self) -> &ChaseTrigger {
        &self.chase
    }

    pub fn chase_reason(&self) -> Option<ChaseReason> {
        self.chase.active()
    }

    pub fn hiding(&self) -> &HidingInteraction {
        &self.hiding
    }

    pub fn patrol(&self) -> &PatrolPlanner {
        &self.patrol
    }

    pub fn stuck(&self) -> &StuckRecovery {
        &self.stuck
    }

    pub fn idle_time_remaining(&self) -> f32 {
        self.idle_timer
    }

    /// Сколько агент уже патрулирует (min-patrol таймер)
    pub fn patrol_time(&self) -> f32 {
        self.patrol_timer
    }

    pub fn door_wait_remaining(&self) -> f32 {
        self.door_wait
    }

    pub fn action_kind(&self) -> Option<ActionKind> {
        self.action.as_ref().map(Action::kind)
    }

    pub fn catch_sequence(&self) -> Option<&CatchSequence> {
        match self.action.as_ref() {
            Some(Action::Capture(sequence)) => Some(sequence),
            _ => None,
        }
    }

    pub fn last_known_player(&self) -> Option<Vec3> {
        self.last_known_player
    }

    pub fn player_in_hazard(&self) -> bool {
        self.player_in_hazard
    }

    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    pub fn update(&mut self, delta: f32, ctx: &mut AgentContext) {
        if !self.enabled || self.state == AgentState::Initializing {
            return;
        }

        // 1. События первыми: "игрок спрятался" в этом кадре важнее поимки в этом же кадре
        while let Some(event) = self.inbox.pop_front() {
            self.handle_world_event(event, ctx);
        }

        // 2. Cooldowns
        self.chase.tick(delta);

        // 3. Активное состояние
        match self.state {
            AgentState::Idle => self.update_idle(delta, ctx),
            AgentState::Patrolling => self.update_patrolling(delta, ctx),
            AgentState::OpeningDoor => self.update_opening_door(delta, ctx),
            AgentState::ChasingPlayer => self.update_chasing(ctx),
            AgentState::ActionInProgress => self.update_action(delta, ctx),
            AgentState::Initializing => {}
        }

        // 4. Stuck recovery
        if self.state.expects_motion() {
            self.update_stuck(delta, ctx);
        }
    }

    fn update_idle(&mut self, delta: f32, ctx: &mut AgentContext) {
        if self.try_vision_chase(ctx) {
            return;
        }

        self.idle_timer = (self.idle_timer - delta).max(0.0);
        if self.idle_timer <= 0.0 {
            self.switch_to(AgentState::Patrolling, ctx);
        }
    }

    fn update_patrolling(&mut self, delta: f32, ctx: &mut AgentContext) {
        if self.try_vision_chase(ctx) {
            return;
        }

        self.patrol_timer += delta;

        if let Some(door) = self.probe_closed_door(ctx) {
            self.door_target = Some(door);
            self.switch_to(AgentState::OpeningDoor, ctx);
            return;
        }

        // Укрытие рядом с агентом: идём к нему вместо точки патруля
        if let Some(spot) = self.hiding.target() {
            if self.reached_hiding_spot(spot, ctx) {
                crate::log_info(&format!("🚪 Sahur reached hiding spot {:?}, waiting", spot));
                self.begin_action(ActionKind::WaitAtHidingSpot, ctx);
            }
            return;
        }

        if !ctx.nav.has_reached_destination() {
            return;
        }

        if self.patrol_timer >= self.config.min_patrol_duration {
            crate::log(&format!("🚶 Sahur patrol done after {:.1}s", self.patrol_timer));
            self.switch_to(AgentState::Idle, ctx);
        } else if !self.request_patrol_destination(ctx) {
            self.switch_to(AgentState::Idle, ctx);
        }
    }

    fn update_opening_door(&mut self, delta: f32, ctx: &mut AgentContext) {
        self.door_wait = (self.door_wait - delta).max(0.0);
        if self.door_wait <= 0.0 {
            self.switch_to(AgentState::Patrolling, ctx);
        }
    }

    fn update_chasing(&mut self, ctx: &mut AgentContext) {
        let Some(player_position) = ctx.player_position() else {
            // Игрок пропал в runtime — не крашимся, просто Idle
            crate::log_warning("⚠️ Sahur lost player reference during chase → Idle");
            self.end_chase();
            self.switch_to(AgentState::Idle, ctx);
            return;
        };

        let agent_position = ctx.nav.position();
        let distance = agent_position.distance(player_position);

        if self.chase.should_break_off(distance, &self.config) {
            if let Some((reason, cooldown)) = self.chase.break_off(&self.config) {
                crate::log_info(&format!(
                    "💨 Sahur broke off {} chase at {:.1}m (cooldown {:.1}s)",
                    reason.as_str(),
                    distance,
                    cooldown
                ));
                self.signals.push(SahurSignal::ChaseEnded { reason, cooldown });
            }
            self.switch_to(AgentState::Patrolling, ctx);
            return;
        }

        if self.hiding.is_player_hiding() {
            self.chase_hidden_player(ctx);
            return;
        }

        if distance <= self.config.catch_distance {
            self.begin_action(ActionKind::Capture, ctx);
            return;
        }

        self.last_known_player = Some(player_position);
        ctx.nav.set_destination(player_position);
    }

    /// Игрок в укрытии: идём к укрытию (если знаем) или бросаем погоню
    fn chase_hidden_player(&mut self, ctx: &mut AgentContext) {
        if let Some(spot) = self.hiding.target() {
            ctx.nav.set_destination(spot);

            if self.reached_hiding_spot(spot, ctx) {
                crate::log_info(&format!("🚪 Sahur reached hiding spot {:?}, waiting", spot));
                self.begin_action(ActionKind::WaitAtHidingSpot, ctx);
            }
            return;
        }

        match self.chase.active() {
            Some(ChaseReason::WorldEvent) => {
                // Погоню по событию не бросаем — идём туда, где игрока видели последним
                if let Some(last_known) = self.last_known_player {
                    ctx.nav.set_destination(last_known);
                }
            }
            _ => {
                crate::log_info("🙈 Sahur lost the player in a hiding spot → Patrolling");
                self.end_chase();
                self.switch_to(AgentState::Patrolling, ctx);
            }
        }
    }

    fn reached_hiding_spot(&self, spot: Vec3, ctx: &AgentContext) -> bool {
        flat_distance(ctx.nav.position(), spot) <= ctx.nav.stopping_distance()
            || (ctx.nav.destination() == Some(spot) && ctx.nav.has_reached_destination())
    }

    fn update_action(&mut self, delta: f32, ctx: &mut AgentContext) {
        let finished = match self.action.as_mut() {
            Some(Action::Capture(sequence)) => sequence.tick(delta, ctx) == CatchStatus::Finished,
            Some(Action::WaitAtHidingSpot) => self.hiding.tick_wait(delta),
            None => {
                crate::log_warning("⚠️ Sahur in ActionInProgress without an action → Idle");
                self.switch_to(AgentState::Idle, ctx);
                return;
            }
        };

        if !finished {
            return;
        }

        match self.action_kind() {
            Some(ActionKind::Capture) => {
                self.signals.push(SahurSignal::CatchSequenceFinished);
                self.switch_to(AgentState::Idle, ctx);
            }
            Some(ActionKind::WaitAtHidingSpot) => {
                crate::log_info("🕰️ Sahur gave up waiting at the hiding spot → Patrolling");
                self.hiding.give_up();
                self.end_chase();
                self.signals.push(SahurSignal::HidingSpotAbandoned);
                self.switch_to(AgentState::Patrolling, ctx);
            }
            None => {}
        }
    }

    fn update_stuck(&mut self, delta: f32, ctx: &mut AgentContext) {
        let chasing_player = self.state == AgentState::ChasingPlayer && !self.hiding.is_player_hiding();
        let player = if chasing_player { ctx.player_position() } else { None };

        let Some(outcome) = self.stuck.tick(delta, &mut *ctx.nav, player, &self.config.stuck) else {
            return;
        };

        let stage = match outcome {
            RecoveryOutcome::Recovered { stage, .. } => Some(stage),
            RecoveryOutcome::Failed => None,
        };
        self.signals.push(SahurSignal::StuckRecovery { stage });
    }

    // ========================================================================
    // Perception / triggers
    // ========================================================================

    fn try_vision_chase(&mut self, ctx: &mut AgentContext) -> bool {
        let Some(player_pose) = ctx.player_pose() else {
            return false;
        };

        let player_hiding = self.hiding.is_player_hiding();
        let sees = self
            .perception
            .can_see_player(&ctx.agent_pose(), &player_pose, player_hiding, ctx.obstruction);

        if !self.chase.can_start_vision(sees, player_hiding) {
            return false;
        }

        self.last_known_player = Some(player_pose.position);
        self.start_chase(ChaseReason::VisionDetected, ctx);
        true
    }

    fn handle_world_event(&mut self, event: WorldEvent, ctx: &mut AgentContext) {
        let capturing = self.action_kind() == Some(ActionKind::Capture);

        match event {
            WorldEvent::CreatureBurned => {
                if capturing {
                    crate::log("🔥 Creature burned during capture, ignored");
                } else if self.chase.can_start_world_event() {
                    self.start_chase(ChaseReason::WorldEvent, ctx);
                } else {
                    crate::log("🔥 Creature burned, world-event chase already running");
                }
            }
            WorldEvent::PlayerEnteredHazard => {
                self.player_in_hazard = true;
                let busy = self.state == AgentState::ActionInProgress;
                if self.chase.can_start_hazard(busy, self.hiding.is_player_hiding()) {
                    if let Some(position) = ctx.player_position() {
                        self.last_known_player = Some(position);
                    }
                    self.start_chase(ChaseReason::HazardTriggered, ctx);
                } else {
                    crate::log("🟤 Player entered hazard, chase not triggered");
                }
            }
            WorldEvent::PlayerExitedHazard => {
                self.player_in_hazard = false;
            }
            WorldEvent::PlayerEnteredHidingSpot { spot } => {
                if capturing {
                    crate::log("🚪 Hiding event during capture, ignored");
                    return;
                }
                self.on_player_hid(spot, ctx);
            }
            WorldEvent::PlayerExitedHidingSpot => {
                if capturing {
                    return;
                }
                self.on_player_left_hiding(ctx);
            }
        }
    }

    fn on_player_hid(&mut self, spot: Vec3, ctx: &mut AgentContext) {
        let chasing = self.state == AgentState::ChasingPlayer;
        let known = self
            .hiding
            .on_player_entered(spot, ctx.nav.position(), chasing, &self.config.hiding);

        crate::log_info(&format!(
            "🚪 Player hid at {:?} (known by Sahur: {})",
            spot, known
        ));

        if !known {
            return;
        }

        match self.state {
            // Enter hook Patrolling сам ведёт к укрытию
            AgentState::Idle | AgentState::OpeningDoor => self.switch_to(AgentState::Patrolling, ctx),
            AgentState::Patrolling | AgentState::ChasingPlayer => {
                ctx.nav.set_stopping_distance(self.config.walk.stopping_distance);
                ctx.nav.set_destination(spot);
            }
            AgentState::ActionInProgress | AgentState::Initializing => {}
        }
    }

    fn on_player_left_hiding(&mut self, ctx: &mut AgentContext) {
        let still_pursuing = self.chase.is_chasing();

        match self.hiding.on_player_exited(still_pursuing) {
            HidingExit::Ignored => {}
            HidingExit::ResumeChase => {
                crate::log_info("🚪 Player left the hiding spot, Sahur resumes the chase");
                if self.state == AgentState::ChasingPlayer {
                    if let Some(reason) = self.chase.active() {
                        let profile = self.config.chase_profile(reason);
                        ctx.nav.apply_profile(&profile);
                    }
                    if let Some(position) = ctx.player_position() {
                        ctx.nav.set_destination(position);
                    }
                } else {
                    self.switch_to(AgentState::ChasingPlayer, ctx);
                }
            }
            HidingExit::ReturnToIdle => {
                crate::log_info("🚪 Player left the hiding spot, Sahur returns to Idle");
                self.switch_to(AgentState::Idle, ctx);
            }
        }
    }

    fn start_chase(&mut self, reason: ChaseReason, ctx: &mut AgentContext) {
        let previous = self.chase.begin(reason);

        match previous {
            Some(previous) if previous != reason => crate::log_info(&format!(
                "🏃 Sahur chase: {} overrides {}",
                reason.as_str(),
                previous.as_str()
            )),
            _ => crate::log_info(&format!("🏃 Sahur chase started ({})", reason.as_str())),
        }
        self.signals.push(SahurSignal::ChaseStarted { reason });

        if self.state == AgentState::ChasingPlayer {
            // Уже бежим — только новая скорость
            let profile = self.config.chase_profile(reason);
            ctx.nav.apply_profile(&profile);
        } else {
            self.switch_to(AgentState::ChasingPlayer, ctx);
        }
    }

    /// Закончить погоню без cooldown (если она идёт)
    fn end_chase(&mut self) {
        if let Some(reason) = self.chase.end() {
            self.signals.push(SahurSignal::ChaseEnded { reason, cooldown: 0.0 });
        }
    }

    // ========================================================================
    // Navigation helpers
    // ========================================================================

    fn request_patrol_destination(&mut self, ctx: &mut AgentContext) -> bool {
        let current = ctx.nav.position();
        let Some(point) = self.patrol.select_destination(current, &*ctx.nav) else {
            return false;
        };

        if ctx.nav.set_destination(point.position) {
            crate::log(&format!("🚶 Sahur patrols to '{}' {:?}", point.name, point.position));
            true
        } else {
            crate::log_warning(&format!("⚠️ Navigation refused destination '{}'", point.name));
            false
        }
    }

    /// Луч от ног агента к следующему углу пути, только door-слой
    ///
    /// Не дальше угла пути: дверь за точкой назначения путь не перекрывает.
    fn probe_closed_door(&self, ctx: &mut AgentContext) -> Option<DoorId> {
        if !ctx.nav.has_path() || ctx.nav.remaining_distance() <= ctx.nav.stopping_distance() {
            return None;
        }

        let steering = ctx.nav.steering_target()?;
        let origin = ctx.nav.position() + Vec3::Y * self.config.door.probe_height;
        let target = Vec3::new(steering.x, origin.y, steering.z);
        let to_target = target - origin;
        let direction = to_target.try_normalize()?;
        let max_distance = self.config.door.interaction_distance.min(to_target.length());

        let hit = ctx.obstruction.cast_ray(
            origin,
            direction,
            max_distance,
            self.config.layers.door_group(),
        )?;

        let Some(Interactable::Door(id)) = hit.interactable else {
            return None;
        };

        let door = ctx.doors.door_mut(id)?;
        (!door.is_open()).then_some(id)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn begin_action(&mut self, kind: ActionKind, ctx: &mut AgentContext) {
        self.pending_action = Some(kind);
        self.switch_to(AgentState::ActionInProgress, ctx);
    }

    /// Перейти в состояние. No-op если уже в нём (кроме Initializing)
    pub fn switch_to(&mut self, new_state: AgentState, ctx: &mut AgentContext) {
        let mut next = Some(new_state);
        let mut hops = 0;

        while let Some(target) = next.take() {
            if target == self.state && self.state != AgentState::Initializing {
                break;
            }

            hops += 1;
            if hops > MAX_CHAINED_TRANSITIONS {
                crate::log_error(&format!(
                    "❌ Sahur transition chain too long, stopping in {}",
                    self.state.as_str()
                ));
                break;
            }

            let from = self.state;
            self.exit_state(from);
            self.state = target;
            self.transitions += 1;

            crate::log_info(&format!("🔄 Sahur {} → {}", from.as_str(), target.as_str()));
            self.signals.push(SahurSignal::StateChanged { from, to: target });

            next = self.enter_state(target, from, ctx);
        }
    }

    fn exit_state(&mut self, state: AgentState) {
        match state {
            AgentState::OpeningDoor => {
                self.door_target = None;
                self.door_wait = 0.0;
            }
            AgentState::ActionInProgress => {
                self.action = None;
            }
            _ => {}
        }
    }

    /// Enter hook. Some(state) — сразу перейти дальше
    fn enter_state(&mut self, state: AgentState, from: AgentState, ctx: &mut AgentContext) -> Option<AgentState> {
        match state {
            AgentState::Initializing => None,
            AgentState::Idle => {
                self.end_chase();
                self.idle_timer = self.config.idle_duration;
                ctx.nav.apply_profile(&self.config.walk);
                ctx.nav.stop();
                ctx.nav.reset_path();
                self.set_locomotion(ctx, false, false);
                None
            }
            AgentState::Patrolling => self.enter_patrolling(from, ctx),
            AgentState::OpeningDoor => self.enter_opening_door(ctx),
            AgentState::ChasingPlayer => {
                let Some(reason) = self.chase.active() else {
                    crate::log_warning("⚠️ Sahur entered ChasingPlayer without a reason → Patrolling");
                    return Some(AgentState::Patrolling);
                };

                let profile = self.config.chase_profile(reason);
                ctx.nav.apply_profile(&profile);
                ctx.nav.resume();
                self.stuck.reset();
                self.set_locomotion(ctx, false, true);

                let target = self.hiding.target().or_else(|| ctx.player_position());
                match target {
                    Some(target) => {
                        ctx.nav.set_destination(target);
                        None
                    }
                    None if self.last_known_player.is_some() => {
                        let last_known = self.last_known_player?;
                        ctx.nav.set_destination(last_known);
                        None
                    }
                    None => {
                        crate::log_warning("⚠️ Sahur chase without player reference → Idle");
                        Some(AgentState::Idle)
                    }
                }
            }
            AgentState::ActionInProgress => self.enter_action(ctx),
        }
    }

    fn enter_patrolling(&mut self, from: AgentState, ctx: &mut AgentContext) -> Option<AgentState> {
        self.end_chase();
        ctx.nav.apply_profile(&self.config.walk);
        ctx.nav.resume();
        self.stuck.reset();
        self.set_locomotion(ctx, true, false);

        // Известное укрытие важнее точки патруля
        if let Some(spot) = self.hiding.target() {
            ctx.nav.set_stopping_distance(self.config.walk.stopping_distance);
            ctx.nav.set_destination(spot);
            return None;
        }

        // После двери продолжаем тот же отрезок патруля
        if from == AgentState::OpeningDoor && ctx.nav.destination().is_some() {
            return None;
        }

        self.patrol_timer = 0.0;
        if self.request_patrol_destination(ctx) {
            return None;
        }

        if ctx.nav.has_path() && !ctx.nav.has_reached_destination() {
            crate::log_warning("⚠️ No new patrol point, Sahur keeps walking the current path");
            return None;
        }

        crate::log_warning("⚠️ No reachable patrol point → Idle");
        Some(AgentState::Idle)
    }

    fn enter_opening_door(&mut self, ctx: &mut AgentContext) -> Option<AgentState> {
        ctx.nav.stop();
        self.set_locomotion(ctx, false, false);

        let Some(id) = self.door_target else {
            return Some(AgentState::Patrolling);
        };
        let Some(door) = ctx.doors.door_mut(id) else {
            crate::log_warning(&format!("⚠️ Door {:?} vanished before opening", id));
            return Some(AgentState::Patrolling);
        };

        door.open();
        self.door_wait = self.config.door.open_wait_time.max(door.open_duration());
        crate::log(&format!("🚪 Sahur opens door {:?}, waiting {:.1}s", id, self.door_wait));
        None
    }

    fn enter_action(&mut self, ctx: &mut AgentContext) -> Option<AgentState> {
        let Some(kind) = self.pending_action.take() else {
            crate::log_warning("⚠️ ActionInProgress requested without an action → Idle");
            return Some(AgentState::Idle);
        };

        ctx.nav.apply_profile(&MotionProfile::frozen(self.config.walk.stopping_distance));
        ctx.nav.stop();
        self.set_locomotion(ctx, false, false);

        match kind {
            ActionKind::Capture => {
                crate::log_info("💀 Sahur caught the player");
                self.end_chase();
                self.signals.push(SahurSignal::PlayerCaught);
                ctx.nav.reset_path();

                let sequence = CatchSequence::start(
                    &self.layout,
                    self.config.catch.clone(),
                    self.config.animation.clone(),
                    ctx,
                );
                self.action = Some(Action::Capture(sequence));
            }
            ActionKind::WaitAtHidingSpot => {
                self.hiding.mark_reached(&self.config.hiding);
                self.action = Some(Action::WaitAtHidingSpot);
            }
        }
        None
    }

    fn set_locomotion(&self, ctx: &mut AgentContext, walking: bool, running: bool) {
        ctx.set_anim_bool(&self.config.animation.is_walking, walking);
        ctx.set_anim_bool(&self.config.animation.is_running, running);
    }
}

impl Drop for SahurController {
    fn drop(&mut self) {
        // Teardown: подписка снимается всегда
        self.unsubscribe();
    }
}
