//! Unit tests для stuck detection + staged recovery

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::stuck::{recover, EscapeDirection, StallKind};
    use super::super::{NavigationPort, RecoveryOutcome, RecoveryStage, StuckRecovery, StuckTracker};
    use crate::ai::StuckTuning;
    use crate::sandbox::{SandboxNav, Zone};

    /// Агент с путём вперёд, но стоит на месте
    fn stalled_nav() -> SandboxNav {
        let mut nav = SandboxNav::new(Vec3::ZERO);
        nav.set_speed(3.0);
        nav.set_stopping_distance(0.5);
        nav.frozen = true;
        nav.set_destination(Vec3::new(0.0, 0.0, -20.0));
        nav
    }

    #[test]
    fn test_path_pending_triggers_after_max_duration() {
        let tuning = StuckTuning::default();
        let mut nav = SandboxNav::new(Vec3::ZERO);
        nav.stall_path_pending = true;
        nav.set_destination(Vec3::new(10.0, 0.0, 0.0));
        assert!(nav.path_pending());

        let mut tracker = StuckTracker::default();
        let mut frames = 0;
        let stall = loop {
            frames += 1;
            if let Some(stall) = tracker.observe(0.1, &nav, &tuning) {
                break stall;
            }
            assert!(frames < 100, "path pending never detected");
        };

        assert_eq!(stall, StallKind::PathPending);
        // 2.0s при 0.1s кадре
        assert!((19..=21).contains(&frames), "detected after {} frames", frames);
    }

    #[test]
    fn test_moving_agent_never_stalls() {
        let tuning = StuckTuning::default();
        let mut nav = SandboxNav::new(Vec3::ZERO);
        nav.set_speed(3.0);
        nav.set_destination(Vec3::new(0.0, 0.0, -50.0));

        let mut tracker = StuckTracker::default();
        for _ in 0..100 {
            nav.step(0.1);
            assert_eq!(tracker.observe(0.1, &nav, &tuning), None);
        }
        assert_eq!(tracker.stuck_timer, 0.0);
    }

    #[test]
    fn test_arrived_agent_is_not_stuck() {
        let tuning = StuckTuning::default();
        let mut nav = SandboxNav::new(Vec3::ZERO);
        nav.set_stopping_distance(0.5);
        nav.set_destination(Vec3::new(0.0, 0.0, -0.3));

        let mut tracker = StuckTracker::default();
        for _ in 0..100 {
            assert_eq!(tracker.observe(0.1, &nav, &tuning), None);
        }
    }

    #[test]
    fn test_first_stage_teleports_behind_player() {
        let tuning = StuckTuning::default();
        let mut nav = stalled_nav();
        let player = Vec3::new(0.0, 0.0, -10.0);

        let mut recovery = StuckRecovery::default();
        let mut outcome = None;
        for _ in 0..100 {
            outcome = recovery.tick(0.1, &mut nav, Some(player), &tuning);
            if outcome.is_some() {
                break;
            }
        }

        let expected = Vec3::new(0.0, 0.0, -10.0 - tuning.behind_player_distance);
        match outcome {
            Some(RecoveryOutcome::Recovered { stage, position }) => {
                assert_eq!(stage, RecoveryStage::BehindPlayer);
                assert!(position.distance(expected) < 1e-4);
            }
            other => panic!("expected recovery, got {:?}", other),
        }

        assert_eq!(recovery.attempts, 1);
        assert_eq!(recovery.failures, 0);
        // Destination переиздан после teleport
        assert_eq!(nav.destination(), Some(Vec3::new(0.0, 0.0, -20.0)));
        assert_eq!(recovery.tracker, StuckTracker::default());
    }

    #[test]
    fn test_escape_candidates_in_order() {
        let tuning = StuckTuning::default();
        let player = Vec3::new(0.0, 0.0, -10.0);

        // За игроком нельзя → назад
        let mut nav = stalled_nav();
        nav.teleport_blocked.push(Zone::new(player, 6.0));
        assert_eq!(
            recover(&mut nav, Some(player), &tuning),
            RecoveryOutcome::Recovered {
                stage: RecoveryStage::Escape(EscapeDirection::Backward),
                position: Vec3::new(0.0, 0.0, tuning.escape_distance),
            }
        );

        // Назад тоже нельзя → влево
        let mut nav = stalled_nav();
        nav.teleport_blocked.push(Zone::new(player, 6.0));
        nav.teleport_blocked.push(Zone::new(Vec3::new(0.0, 0.0, 2.0), 0.5));
        match recover(&mut nav, Some(player), &tuning) {
            RecoveryOutcome::Recovered { stage, position } => {
                assert_eq!(stage, RecoveryStage::Escape(EscapeDirection::Left));
                assert!(position.distance(Vec3::new(-tuning.escape_distance, 0.0, 0.0)) < 1e-4);
            }
            RecoveryOutcome::Failed => panic!("left escape should succeed"),
        }
    }

    #[test]
    fn test_nudge_is_last_resort() {
        let tuning = StuckTuning::default();
        let mut nav = stalled_nav();
        for blocked in [Vec3::new(0.0, 0.0, 2.0), Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)] {
            nav.teleport_blocked.push(Zone::new(blocked, 0.5));
        }

        match recover(&mut nav, None, &tuning) {
            RecoveryOutcome::Recovered { stage, position } => {
                assert_eq!(stage, RecoveryStage::NudgeAndSnap);
                assert!(position.distance(Vec3::new(0.0, 0.0, -tuning.nudge_distance)) < 1e-4);
            }
            RecoveryOutcome::Failed => panic!("nudge should succeed"),
        }
    }

    #[test]
    fn test_total_failure_rearms_and_retries() {
        let tuning = StuckTuning::default();
        let mut nav = stalled_nav();
        nav.teleport_blocked.push(Zone::new(Vec3::ZERO, 1000.0));

        let mut recovery = StuckRecovery::default();
        let mut outcomes = Vec::new();
        for _ in 0..200 {
            if let Some(outcome) = recovery.tick(0.1, &mut nav, None, &tuning) {
                outcomes.push(outcome);
            }
        }

        // 20s / 3s max_stuck_duration → несколько попыток, все неудачные, без паники
        assert!(outcomes.len() >= 5);
        assert!(outcomes.iter().all(|o| *o == RecoveryOutcome::Failed));
        assert_eq!(recovery.failures, recovery.attempts);
        assert_eq!(nav.position, Vec3::ZERO);
    }
}
