//! Patrol planner — неповторяющийся выбор патрульной точки
//!
//! Алгоритм:
//! 1. shuffle всех точек (tie-break по случайному порядку, не по дистанции — без циклов)
//! 2. кандидат отбрасывается если ближе `min_distance_to_recent_target` к текущей
//!    позиции или к любой из недавних destination
//! 3. первый не-недавний кандидат с Complete путём — победитель
//! 4. победитель уходит в историю (FIFO, bounded)

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::PatrolTuning;
use crate::components::PatrolPoint;
use crate::navigation::{NavigationPort, PathStatus};

/// Последние N destination (FIFO eviction)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentDestinationHistory {
    positions: VecDeque<Vec3>,
    capacity: usize,
}

impl RecentDestinationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, position: Vec3) {
        if self.capacity == 0 {
            return;
        }
        while self.positions.len() >= self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn is_recent(&self, position: Vec3, min_distance: f32) -> bool {
        self.positions
            .iter()
            .any(|recent| recent.distance(position) < min_distance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.positions.iter()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

#[derive(Debug, Clone)]
pub struct PatrolPlanner {
    points: Vec<PatrolPoint>,
    history: RecentDestinationHistory,
    tuning: PatrolTuning,
    rng: ChaCha8Rng,
}

impl PatrolPlanner {
    pub fn new(points: Vec<PatrolPoint>, tuning: PatrolTuning, seed: u64) -> Self {
        Self {
            history: RecentDestinationHistory::new(tuning.max_recent_destinations),
            points,
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn points(&self) -> &[PatrolPoint] {
        &self.points
    }

    pub fn history(&self) -> &RecentDestinationHistory {
        &self.history
    }

    /// Выбрать следующую патрульную точку. None — подходящей нет (caller → Idle)
    pub fn select_destination(&mut self, current_position: Vec3, nav: &dyn NavigationPort) -> Option<PatrolPoint> {
        if self.points.is_empty() {
            crate::log_warning("PatrolPlanner: no patrol points configured");
            return None;
        }

        let mut candidates: Vec<&PatrolPoint> = self.points.iter().collect();
        candidates.shuffle(&mut self.rng);

        let min_distance = self.tuning.min_distance_to_recent_target;
        let mut path_queries = 0usize;
        let mut selected = None;

        for candidate in candidates.iter() {
            if candidate.position.distance(current_position) < min_distance
                || self.history.is_recent(candidate.position, min_distance)
            {
                continue;
            }

            if path_queries >= self.tuning.max_destination_find_attempts {
                crate::log_warning(&format!(
                    "PatrolPlanner: gave up after {} path queries",
                    path_queries
                ));
                break;
            }
            path_queries += 1;

            match nav.calculate_path(candidate.position) {
                PathStatus::Complete => {
                    selected = Some((*candidate).clone());
                    break;
                }
                status => {
                    crate::log_warning(&format!(
                        "PatrolPlanner: no complete path to '{}' {:?} ({:?}), trying another",
                        candidate.name, candidate.position, status
                    ));
                }
            }
        }

        match selected {
            Some(point) => {
                self.history.push(point.position);
                Some(point)
            }
            None => {
                crate::log_warning(&format!(
                    "PatrolPlanner: no reachable non-recent point among {} candidates",
                    candidates.len()
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{SandboxNav, Zone};

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = RecentDestinationHistory::new(2);
        history.push(Vec3::X);
        history.push(Vec3::Y);
        history.push(Vec3::Z);

        assert_eq!(history.len(), 2);
        assert!(!history.is_recent(Vec3::X, 0.1));
        assert!(history.is_recent(Vec3::Y, 0.1));
        assert!(history.is_recent(Vec3::Z, 0.1));
    }

    fn points() -> Vec<PatrolPoint> {
        vec![
            PatrolPoint::new("north", Vec3::new(0.0, 0.0, -8.0)),
            PatrolPoint::new("south", Vec3::new(0.0, 0.0, 8.0)),
            PatrolPoint::new("east", Vec3::new(8.0, 0.0, 0.0)),
            PatrolPoint::new("west", Vec3::new(-8.0, 0.0, 0.0)),
            PatrolPoint::new("corner", Vec3::new(8.0, 0.0, 8.0)),
        ]
    }

    #[test]
    fn test_never_picks_recent_destination() {
        let tuning = PatrolTuning::default();
        let nav = SandboxNav::new(Vec3::ZERO);
        let mut planner = PatrolPlanner::new(points(), tuning.clone(), 7);

        let mut visited: Vec<Vec3> = Vec::new();
        let mut current = Vec3::ZERO;
        for _ in 0..50 {
            let point = planner.select_destination(current, &nav).expect("5 points, 3 remembered");
            for recent in visited.iter().rev().take(tuning.max_recent_destinations) {
                assert!(point.position.distance(*recent) >= tuning.min_distance_to_recent_target);
            }
            visited.push(point.position);
            current = point.position;
        }
    }

    #[test]
    fn test_unreachable_points_are_skipped() {
        let mut nav = SandboxNav::new(Vec3::ZERO);
        for point in points().iter().filter(|p| p.name != "west") {
            nav.unreachable.push(Zone::new(point.position, 0.5));
        }

        let mut planner = PatrolPlanner::new(points(), PatrolTuning::default(), 1);
        let point = planner.select_destination(Vec3::ZERO, &nav).expect("west is reachable");
        assert_eq!(point.name, "west");

        // west теперь в истории и рядом — больше выбрать нечего
        assert!(planner.select_destination(point.position, &nav).is_none());
        assert_eq!(planner.history().len(), 1);
    }

    #[test]
    fn test_path_queries_are_capped() {
        let mut nav = SandboxNav::new(Vec3::ZERO);
        nav.unreachable.push(Zone::new(Vec3::ZERO, 100.0));
        let tuning = PatrolTuning {
            max_destination_find_attempts: 2,
            ..Default::default()
        };

        let mut planner = PatrolPlanner::new(points(), tuning, 3);
        assert!(planner.select_destination(Vec3::ZERO, &nav).is_none());
        assert!(planner.history().is_empty());
    }

    #[test]
    fn test_is_recent_uses_min_distance() {
        let mut history = RecentDestinationHistory::new(3);
        history.push(Vec3::ZERO);

        assert!(history.is_recent(Vec3::new(0.3, 0.0, 0.0), 0.5));
        assert!(!history.is_recent(Vec3::new(0.6, 0.0, 0.0), 0.5));
    }
}
