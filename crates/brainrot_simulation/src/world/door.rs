//! Двери мира

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable ID двери внутри уровня
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct DoorId(pub u32);

/// Дверь с open/closed состоянием
pub trait DoorGate {
    fn is_open(&self) -> bool;
    fn open(&mut self);
    fn close(&mut self);
    /// Длительность анимации открытия (секунды)
    fn open_duration(&self) -> f32;

    fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }
}

/// Lookup дверей по ID (результат raycast → Interactable::Door(id))
pub trait DoorDirectory {
    fn door_mut(&mut self, id: DoorId) -> Option<&mut dyn DoorGate>;
}

/// Простая дверь: open/closed флаг + длительность анимации
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SimpleDoor {
    pub is_open: bool,
    pub open_duration: f32,
}

impl Default for SimpleDoor {
    fn default() -> Self {
        Self {
            is_open: false,
            open_duration: 1.0,
        }
    }
}

impl DoorGate for SimpleDoor {
    fn is_open(&self) -> bool {
        self.is_open
    }

    fn open(&mut self) {
        self.is_open = true;
    }

    fn close(&mut self) {
        self.is_open = false;
    }

    fn open_duration(&self) -> f32 {
        self.open_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state() {
        let mut door = SimpleDoor::default();
        door.toggle();
        assert!(door.is_open());
        door.toggle();
        assert!(!door.is_open());
    }
}
