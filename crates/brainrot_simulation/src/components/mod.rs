//! Базовые типы мира: позы, патрульные точки, layout уровня
//!
//! - pose: позиция + forward (агент, игрок, якоря)
//! - level: PatrolPoint, LevelLayout (per-level ссылки)

pub mod level;
pub mod pose;

pub use level::*;
pub use pose::*;
