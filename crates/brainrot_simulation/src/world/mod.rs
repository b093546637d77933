//! Внешние коллабораторы агента (контракты, реализация — в движке)
//!
//! - door: DoorGate + DoorDirectory (двери по DoorId)
//! - presentation: аниматоры, игрок, HUD/overlay, здоровье
//! - context: AgentContext — набор ссылок, который хост одалживает на один кадр

pub mod context;
pub mod door;
pub mod presentation;

pub use context::*;
pub use door::*;
pub use presentation::*;
