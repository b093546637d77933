//! AI components (FSM state, chase reasons, tuning)

pub mod config;
pub mod state;


pub use config::*;
pub use state::*;
