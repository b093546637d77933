//! Ошибки инициализации агента
//!
//! Runtime-сбои (навигация, catch-шаги, потеря игрока) ошибок не порождают —
//! они логируются и восстанавливаются локально.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no patrol points configured for this level")]
    NoPatrolPoints,

    #[error("agent animator is missing")]
    MissingAnimator,

    #[error("navigation agent is not placed on the navmesh")]
    AgentNotOnNavMesh,

    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SetupError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
