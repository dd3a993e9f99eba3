//! error taxonomy for world streaming and fishing

use thiserror::Error;

/// Failures raised while generating, evicting or querying world content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("chunk {index} failed to generate: {reason}")]
    GenerationFailed { index: i32, reason: String },

    #[error("chunk {index} failed to unload: {reason}")]
    EvictionFailed { index: i32, reason: String },

    #[error("hook: {0}")]
    Hook(#[from] HookError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failures reported by the physics side of the hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("hook body is missing from the physics world")]
    Missing,

    #[error("hook is not active")]
    Inactive,

    #[error("physics rejected the request: {0}")]
    Rejected(String),
}

pub type WorldResult<T> = Result<T, WorldError>;
