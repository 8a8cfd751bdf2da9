use thiserror::Error;

use crate::types::AgentId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Agent {id} not found")]
    UnknownAgent { id: AgentId },

    #[error("Agent {id} is not a {expected}")]
    WrongKind { id: AgentId, expected: &'static str },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
