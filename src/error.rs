//! Error types
//!
//! The body core itself is total; these errors come from the surrounding
//! context (configuration validation, handle lookup, hierarchy edits and
//! phase ordering).

use crate::sim::{BodyId, Phase};

/// Errors reported by the simulation context
#[derive(thiserror::Error, Debug)]
pub enum BodyError {
    /// Shape parameters don't describe a usable shape
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Handle does not name a registered body
    #[error("Unknown body: {0:?}")]
    UnknownBody(BodyId),

    /// Attaching would make a body its own ancestor
    #[error("Parenting {child:?} to {parent:?} would create a cycle")]
    ParentCycle { child: BodyId, parent: BodyId },

    /// A tick phase was entered out of order
    #[error("Expected {expected:?} phase, got {got:?}")]
    OutOfPhase { expected: Phase, got: Phase },

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
