//! Error types.
//!
//! None of these ever escape a hook as a hard failure: invalid persisted state is
//! repaired, bad commands become explanatory notices, and internal faults become
//! no-op turns. The types exist so those paths can be named, logged and tested.

use thiserror::Error;

/// An identifier that does not name any member of a preset enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    /// Which enum was being parsed ("archetype", "pacing", "stage").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    /// Build an error for `kind` rejecting `value`.
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A `((...))` configuration command that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The text inside the brackets is not a known command.
    #[error("unknown command '{0}'")]
    Unknown(String),

    /// The command is known but its argument is not.
    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),

    /// `set archetype` / `set pacing` without an argument.
    #[error("missing value for '{0}'")]
    MissingValue(&'static str),
}

/// Faults contained by the engine hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Analysis or scoring panicked; the turn was turned into a no-op.
    #[error("internal fault during {stage}: {message}")]
    Fault {
        /// Pipeline step that failed ("user turn", "generated turn").
        stage: &'static str,
        /// Panic payload, if it was a string.
        message: String,
    },
}
