use std::{io::Error as IoError, result::Result as StdResult};

use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Only [`Error::Layout`] is treated as fatal by callers; every other variant
/// is logged and the bridge keeps accepting messages.
#[derive(Error, Debug)]
pub enum Error {
    /// The raw payload had no usable `type`/`action` pair.
    #[error("undecodable bridge message: {0}")]
    Decode(String),

    /// No handler is registered for the message type.
    #[error("no handler registered for type {0:?}")]
    UnknownType(String),

    /// The handler exists but does not implement the action.
    #[error("{kind} handler has no action {action:?}")]
    UnknownAction {
        /// Handler type the message was routed to.
        kind: String,
        /// Action that was not recognised.
        action: String,
    },

    /// The action's `data` payload was missing or malformed.
    #[error("invalid data for {action}: {message}")]
    InvalidData {
        /// Action whose payload failed validation.
        action: String,
        /// What was wrong with it.
        message: String,
    },

    /// A capability handler failed to perform an action.
    #[error("{0}")]
    Handler(String),

    /// Dynamic type synthesis failed; callers fall back to the base type.
    #[error("type registration failed for {name}: {reason}")]
    Registration {
        /// Name of the type that could not be synthesized.
        name: String,
        /// Runtime-specific reason.
        reason: String,
    },

    /// A foreign decision callback did not have the expected layout.
    #[error("decision callback layout violated: {0}")]
    Layout(&'static str),

    /// Operation requires the UI main thread.
    #[error("operation requires the main thread")]
    MainThread,

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidData`].
    pub fn invalid_data(action: &str, message: impl Into<String>) -> Self {
        Self::InvalidData {
            action: action.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::UnknownAction`].
    pub fn unknown_action(kind: &str, action: &str) -> Self {
        Self::UnknownAction {
            kind: kind.to_string(),
            action: action.to_string(),
        }
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
