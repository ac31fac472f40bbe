use serde::Serialize;
use thiserror::Error;

use crate::access::AccessLevel;

/// Structured failure of a script statement. Serialized with a `code` tag so
/// a front end can match on the kind and render the detail.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum ScriptError {
    #[error("malformed arguments for `{keyword}`")]
    MalformedArguments { keyword: String },

    #[error("degenerate geometry: {what}")]
    DegenerateGeometry { what: String },

    #[error("unknown paper preset `{tag}`")]
    UnknownPreset { tag: String },

    #[error("missing precondition: {what}")]
    MissingPrecondition { what: String },

    #[error("insufficient access: requires {required}, current level is {current}")]
    InsufficientAccess {
        required: AccessLevel,
        current: AccessLevel,
    },

    #[error("texture `{path}` has an alpha channel, which the paper cannot carry")]
    UnsupportedTexture { path: String },

    #[error("cannot construct paper: {reason}")]
    ModelConstructionFailure { reason: String },

    /// Refusal raised by the folding model itself.
    #[error("model error: {message}")]
    Model { message: String },

    #[error("export to {format} failed: {message}")]
    Export { format: String, message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    /// Cooperative cancellation observed by the dispatch loop. The supervisor
    /// swallows it; nothing else should surface it to a caller.
    #[error("execution cancelled")]
    Cancelled,
}

impl ScriptError {
    pub(crate) fn malformed(keyword: &str) -> Self {
        ScriptError::MalformedArguments {
            keyword: keyword.to_string(),
        }
    }

    pub(crate) fn missing(what: impl Into<String>) -> Self {
        ScriptError::MissingPrecondition { what: what.into() }
    }

    pub(crate) fn degenerate(what: impl Into<String>) -> Self {
        ScriptError::DegenerateGeometry { what: what.into() }
    }

    pub(crate) fn model(message: impl Into<String>) -> Self {
        ScriptError::Model {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        ScriptError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        ScriptError::Config {
            message: e.to_string(),
        }
    }
}
