//! Error types for the parser, the format contract, and action conversion.
//!
//! Only programming mistakes and bad configuration are errors here. A turn
//! whose action section never parses is not an error: it shows up as an
//! absent [`parsed_document`](crate::parser::StreamParser::parsed_document)
//! so the caller can decide how to recover.

/// Misuse of a [`StreamParser`](crate::parser::StreamParser) after its stream
/// has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParserMisuseError {
    #[error("feed() called after finalize()")]
    FeedAfterFinalize,

    #[error("finalize() called more than once")]
    FinalizeTwice,
}

/// Invalid [`FormatConfig`](crate::config::FormatConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    EmptyKey { field: &'static str },

    #[error("{field} '{value}' is not a plain identifier")]
    InvalidKey { field: &'static str, value: String },

    #[error("failed to compile format pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A parsed mapping that does not describe a usable action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("document has no '{key}' field")]
    MissingType { key: String },

    #[error("Unknown action type: {0}")]
    UnknownType(String),

    #[error("{kind} action requires a '{field}' field")]
    MissingField { kind: &'static str, field: &'static str },

    #[error("field '{field}' has the wrong shape: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// A status or event name that is not part of the orchestration taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("invalid event: {0}")]
    Invalid(String),
}

/// Failure while driving a turn from a fallible input stream.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Misuse(#[from] ParserMisuseError),

    #[error("failed to read model output: {0}")]
    Input(#[from] std::io::Error),
}
