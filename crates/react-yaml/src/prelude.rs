//! Convenience re-exports for common `react-yaml` types.
//!
//! ```
//! use react_yaml::prelude::*;
//! ```
//!
//! Covers the parser, the format contract, action decoding, and observers.
//! The event taxonomy and the line-level parse outcome details are left in
//! their modules.

pub use crate::ActionDocument;

// ── Parsing ─────────────────────────────────────────────────────────
pub use crate::config::FormatConfig;
pub use crate::format::YamlFormat;
pub use crate::parser::{Lifecycle, ParseOutcome, StreamParser};
pub use crate::turn::{TurnOutput, run_chunks, run_stream};

// ── Actions ─────────────────────────────────────────────────────────
pub use crate::action::{ActionKind, ErrorAction, FinalAction, ReactAction, StopReason, ToolAction};
pub use crate::status::ReactStatus;

// ── Observers ───────────────────────────────────────────────────────
pub use crate::observer::{
    CompositeObserver, FnObserver, LoggingObserver, NoopObserver, ParseEvent, ParseObserver,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{ActionError, ConfigError, ParserMisuseError};
