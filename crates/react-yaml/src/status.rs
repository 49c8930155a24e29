//! Lifecycle status of the orchestration loop that consumes parsed turns.
//!
//! Separate from [`Lifecycle`](crate::parser::Lifecycle): this classifies the
//! loop, not a single parser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EventError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactStatus {
    #[default]
    Idle,
    Running,
    Final,
    Failed,
    Waiting,
    Paused,
    AwaitingInput,
}

impl ReactStatus {
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Running,
        Self::Final,
        Self::Failed,
        Self::Waiting,
        Self::Paused,
        Self::AwaitingInput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Final => "FINAL",
            Self::Failed => "FAILED",
            Self::Waiting => "WAITING",
            Self::Paused => "PAUSED",
            Self::AwaitingInput => "AWAITING_INPUT",
        }
    }

    /// The loop is doing work or waiting on a tool.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Waiting)
    }

    /// The loop has stopped for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Final | Self::Failed)
    }

    /// The loop is waiting on the user.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Paused | Self::AwaitingInput)
    }
}

impl fmt::Display for ReactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactStatus {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EventError::UnknownStatus(s.to_string()))
    }
}
