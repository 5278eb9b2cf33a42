//! Core process identifiers and states.

use serde::{Deserialize, Serialize};
use strum::Display;

/// A process identifier: positive, container-unique, monotonically
/// increasing for the lifetime of the container.
pub type Pid = u32;

/// The kind of program a process hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    Shell,
    Script,
}

/// Lifecycle state of a process.
///
/// The only legal transitions are `Created → Running` and
/// `Running → Completed | Failed | Terminated`. Terminal states are
/// absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Created,
    Running,
    Completed,
    Failed,
    Terminated,
}

impl ProcessState {
    /// Whether the state is terminal (absorbing).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Terminated)
    }
}
