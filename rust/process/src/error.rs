//! Process runtime error taxonomy.

use crate::types::{Pid, ProcessState};
use vessel_vfs::FsError;

/// Errors raised by the process runtime.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// An operation was attempted in a state that does not allow it,
    /// e.g. writing input to a process that is not running.
    #[error("invalid state: expected {expected}, was {actual}")]
    InvalidState {
        expected: ProcessState,
        actual: ProcessState,
    },

    /// No registered executor accepts the executable.
    #[error("no executor for `{executable}`")]
    NoExecutor { executable: String },

    /// The PID is not present in the process table.
    #[error("no such process: {pid}")]
    ProcessNotFound { pid: Pid },

    /// Building or starting a child process failed.
    #[error("spawn failed: {reason}")]
    SpawnFailed { reason: String },

    /// The embedded interpreter reported an error. Carries the
    /// interpreter's own message.
    #[error("{message}")]
    Interpreter { message: String },

    /// A file system operation failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The peer end of an internal channel has gone away, usually
    /// because the process was terminated.
    #[error("channel closed")]
    ChannelClosed,
}

pub type ProcessResult<T> = Result<T, ProcessError>;
