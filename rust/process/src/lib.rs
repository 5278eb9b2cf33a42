//! Cooperative process runtime for the virtual container.
//!
//! Processes are in-process entities, not operating system processes:
//! each one is an async task with a PID, a lifecycle state machine, an
//! input queue, and an event bus over which it publishes its output and
//! exit. The [`ProcessManager`] owns every process by PID; parent/child
//! relations are derived from `parent_pid`, never from references, so
//! the tree is a forest with no cycles of ownership.

pub mod core;
pub mod error;
pub mod events;
pub mod executor;
pub mod manager;
pub mod process;
pub mod spawn;
pub mod types;

pub use self::core::ProcessCore;
pub use error::{ProcessError, ProcessResult};
pub use events::{EventBus, EventKind, ListenerId, OutputChunk, OutputStream, ProcessEvent};
pub use executor::{Executor, ExecutorRegistry};
pub use manager::{ProcessManager, ProcessNode};
pub use process::{Process, run, wait_exit};
pub use spawn::{SpawnOutcome, SpawnRequest, SpawnSpec};
pub use types::{Pid, ProcessKind, ProcessState};
