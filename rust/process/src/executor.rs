//! Executable-to-process mapping.

use std::sync::{Arc, Mutex};

use crate::error::ProcessResult;
use crate::process::Process;
use crate::spawn::SpawnSpec;
use crate::types::Pid;

/// A factory that recognizes certain executable identifiers and builds
/// processes for them.
pub trait Executor: Send + Sync {
    /// Whether this executor can launch `executable`.
    fn accepts(&self, executable: &str) -> bool;

    /// Build (but do not start) a process for the spawn spec.
    fn make(
        &self,
        spec: SpawnSpec,
        pid: Pid,
        parent_pid: Option<Pid>,
    ) -> ProcessResult<Arc<dyn Process>>;
}

/// An ordered collection of executors.
///
/// `find` consults the most recently registered executor first, so
/// registering another executor for an already-covered executable
/// overrides the earlier one.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: Mutex<Vec<Arc<dyn Executor>>>,
}

impl ExecutorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor, giving it priority over existing ones.
    pub fn register(&self, executor: Arc<dyn Executor>) {
        self.lock().insert(0, executor);
    }

    /// The first registered executor (newest first) that accepts the
    /// executable.
    #[must_use]
    pub fn find(&self, executable: &str) -> Option<Arc<dyn Executor>> {
        self.lock()
            .iter()
            .find(|executor| executor.accepts(executable))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn Executor>>> {
        self.executors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("count", &self.lock().len())
            .finish()
    }
}
