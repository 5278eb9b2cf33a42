//! Executor building shell processes.

use std::sync::Arc;

use vessel_process::{
    Executor, Pid, Process, ProcessCore, ProcessKind, ProcessResult, SpawnSpec,
};
use vessel_vfs::VirtualFileSystem;

use crate::process::ShellProcess;

/// Accepts exactly `sh`, producing a [`ShellProcess`].
pub struct ShellExecutor {
    vfs: Arc<VirtualFileSystem>,
}

impl ShellExecutor {
    #[must_use]
    pub fn new(vfs: Arc<VirtualFileSystem>) -> Self {
        Self { vfs }
    }
}

impl Executor for ShellExecutor {
    fn accepts(&self, executable: &str) -> bool {
        executable == "sh"
    }

    fn make(
        &self,
        spec: SpawnSpec,
        pid: Pid,
        parent_pid: Option<Pid>,
    ) -> ProcessResult<Arc<dyn Process>> {
        let core = ProcessCore::new(pid, parent_pid, ProcessKind::Shell, spec);
        Ok(ShellProcess::new(core, self.vfs.clone()))
    }
}
