//! Executor building script processes.

use std::sync::Arc;

use vessel_process::{
    Executor, Pid, Process, ProcessCore, ProcessError, ProcessKind, ProcessResult, SpawnSpec,
};
use vessel_vfs::VirtualFileSystem;

use crate::process::ScriptProcess;

/// Accepts `node` and any `*.js` path, producing a [`ScriptProcess`].
///
/// When the executable is `node` the first argument names the script;
/// otherwise the executable itself is the script path.
pub struct ScriptExecutor {
    vfs: Arc<VirtualFileSystem>,
}

impl ScriptExecutor {
    #[must_use]
    pub fn new(vfs: Arc<VirtualFileSystem>) -> Self {
        Self { vfs }
    }
}

impl Executor for ScriptExecutor {
    fn accepts(&self, executable: &str) -> bool {
        executable == "node" || executable.ends_with(".js")
    }

    fn make(
        &self,
        spec: SpawnSpec,
        pid: Pid,
        parent_pid: Option<Pid>,
    ) -> ProcessResult<Arc<dyn Process>> {
        let (script_path, script_args) = if spec.executable == "node" {
            let mut args = spec.args.clone();
            if args.is_empty() {
                return Err(ProcessError::SpawnFailed {
                    reason: "node: missing script path".to_string(),
                });
            }
            let script = args.remove(0);
            (script, args)
        } else {
            (spec.executable.clone(), spec.args.clone())
        };

        let core = ProcessCore::new(pid, parent_pid, ProcessKind::Script, spec);
        Ok(ScriptProcess::new(
            core,
            self.vfs.clone(),
            script_path,
            script_args,
        ))
    }
}
