//! The process table.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;

use crate::process::Process;
use crate::types::{Pid, ProcessKind, ProcessState};

/// A node in a process tree snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessNode {
    pub pid: Pid,
    pub parent_pid: Option<Pid>,
    pub kind: ProcessKind,
    pub state: ProcessState,
    pub executable_path: String,
    pub children: Vec<ProcessNode>,
}

/// Owns every process by PID and allocates new PIDs.
///
/// Parent/child relations are weak: only `parent_pid` is stored, and
/// tree queries scan the table, so dropping a parent never leaks its
/// children and reference cycles cannot form.
pub struct ProcessManager {
    inner: Mutex<ManagerState>,
}

struct ManagerState {
    table: IndexMap<Pid, Arc<dyn Process>>,
    next_pid: Pid,
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ManagerState {
                table: IndexMap::new(),
                next_pid: 1,
            }),
        }
    }

    /// Allocate the next PID. PIDs start at 1 and are never reused.
    #[must_use]
    pub fn next_pid(&self) -> Pid {
        let mut state = self.lock();
        let pid = state.next_pid;
        state.next_pid += 1;
        pid
    }

    /// Insert a process into the table under its own PID.
    pub fn add(&self, process: Arc<dyn Process>) {
        let pid = process.core().pid();
        self.lock().table.insert(pid, process);
    }

    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<Arc<dyn Process>> {
        self.lock().table.get(&pid).cloned()
    }

    /// Remove a process from the table. Missing PIDs are a no-op, so
    /// double-removal (child reaping racing a tree termination) is
    /// harmless.
    pub fn remove(&self, pid: Pid) -> Option<Arc<dyn Process>> {
        self.lock().table.shift_remove(&pid)
    }

    /// All processes, in insertion (PID) order.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<dyn Process>> {
        self.lock().table.values().cloned().collect()
    }

    /// Direct children of `pid`.
    #[must_use]
    pub fn children(&self, pid: Pid) -> Vec<Arc<dyn Process>> {
        self.lock()
            .table
            .values()
            .filter(|process| process.core().parent_pid() == Some(pid))
            .cloned()
            .collect()
    }

    /// Processes with no live parent in the table.
    #[must_use]
    pub fn roots(&self) -> Vec<Arc<dyn Process>> {
        let state = self.lock();
        state
            .table
            .values()
            .filter(|process| match process.core().parent_pid() {
                Some(parent) => !state.table.contains_key(&parent),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// A snapshot of the tree rooted at `pid`.
    #[must_use]
    pub fn tree(&self, pid: Pid) -> Option<ProcessNode> {
        let snapshot = self.list();
        build_node(pid, &snapshot)
    }

    /// Snapshots of every root's tree.
    #[must_use]
    pub fn full_tree(&self) -> Vec<ProcessNode> {
        let snapshot = self.list();
        self.roots()
            .into_iter()
            .filter_map(|process| build_node(process.core().pid(), &snapshot))
            .collect()
    }

    /// Terminate every process concurrently, await completion, and
    /// clear the table.
    pub async fn terminate_all(&self) {
        let processes = self.list();
        tracing::debug!(count = processes.len(), "terminating all processes");
        join_all(processes.iter().map(|process| process.terminate())).await;
        self.lock().table.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerState> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn build_node(pid: Pid, snapshot: &[Arc<dyn Process>]) -> Option<ProcessNode> {
    let process = snapshot
        .iter()
        .find(|process| process.core().pid() == pid)?;
    let core = process.core();
    let children = snapshot
        .iter()
        .filter(|child| child.core().parent_pid() == Some(pid))
        .filter_map(|child| build_node(child.core().pid(), snapshot))
        .collect();
    Some(ProcessNode {
        pid: core.pid(),
        parent_pid: core.parent_pid(),
        kind: core.kind(),
        state: core.state(),
        executable_path: core.executable_path().to_string(),
        children,
    })
}

impl std::fmt::Debug for ProcessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ProcessManager")
            .field("count", &state.table.len())
            .field("next_pid", &state.next_pid)
            .finish()
    }
}
