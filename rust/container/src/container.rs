//! Container composition and spawn wiring.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use vessel_process::{
    EventKind, ExecutorRegistry, Pid, Process, ProcessError, ProcessEvent, ProcessManager,
    ProcessNode, ProcessResult, ProcessState, SpawnOutcome, SpawnRequest, SpawnSpec, run,
};
use vessel_script::ScriptExecutor;
use vessel_shell::ShellExecutor;
use vessel_vfs::{FsResult, VirtualFileSystem};

/// Optional spawn parameters: working directory and environment.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub cwd: Option<String>,
    pub env: Option<BTreeMap<String, String>>,
}

/// Counts reported by [`Container::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub processes: usize,
    pub running: usize,
    pub files: usize,
}

type EventCallback = Arc<dyn Fn(Pid, &ProcessEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, EventCallback)>,
}

/// Handle for a global event subscription; call
/// [`unsubscribe`](Self::unsubscribe) to remove the callback.
pub struct OutputSubscription {
    id: u64,
    inner: Weak<ContainerInner>,
}

impl OutputSubscription {
    /// Remove the subscribed callback.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .subscribers
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .callbacks
                .retain(|(id, _)| *id != self.id);
        }
    }
}

struct ContainerInner {
    vfs: Arc<VirtualFileSystem>,
    manager: ProcessManager,
    registry: ExecutorRegistry,
    subscribers: Mutex<Subscribers>,
}

/// The in-process virtual container: one file system, one process
/// table, and the executors that launch shells and scripts.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Create a container with an empty file system and the built-in
    /// shell and script executors.
    #[must_use]
    pub fn new() -> Self {
        let vfs = Arc::new(VirtualFileSystem::new());
        let registry = ExecutorRegistry::new();
        registry.register(Arc::new(ScriptExecutor::new(vfs.clone())));
        registry.register(Arc::new(ShellExecutor::new(vfs.clone())));
        Self {
            inner: Arc::new(ContainerInner {
                vfs,
                manager: ProcessManager::new(),
                registry,
                subscribers: Mutex::new(Subscribers::default()),
            }),
        }
    }

    /// The shared virtual file system.
    #[must_use]
    pub fn vfs(&self) -> &Arc<VirtualFileSystem> {
        &self.inner.vfs
    }

    // -- File operations (pass-through) --

    pub fn write_file(&self, path: &str, content: impl Into<Vec<u8>>) -> FsResult<()> {
        self.inner.vfs.write_file(path, content)
    }

    pub fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        self.inner.vfs.read_file(path)
    }

    pub fn delete_file(&self, path: &str) -> FsResult<()> {
        self.inner.vfs.delete_file(path)
    }

    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        self.inner.vfs.list_files()
    }

    pub fn create_directory(&self, path: &str) -> FsResult<()> {
        self.inner.vfs.create_directory(path)
    }

    pub fn list_directory(&self, path: &str) -> FsResult<Vec<String>> {
        self.inner.vfs.list_directory(path)
    }

    pub fn delete_directory(&self, path: &str) -> FsResult<()> {
        self.inner.vfs.delete_directory(path)
    }

    #[must_use]
    pub fn is_directory(&self, path: &str) -> bool {
        self.inner.vfs.is_directory(path)
    }

    // -- Spawning --

    /// Spawn a top-level process and start it. The returned handle can
    /// be used to write input and observe events; the final state is
    /// reported by the process's exit event.
    pub fn spawn(
        &self,
        executable: &str,
        args: Vec<String>,
        parent_pid: Option<Pid>,
        options: SpawnOptions,
    ) -> ProcessResult<Arc<dyn Process>> {
        let spec = SpawnSpec {
            executable: executable.to_string(),
            args,
            cwd: options.cwd.unwrap_or_else(|| "/".to_string()),
            env: options.env.unwrap_or_default(),
        };
        let process = self.inner.build(spec, parent_pid, true)?;
        tokio::spawn(run(process.clone()));
        Ok(process)
    }

    /// Register an executor, overriding built-ins for the executables
    /// it accepts.
    pub fn register_executor(&self, executor: Arc<dyn vessel_process::Executor>) {
        self.inner.registry.register(executor);
    }

    // -- Observation --

    /// Subscribe to every event of every process the container spawns.
    pub fn on_event(
        &self,
        callback: impl Fn(Pid, &ProcessEvent) + Send + Sync + 'static,
    ) -> OutputSubscription {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        subscribers.next_id += 1;
        let id = subscribers.next_id;
        subscribers.callbacks.push((id, Arc::new(callback)));
        OutputSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe to process output (stdout/stderr chunks) globally.
    pub fn on_output(
        &self,
        callback: impl Fn(Pid, &vessel_process::OutputChunk) + Send + Sync + 'static,
    ) -> OutputSubscription {
        self.on_event(move |pid, event| {
            if let ProcessEvent::Message { output } = event {
                callback(pid, output);
            }
        })
    }

    #[must_use]
    pub fn process(&self, pid: Pid) -> Option<Arc<dyn Process>> {
        self.inner.manager.get(pid)
    }

    #[must_use]
    pub fn processes(&self) -> Vec<Arc<dyn Process>> {
        self.inner.manager.list()
    }

    #[must_use]
    pub fn children(&self, pid: Pid) -> Vec<Arc<dyn Process>> {
        self.inner.manager.children(pid)
    }

    #[must_use]
    pub fn tree(&self, pid: Pid) -> Option<ProcessNode> {
        self.inner.manager.tree(pid)
    }

    #[must_use]
    pub fn full_tree(&self) -> Vec<ProcessNode> {
        self.inner.manager.full_tree()
    }

    #[must_use]
    pub fn stats(&self) -> ContainerStats {
        let processes = self.inner.manager.list();
        ContainerStats {
            processes: processes.len(),
            running: processes
                .iter()
                .filter(|process| process.core().state() == ProcessState::Running)
                .count(),
            files: self.inner.vfs.list_files().len(),
        }
    }

    // -- Termination --

    /// Terminate the process and all its descendants, children first,
    /// removing each from the table.
    pub async fn terminate_tree(&self, pid: Pid) {
        let order = self.inner.post_order(pid);
        for pid in order {
            if let Some(process) = self.inner.manager.get(pid) {
                process.terminate().await;
            }
            self.inner.manager.remove(pid);
        }
    }

    /// Terminate everything and clear the table.
    pub async fn dispose(&self) {
        self.inner.manager.terminate_all().await;
    }
}

impl ContainerInner {
    /// Resolve an executor, allocate a PID, build the process, and
    /// wire it into the container: global event forwarding (top-level
    /// spawns only) and the child-spawn service channel.
    fn build(
        self: &Arc<Self>,
        spec: SpawnSpec,
        parent_pid: Option<Pid>,
        forward_events: bool,
    ) -> ProcessResult<Arc<dyn Process>> {
        let executor =
            self.registry
                .find(&spec.executable)
                .ok_or_else(|| ProcessError::NoExecutor {
                    executable: spec.executable.clone(),
                })?;
        let pid = self.manager.next_pid();
        tracing::debug!(pid, executable = %spec.executable, ?parent_pid, "spawning process");
        let process = executor.make(spec, pid, parent_pid)?;

        if forward_events {
            let weak = Arc::downgrade(self);
            for kind in [
                EventKind::Start,
                EventKind::Message,
                EventKind::Error,
                EventKind::Exit,
            ] {
                let weak = weak.clone();
                process.core().bus().on(kind, move |event| {
                    if let Some(inner) = weak.upgrade() {
                        inner.deliver(pid, event);
                    }
                });
            }
        }

        // Service channel for this process's child-spawn requests.
        let (sender, mut requests) = mpsc::unbounded_channel::<SpawnRequest>();
        process.core().set_spawner(sender);
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                inner.serve_spawn_request(pid, request).await;
            }
        });

        self.manager.add(process.clone());
        Ok(process)
    }

    /// Handle one child-spawn request: build and start the child,
    /// accumulate its output, and answer with the outcome once it
    /// exits. The child is reaped from the table before the reply.
    async fn serve_spawn_request(self: Arc<Self>, parent_pid: Pid, request: SpawnRequest) {
        let SpawnRequest { spec, reply } = request;
        let child = match self.build(spec, Some(parent_pid), false) {
            Ok(child) => child,
            Err(error) => {
                let _ = reply.send(SpawnOutcome::failure(error.to_string()));
                return;
            }
        };
        let child_pid = child.core().pid();

        let stdout = Arc::new(Mutex::new(String::new()));
        let stderr = Arc::new(Mutex::new(String::new()));
        {
            let stdout = stdout.clone();
            let stderr = stderr.clone();
            child.core().bus().on(EventKind::Message, move |event| {
                if let ProcessEvent::Message { output } = event {
                    let sink = match output.stream {
                        vessel_process::OutputStream::Stdout => &stdout,
                        vessel_process::OutputStream::Stderr => &stderr,
                    };
                    sink.lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .push_str(&output.text);
                }
            });
        }

        let (exit_sender, exit) = oneshot::channel::<i32>();
        let exit_slot = Mutex::new(Some(exit_sender));
        child.core().bus().on(EventKind::Exit, move |event| {
            if let ProcessEvent::Exit { exit_code, .. } = event {
                if let Some(sender) = exit_slot
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .take()
                {
                    let _ = sender.send(*exit_code);
                }
            }
        });

        tokio::spawn(run(child.clone()));
        let exit_code = exit.await.unwrap_or(-1);

        self.manager.remove(child_pid);
        let take = |sink: &Arc<Mutex<String>>| {
            std::mem::take(
                &mut *sink
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
            )
        };
        let _ = reply.send(SpawnOutcome {
            stdout: take(&stdout),
            stderr: take(&stderr),
            exit_code,
        });
    }

    fn deliver(&self, pid: Pid, event: &ProcessEvent) {
        let callbacks: Vec<EventCallback> = {
            let subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            subscribers
                .callbacks
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect()
        };
        for callback in callbacks {
            callback(pid, event);
        }
    }

    /// PIDs of the tree rooted at `pid`, deepest first, root last.
    fn post_order(&self, pid: Pid) -> Vec<Pid> {
        let mut order = Vec::new();
        let mut stack = vec![pid];
        while let Some(current) = stack.pop() {
            order.push(current);
            for child in self.manager.children(current) {
                stack.push(child.core().pid());
            }
        }
        order.reverse();
        order
    }
}
