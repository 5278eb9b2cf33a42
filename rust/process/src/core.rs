//! Shared process state: identity, lifecycle cell, input queue, bus.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use crate::error::{ProcessError, ProcessResult};
use crate::events::{EventBus, OutputChunk, ProcessEvent};
use crate::spawn::{SpawnOutcome, SpawnRequest, SpawnSpec};
use crate::types::{Pid, ProcessKind, ProcessState};

#[derive(Debug)]
struct StateCell {
    state: ProcessState,
    exit_code: Option<i32>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    /// Set by `mark_terminated` so a racing normal completion does not
    /// transition again or emit a second exit event.
    terminated: bool,
    /// Exit code requested by the program itself (e.g. a shell's
    /// `exit 2`), consulted when `execute` returns success.
    requested_exit_code: Option<i32>,
}

/// The state every process shares, regardless of what it executes.
///
/// Concrete processes (shell, script) embed a core and implement
/// [`Process`](crate::process::Process) around it. The core owns the
/// lifecycle cell, the event bus, the FIFO input queue, and the channel
/// over which child-spawn requests travel to the container.
pub struct ProcessCore {
    pid: Pid,
    parent_pid: Option<Pid>,
    kind: ProcessKind,
    executable_path: String,
    args: Vec<String>,
    cwd: String,
    env: BTreeMap<String, String>,
    state: Mutex<StateCell>,
    bus: EventBus,
    input_tx: Mutex<Option<UnboundedSender<String>>>,
    input_rx: tokio::sync::Mutex<UnboundedReceiver<String>>,
    spawner: Mutex<Option<UnboundedSender<SpawnRequest>>>,
}

impl ProcessCore {
    #[must_use]
    pub fn new(pid: Pid, parent_pid: Option<Pid>, kind: ProcessKind, spec: SpawnSpec) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Self {
            pid,
            parent_pid,
            kind,
            executable_path: spec.executable,
            args: spec.args,
            cwd: spec.cwd,
            env: spec.env,
            state: Mutex::new(StateCell {
                state: ProcessState::Created,
                exit_code: None,
                start_time: None,
                end_time: None,
                terminated: false,
                requested_exit_code: None,
            }),
            bus: EventBus::new(),
            input_tx: Mutex::new(Some(input_tx)),
            input_rx: tokio::sync::Mutex::new(input_rx),
            spawner: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[must_use]
    pub fn parent_pid(&self) -> Option<Pid> {
        self.parent_pid
    }

    #[must_use]
    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    #[must_use]
    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    #[must_use]
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.cell().state
    }

    /// The exit code; `None` until a terminal state is reached.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.cell().exit_code
    }

    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.cell().start_time
    }

    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.cell().end_time
    }

    /// Milliseconds between start and end (or now, while running).
    #[must_use]
    pub fn uptime_ms(&self) -> i64 {
        let cell = self.cell();
        match (cell.start_time, cell.end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            (Some(start), None) => (Utc::now() - start).num_milliseconds(),
            _ => 0,
        }
    }

    // -- Lifecycle (driven by `process::run` and `Process::terminate`) --

    /// Transition `Created → Running` and emit the start event.
    pub(crate) fn begin(&self) -> ProcessResult<()> {
        {
            let mut cell = self.cell();
            if cell.state != ProcessState::Created {
                return Err(ProcessError::InvalidState {
                    expected: ProcessState::Created,
                    actual: cell.state,
                });
            }
            cell.state = ProcessState::Running;
            cell.start_time = Some(Utc::now());
        }
        tracing::debug!(pid = self.pid, executable = %self.executable_path, "process started");
        self.bus.emit(&ProcessEvent::Start { pid: self.pid });
        Ok(())
    }

    /// Record the result of `execute` and emit the exit event, unless
    /// a terminate already claimed the terminal transition.
    pub(crate) fn finish(&self, result: ProcessResult<()>) {
        let error = result.err();
        {
            let mut cell = self.cell();
            if cell.terminated || cell.state.is_terminal() {
                return;
            }
            cell.end_time = Some(Utc::now());
            if error.is_none() {
                let code = cell.requested_exit_code.unwrap_or(0);
                cell.state = if code == 0 {
                    ProcessState::Completed
                } else {
                    ProcessState::Failed
                };
                cell.exit_code = Some(code);
            } else {
                cell.state = ProcessState::Failed;
                cell.exit_code = Some(1);
            }
        }
        self.close_input();
        if let Some(error) = error {
            tracing::debug!(pid = self.pid, %error, "process failed");
            self.bus.emit(&ProcessEvent::Error {
                message: error.to_string(),
            });
        }
        self.emit_exit();
    }

    /// Claim the `Running → Terminated` transition. Returns false (and
    /// does nothing) in any other state, making terminate idempotent.
    pub(crate) fn mark_terminated(&self) -> bool {
        let mut cell = self.cell();
        if cell.state != ProcessState::Running {
            return false;
        }
        cell.terminated = true;
        cell.state = ProcessState::Terminated;
        cell.exit_code = Some(-1);
        cell.end_time = Some(Utc::now());
        true
    }

    /// Ask for a specific exit code when `execute` returns success.
    /// A non-zero code maps the terminal state to failed.
    pub fn request_exit_code(&self, code: i32) {
        self.cell().requested_exit_code = Some(code);
    }

    pub(crate) fn emit_exit(&self) {
        let (exit_code, uptime_ms) = {
            let cell = self.cell();
            let uptime = match (cell.start_time, cell.end_time) {
                (Some(start), Some(end)) => (end - start).num_milliseconds(),
                _ => 0,
            };
            (cell.exit_code.unwrap_or(-1), uptime)
        };
        self.bus.emit(&ProcessEvent::Exit {
            pid: self.pid,
            exit_code,
            uptime_ms,
        });
    }

    // -- Input --

    /// Enqueue an input chunk. Only legal while running.
    pub fn write_input(&self, text: impl Into<String>) -> ProcessResult<()> {
        let state = self.state();
        if state != ProcessState::Running {
            return Err(ProcessError::InvalidState {
                expected: ProcessState::Running,
                actual: state,
            });
        }
        let guard = self.lock_input_tx();
        match guard.as_ref() {
            Some(sender) => sender.send(text.into()).map_err(|_| ProcessError::ChannelClosed),
            None => Err(ProcessError::ChannelClosed),
        }
    }

    /// Dequeue the next input chunk, suspending until one arrives.
    /// Returns `None` once the queue is closed (process leaving the
    /// running state); anything still queued at that point is
    /// discarded.
    pub async fn read_input(&self) -> Option<String> {
        self.input_rx.lock().await.recv().await
    }

    pub(crate) fn close_input(&self) {
        self.lock_input_tx().take();
    }

    // -- Output --

    /// Emit a message event carrying stdout text.
    pub fn emit_stdout(&self, text: impl Into<String>) {
        self.bus.emit(&ProcessEvent::Message {
            output: OutputChunk::stdout(text),
        });
    }

    /// Emit a message event carrying stderr text.
    pub fn emit_stderr(&self, text: impl Into<String>) {
        self.bus.emit(&ProcessEvent::Message {
            output: OutputChunk::stderr(text),
        });
    }

    // -- Child spawning --

    /// Wire the channel over which this process's child-spawn requests
    /// reach the container. Called by the container before start.
    pub fn set_spawner(&self, sender: UnboundedSender<SpawnRequest>) {
        *self
            .spawner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(sender);
    }

    /// Request a child process and suspend until it exits.
    pub async fn spawn_child(&self, spec: SpawnSpec) -> ProcessResult<SpawnOutcome> {
        let sender = self
            .spawner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or(ProcessError::ChannelClosed)?;
        let (reply, outcome) = oneshot::channel();
        sender
            .send(SpawnRequest { spec, reply })
            .map_err(|_| ProcessError::ChannelClosed)?;
        outcome.await.map_err(|_| ProcessError::ChannelClosed)
    }

    fn cell(&self) -> std::sync::MutexGuard<'_, StateCell> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_input_tx(&self) -> std::sync::MutexGuard<'_, Option<UnboundedSender<String>>> {
        self.input_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ProcessCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessCore")
            .field("pid", &self.pid)
            .field("parent_pid", &self.parent_pid)
            .field("kind", &self.kind)
            .field("executable_path", &self.executable_path)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
