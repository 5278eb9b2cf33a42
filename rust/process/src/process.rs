//! The process trait and lifecycle driver.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::core::ProcessCore;
use crate::error::ProcessResult;
use crate::events::{EventKind, ProcessEvent};

/// A runnable process inside the container.
///
/// Implementations provide `execute` (the program body) and may hook
/// `on_terminate` to release resources when cancelled. Everything
/// else — state transitions, event emission, input plumbing — lives on
/// the shared [`ProcessCore`].
#[async_trait]
pub trait Process: Send + Sync {
    /// The shared core carrying identity, state, and the event bus.
    fn core(&self) -> &ProcessCore;

    /// Run the program to completion. An `Err` maps to the failed
    /// state with exit code 1.
    async fn execute(&self) -> ProcessResult<()>;

    /// Hook invoked on termination, before the exit event. Used to
    /// release resources an in-flight `execute` may be holding.
    async fn on_terminate(&self) {}

    /// Cancel the process. Legal only while running; in any other
    /// state this is a no-op, so calling it twice (or concurrently
    /// with normal completion) is safe. Never raises.
    async fn terminate(&self) {
        if self.core().mark_terminated() {
            tracing::debug!(pid = self.core().pid(), "process terminated");
            self.on_terminate().await;
            self.core().close_input();
            self.core().emit_exit();
        }
    }
}

impl std::fmt::Debug for dyn Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process").field("pid", &self.core().pid()).finish()
    }
}

/// Drive a process through its lifecycle: transition to running, emit
/// the start event, execute, then record the outcome and emit exit.
///
/// Callers that need the final state must observe the exit event (or
/// poll the core), not the completion of this future: a terminate that
/// races normal completion claims the terminal transition for itself.
pub async fn run(process: Arc<dyn Process>) {
    let started = process.core().begin();
    match started {
        Ok(()) => {
            let result = process.execute().await;
            process.core().finish(result);
        }
        Err(error) => {
            tracing::warn!(
                pid = process.core().pid(),
                %error,
                "refusing to run process twice"
            );
        }
    }
}

/// Suspend until the process reaches a terminal state and return its
/// exit code. Safe against the process having already exited.
pub async fn wait_exit(process: &Arc<dyn Process>) -> i32 {
    let (sender, receiver) = oneshot::channel();
    let slot = Mutex::new(Some(sender));
    let listener = process.core().bus().on(EventKind::Exit, move |event| {
        if let ProcessEvent::Exit { exit_code, .. } = event {
            if let Some(sender) = slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .take()
            {
                let _ = sender.send(*exit_code);
            }
        }
    });

    if process.core().state().is_terminal() {
        process.core().bus().off(listener);
        return process.core().exit_code().unwrap_or(-1);
    }

    let code = receiver
        .await
        .unwrap_or_else(|_| process.core().exit_code().unwrap_or(-1));
    process.core().bus().off(listener);
    code
}
