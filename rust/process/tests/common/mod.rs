#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vessel_process::{
    EventKind, Process, ProcessCore, ProcessError, ProcessEvent, ProcessKind, ProcessResult,
    SpawnSpec,
};

/// What a [`StubProcess`] does when executed.
pub enum Behavior {
    /// Return immediately with success.
    Complete,
    /// Fail with the given reason.
    Fail(String),
    /// Echo every input chunk to stdout until the queue closes or a
    /// `"stop"` chunk arrives.
    EchoInput,
    /// Sleep for the duration, then succeed.
    Sleep(Duration),
}

/// A minimal process for exercising the lifecycle driver.
pub struct StubProcess {
    core: ProcessCore,
    behavior: Behavior,
}

impl StubProcess {
    pub fn new(pid: u32, behavior: Behavior) -> Arc<Self> {
        Self::with_parent(pid, None, behavior)
    }

    pub fn with_parent(pid: u32, parent: Option<u32>, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            core: ProcessCore::new(pid, parent, ProcessKind::Script, SpawnSpec::new("stub")),
            behavior,
        })
    }
}

#[async_trait]
impl Process for StubProcess {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn execute(&self) -> ProcessResult<()> {
        match &self.behavior {
            Behavior::Complete => Ok(()),
            Behavior::Fail(reason) => Err(ProcessError::SpawnFailed {
                reason: reason.clone(),
            }),
            Behavior::EchoInput => {
                while let Some(chunk) = self.core.read_input().await {
                    if chunk == "stop" {
                        break;
                    }
                    self.core.emit_stdout(chunk);
                }
                Ok(())
            }
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
        }
    }
}

/// Record every event published on a core's bus.
pub fn record_events(core: &ProcessCore) -> Arc<Mutex<Vec<ProcessEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        EventKind::Start,
        EventKind::Message,
        EventKind::Error,
        EventKind::Exit,
    ] {
        let sink = events.clone();
        core.bus().on(kind, move |event| {
            sink.lock().expect("not poisoned").push(event.clone());
        });
    }
    events
}
