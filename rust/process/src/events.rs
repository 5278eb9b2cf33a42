//! Per-process event bus.
//!
//! Each process owns one [`EventBus`]; buses are never shared between
//! processes. Listeners fire synchronously, in registration order, and
//! emission snapshots the listener list so a listener may register or
//! remove listeners without affecting the emit in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use strum::Display;

use crate::types::Pid;

/// Which output stream a message chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A chunk of process output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputChunk {
    #[must_use]
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }
}

/// An event published on a process's bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ProcessEvent {
    /// The process transitioned from created to running.
    Start { pid: Pid },
    /// The process produced output.
    Message { output: OutputChunk },
    /// The process hit an error (always followed by `Exit`).
    Error { message: String },
    /// The process reached a terminal state. Emitted exactly once.
    Exit {
        pid: Pid,
        exit_code: i32,
        uptime_ms: i64,
    },
}

impl ProcessEvent {
    /// The kind used for listener registration.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start { .. } => EventKind::Start,
            Self::Message { .. } => EventKind::Message,
            Self::Error { .. } => EventKind::Error,
            Self::Exit { .. } => EventKind::Exit,
        }
    }
}

/// Event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventKind {
    Start,
    Message,
    Error,
    Exit,
}

/// Handle returned by [`EventBus::on`]; pass to [`EventBus::off`] to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ProcessEvent) + Send + Sync>;

/// Above this many listeners for a single event kind a warning is
/// logged (once per bus); registration itself is unbounded.
const LISTENER_SOFT_CAP: usize = 100;

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    cap_warned: bool,
}

/// Ordered, synchronous publish/subscribe for process events.
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`. Listeners fire in registration
    /// order; a listener registered during an emit first fires on the
    /// next emit.
    pub fn on(&self, kind: EventKind, listener: impl Fn(&ProcessEvent) + Send + Sync + 'static) -> ListenerId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        let list = state.listeners.entry(kind).or_default();
        list.push((id, Arc::new(listener)));
        let len = list.len();
        if len > LISTENER_SOFT_CAP && !state.cap_warned {
            state.cap_warned = true;
            tracing::warn!(%kind, count = len, "listener count above soft cap");
        }
        id
    }

    /// Remove a previously registered listener. Unknown ids are a
    /// no-op.
    pub fn off(&self, id: ListenerId) {
        let mut state = self.lock();
        for list in state.listeners.values_mut() {
            list.retain(|(listener_id, _)| *listener_id != id);
        }
    }

    /// Deliver `event` to every listener registered for its kind, in
    /// registration order.
    pub fn emit(&self, event: &ProcessEvent) {
        let snapshot: Vec<Listener> = {
            let state = self.lock();
            state
                .listeners
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };
        for listener in snapshot {
            listener(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("EventBus")
            .field(
                "listeners",
                &state
                    .listeners
                    .iter()
                    .map(|(kind, list)| (kind, list.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
