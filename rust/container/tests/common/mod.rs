#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use vessel_process::Process;

/// Wait (with a generous deadline) for a process to reach a terminal
/// state.
pub async fn wait_for_exit(process: &Arc<dyn Process>) {
    for _ in 0..2000 {
        if process.core().state().is_terminal() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("process {} never exited", process.core().pid());
}

/// Wait until `predicate` returns true.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never became true");
}

/// A shared buffer collecting all container output text.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    text: Arc<Mutex<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, text: &str) {
        self.text
            .lock()
            .expect("not poisoned")
            .push_str(text);
    }

    pub fn contents(&self) -> String {
        self.text.lock().expect("not poisoned").clone()
    }
}
