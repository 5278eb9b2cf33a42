//! Spawn specifications and child-spawn plumbing.
//!
//! A running process asks for a child by sending a [`SpawnRequest`]
//! down the spawner channel its core was wired with. The container is
//! the sole consumer: it builds and starts the child, accumulates its
//! output, and answers with a [`SpawnOutcome`] once the child exits.

use std::collections::BTreeMap;

use tokio::sync::oneshot;

/// What to launch: executable identifier plus arguments, working
/// directory, and environment.
#[derive(Debug, Clone, Default)]
pub struct SpawnSpec {
    pub executable: String,
    pub args: Vec<String>,
    pub cwd: String,
    pub env: BTreeMap<String, String>,
}

impl SpawnSpec {
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            cwd: "/".to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// The result of running a child to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl SpawnOutcome {
    /// Whether the child exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// A failed outcome with `message` on stderr and exit code 1.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            exit_code: 1,
            ..Default::default()
        }
    }
}

/// A request to spawn a child, answered once the child exits.
#[derive(Debug)]
pub struct SpawnRequest {
    pub spec: SpawnSpec,
    pub reply: oneshot::Sender<SpawnOutcome>,
}
