//! Mutable session state shared by the loop and the builtins.

use std::collections::BTreeMap;
use std::sync::Arc;

use vessel_vfs::{VirtualFileSystem, path};

use crate::history::History;

/// Everything a command can observe or change about the session:
/// the file system, working directory, environment, history, and the
/// loop's liveness.
pub struct ShellState {
    pub vfs: Arc<VirtualFileSystem>,
    pub cwd: String,
    pub env: BTreeMap<String, String>,
    pub history: History,
    /// The interactive loop runs while this is true; `exit` (and
    /// Ctrl-D) clear it.
    pub running: bool,
    /// The code the shell process reports when the loop stops.
    pub exit_code: i32,
}

impl ShellState {
    /// Build session state from the spawn's cwd and environment.
    /// An empty environment gets the standard defaults.
    #[must_use]
    pub fn new(vfs: Arc<VirtualFileSystem>, cwd: &str, env: BTreeMap<String, String>) -> Self {
        let cwd = path::normalize(cwd);
        let mut env = env;
        if env.is_empty() {
            env.insert("PATH".to_string(), "/bin:/usr/bin".to_string());
            env.insert("HOME".to_string(), "/home".to_string());
            env.insert("PWD".to_string(), cwd.clone());
        }
        Self {
            vfs,
            cwd,
            env,
            history: History::default(),
            running: true,
            exit_code: 0,
        }
    }

    /// Resolve a user-supplied path against the working directory.
    #[must_use]
    pub fn resolve(&self, target: &str) -> String {
        path::resolve(&self.cwd, target)
    }

    /// Change the working directory, keeping `PWD` in sync.
    pub fn change_directory(&mut self, target: String) {
        self.env.insert("PWD".to_string(), target.clone());
        self.cwd = target;
    }
}
