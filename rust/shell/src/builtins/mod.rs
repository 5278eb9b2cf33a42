//! Builtin commands and their registry.
//!
//! A builtin exposes two operations: `help` (a one-line summary) and
//! `execute`. The registry maps names to boxed trait objects; lookup
//! misses produce the conventional `Command not found` with exit
//! code 127.

mod fs;
mod session;

use std::collections::HashMap;

pub use fs::{Cat, Cp, Ls, Mkdir, Mv, Rm, Rmdir, Touch};
pub use session::{Cd, Echo, Env, Exit, Help, HistoryCommand, Pwd};

use crate::output::CommandOutput;
use crate::state::ShellState;

/// A command implemented by the shell itself, not spawned.
pub trait Builtin: Send + Sync {
    /// The command name users type.
    fn name(&self) -> &'static str;

    /// One-line usage summary.
    fn help(&self) -> &'static str;

    /// Run the command against the session state.
    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput;
}

/// Maps command names to builtin implementations.
pub struct BuiltinRegistry {
    commands: HashMap<&'static str, Box<dyn Builtin>>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BuiltinRegistry {
    /// An empty registry with no commands.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// A registry pre-loaded with the full builtin set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let commands: Vec<Box<dyn Builtin>> = vec![
            Box::new(Ls),
            Box::new(Cat),
            Box::new(Mkdir),
            Box::new(Rm),
            Box::new(Rmdir),
            Box::new(Touch),
            Box::new(Cp),
            Box::new(Mv),
            Box::new(Pwd),
            Box::new(Cd),
            Box::new(Echo),
            Box::new(Exit),
            Box::new(HistoryCommand),
            Box::new(Env),
        ];
        let mut summaries: Vec<(String, String)> = commands
            .iter()
            .map(|command| (command.name().to_string(), command.help().to_string()))
            .collect();
        summaries.push(("help".to_string(), Help::SUMMARY.to_string()));
        summaries.sort();

        for command in commands {
            registry.register(command);
        }
        registry.register(Box::new(Help::new(summaries)));
        registry
    }

    /// Register a builtin, replacing any previous one with the same
    /// name.
    pub fn register(&mut self, builtin: Box<dyn Builtin>) {
        self.commands.insert(builtin.name(), builtin);
    }

    /// Look up a builtin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.commands.get(name).map(Box::as_ref)
    }

    /// Whether a builtin with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
