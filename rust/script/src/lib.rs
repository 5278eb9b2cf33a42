//! Script processes backed by an embedded QuickJS interpreter.
//!
//! Each [`ScriptProcess`] owns a private `rquickjs` runtime for the
//! duration of its execution: sources and module imports load from the
//! virtual file system, `console.log`/`console.error` feed the process
//! event bus, and termination interrupts the interpreter mid-flight.
//! The interpreter never outlives `execute` — resources are released
//! on completion, failure, and termination alike.

mod console;
mod executor;
mod loader;
mod process;

pub use executor::ScriptExecutor;
pub use process::ScriptProcess;
