//! The `vessel` command line interface.
//!
//! Hosts a [`vessel_container::Container`] on the local terminal:
//! interactive shell sessions by default, one-shot script and command
//! execution via subcommands.

pub mod cli;
pub mod logging;
mod terminal;
mod worker;

pub use cli::{Cli, Command};
