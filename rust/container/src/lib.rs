//! The container façade.
//!
//! A [`Container`] composes the virtual file system, the process
//! manager, and the executor registry into one runtime: it spawns
//! shells and scripts, services child-spawn requests from running
//! processes, forwards output to global subscribers, and answers the
//! worker transport protocol in [`transport`].

mod container;
pub mod transport;

pub use container::{Container, ContainerStats, OutputSubscription, SpawnOptions};
