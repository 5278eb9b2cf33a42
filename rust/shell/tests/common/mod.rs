#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use vessel_process::{
    EventKind, Executor, Process, ProcessEvent, ProcessState, SpawnSpec, run,
};
use vessel_shell::ShellExecutor;
use vessel_vfs::VirtualFileSystem;

/// A running interactive shell plus everything it has emitted.
pub struct ShellSession {
    pub vfs: Arc<VirtualFileSystem>,
    pub process: Arc<dyn Process>,
    events: Arc<Mutex<Vec<ProcessEvent>>>,
    task: JoinHandle<()>,
}

impl ShellSession {
    /// Spawn `sh` with the given arguments and wait until it is
    /// running (interactive mode blocks on input immediately).
    pub async fn start(args: &[&str]) -> Self {
        let vfs = Arc::new(VirtualFileSystem::new());
        Self::start_with_vfs(vfs, args).await
    }

    pub async fn start_with_vfs(vfs: Arc<VirtualFileSystem>, args: &[&str]) -> Self {
        let executor = ShellExecutor::new(vfs.clone());
        let spec =
            SpawnSpec::new("sh").with_args(args.iter().map(ToString::to_string).collect());
        let process = executor.make(spec, 1, None).expect("make");

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::Start,
            EventKind::Message,
            EventKind::Error,
            EventKind::Exit,
        ] {
            let sink = events.clone();
            process.core().bus().on(kind, move |event| {
                sink.lock().expect("not poisoned").push(event.clone());
            });
        }

        let task = tokio::spawn(run(process.clone()));
        while process.core().state() == ProcessState::Created {
            tokio::task::yield_now().await;
        }

        Self {
            vfs,
            process,
            events,
            task,
        }
    }

    /// Queue an input chunk.
    pub fn send(&self, chunk: &str) {
        self.process.core().write_input(chunk).expect("write input");
    }

    /// Queue a command line followed by Enter.
    pub fn send_line(&self, line: &str) {
        self.send(line);
        self.send("\r");
    }

    /// Ask the shell to exit and wait for the process to finish.
    pub async fn finish(self) -> (Arc<dyn Process>, Vec<ProcessEvent>) {
        let _ = self.process.core().write_input("exit");
        let _ = self.process.core().write_input("\r");
        self.task.await.expect("shell task");
        let events = self.events.lock().expect("not poisoned").clone();
        (self.process, events)
    }

    /// Wait for the process to finish without sending anything.
    pub async fn wait(self) -> (Arc<dyn Process>, Vec<ProcessEvent>) {
        self.task.await.expect("shell task");
        let events = self.events.lock().expect("not poisoned").clone();
        (self.process, events)
    }
}

/// Run a one-shot shell command line to completion.
pub async fn one_shot(
    vfs: Arc<VirtualFileSystem>,
    args: &[&str],
) -> (Arc<dyn Process>, Vec<ProcessEvent>) {
    let executor = ShellExecutor::new(vfs);
    let spec = SpawnSpec::new("sh").with_args(args.iter().map(ToString::to_string).collect());
    let process = executor.make(spec, 1, None).expect("make");

    let events = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::Message, EventKind::Exit] {
        let sink = events.clone();
        process.core().bus().on(kind, move |event| {
            sink.lock().expect("not poisoned").push(event.clone());
        });
    }

    run(process.clone()).await;
    let events = events.lock().expect("not poisoned").clone();
    (process, events)
}

/// Concatenated stdout from an event stream.
pub fn stdout_of(events: &[ProcessEvent]) -> String {
    stream_of(events, vessel_process::OutputStream::Stdout)
}

/// Concatenated stderr from an event stream.
pub fn stderr_of(events: &[ProcessEvent]) -> String {
    stream_of(events, vessel_process::OutputStream::Stderr)
}

fn stream_of(events: &[ProcessEvent], stream: vessel_process::OutputStream) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            ProcessEvent::Message { output } if output.stream == stream => {
                Some(output.text.clone())
            }
            _ => None,
        })
        .collect()
}
