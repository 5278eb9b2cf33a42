#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use vessel_process::{
    EventKind, Executor, Process, ProcessEvent, SpawnSpec, run,
};
use vessel_script::ScriptExecutor;
use vessel_vfs::VirtualFileSystem;

/// Populate a VFS, spawn the executable through the script executor,
/// run it to completion, and return the process with every event it
/// published.
pub async fn run_script(
    files: &[(&str, &str)],
    executable: &str,
    args: &[&str],
) -> (Arc<dyn Process>, Vec<ProcessEvent>) {
    let vfs = Arc::new(VirtualFileSystem::new());
    for (path, content) in files {
        vfs.write_file(path, *content).expect("write");
    }

    let executor = ScriptExecutor::new(vfs);
    let spec = SpawnSpec::new(executable)
        .with_args(args.iter().map(ToString::to_string).collect());
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

    run(process.clone()).await;

    let events = events.lock().expect("not poisoned").clone();
    (process, events)
}

/// Concatenated stdout text from a recorded event stream.
pub fn stdout_of(events: &[ProcessEvent]) -> String {
    collect_stream(events, vessel_process::OutputStream::Stdout)
}

/// Concatenated stderr text from a recorded event stream.
pub fn stderr_of(events: &[ProcessEvent]) -> String {
    collect_stream(events, vessel_process::OutputStream::Stderr)
}

fn collect_stream(events: &[ProcessEvent], stream: vessel_process::OutputStream) -> String {
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
