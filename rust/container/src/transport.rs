//! Worker transport protocol.
//!
//! When the container is hosted behind a worker boundary, requests and
//! responses cross it as tagged JSON messages. The message names here
//! are part of the wire contract and must not change.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use vessel_process::{OutputStream, Pid, ProcessEvent};

use crate::container::{Container, ContainerStats, OutputSubscription, SpawnOptions};

/// A request from the host to the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostRequest {
    Initialize,
    Spawn {
        executable: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        parent_pid: Option<Pid>,
    },
    WriteInput {
        pid: Pid,
        input: String,
    },
    Terminate {
        pid: Pid,
    },
    Dispose,
    GetStats,
    WriteFile {
        path: String,
        content: String,
    },
    ReadFile {
        path: String,
    },
    DeleteFile {
        path: String,
    },
    ListFiles,
    CreateDirectory {
        path: String,
    },
    ListDirectory {
        path: String,
    },
    DeleteDirectory {
        path: String,
    },
}

/// A response (or pushed notification) from the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostResponse {
    Initialized,
    Spawned {
        pid: Pid,
    },
    InputWritten {
        pid: Pid,
    },
    Terminated {
        pid: Pid,
    },
    /// Pushed whenever any process emits output.
    ProcessOutput {
        pid: Pid,
        stream: String,
        text: String,
    },
    /// Pushed whenever any process exits.
    ProcessExit {
        pid: Pid,
        exit_code: i32,
    },
    /// Pushed whenever any process reports an error.
    ProcessError {
        pid: Pid,
        message: String,
    },
    Stats {
        #[serde(flatten)]
        stats: StatsBody,
    },
    Disposed,
    Error {
        message: String,
    },
    FileWritten {
        path: String,
    },
    FileContents {
        path: String,
        content: String,
    },
    FileDeleted {
        path: String,
    },
    FileList {
        files: Vec<String>,
    },
    DirectoryCreated {
        path: String,
    },
    DirectoryListing {
        path: String,
        entries: Vec<String>,
    },
    DirectoryDeleted {
        path: String,
    },
}

/// Serializable stats payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsBody {
    pub processes: usize,
    pub running: usize,
    pub files: usize,
}

impl From<ContainerStats> for StatsBody {
    fn from(stats: ContainerStats) -> Self {
        Self {
            processes: stats.processes,
            running: stats.running,
            files: stats.files,
        }
    }
}

/// Apply one request to the container and produce its response.
///
/// Failures become `error` responses; the transport itself never
/// raises.
pub async fn dispatch(container: &Container, request: HostRequest) -> HostResponse {
    match request {
        HostRequest::Initialize => HostResponse::Initialized,

        HostRequest::Spawn {
            executable,
            args,
            parent_pid,
        } => match container.spawn(&executable, args, parent_pid, SpawnOptions::default()) {
            Ok(process) => HostResponse::Spawned {
                pid: process.core().pid(),
            },
            Err(error) => error_response(error),
        },

        HostRequest::WriteInput { pid, input } => match container.process(pid) {
            Some(process) => match process.core().write_input(input) {
                Ok(()) => HostResponse::InputWritten { pid },
                Err(error) => error_response(error),
            },
            None => HostResponse::Error {
                message: format!("no such process: {pid}"),
            },
        },

        HostRequest::Terminate { pid } => {
            container.terminate_tree(pid).await;
            HostResponse::Terminated { pid }
        }

        HostRequest::Dispose => {
            container.dispose().await;
            HostResponse::Disposed
        }

        HostRequest::GetStats => HostResponse::Stats {
            stats: container.stats().into(),
        },

        HostRequest::WriteFile { path, content } => {
            match container.write_file(&path, content.into_bytes()) {
                Ok(()) => HostResponse::FileWritten { path },
                Err(error) => error_response(error),
            }
        }

        HostRequest::ReadFile { path } => match container.vfs().read_to_string(&path) {
            Ok(content) => HostResponse::FileContents { path, content },
            Err(error) => error_response(error),
        },

        HostRequest::DeleteFile { path } => match container.delete_file(&path) {
            Ok(()) => HostResponse::FileDeleted { path },
            Err(error) => error_response(error),
        },

        HostRequest::ListFiles => HostResponse::FileList {
            files: container.list_files(),
        },

        HostRequest::CreateDirectory { path } => match container.create_directory(&path) {
            Ok(()) => HostResponse::DirectoryCreated { path },
            Err(error) => error_response(error),
        },

        HostRequest::ListDirectory { path } => match container.list_directory(&path) {
            Ok(entries) => HostResponse::DirectoryListing { path, entries },
            Err(error) => error_response(error),
        },

        HostRequest::DeleteDirectory { path } => match container.delete_directory(&path) {
            Ok(()) => HostResponse::DirectoryDeleted { path },
            Err(error) => error_response(error),
        },
    }
}

/// Subscribe to the container's event stream as pushed responses.
///
/// Keep the returned subscription alive for as long as the stream is
/// consumed.
#[must_use]
pub fn event_stream(
    container: &Container,
) -> (UnboundedReceiver<HostResponse>, OutputSubscription) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let subscription = container.on_event(move |pid, event| {
        let response = match event {
            ProcessEvent::Message { output } => HostResponse::ProcessOutput {
                pid,
                stream: match output.stream {
                    OutputStream::Stdout => "stdout".to_string(),
                    OutputStream::Stderr => "stderr".to_string(),
                },
                text: output.text.clone(),
            },
            ProcessEvent::Exit { exit_code, .. } => HostResponse::ProcessExit {
                pid,
                exit_code: *exit_code,
            },
            ProcessEvent::Error { message } => HostResponse::ProcessError {
                pid,
                message: message.clone(),
            },
            ProcessEvent::Start { .. } => return,
        };
        let _ = sender.send(response);
    });
    (receiver, subscription)
}

fn error_response(error: impl std::fmt::Display) -> HostResponse {
    HostResponse::Error {
        message: error.to_string(),
    }
}
