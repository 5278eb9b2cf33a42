//! Serving the worker transport over standard I/O.
//!
//! Requests arrive as JSON lines on stdin; responses and pushed
//! process events leave as JSON lines on stdout. A `dispose` request
//! ends the session.

use eyre::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use vessel_container::Container;
use vessel_container::transport::{self, HostRequest, HostResponse};

/// Run a container as a worker on stdin/stdout until the stream ends
/// or the host disposes it.
pub async fn serve() -> Result<()> {
    let container = Container::new();
    let (outbound, mut responses) = mpsc::unbounded_channel::<HostResponse>();

    // Replies and pushed events share stdout through a single writer
    // so lines never interleave.
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = responses.recv().await {
            match serde_json::to_string(&response) {
                Ok(line) => {
                    if stdout.write_all(line.as_bytes()).await.is_err()
                        || stdout.write_all(b"\n").await.is_err()
                    {
                        break;
                    }
                    let _ = stdout.flush().await;
                }
                Err(error) => tracing::error!(%error, "unserializable response"),
            }
        }
    });

    let (mut events, _subscription) = transport::event_stream(&container);
    let pusher = {
        let outbound = outbound.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if outbound.send(event).is_err() {
                    break;
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<HostRequest>(line) {
            Ok(request) => transport::dispatch(&container, request).await,
            Err(error) => HostResponse::Error {
                message: format!("invalid request: {error}"),
            },
        };
        let done = matches!(response, HostResponse::Disposed);
        if outbound.send(response).is_err() || done {
            break;
        }
    }

    container.dispose().await;
    pusher.abort();
    drop(outbound);
    let _ = writer.await;
    Ok(())
}
