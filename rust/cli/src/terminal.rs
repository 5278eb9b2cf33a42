//! Bridging the host terminal and a container-hosted shell.

use std::io::Write;
use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use eyre::Result;
use futures::StreamExt;

use vessel_container::{Container, OutputSubscription};
use vessel_process::{Process, wait_exit};

/// Restores the terminal mode on drop so panics and early returns
/// cannot leave the terminal raw.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Subscribe the host stdout to all container output.
///
/// Keep the returned subscription alive while output should flow.
pub fn print_output(container: &Container) -> OutputSubscription {
    container.on_output(|_pid, chunk| {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(chunk.text.as_bytes());
        let _ = stdout.flush();
    })
}

/// Put the terminal in raw mode and pump keys into the shell until it
/// exits. Returns the shell's exit code.
pub async fn attach(container: &Container, shell: &Arc<dyn Process>) -> Result<i32> {
    let _guard = RawModeGuard::enable()?;

    // Raw mode needs explicit carriage returns.
    let subscription = container.on_output(|_pid, chunk| {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(chunk.text.replace('\n', "\r\n").as_bytes());
        let _ = stdout.flush();
    });

    let mut events = EventStream::new();
    let exit = wait_exit(shell);
    tokio::pin!(exit);

    let code = loop {
        tokio::select! {
            code = &mut exit => break code,
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if let Some(chunk) = encode_key(&key) {
                            // A failed write means the shell has left
                            // the running state; the exit arm ends the
                            // loop.
                            let _ = shell.core().write_input(chunk);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => tracing::warn!(%error, "terminal event error"),
                    None => break wait_exit(shell).await,
                }
            }
        }
    };

    subscription.unsubscribe();
    Ok(code)
}

/// Translate a key event into the input chunk the shell's line editor
/// understands.
fn encode_key(key: &KeyEvent) -> Option<String> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some("\u{3}".to_string()),
            KeyCode::Char('d') => Some("\u{4}".to_string()),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(character) => Some(character.to_string()),
        KeyCode::Enter => Some("\r".to_string()),
        KeyCode::Backspace => Some("\u{7f}".to_string()),
        KeyCode::Up => Some("\x1b[A".to_string()),
        KeyCode::Down => Some("\x1b[B".to_string()),
        KeyCode::Right => Some("\x1b[C".to_string()),
        KeyCode::Left => Some("\x1b[D".to_string()),
        _ => None,
    }
}
