//! The shell process: interactive loop and one-shot execution.

use std::sync::Arc;

use async_trait::async_trait;

use vessel_process::{Process, ProcessCore, ProcessResult};
use vessel_vfs::VirtualFileSystem;

use crate::builtins::BuiltinRegistry;
use crate::dispatch::run_command_line;
use crate::editor::LineBuffer;
use crate::output::CommandOutput;
use crate::state::ShellState;

const PROMPT: &str = "$ ";
const PROMPT_OSC: &str = "\x1b[32m$ \x1b[0m";

/// An interactive (or one-shot) shell session.
///
/// With arguments — after stripping the `--osc` flag — the shell runs
/// them as a single command line and exits with its code. Without
/// arguments it prompts, edits, and executes until `exit`, Ctrl-D, or
/// termination.
pub struct ShellProcess {
    core: Arc<ProcessCore>,
    vfs: Arc<VirtualFileSystem>,
    osc: bool,
    one_shot: Option<String>,
}

impl ShellProcess {
    /// Build a shell around an already-constructed core.
    #[must_use]
    pub fn new(core: ProcessCore, vfs: Arc<VirtualFileSystem>) -> Arc<Self> {
        let mut args: Vec<String> = core.args().to_vec();
        let osc = args.iter().any(|arg| arg == "--osc");
        args.retain(|arg| arg != "--osc");
        let one_shot = if args.is_empty() {
            None
        } else {
            Some(args.join(" "))
        };
        Arc::new(Self {
            core: Arc::new(core),
            vfs,
            osc,
            one_shot,
        })
    }

    fn prompt(&self) -> &'static str {
        if self.osc { PROMPT_OSC } else { PROMPT }
    }

    fn emit_output(&self, output: &CommandOutput) {
        if !output.stdout.is_empty() {
            self.core.emit_stdout(output.stdout.clone());
        }
        if !output.stderr.is_empty() {
            self.core.emit_stderr(output.stderr.clone());
        }
    }

    /// Interpret one input chunk through the line editor.
    async fn handle_chunk(
        &self,
        registry: &BuiltinRegistry,
        state: &mut ShellState,
        line: &mut LineBuffer,
        chunk: &str,
    ) {
        match chunk {
            // Enter: execute the line and prompt again.
            "\r" => {
                self.core.emit_stdout("\n");
                let command = line.take();
                let output = run_command_line(&self.core, registry, state, &command).await;
                self.emit_output(&output);
                if state.running {
                    self.core.emit_stdout(self.prompt());
                }
            }
            // Backspace (DEL or BS).
            "\u{7f}" | "\u{8}" => {
                if let Some(echo) = line.backspace() {
                    self.core.emit_stdout(echo);
                }
            }
            // Up: back through history.
            "\x1b[A" => {
                if let Some(command) = state.history.up(&line.text()) {
                    self.core.emit_stdout(line.replace(&command));
                }
            }
            // Down: forward through history, ending at the saved live
            // line.
            "\x1b[B" => {
                if let Some(command) = state.history.down() {
                    self.core.emit_stdout(line.replace(&command));
                }
            }
            "\x1b[C" => {
                if let Some(echo) = line.move_right() {
                    self.core.emit_stdout(echo);
                }
            }
            "\x1b[D" => {
                if let Some(echo) = line.move_left() {
                    self.core.emit_stdout(echo);
                }
            }
            // Ctrl-C: abandon the line.
            "\u{3}" => {
                line.take();
                self.core.emit_stdout(format!("^C\n{}", self.prompt()));
            }
            // Ctrl-D on an empty line: leave the session.
            "\u{4}" => {
                if line.is_empty() {
                    self.core.emit_stdout("exit\n");
                    state.running = false;
                    state.exit_code = 0;
                }
            }
            // Printable input (single keystrokes or pasted runs).
            // Unrecognized escape sequences are dropped whole.
            _ => {
                if chunk.starts_with('\x1b') {
                    return;
                }
                for character in chunk.chars().filter(|c| !c.is_control()) {
                    self.core.emit_stdout(line.insert(character));
                }
            }
        }
    }
}

#[async_trait]
impl Process for ShellProcess {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn execute(&self) -> ProcessResult<()> {
        let mut state = ShellState::new(
            self.vfs.clone(),
            self.core.cwd(),
            self.core.env().clone(),
        );
        let registry = BuiltinRegistry::with_defaults();

        if let Some(line) = &self.one_shot {
            tracing::debug!(pid = self.core.pid(), command = %line, "one-shot shell");
            let output = run_command_line(&self.core, &registry, &mut state, line).await;
            self.emit_output(&output);
            self.core.request_exit_code(output.exit_code);
            return Ok(());
        }

        tracing::debug!(pid = self.core.pid(), "interactive shell");
        let mut line = LineBuffer::new();
        self.core.emit_stdout(self.prompt());
        while state.running {
            let Some(chunk) = self.core.read_input().await else {
                break;
            };
            self.handle_chunk(&registry, &mut state, &mut line, &chunk)
                .await;
        }
        self.core.request_exit_code(state.exit_code);
        Ok(())
    }
}
