//! Command execution: builtins first, then PATH, shebangs, scripts.

use vessel_process::{ProcessCore, SpawnSpec};
use vessel_vfs::path;

use crate::builtins::BuiltinRegistry;
use crate::output::CommandOutput;
use crate::parser::{ParsedCommand, RedirectMode, Redirection, parse_command_line};
use crate::state::ShellState;

/// Execute one command line: record it in history, parse, dispatch,
/// then apply redirections to the captured stdout.
pub(crate) async fn run_command_line(
    core: &ProcessCore,
    registry: &BuiltinRegistry,
    state: &mut ShellState,
    line: &str,
) -> CommandOutput {
    state.history.push(line);

    let parsed = match parse_command_line(line) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return CommandOutput::success(),
        Err(error) => return CommandOutput::failure(error.to_string()),
    };

    let mut output = dispatch(core, registry, state, &parsed).await;

    // Redirections consume stdout only after a successful command, so
    // a failure neither touches the targets nor loses its stderr.
    if output.is_success() && !parsed.redirections.is_empty() {
        if let Err(message) = apply_redirections(state, &parsed.redirections, &output.stdout) {
            return CommandOutput::failure(message);
        }
        output.stdout.clear();
    }
    output
}

async fn dispatch(
    core: &ProcessCore,
    registry: &BuiltinRegistry,
    state: &mut ShellState,
    command: &ParsedCommand,
) -> CommandOutput {
    let name = command.name.as_str();
    let args = &command.args;

    // 1. Builtins shadow everything else.
    if let Some(builtin) = registry.get(name) {
        tracing::trace!(command = name, "dispatching builtin");
        return builtin.execute(state, args);
    }

    // 2. PATH lookup: the first component holding the command wins.
    if let Some(path_var) = state.env.get("PATH").cloned() {
        for dir in path_var.split(':').filter(|dir| !dir.is_empty()) {
            let candidate = path::join(dir, name);
            if state.vfs.is_file(&candidate) {
                return spawn_child(core, state, candidate, args.clone()).await;
            }
        }
    }

    // 3. A shebang file names its own interpreter.
    let direct = state.resolve(name);
    if state.vfs.is_file(&direct) {
        if let Ok(source) = state.vfs.read_to_string(&direct) {
            if let Some(interpreter) = shebang_interpreter(&source) {
                let mut child_args = vec![direct.clone()];
                child_args.extend(args.iter().cloned());
                return spawn_child(core, state, interpreter, child_args).await;
            }
        }
    }

    // 4. Scripts run in the embedded interpreter.
    if name == "node" || name.ends_with(".js") {
        let executable = if name == "node" {
            name.to_string()
        } else {
            direct
        };
        return spawn_child(core, state, executable, args.clone()).await;
    }

    CommandOutput::failure(format!("Command not found: {name}")).with_code(127)
}

/// Spawn a child through the container and wait for its exit.
async fn spawn_child(
    core: &ProcessCore,
    state: &ShellState,
    executable: String,
    args: Vec<String>,
) -> CommandOutput {
    tracing::debug!(%executable, "spawning child process");
    let spec = SpawnSpec {
        executable,
        args,
        cwd: state.cwd.clone(),
        env: state.env.clone(),
    };
    match core.spawn_child(spec).await {
        Ok(outcome) => CommandOutput {
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            exit_code: outcome.exit_code,
        },
        Err(error) => CommandOutput::failure(error.to_string()),
    }
}

/// The interpreter named by a `#!/usr/bin/env <name> [args]` first
/// line, if any.
fn shebang_interpreter(source: &str) -> Option<String> {
    let first_line = source.lines().next()?;
    let rest = first_line.strip_prefix("#!")?.trim();
    let mut words = rest.split_whitespace();
    if words.next()? != "/usr/bin/env" {
        return None;
    }
    words.next().map(ToString::to_string)
}

/// Write or append the captured stdout to each target, in order.
fn apply_redirections(
    state: &ShellState,
    redirections: &[Redirection],
    stdout: &str,
) -> Result<(), String> {
    for redirection in redirections {
        let target = state.resolve(&redirection.target);
        let result = match redirection.mode {
            RedirectMode::Overwrite => state.vfs.write_file(&target, stdout.as_bytes()),
            RedirectMode::Append => {
                let mut contents = match state.vfs.read_file(&target) {
                    Ok(existing) => existing,
                    Err(vessel_vfs::FsError::NotFound { .. }) => Vec::new(),
                    Err(error) => return Err(format!("{target}: {error}")),
                };
                contents.extend_from_slice(stdout.as_bytes());
                state.vfs.write_file(&target, contents)
            }
        };
        if let Err(error) = result {
            return Err(format!("{target}: {error}"));
        }
    }
    Ok(())
}
