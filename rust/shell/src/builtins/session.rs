//! Session and environment builtins.

use itertools::Itertools;

use super::Builtin;
use crate::output::CommandOutput;
use crate::state::ShellState;

/// `pwd` — print the working directory.
pub struct Pwd;

impl Builtin for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn help(&self) -> &'static str {
        "print the working directory"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> CommandOutput {
        CommandOutput::stdout(format!("{}\n", state.cwd))
    }
}

/// `cd [path]` — change the working directory (`HOME` by default).
pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn help(&self) -> &'static str {
        "change the working directory"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let target = match args.first() {
            Some(path) => state.resolve(path),
            None => state.env.get("HOME").cloned().unwrap_or_else(|| "/".to_string()),
        };
        if state.vfs.is_directory(&target) {
            state.change_directory(target);
            CommandOutput::success()
        } else {
            CommandOutput::failure(format!("cd: not a directory: {target}"))
        }
    }
}

/// `echo args…` — print arguments joined with spaces.
pub struct Echo;

impl Builtin for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn help(&self) -> &'static str {
        "print arguments"
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> CommandOutput {
        CommandOutput::stdout(format!("{}\n", args.iter().join(" ")))
    }
}

/// `exit [code]` — stop the shell loop.
pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn help(&self) -> &'static str {
        "exit the shell"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let code = match args.first() {
            None => 0,
            Some(arg) => match arg.parse::<i32>() {
                Ok(code) => code,
                Err(_) => {
                    state.running = false;
                    state.exit_code = 2;
                    return CommandOutput::failure(format!(
                        "exit: {arg}: numeric argument required"
                    ))
                    .with_code(2);
                }
            },
        };
        state.running = false;
        state.exit_code = code;
        CommandOutput::success().with_code(code)
    }
}

/// `history` — dump the timestamped command history.
pub struct HistoryCommand;

impl Builtin for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn help(&self) -> &'static str {
        "show command history"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> CommandOutput {
        let stdout: String = state
            .history
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                format!(
                    "{:5}  {}  {}\n",
                    index + 1,
                    entry.time.format("%Y-%m-%d %H:%M:%S"),
                    entry.command
                )
            })
            .collect();
        CommandOutput::stdout(stdout)
    }
}

/// `env` — print the environment, one `NAME=value` per line.
pub struct Env;

impl Builtin for Env {
    fn name(&self) -> &'static str {
        "env"
    }

    fn help(&self) -> &'static str {
        "print the environment"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> CommandOutput {
        let stdout: String = state
            .env
            .iter()
            .map(|(name, value)| format!("{name}={value}\n"))
            .collect();
        CommandOutput::stdout(stdout)
    }
}

/// `help` — list the builtins with their summaries.
pub struct Help {
    summaries: Vec<(String, String)>,
}

impl Help {
    pub(crate) const SUMMARY: &'static str = "list builtin commands";

    #[must_use]
    pub fn new(summaries: Vec<(String, String)>) -> Self {
        Self { summaries }
    }
}

impl Builtin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        Self::SUMMARY
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> CommandOutput {
        let stdout: String = self
            .summaries
            .iter()
            .map(|(name, summary)| format!("{name:<10} {summary}\n"))
            .collect();
        CommandOutput::stdout(stdout)
    }
}
