//! File and directory builtins.

use super::Builtin;
use crate::output::CommandOutput;
use crate::state::ShellState;

/// `ls [path]` — list a directory.
pub struct Ls;

impl Builtin for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn help(&self) -> &'static str {
        "list directory contents"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let target = match args.first() {
            Some(path) => state.resolve(path),
            None => state.cwd.clone(),
        };
        match state.vfs.list_directory(&target) {
            Ok(names) if names.is_empty() => CommandOutput::success(),
            Ok(names) => CommandOutput::stdout(format!("{}\n", names.join("\n"))),
            Err(error) => CommandOutput::failure(format!("ls: {error}")),
        }
    }
}

/// `cat file…` — print file contents.
pub struct Cat;

impl Builtin for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn help(&self) -> &'static str {
        "print file contents"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::failure("cat: missing operand");
        }
        let mut stdout = String::new();
        for file in args {
            match state.vfs.read_to_string(&state.resolve(file)) {
                Ok(contents) => stdout.push_str(&contents),
                Err(error) => return CommandOutput::failure(format!("cat: {error}")),
            }
        }
        CommandOutput::stdout(stdout)
    }
}

/// `mkdir path…` — create directories, ancestors included.
pub struct Mkdir;

impl Builtin for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn help(&self) -> &'static str {
        "create directories"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::failure("mkdir: missing operand");
        }
        for dir in args {
            if let Err(error) = state.vfs.create_directory(&state.resolve(dir)) {
                return CommandOutput::failure(format!("mkdir: {error}"));
            }
        }
        CommandOutput::success()
    }
}

/// `rm [-r] path…` — delete files. Directories need `rmdir`; the `-r`
/// flag is accepted for familiarity but does not remove directories.
pub struct Rm;

impl Builtin for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn help(&self) -> &'static str {
        "delete files (directories: see rmdir)"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let paths: Vec<&String> = args.iter().filter(|arg| *arg != "-r").collect();
        if paths.is_empty() {
            return CommandOutput::failure("rm: missing operand");
        }
        let mut stderr = String::new();
        for path in paths {
            let resolved = state.resolve(path);
            if state.vfs.is_directory(&resolved) {
                stderr.push_str(&format!("rm: cannot remove '{path}': is a directory\n"));
                continue;
            }
            if let Err(error) = state.vfs.delete_file(&resolved) {
                stderr.push_str(&format!("rm: {error}\n"));
            }
        }
        if stderr.is_empty() {
            CommandOutput::success()
        } else {
            CommandOutput {
                stderr,
                exit_code: 1,
                ..Default::default()
            }
        }
    }
}

/// `rmdir path…` — delete empty directories.
pub struct Rmdir;

impl Builtin for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn help(&self) -> &'static str {
        "delete empty directories"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::failure("rmdir: missing operand");
        }
        for dir in args {
            if let Err(error) = state.vfs.delete_directory(&state.resolve(dir)) {
                return CommandOutput::failure(format!("rmdir: {error}"));
            }
        }
        CommandOutput::success()
    }
}

/// `touch path…` — write empty files.
pub struct Touch;

impl Builtin for Touch {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn help(&self) -> &'static str {
        "create empty files"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::failure("touch: missing operand");
        }
        for file in args {
            if let Err(error) = state.vfs.write_file(&state.resolve(file), Vec::new()) {
                return CommandOutput::failure(format!("touch: {error}"));
            }
        }
        CommandOutput::success()
    }
}

/// `cp src dst` — copy a file.
pub struct Cp;

impl Builtin for Cp {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn help(&self) -> &'static str {
        "copy a file"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let [src, dst] = args else {
            return CommandOutput::failure("cp: expected source and destination");
        };
        match copy(state, src, dst) {
            Ok(()) => CommandOutput::success(),
            Err(message) => CommandOutput::failure(format!("cp: {message}")),
        }
    }
}

/// `mv src dst` — copy then delete the source.
pub struct Mv;

impl Builtin for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn help(&self) -> &'static str {
        "move a file"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> CommandOutput {
        let [src, dst] = args else {
            return CommandOutput::failure("mv: expected source and destination");
        };
        let result = copy(state, src, dst)
            .and_then(|()| state.vfs.delete_file(&state.resolve(src)).map_err(|e| e.to_string()));
        match result {
            Ok(()) => CommandOutput::success(),
            Err(message) => CommandOutput::failure(format!("mv: {message}")),
        }
    }
}

fn copy(state: &ShellState, src: &str, dst: &str) -> Result<(), String> {
    let contents = state
        .vfs
        .read_file(&state.resolve(src))
        .map_err(|error| error.to_string())?;
    state
        .vfs
        .write_file(&state.resolve(dst), contents)
        .map_err(|error| error.to_string())
}
