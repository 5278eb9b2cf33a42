//! Builtin commands against session state, without a running shell.

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use vessel_shell::ShellState;
use vessel_shell::builtins::BuiltinRegistry;
use vessel_vfs::VirtualFileSystem;

fn state() -> ShellState {
    ShellState::new(Arc::new(VirtualFileSystem::new()), "/", BTreeMap::new())
}

fn run(state: &mut ShellState, name: &str, args: &[&str]) -> vessel_shell::CommandOutput {
    let registry = BuiltinRegistry::with_defaults();
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    registry
        .get(name)
        .unwrap_or_else(|| panic!("builtin {name} registered"))
        .execute(state, &args)
}

#[test]
fn default_environment_is_installed() {
    let state = state();
    assert_eq!(state.env.get("PATH").map(String::as_str), Some("/bin:/usr/bin"));
    assert_eq!(state.env.get("HOME").map(String::as_str), Some("/home"));
    assert_eq!(state.env.get("PWD").map(String::as_str), Some("/"));
}

#[test]
fn caller_environment_is_kept_verbatim() {
    let mut env = BTreeMap::new();
    env.insert("ONLY".to_string(), "this".to_string());
    let state = ShellState::new(Arc::new(VirtualFileSystem::new()), "/", env);
    assert!(!state.env.contains_key("PATH"));
    assert_eq!(state.env.get("ONLY").map(String::as_str), Some("this"));
}

#[test]
fn echo_joins_arguments() {
    let mut state = state();
    let output = run(&mut state, "echo", &["a", "b", "c"]);
    assert_eq!(output.stdout, "a b c\n");
    assert_eq!(output.exit_code, 0);
}

#[test]
fn cat_streams_file_contents() {
    let mut state = state();
    state.vfs.write_file("/f.txt", "contents").expect("write");
    let output = run(&mut state, "cat", &["/f.txt"]);
    assert_eq!(output.stdout, "contents");
}

#[test]
fn cat_missing_file_fails() {
    let mut state = state();
    let output = run(&mut state, "cat", &["/absent"]);
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.starts_with("cat:"));
}

#[test]
fn mkdir_then_rmdir() {
    let mut state = state();
    assert_eq!(run(&mut state, "mkdir", &["/a/b"]).exit_code, 0);
    assert!(state.vfs.is_directory("/a/b"));
    assert_eq!(run(&mut state, "rmdir", &["/a/b"]).exit_code, 0);
    assert!(!state.vfs.is_directory("/a/b"));
}

#[test]
fn rmdir_refuses_non_empty() {
    let mut state = state();
    state.vfs.write_file("/d/f", "x").expect("write");
    let output = run(&mut state, "rmdir", &["/d"]);
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("not empty"));
}

#[test]
fn rm_deletes_files_only() {
    let mut state = state();
    state.vfs.write_file("/f", "x").expect("write");
    state.vfs.create_directory("/d").expect("mkdir");

    assert_eq!(run(&mut state, "rm", &["/f"]).exit_code, 0);
    assert!(!state.vfs.is_file("/f"));

    let output = run(&mut state, "rm", &["-r", "/d"]);
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("is a directory"));
    assert!(state.vfs.is_directory("/d"));
}

#[test]
fn touch_creates_empty_files() {
    let mut state = state();
    assert_eq!(run(&mut state, "touch", &["/new.txt"]).exit_code, 0);
    assert_eq!(state.vfs.read_file("/new.txt").expect("read"), Vec::<u8>::new());
}

#[test]
fn cp_copies_and_mv_moves() {
    let mut state = state();
    state.vfs.write_file("/src", "data").expect("write");

    assert_eq!(run(&mut state, "cp", &["/src", "/copy"]).exit_code, 0);
    assert_eq!(state.vfs.read_to_string("/copy").expect("read"), "data");
    assert!(state.vfs.is_file("/src"));

    assert_eq!(run(&mut state, "mv", &["/src", "/moved"]).exit_code, 0);
    assert!(!state.vfs.is_file("/src"));
    assert_eq!(state.vfs.read_to_string("/moved").expect("read"), "data");
}

#[test]
fn cd_requires_a_directory() {
    let mut state = state();
    state.vfs.write_file("/file", "x").expect("write");
    state.vfs.create_directory("/dir").expect("mkdir");

    let output = run(&mut state, "cd", &["/file"]);
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("not a directory"));
    assert_eq!(state.cwd, "/");

    assert_eq!(run(&mut state, "cd", &["/dir"]).exit_code, 0);
    assert_eq!(state.cwd, "/dir");
    assert_eq!(state.env.get("PWD").map(String::as_str), Some("/dir"));
}

#[test]
fn cd_without_args_goes_home() {
    let mut state = state();
    state.vfs.create_directory("/home").expect("mkdir");
    assert_eq!(run(&mut state, "cd", &[]).exit_code, 0);
    assert_eq!(state.cwd, "/home");
}

#[test]
fn relative_paths_resolve_against_cwd() {
    let mut state = state();
    state.vfs.create_directory("/work").expect("mkdir");
    run(&mut state, "cd", &["/work"]);
    run(&mut state, "touch", &["here.txt"]);
    assert!(state.vfs.is_file("/work/here.txt"));
}

#[test]
fn exit_stops_the_session_with_code() {
    let mut state = state();
    let output = run(&mut state, "exit", &["5"]);
    assert!(!state.running);
    assert_eq!(state.exit_code, 5);
    assert_eq!(output.exit_code, 5);
}

#[test]
fn exit_rejects_non_numeric_codes() {
    let mut state = state();
    let output = run(&mut state, "exit", &["nope"]);
    assert!(!state.running);
    assert_eq!(output.exit_code, 2);
    assert!(output.stderr.contains("numeric argument required"));
}

#[test]
fn env_prints_sorted_pairs() {
    let mut state = state();
    let output = run(&mut state, "env", &[]);
    assert_eq!(
        output.stdout,
        "HOME=/home\nPATH=/bin:/usr/bin\nPWD=/\n"
    );
}

#[test]
fn history_lists_executed_commands() {
    let mut state = state();
    state.history.push("ls");
    state.history.push("pwd");
    let output = run(&mut state, "history", &[]);
    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("ls"));
    assert!(lines[1].ends_with("pwd"));
}

#[test]
fn help_lists_every_builtin() {
    let mut state = state();
    let output = run(&mut state, "help", &[]);
    for name in [
        "ls", "cat", "mkdir", "rm", "rmdir", "touch", "pwd", "cd", "echo", "cp", "mv", "exit",
        "history", "env", "help",
    ] {
        assert!(
            output.stdout.lines().any(|line| line.starts_with(name)),
            "{name} missing from help"
        );
    }
}

#[test]
fn ls_lists_sorted_with_directory_suffix() {
    let mut state = state();
    state.vfs.write_file("/b.txt", "x").expect("write");
    state.vfs.create_directory("/a").expect("mkdir");
    let output = run(&mut state, "ls", &["/"]);
    assert_eq!(output.stdout, "a/\nb.txt\n");
}
