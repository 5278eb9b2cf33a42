//! Command line definition and top-level dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{Result, bail, eyre};

use vessel_container::{Container, SpawnOptions};
use vessel_process::wait_exit;

use crate::logging::LoggingLevel;
use crate::terminal;

/// A virtual container runtime with a shell and script interpreter
#[derive(Debug, Parser)]
#[command(name = "vessel", version, about)]
pub struct Cli {
    /// The minimum log level to output
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LoggingLevel,

    /// A filter for log entries from other crates
    #[arg(long, default_value = "", global = true)]
    pub log_filter: String,

    /// Disable the colored shell prompt
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a JavaScript file inside the container
    Run {
        /// Path of the script on the host file system
        script: PathBuf,

        /// Arguments passed to the script via `process.argv`
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Execute a single shell command line and exit
    Exec {
        /// The command and its arguments
        #[arg(trailing_var_arg = true, required = true)]
        line: Vec<String>,
    },

    /// Serve the worker transport protocol over stdin/stdout
    Worker,
}

impl Cli {
    /// Run the selected command, returning the process exit code.
    pub async fn run(self) -> Result<i32> {
        match self.command {
            None => self.interactive().await,
            Some(Command::Run { ref script, ref args }) => self.run_script(script, args).await,
            Some(Command::Exec { ref line }) => self.exec(line).await,
            Some(Command::Worker) => {
                crate::worker::serve().await?;
                Ok(0)
            }
        }
    }

    /// Attach an interactive shell to the host terminal.
    async fn interactive(&self) -> Result<i32> {
        let container = Container::new();
        let args = if self.no_color {
            vec![]
        } else {
            vec!["--osc".to_string()]
        };
        let shell = container
            .spawn("sh", args, None, SpawnOptions::default())
            .map_err(|error| eyre!(error))?;

        let code = terminal::attach(&container, &shell).await?;
        container.dispose().await;
        Ok(code)
    }

    /// Copy a host script into the container and run it to completion.
    async fn run_script(&self, script: &PathBuf, args: &[String]) -> Result<i32> {
        let source = std::fs::read_to_string(script)
            .map_err(|error| eyre!("{}: {error}", script.display()))?;
        let name = script
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| eyre!("script path has no file name"))?;

        let container = Container::new();
        let path = format!("/{name}");
        container
            .write_file(&path, source)
            .map_err(|error| eyre!(error))?;

        let mut spawn_args = vec![path];
        spawn_args.extend(args.iter().cloned());
        let process = container
            .spawn("node", spawn_args, None, SpawnOptions::default())
            .map_err(|error| eyre!(error))?;

        let _subscription = terminal::print_output(&container);
        let code = wait_exit(&process).await;
        container.dispose().await;
        Ok(code)
    }

    /// Run one shell command line inside a fresh container.
    async fn exec(&self, line: &[String]) -> Result<i32> {
        if line.is_empty() {
            bail!("no command given");
        }
        let container = Container::new();
        let process = container
            .spawn("sh", line.to_vec(), None, SpawnOptions::default())
            .map_err(|error| eyre!(error))?;

        let _subscription = terminal::print_output(&container);
        let code = wait_exit(&process).await;
        container.dispose().await;
        Ok(code)
    }
}
