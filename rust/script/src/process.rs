//! The script process: one QuickJS interpreter per execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rquickjs::{AsyncContext, AsyncRuntime, CatchResultExt, CaughtError, Module, async_with};
use tokio::sync::Notify;

use vessel_process::{Process, ProcessCore, ProcessError, ProcessResult};
use vessel_vfs::VirtualFileSystem;

use crate::console;
use crate::loader::{VfsLoader, VfsResolver};

/// A process that evaluates a JavaScript source file from the virtual
/// file system in an embedded interpreter.
pub struct ScriptProcess {
    core: Arc<ProcessCore>,
    vfs: Arc<VirtualFileSystem>,
    script_path: String,
    script_args: Vec<String>,
    /// Polled by the interpreter's interrupt handler so termination
    /// aborts long-running evaluation.
    interrupted: Arc<AtomicBool>,
    /// Wakes `execute` when termination arrives while the interpreter
    /// is idle (e.g. awaiting a promise that will never settle).
    cancel: Notify,
}

impl ScriptProcess {
    /// Build a script process around an already-constructed core.
    ///
    /// `script_path` is the VFS path of the source; `script_args` are
    /// the arguments visible to the script via `process.argv`.
    #[must_use]
    pub fn new(
        core: ProcessCore,
        vfs: Arc<VirtualFileSystem>,
        script_path: String,
        script_args: Vec<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            core: Arc::new(core),
            vfs,
            script_path,
            script_args,
            interrupted: Arc::new(AtomicBool::new(false)),
            cancel: Notify::new(),
        })
    }

    /// Evaluate the script to completion. Errors are already formatted
    /// for stderr.
    async fn evaluate(&self) -> Result<(), String> {
        let source = self
            .vfs
            .read_to_string(&self.script_path)
            .map_err(|error| error.to_string())?;
        let source = strip_shebang(&source);

        let runtime = AsyncRuntime::new().map_err(|error| error.to_string())?;
        let interrupted = self.interrupted.clone();
        runtime
            .set_interrupt_handler(Some(Box::new(move || interrupted.load(Ordering::Relaxed))))
            .await;
        runtime
            .set_loader(
                VfsResolver::new(self.vfs.clone()),
                VfsLoader::new(self.vfs.clone()),
            )
            .await;

        let context = AsyncContext::full(&runtime)
            .await
            .map_err(|error| error.to_string())?;

        let core = self.core.clone();
        let env = self.core.env().clone();
        let mut argv = vec!["node".to_string(), self.script_path.clone()];
        argv.extend(self.script_args.iter().cloned());
        let path = self.script_path.clone();

        let result: Result<(), String> = async_with!(context => |ctx| {
            let installed: rquickjs::Result<()> = (|| {
                console::install_console(&ctx, core)?;
                console::install_process_global(&ctx, argv, &env)?;
                Ok(())
            })();
            if let Err(error) = installed.catch(&ctx) {
                return Err(describe_caught(&error));
            }

            let evaluated: rquickjs::Result<()> = async {
                let module = Module::declare(ctx.clone(), path.as_str(), source)?;
                let (_module, promise) = module.eval()?;
                promise.into_future::<()>().await
            }
            .await;
            evaluated
                .catch(&ctx)
                .map_err(|error| describe_caught(&error))
        })
        .await;

        // Drain any jobs still pending after module evaluation settled.
        runtime.idle().await;

        result
    }
}

#[async_trait]
impl Process for ScriptProcess {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn execute(&self) -> ProcessResult<()> {
        tracing::debug!(pid = self.core.pid(), script = %self.script_path, "evaluating script");
        let evaluated = tokio::select! {
            result = self.evaluate() => result,
            () = self.cancel.notified() => return Ok(()),
        };
        match evaluated {
            Ok(()) => Ok(()),
            Err(message) => {
                self.core.emit_stderr(format!("{message}\n"));
                Err(ProcessError::Interpreter { message })
            }
        }
    }

    async fn on_terminate(&self) {
        // Trip the interrupt handler for busy evaluation and wake the
        // idle wait; the interpreter is dropped with the abandoned
        // `evaluate` future, discarding any in-flight result.
        self.interrupted.store(true, Ordering::Relaxed);
        self.cancel.notify_one();
    }
}

/// Render a caught interpreter error the way a console would: message
/// first, stack appended when present.
fn describe_caught(error: &CaughtError<'_>) -> String {
    match error {
        CaughtError::Exception(exception) => {
            let message = exception
                .message()
                .unwrap_or_else(|| "unknown error".to_string());
            match exception.stack() {
                Some(stack) if !stack.is_empty() => format!("{message}\n{stack}"),
                _ => message,
            }
        }
        CaughtError::Value(value) => value
            .as_string()
            .and_then(|string| string.to_string().ok())
            .unwrap_or_else(|| format!("uncaught [{}]", value.type_of())),
        CaughtError::Error(error) => error.to_string(),
    }
}

/// Drop a leading `#!` line, keeping line numbering intact for error
/// stacks.
fn strip_shebang(source: &str) -> String {
    if !source.starts_with("#!") {
        return source.to_string();
    }
    match source.find('\n') {
        Some(index) => source[index..].to_string(),
        None => String::new(),
    }
}
