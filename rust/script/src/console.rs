//! Console bindings and structural value formatting.

use std::collections::BTreeMap;
use std::sync::Arc;

use rquickjs::convert::Coerced;
use rquickjs::function::Rest;
use rquickjs::{Ctx, FromJs, Function, Object, Value};

use vessel_process::ProcessCore;

/// Install `console.log` and `console.error` on the context's globals,
/// wired to the process's stdout and stderr message events.
pub(crate) fn install_console<'js>(
    ctx: &Ctx<'js>,
    core: Arc<ProcessCore>,
) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;

    let stdout_core = core.clone();
    console.set(
        "log",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            stdout_core.emit_stdout(format!("{}\n", format_args_line(&ctx, &args.0)));
        })?,
    )?;

    let stderr_core = core;
    console.set(
        "error",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            stderr_core.emit_stderr(format!("{}\n", format_args_line(&ctx, &args.0)));
        })?,
    )?;

    ctx.globals().set("console", console)?;
    Ok(())
}

/// Install a Node-flavoured `process` global carrying `argv` and
/// `env`.
pub(crate) fn install_process_global<'js>(
    ctx: &Ctx<'js>,
    argv: Vec<String>,
    env: &BTreeMap<String, String>,
) -> rquickjs::Result<()> {
    let process = Object::new(ctx.clone())?;
    process.set("argv", argv)?;

    let env_object = Object::new(ctx.clone())?;
    for (name, value) in env {
        env_object.set(name.as_str(), value.as_str())?;
    }
    process.set("env", env_object)?;

    ctx.globals().set("process", process)?;
    Ok(())
}

/// Format console arguments the way a user expects to read them:
/// space-joined, strings bare, everything else structurally.
fn format_args_line<'js>(ctx: &Ctx<'js>, args: &[Value<'js>]) -> String {
    args.iter()
        .map(|value| format_value(ctx, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Structural pretty-print of a single value.
///
/// Strings print bare; objects and arrays print JSON-shaped; values
/// JSON cannot express (functions, cycles, symbols) degrade to a
/// coerced string rather than failing the log call.
fn format_value<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> String {
    if let Some(string) = value.as_string() {
        return string.to_string().unwrap_or_default();
    }
    if value.is_undefined() {
        return "undefined".to_string();
    }
    if value.is_null() {
        return "null".to_string();
    }
    if value.is_function() {
        return "[Function]".to_string();
    }

    if let Ok(Some(json)) = ctx.json_stringify(value.clone()) {
        if let Ok(json) = json.to_string() {
            return json;
        }
    }

    // Cyclic or otherwise unstringifiable: fall back to JS coercion.
    Coerced::<String>::from_js(ctx, value.clone())
        .map(|coerced| coerced.0)
        .unwrap_or_else(|_| format!("[{}]", value.type_of()))
}
