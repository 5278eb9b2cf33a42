//! Shell error taxonomy.

/// Errors raised while interpreting a command line.
///
/// These never escape the shell: they are rendered onto stderr with a
/// non-zero exit code and the prompt continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    /// The command line could not be parsed.
    #[error("SyntaxError: {message}")]
    Syntax { message: String },
}

impl ShellError {
    pub(crate) fn missing_redirection_target() -> Self {
        Self::Syntax {
            message: "missing file for redirection".to_string(),
        }
    }
}
