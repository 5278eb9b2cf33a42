//! Command results.

/// The outcome of one command: captured stdout, stderr, and an exit
/// code. Zero means success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// A successful, silent result.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// A successful result carrying stdout text.
    #[must_use]
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            ..Default::default()
        }
    }

    /// A failed result: `message` on stderr (newline appended when
    /// missing) and exit code 1.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        let mut stderr = message.into();
        if !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        Self {
            stderr,
            exit_code: 1,
            ..Default::default()
        }
    }

    /// Replace the exit code.
    #[must_use]
    pub fn with_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Whether the command exited with code 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
