//! File system error taxonomy.

/// Errors returned by virtual file system operations.
///
/// All variants are recoverable: callers (shell builtins, the module
/// loader) are expected to surface them to the user rather than abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    /// The file or directory does not exist.
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    /// A file occupies a path where a directory is required.
    #[error("file exists: {path}")]
    FileExists { path: String },

    /// The path names a directory where a file is required.
    #[error("is a directory: {path}")]
    IsADirectory { path: String },

    /// The path names a file where a directory is required.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The directory has entries and cannot be removed.
    #[error("directory not empty: {path}")]
    NotEmpty { path: String },

    /// The path is malformed, e.g. `..` escaping the root.
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    /// Module resolution exhausted all candidates.
    #[error("cannot find module `{specifier}` (resolved from {resolved})")]
    ModuleNotFound { specifier: String, resolved: String },
}

impl FsError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}

pub type FsResult<T> = Result<T, FsError>;
