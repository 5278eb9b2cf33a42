//! Module specifier resolution.

use crate::error::{FsError, FsResult};
use crate::path;
use crate::system::VirtualFileSystem;

/// File extensions probed when a specifier does not name a file
/// exactly.
const EXTENSIONS: &[&str] = &[".js", ".mjs"];

impl VirtualFileSystem {
    /// Resolve a module specifier to the path of an existing file.
    ///
    /// Relative specifiers (`./x`, `../y`) resolve against the
    /// directory of `referrer`; anything else normalizes as an absolute
    /// path. The resolved path is probed in order: as-is, with each of
    /// `.js`/`.mjs` appended, then (when it names a directory) as
    /// `<dir>/index` with the same extensions.
    ///
    /// Resolution is deterministic: the same store contents and inputs
    /// always produce the same result.
    pub fn resolve_module(&self, specifier: &str, referrer: &str) -> FsResult<String> {
        let resolved = if specifier.starts_with("./") || specifier.starts_with("../") {
            path::resolve_relative(specifier, &path::dirname(referrer))?
        } else {
            path::normalize(specifier)
        };

        if self.is_file(&resolved) {
            return Ok(resolved);
        }

        for extension in EXTENSIONS {
            let candidate = format!("{resolved}{extension}");
            if self.is_file(&candidate) {
                tracing::debug!(specifier, %candidate, "resolved module via extension");
                return Ok(candidate);
            }
        }

        if self.is_directory(&resolved) {
            for extension in EXTENSIONS {
                let candidate = format!("{resolved}/index{extension}");
                if self.is_file(&candidate) {
                    tracing::debug!(specifier, %candidate, "resolved module via directory index");
                    return Ok(candidate);
                }
            }
        }

        Err(FsError::ModuleNotFound {
            specifier: specifier.to_string(),
            resolved,
        })
    }
}
