//! The virtual file system store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::error::{FsError, FsResult};
use crate::path;

/// An in-memory hierarchical store of files and directories.
///
/// Files and directories share one namespace: a normalized path maps to
/// at most one of the two. Two invariants hold after every operation:
/// the root `/` is always a directory, and the parent of every entry is
/// a directory in the store.
///
/// The store is shared between the container, shells, and script
/// loaders, so all methods take `&self` and synchronize internally.
pub struct VirtualFileSystem {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl Store {
    /// Create the missing ancestor directories of `path`, failing if a
    /// file occupies any of them.
    fn ensure_ancestors(&mut self, path: &str) -> FsResult<()> {
        for ancestor in path::ancestors(path) {
            if self.files.contains_key(&ancestor) {
                return Err(FsError::FileExists { path: ancestor });
            }
            self.directories.insert(ancestor);
        }
        Ok(())
    }

    fn has_children(&self, dir: &str) -> bool {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        };
        self.files.keys().any(|p| p.starts_with(&prefix))
            || self
                .directories
                .iter()
                .any(|p| p != dir && p.starts_with(&prefix))
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Create an empty file system containing only the root directory.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Store::default();
        store.directories.insert("/".to_string());
        Self {
            inner: RwLock::new(store),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Store> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Store> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Create or replace the file at `path`, creating missing ancestor
    /// directories.
    pub fn write_file(&self, path: &str, content: impl Into<Vec<u8>>) -> FsResult<()> {
        let path = path::normalize(path);
        let mut store = self.write();
        if store.directories.contains(&path) {
            return Err(FsError::IsADirectory { path });
        }
        store.ensure_ancestors(&path)?;
        tracing::trace!(%path, "write file");
        store.files.insert(path, content.into());
        Ok(())
    }

    /// Read the contents of the file at `path`.
    pub fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let path = path::normalize(path);
        let store = self.read();
        if store.directories.contains(&path) {
            return Err(FsError::IsADirectory { path });
        }
        store
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| FsError::not_found(path))
    }

    /// Read the file at `path` as UTF-8, replacing invalid sequences.
    pub fn read_to_string(&self, path: &str) -> FsResult<String> {
        Ok(String::from_utf8_lossy(&self.read_file(path)?).into_owned())
    }

    /// Delete the file at `path`.
    pub fn delete_file(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        let mut store = self.write();
        if store.files.remove(&path).is_none() {
            return Err(FsError::not_found(path));
        }
        tracing::trace!(%path, "delete file");
        Ok(())
    }

    /// All file paths in the store, in unspecified order.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        self.read().files.keys().cloned().collect()
    }

    /// Create the directory at `path` (and missing ancestors).
    /// Idempotent for existing directories.
    pub fn create_directory(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        let mut store = self.write();
        if store.files.contains_key(&path) {
            return Err(FsError::FileExists { path });
        }
        store.ensure_ancestors(&path)?;
        tracing::trace!(%path, "create directory");
        store.directories.insert(path);
        Ok(())
    }

    /// Delete the empty directory at `path`.
    pub fn delete_directory(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        if path == "/" {
            return Err(FsError::invalid_path(path));
        }
        let mut store = self.write();
        if !store.directories.contains(&path) {
            return if store.files.contains_key(&path) {
                Err(FsError::NotADirectory { path })
            } else {
                Err(FsError::not_found(path))
            };
        }
        if store.has_children(&path) {
            return Err(FsError::NotEmpty { path });
        }
        tracing::trace!(%path, "delete directory");
        store.directories.remove(&path);
        Ok(())
    }

    /// The immediate children of the directory at `path`, sorted
    /// ascending. Directory names carry a trailing `/` so callers can
    /// tell the two kinds apart.
    pub fn list_directory(&self, path: &str) -> FsResult<Vec<String>> {
        let path = path::normalize(path);
        let store = self.read();
        if store.files.contains_key(&path) {
            return Err(FsError::NotADirectory { path });
        }
        if !store.directories.contains(&path) {
            return Err(FsError::not_found(path));
        }

        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };
        let immediate = |p: &str| -> Option<String> {
            let rest = p.strip_prefix(&prefix)?;
            if rest.is_empty() || rest.contains('/') {
                None
            } else {
                Some(rest.to_string())
            }
        };

        let mut names: Vec<String> = store.files.keys().filter_map(|p| immediate(p)).collect();
        names.extend(
            store
                .directories
                .iter()
                .filter_map(|p| immediate(p))
                .map(|name| format!("{name}/")),
        );
        names.sort();
        Ok(names)
    }

    /// Whether `path` names a directory.
    #[must_use]
    pub fn is_directory(&self, path: &str) -> bool {
        self.read().directories.contains(&path::normalize(path))
    }

    /// Whether `path` names a file.
    #[must_use]
    pub fn is_file(&self, path: &str) -> bool {
        self.read().files.contains_key(&path::normalize(path))
    }

    /// Whether `path` names a file or a directory.
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        let path = path::normalize(path);
        let store = self.read();
        store.files.contains_key(&path) || store.directories.contains(&path)
    }
}
