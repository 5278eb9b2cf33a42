//! Module resolution and loading from the virtual file system.

use std::sync::Arc;

use rquickjs::loader::{Loader, Resolver};
use rquickjs::module::Declared;
use rquickjs::{Ctx, Error, Module};

use vessel_vfs::VirtualFileSystem;

/// Resolves import specifiers against the virtual file system using
/// the container's module resolution rules.
pub(crate) struct VfsResolver {
    vfs: Arc<VirtualFileSystem>,
}

impl VfsResolver {
    pub(crate) fn new(vfs: Arc<VirtualFileSystem>) -> Self {
        Self { vfs }
    }
}

impl Resolver for VfsResolver {
    fn resolve(&mut self, _ctx: &Ctx<'_>, base: &str, name: &str) -> rquickjs::Result<String> {
        self.vfs
            .resolve_module(name, base)
            .map_err(|error| Error::new_resolving_message(base, name, error.to_string()))
    }
}

/// Loads module sources from the virtual file system.
pub(crate) struct VfsLoader {
    vfs: Arc<VirtualFileSystem>,
}

impl VfsLoader {
    pub(crate) fn new(vfs: Arc<VirtualFileSystem>) -> Self {
        Self { vfs }
    }
}

impl Loader for VfsLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, path: &str) -> rquickjs::Result<Module<'js, Declared>> {
        let source = self
            .vfs
            .read_to_string(path)
            .map_err(|error| Error::new_loading_message(path, error.to_string()))?;
        Module::declare(ctx.clone(), path, source)
    }
}
