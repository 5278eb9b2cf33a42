//! Module specifier resolution behavior.

use pretty_assertions::assert_eq;

use vessel_vfs::{FsError, VirtualFileSystem};

fn vfs_with(files: &[&str]) -> VirtualFileSystem {
    let vfs = VirtualFileSystem::new();
    for file in files {
        vfs.write_file(file, "export default 1;").expect("write");
    }
    vfs
}

#[test]
fn exact_file_wins() {
    let vfs = vfs_with(&["/lib/util.js"]);
    assert_eq!(
        vfs.resolve_module("/lib/util.js", "").expect("resolve"),
        "/lib/util.js"
    );
}

#[test]
fn extension_probing() {
    let vfs = vfs_with(&["/lib/util.js", "/lib/other.mjs"]);
    assert_eq!(
        vfs.resolve_module("/lib/util", "").expect("resolve"),
        "/lib/util.js"
    );
    assert_eq!(
        vfs.resolve_module("/lib/other", "").expect("resolve"),
        "/lib/other.mjs"
    );
}

#[test]
fn js_probed_before_mjs() {
    let vfs = vfs_with(&["/lib/a.js", "/lib/a.mjs"]);
    assert_eq!(
        vfs.resolve_module("/lib/a", "").expect("resolve"),
        "/lib/a.js"
    );
}

#[test]
fn directory_index_probing() {
    let vfs = vfs_with(&["/lib/index.js"]);
    assert_eq!(
        vfs.resolve_module("/lib", "").expect("resolve"),
        "/lib/index.js"
    );
}

#[test]
fn relative_specifier_resolves_against_referrer_dir() {
    let vfs = vfs_with(&["/app/helper.js", "/app/main.js"]);
    assert_eq!(
        vfs.resolve_module("./helper", "/app/main.js")
            .expect("resolve"),
        "/app/helper.js"
    );
}

#[test]
fn parent_relative_specifier() {
    let vfs = vfs_with(&["/lib/util.js", "/app/main.js"]);
    assert_eq!(
        vfs.resolve_module("../lib/util", "/app/main.js")
            .expect("resolve"),
        "/lib/util.js"
    );
}

#[test]
fn escaping_root_is_invalid() {
    let vfs = vfs_with(&["/main.js"]);
    assert!(matches!(
        vfs.resolve_module("../../oops", "/main.js"),
        Err(FsError::InvalidPath { .. })
    ));
}

#[test]
fn missing_module_reports_specifier_and_resolved() {
    let vfs = vfs_with(&[]);
    let error = vfs
        .resolve_module("./missing", "/app/main.js")
        .expect_err("should not resolve");
    match error {
        FsError::ModuleNotFound {
            specifier,
            resolved,
        } => {
            assert_eq!(specifier, "./missing");
            assert_eq!(resolved, "/app/missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn resolution_is_deterministic() {
    let vfs = vfs_with(&["/lib/index.js", "/lib.js"]);
    let first = vfs.resolve_module("/lib", "").expect("resolve");
    let second = vfs.resolve_module("/lib", "").expect("resolve");
    assert_eq!(first, second);
    // The extension probe on the bare path precedes the directory
    // index probe.
    assert_eq!(first, "/lib.js");
}
