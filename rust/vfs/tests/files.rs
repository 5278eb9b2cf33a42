//! File and directory operation behavior.

use pretty_assertions::assert_eq;

use vessel_vfs::{FsError, VirtualFileSystem};

#[test]
fn write_then_read_round_trips() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/a/b.txt", "hi").expect("write");
    assert_eq!(vfs.read_to_string("/a/b.txt").expect("read"), "hi");
    assert_eq!(vfs.list_directory("/a").expect("list"), vec!["b.txt"]);
    assert!(
        vfs.list_directory("/")
            .expect("list root")
            .contains(&"a/".to_string())
    );
}

#[test]
fn write_creates_missing_ancestors() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/deep/ly/nested/file", b"x".as_slice())
        .expect("write");
    assert!(vfs.is_directory("/deep"));
    assert!(vfs.is_directory("/deep/ly"));
    assert!(vfs.is_directory("/deep/ly/nested"));
    assert!(vfs.is_file("/deep/ly/nested/file"));
}

#[test]
fn write_over_directory_fails() {
    let vfs = VirtualFileSystem::new();
    vfs.create_directory("/dir").expect("mkdir");
    assert!(matches!(
        vfs.write_file("/dir", "nope"),
        Err(FsError::IsADirectory { .. })
    ));
}

#[test]
fn read_missing_file_is_not_found() {
    let vfs = VirtualFileSystem::new();
    assert!(matches!(
        vfs.read_file("/nope"),
        Err(FsError::NotFound { .. })
    ));
}

#[test]
fn delete_file_requires_existence() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/f", "x").expect("write");
    vfs.delete_file("/f").expect("delete");
    assert!(matches!(
        vfs.delete_file("/f"),
        Err(FsError::NotFound { .. })
    ));
}

#[test]
fn create_directory_is_idempotent() {
    let vfs = VirtualFileSystem::new();
    vfs.create_directory("/d").expect("first");
    vfs.create_directory("/d").expect("second is a no-op");
    assert!(vfs.is_directory("/d"));
}

#[test]
fn create_directory_over_file_fails() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/f", "x").expect("write");
    assert!(matches!(
        vfs.create_directory("/f"),
        Err(FsError::FileExists { .. })
    ));
    assert!(matches!(
        vfs.create_directory("/f/child"),
        Err(FsError::FileExists { .. })
    ));
}

#[test]
fn delete_directory_requires_empty() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/d/f", "x").expect("write");
    assert!(matches!(
        vfs.delete_directory("/d"),
        Err(FsError::NotEmpty { .. })
    ));
    vfs.delete_file("/d/f").expect("delete file");
    vfs.delete_directory("/d").expect("now empty");
    assert!(!vfs.is_directory("/d"));
}

#[test]
fn delete_missing_directory_is_not_found() {
    let vfs = VirtualFileSystem::new();
    assert!(matches!(
        vfs.delete_directory("/nope"),
        Err(FsError::NotFound { .. })
    ));
}

#[test]
fn listing_distinguishes_files_from_directories() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/x/file.txt", "1").expect("write");
    vfs.create_directory("/x/sub").expect("mkdir");
    assert_eq!(
        vfs.list_directory("/x").expect("list"),
        vec!["file.txt", "sub/"]
    );
}

#[test]
fn listing_a_file_is_not_a_directory() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/f", "x").expect("write");
    assert!(matches!(
        vfs.list_directory("/f"),
        Err(FsError::NotADirectory { .. })
    ));
}

#[test]
fn duplicate_separators_normalize() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("//a///b.txt", "x").expect("write");
    assert_eq!(vfs.read_to_string("/a/b.txt").expect("read"), "x");
    assert!(vfs.is_file("/a//b.txt"));
}

#[test]
fn files_and_listings_stay_consistent() {
    let vfs = VirtualFileSystem::new();
    vfs.write_file("/a/one", "1").expect("write");
    vfs.write_file("/a/two", "2").expect("write");
    vfs.create_directory("/a/d").expect("mkdir");
    vfs.delete_file("/a/one").expect("delete");

    for path in vfs.list_files() {
        assert!(vfs.is_file(&path));
        assert!(!vfs.is_directory(&path));
        assert!(vfs.is_directory(&vessel_vfs::path::dirname(&path)));
    }
    assert_eq!(vfs.list_directory("/a").expect("list"), vec!["d/", "two"]);
}

#[test]
fn root_always_exists_and_cannot_be_deleted() {
    let vfs = VirtualFileSystem::new();
    assert!(vfs.is_directory("/"));
    assert!(matches!(
        vfs.delete_directory("/"),
        Err(FsError::InvalidPath { .. })
    ));
}
