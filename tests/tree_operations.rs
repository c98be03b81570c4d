use std::fs;
use std::io;
use std::path::Path;

use assert_fs::prelude::*;
use predicates::prelude::*;

use fixture_tree::{build, Descriptor, DirNode, TreeError};

fn built(root: &Path, desc: &Descriptor) -> DirNode {
    fixture_tree::logging::init_test_logging();
    build(root, desc, None).expect("build").into_dir().expect("dir root")
}

fn storage_kind(err: TreeError) -> io::ErrorKind {
    match err {
        TreeError::Storage(e) => e.kind(),
        other => panic!("expected a storage error, got {other:?}"),
    }
}

#[test]
fn declared_children_resolve_under_root() {
    let temp = assert_fs::TempDir::new().unwrap();
    let desc = Descriptor::dir()
        .child("file1", Descriptor::file())
        .child("dir1", Descriptor::dir());
    let tree = built(temp.path(), &desc);

    assert_eq!(tree.file("file1").unwrap().get_path().unwrap(), temp.path().join("file1"));
    assert_eq!(tree.dir("dir1").unwrap().get_path().unwrap(), temp.path().join("dir1"));
    // building alone leaves the disk untouched
    temp.child("file1").assert(predicate::path::missing());
}

#[test]
fn file_create_then_read_round_trips() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    let text = "line one\nline two\u{1F600}\n";
    let file = tree.file_create("notes.txt", Some(text)).unwrap();
    assert_eq!(tree.file_read("notes.txt").unwrap(), text);
    assert_eq!(file.file_read().unwrap(), text);
    assert_eq!(file.get_path().unwrap(), temp.path().join("notes.txt"));
    temp.child("notes.txt").assert(text);
}

#[test]
fn file_create_without_data_writes_empty_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());
    tree.file_create("empty", None).unwrap();
    temp.child("empty").assert("");
}

#[test]
fn nested_file_create_needs_existing_parent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    let err = tree.file_create("missingDir/newFile", Some("x")).unwrap_err();
    assert_eq!(storage_kind(err), io::ErrorKind::NotFound);
    temp.child("missingDir").assert(predicate::path::missing());

    tree.dir_create("missingDir").unwrap();
    tree.file_create("missingDir/newFile", Some("x")).unwrap();
    temp.child("missingDir/newFile").assert("x");
}

#[test]
fn dir_create_returns_working_node() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    let sub = tree.dir_create("newDir").unwrap();
    temp.child("newDir").assert(predicate::path::is_dir());
    assert_eq!(sub.get_path().unwrap(), temp.path().join("newDir"));
    assert_eq!(sub.context().parent_path(), Some(temp.path()));

    let deeper = sub.dir_create("a/b").unwrap();
    deeper.file_create("leaf.txt", Some("deep")).unwrap();
    temp.child("newDir/a/b/leaf.txt").assert("deep");

    // the declared shape is unchanged
    assert!(tree.children().is_empty());
    assert!(tree.child("newDir").is_err());
}

#[test]
fn exists_sees_files_and_dirs() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("f").write_str("x").unwrap();
    temp.child("d").create_dir_all().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    assert!(tree.exists("f").unwrap());
    assert!(tree.exists("d").unwrap());
    assert!(!tree.exists("nope").unwrap());
}

#[test]
fn deletes_are_idempotent() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("keep.txt").write_str("k").unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    tree.dir_delete("ghost").unwrap();
    tree.file_delete("ghost.txt").unwrap();
    temp.child("keep.txt").assert("k");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_delete_refuses_populated_dir() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("d/e").create_dir_all().unwrap();
    temp.child("d/e/keep.txt").write_str("k").unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    assert!(matches!(tree.file_delete("d").unwrap_err(), TreeError::Storage(_)));
    temp.child("d/e/keep.txt").assert("k");

    // a declared file node pointed at the same directory refuses too
    let desc = Descriptor::dir().child("d", Descriptor::file());
    let tree = built(temp.path(), &desc);
    assert!(tree.file("d").unwrap().file_delete().is_err());
    temp.child("d/e").assert(predicate::path::is_dir());
}

#[test]
fn dir_delete_removes_contents() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("d/e").create_dir_all().unwrap();
    temp.child("d/e/f.txt").write_str("x").unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    tree.dir_delete("d").unwrap();
    temp.child("d").assert(predicate::path::missing());
}

#[test]
fn write_then_clear_leaves_empty_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());

    tree.file_write("w.txt", "something").unwrap();
    assert_eq!(tree.file_read("w.txt").unwrap(), "something");
    tree.file_clear("w.txt").unwrap();
    assert_eq!(tree.file_read("w.txt").unwrap(), "");
    temp.child("w.txt").assert(predicate::path::is_file());
}

#[test]
fn read_of_missing_file_surfaces_backend_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());
    let err = tree.file_read("absent.txt").unwrap_err();
    assert_eq!(storage_kind(err), io::ErrorKind::NotFound);
}

#[test]
fn file_node_operations_act_on_their_own_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    let desc = Descriptor::dir().child(
        "conf",
        Descriptor::dir().child("app.toml", Descriptor::file_with("a = 1")),
    );
    let tree = built(temp.path(), &desc);
    let conf = tree.dir("conf").unwrap();
    let file = conf.file("app.toml").unwrap();

    assert!(!file.exists().unwrap());
    tree.dir_create("conf").unwrap();
    file.file_create(None).unwrap();
    assert!(file.exists().unwrap());
    assert_eq!(file.file_read().unwrap(), "a = 1");

    file.file_write(Some("a = 2")).unwrap();
    temp.child("conf/app.toml").assert("a = 2");
    file.file_clear().unwrap();
    assert_eq!(file.file_read().unwrap(), "");

    file.file_delete().unwrap();
    assert!(!file.exists().unwrap());
    file.file_delete().unwrap();
}

#[test]
fn lazy_data_is_resolved_at_each_write() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let temp = assert_fs::TempDir::new().unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let c = counter.clone();
    let desc = Descriptor::dir().child(
        "stamp",
        Descriptor::file_lazy(move || format!("v{}", c.fetch_add(1, Ordering::SeqCst))),
    );
    let tree = built(temp.path(), &desc);
    assert_eq!(counter.load(Ordering::SeqCst), 0, "build must not resolve data");

    let file = tree.file("stamp").unwrap();
    file.file_create(None).unwrap();
    assert_eq!(file.file_read().unwrap(), "v0");
    file.file_write(None).unwrap();
    assert_eq!(file.file_read().unwrap(), "v1");
    file.call("file_write", &[]).unwrap();
    assert_eq!(file.file_read().unwrap(), "v2");
}

#[test]
fn materialize_writes_declared_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    let desc = Descriptor::dir()
        .child("readme.md", Descriptor::file_with("# hi"))
        .child("src", Descriptor::dir().child("main.rs", Descriptor::file()))
        .child("ignored", Descriptor::dir().skipped().child("x", Descriptor::file()))
        .child("nested/deep.txt", Descriptor::file_with("deep"));
    let root = temp.child("project");
    let tree = build(root.path(), &desc, None).unwrap();
    tree.materialize().unwrap();

    root.child("readme.md").assert("# hi");
    root.child("src/main.rs").assert("");
    root.child("nested/deep.txt").assert("deep");
    root.child("ignored").assert(predicate::path::missing());
}

#[test]
fn wrong_kind_lookup_is_an_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let desc = Descriptor::dir().child("f", Descriptor::file());
    let tree = built(temp.path(), &desc);
    assert!(matches!(tree.dir("f").unwrap_err(), TreeError::KindMismatch { .. }));
    assert!(matches!(tree.file("g").unwrap_err(), TreeError::NoSuchChild { .. }));
}

#[test]
fn missing_argument_is_reported() {
    let temp = assert_fs::TempDir::new().unwrap();
    let tree = built(temp.path(), &Descriptor::dir());
    let err = tree.call("file_write", &["only-name"]).unwrap_err();
    assert!(matches!(err, TreeError::MissingArgument { index: 1, .. }));
}
