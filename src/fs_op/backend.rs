use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::fs_op::{create, remove, stat};

/// How [`StorageBackend::remove_path`] treats directories and missing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
    /// Remove directories together with their contents.
    pub recursive: bool,
    /// Treat a missing target as already removed.
    pub force: bool,
}

impl RemoveOptions {
    /// Tolerant of missing targets, but a populated directory is refused.
    /// Used by `file_delete`.
    pub const FORCE: RemoveOptions = RemoveOptions {
        recursive: false,
        force: true,
    };

    /// Recursive and tolerant of missing targets. Used by `dir_delete`.
    pub const FORCE_RECURSIVE: RemoveOptions = RemoveOptions {
        recursive: true,
        force: true,
    };
}

/// Synchronous storage primitives every tree operation is expressed in.
///
/// Paths are absolute. Errors are plain `io::Error`s and the tree hands them
/// to callers unchanged.
pub trait StorageBackend: Send + Sync {
    /// Check whether anything exists at `path`.
    fn path_exists(&self, path: &Path) -> bool;

    /// Create a directory, with `recursive` also creating missing ancestors.
    fn make_directory(&self, path: &Path, recursive: bool) -> io::Result<()>;

    /// Remove a file or directory.
    fn remove_path(&self, path: &Path, opts: RemoveOptions) -> io::Result<()>;

    /// Read a whole file as UTF-8 text.
    fn read_text_file(&self, path: &Path) -> io::Result<String>;

    /// Replace the contents of a file. The parent directory must exist.
    fn write_text_file(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Storage backed by the local filesystem via `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStorage;

impl StorageBackend for NativeStorage {
    fn path_exists(&self, path: &Path) -> bool {
        stat::exists(path)
    }

    fn make_directory(&self, path: &Path, recursive: bool) -> io::Result<()> {
        create::create_dir(path, recursive)
    }

    fn remove_path(&self, path: &Path, opts: RemoveOptions) -> io::Result<()> {
        remove::remove_path(path, opts.recursive, opts.force)
    }

    fn read_text_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_text_file(&self, path: &Path, content: &str) -> io::Result<()> {
        create::write_text(path, content)
    }
}

impl fmt::Debug for dyn StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StorageBackend")
    }
}
