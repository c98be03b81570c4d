use std::fs;
use std::io;
use std::path::Path;

/// What occupies a path on disk, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    NotFound,
    Directory,
    File,
    /// Sockets, FIFOs, device nodes and the like.
    Other,
}

impl PathType {
    /// Classify `path`, following symlinks.
    ///
    /// A missing entry is `Ok(NotFound)`; any other metadata failure (for
    /// example a permission error on an ancestor) is returned as-is.
    pub fn probe<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        match fs::metadata(path.as_ref()) {
            Ok(m) if m.is_dir() => Ok(PathType::Directory),
            Ok(m) if m.is_file() => Ok(PathType::File),
            Ok(_) => Ok(PathType::Other),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PathType::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Like [`PathType::probe`], folding metadata failures into `NotFound`.
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        Self::probe(path).unwrap_or(PathType::NotFound)
    }

    pub fn label(self) -> &'static str {
        match self {
            PathType::NotFound => "missing",
            PathType::Directory => "directory",
            PathType::File => "file",
            PathType::Other => "special",
        }
    }
}

/// Return `true` if anything exists at `path`. Files and directories are not
/// distinguished.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) != PathType::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_type_nonexistent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("no_such_file_hopefully");
        assert_eq!(PathType::probe(&p).unwrap(), PathType::NotFound);
        assert!(!exists(&p));
    }

    #[test]
    fn path_type_file_and_dir() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        assert_eq!(PathType::of(&file), PathType::File);
        assert!(exists(&file));

        let dir = tmp.path().join("subdir");
        fs::create_dir(&dir).unwrap();
        assert_eq!(PathType::of(&dir), PathType::Directory);
        assert_eq!(PathType::of(&dir).label(), "directory");
        assert!(exists(&dir));
    }
}
