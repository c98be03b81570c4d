use std::fs;
use std::io;
use std::path::Path;

/// Remove a file or directory at `path`.
///
/// Directories are only removed together with their contents when
/// `recursive` is set; otherwise the directory must be empty. When `force`
/// is set a path that does not exist is treated as already removed, so
/// callers can attempt removal without checking for existence first.
pub fn remove_path(path: impl AsRef<Path>, recursive: bool, force: bool) -> io::Result<()> {
    let p = path.as_ref();

    // symlink_metadata so a dangling link still counts as present
    let meta = match fs::symlink_metadata(p) {
        Ok(m) => m,
        Err(e) if force && e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        if recursive {
            fs::remove_dir_all(p)
        } else {
            fs::remove_dir(p)
        }
    } else {
        fs::remove_file(p)
    }
}
