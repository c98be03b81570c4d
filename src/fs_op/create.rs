use std::fs;
use std::io;
use std::path::Path;

/// Create the directory at `path`.
///
/// With `recursive` every missing ancestor is created and an existing
/// directory is not an error. Without it only the leaf is created and the
/// parent must already exist.
pub fn create_dir<P: AsRef<Path>>(path: P, recursive: bool) -> io::Result<()> {
    let p = path.as_ref();
    if recursive {
        fs::create_dir_all(p)
    } else {
        fs::create_dir(p)
    }
}

/// Write `content` to `path`, replacing anything already there.
///
/// Parent directories are never created: writing below a missing directory
/// fails with the OS error (usually `NotFound`).
pub fn write_text<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    fs::write(path.as_ref(), content)
}
