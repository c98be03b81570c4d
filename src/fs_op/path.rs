use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Reasons a declared child key cannot name a child of its directory.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyError {
    Empty,
    Absolute,
    ParentSegment,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Empty => write!(f, "key has no path segments"),
            KeyError::Absolute => write!(f, "key must be relative to its directory"),
            KeyError::ParentSegment => write!(f, "key must not contain `..`"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Resolve `key` against `parent`.
///
/// The key is split on `/` (and the host separator) and pushed one segment
/// at a time, so `"a/b/c"` lands at `parent/a/b/c` on every platform. Empty
/// and `.` segments are dropped; a leading separator does not make the key
/// absolute.
pub fn resolve(parent: &Path, key: &str) -> PathBuf {
    let mut p = parent.to_path_buf();
    for seg in segments(key) {
        p.push(seg);
    }
    p
}

/// Check that a declared key names something strictly below its directory.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.starts_with('/') || key.starts_with(MAIN_SEPARATOR) || Path::new(key).is_absolute() {
        return Err(KeyError::Absolute);
    }
    let mut any = false;
    for seg in segments(key) {
        if seg == ".." {
            return Err(KeyError::ParentSegment);
        }
        any = true;
    }
    if !any {
        return Err(KeyError::Empty);
    }
    Ok(())
}

fn segments(key: &str) -> impl Iterator<Item = &str> {
    key.split(|c: char| c == '/' || c == MAIN_SEPARATOR)
        .filter(|s| !s.is_empty() && *s != ".")
}
