use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::descriptor::Descriptor;
use crate::fs_op::stat::PathType;
use crate::tree::builder::TreeBuilder;
use crate::tree::node::Node;

/// A materialized tree under its own scratch directory. The directory is
/// removed when the fixture is dropped.
#[derive(Debug)]
pub struct Fixture {
    root: PathBuf,
    tree: Node,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Create a fresh directory under the OS temp dir, build `descriptor` at
/// `<scratch>/root` and materialize it.
pub fn make_fixture(descriptor: &Descriptor) -> Result<Fixture> {
    static NEXT_ID: AtomicU64 = AtomicU64::new(0);
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_nanos();
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut scratch = std::env::temp_dir();
    scratch.push(format!("fixture_tree_{}_{:x}_{}", std::process::id(), stamp, seq));
    fs::create_dir_all(&scratch)
        .with_context(|| format!("creating scratch dir {}", scratch.display()))?;

    let tree = TreeBuilder::new(scratch.join("root"))
        .build(descriptor)
        .context("building fixture tree")?;
    let fixture = Fixture { root: scratch, tree };
    fixture.tree.materialize().context("materializing fixture tree")?;
    Ok(fixture)
}

/// Every entry below `root` as a `/`-separated relative path, sorted.
/// Directories carry a trailing `/`.
pub fn list_entries(root: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        let rel = entry.path().strip_prefix(root)?;
        let mut name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if PathType::of(entry.path()) == PathType::Directory {
            name.push('/');
        }
        out.push(name);
    }
    out.sort();
    Ok(out)
}
