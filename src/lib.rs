//! Build a live, path-aware tree of filesystem handles from a declarative
//! description of files and directories.
//!
//! ```no_run
//! use fixture_tree::{build, Descriptor};
//!
//! let desc = Descriptor::dir()
//!     .child("file1", Descriptor::file_with("hello"))
//!     .child("dir1", Descriptor::dir());
//! let tree = build("/tmp/fixture", &desc, None)?.into_dir()?;
//! tree.file("file1")?.file_create(None)?;
//! let sub = tree.dir("dir1")?.dir_create("nested")?;
//! sub.file_create("a.txt", Some("x"))?;
//! # Ok::<(), fixture_tree::TreeError>(())
//! ```

pub mod descriptor;
pub mod errors;
pub mod fs_op;
pub mod logging;
pub mod tree;

// Test-only helpers. Enabled via the `test-helpers` feature in Cargo.toml so
// regular builds don't include test scaffolding.
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use crate::descriptor::{Descriptor, DirSpec, FileData, FileSpec, NodeKind};
pub use crate::errors::{DescriptorError, Result, TreeError};
pub use crate::fs_op::backend::{NativeStorage, RemoveOptions, StorageBackend};
pub use crate::tree::binder::{bind, CustomOps, Factory};
pub use crate::tree::builder::{build, TreeBuilder};
pub use crate::tree::context::NodeContext;
pub use crate::tree::node::{DirNode, FileNode, Node};
pub use crate::tree::ops::{OpOutput, Operation, OperationTable};
