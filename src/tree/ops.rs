//! Operation tables and the default operations for file and directory
//! nodes.
//!
//! Directory operations take a name relative to the directory as their
//! first argument. File operations act on the file itself.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::trace;

use crate::descriptor::{Descriptor, FileSpec};
use crate::errors::{Result, TreeError};
use crate::fs_op::backend::RemoveOptions;
use crate::tree::builder;
use crate::tree::context::NodeContext;
use crate::tree::node::{DirNode, FileNode};

/// Names of the default operations.
pub mod names {
    pub const GET_PATH: &str = "get_path";
    pub const EXISTS: &str = "exists";
    pub const DIR_CREATE: &str = "dir_create";
    pub const DIR_DELETE: &str = "dir_delete";
    pub const FILE_CREATE: &str = "file_create";
    pub const FILE_DELETE: &str = "file_delete";
    pub const FILE_READ: &str = "file_read";
    pub const FILE_WRITE: &str = "file_write";
    pub const FILE_CLEAR: &str = "file_clear";
}

/// A bound operation. Arguments are positional strings.
pub type Operation = Arc<dyn Fn(&[&str]) -> Result<OpOutput> + Send + Sync>;

/// Value returned by an operation.
#[derive(Debug, Clone)]
pub enum OpOutput {
    Unit,
    Bool(bool),
    Text(String),
    Path(PathBuf),
    Dir(DirNode),
    File(FileNode),
}

impl OpOutput {
    pub fn label(&self) -> &'static str {
        match self {
            OpOutput::Unit => "nothing",
            OpOutput::Bool(_) => "a bool",
            OpOutput::Text(_) => "text",
            OpOutput::Path(_) => "a path",
            OpOutput::Dir(_) => "a dir node",
            OpOutput::File(_) => "a file node",
        }
    }

    fn mismatch(self, op: &str, expected: &'static str) -> TreeError {
        TreeError::UnexpectedOutput {
            op: op.to_string(),
            expected,
            found: self.label(),
        }
    }

    pub fn into_unit(self, op: &str) -> Result<()> {
        match self {
            OpOutput::Unit => Ok(()),
            other => Err(other.mismatch(op, "nothing")),
        }
    }

    pub fn into_bool(self, op: &str) -> Result<bool> {
        match self {
            OpOutput::Bool(b) => Ok(b),
            other => Err(other.mismatch(op, "a bool")),
        }
    }

    pub fn into_text(self, op: &str) -> Result<String> {
        match self {
            OpOutput::Text(s) => Ok(s),
            other => Err(other.mismatch(op, "text")),
        }
    }

    pub fn into_path(self, op: &str) -> Result<PathBuf> {
        match self {
            OpOutput::Path(p) => Ok(p),
            other => Err(other.mismatch(op, "a path")),
        }
    }

    pub fn into_dir(self, op: &str) -> Result<DirNode> {
        match self {
            OpOutput::Dir(d) => Ok(d),
            other => Err(other.mismatch(op, "a dir node")),
        }
    }

    pub fn into_file(self, op: &str) -> Result<FileNode> {
        match self {
            OpOutput::File(f) => Ok(f),
            other => Err(other.mismatch(op, "a file node")),
        }
    }
}

/// Name-indexed set of operations.
#[derive(Clone, Default)]
pub struct OperationTable {
    ops: BTreeMap<String, Operation>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `op` under `name`, replacing any operation already there.
    pub fn insert<F>(&mut self, name: impl Into<String>, op: F) -> &mut Self
    where
        F: Fn(&[&str]) -> Result<OpOutput> + Send + Sync + 'static,
    {
        self.ops.insert(name.into(), Arc::new(op));
        self
    }

    /// Chaining form of [`OperationTable::insert`].
    pub fn with<F>(mut self, name: impl Into<String>, op: F) -> Self
    where
        F: Fn(&[&str]) -> Result<OpOutput> + Send + Sync + 'static,
    {
        self.insert(name, op);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.ops.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Fold `later` into this table. On a name collision `later` wins.
    pub fn merge(&mut self, later: OperationTable) {
        self.ops.extend(later.ops);
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Positional argument `index` of `op`, or a `MissingArgument` error.
pub fn arg<'a>(op: &str, args: &[&'a str], index: usize) -> Result<&'a str> {
    args.get(index).copied().ok_or_else(|| TreeError::MissingArgument {
        op: op.to_string(),
        index,
    })
}

/// Default operations of a directory node.
pub fn dir_operations(ctx: &Arc<NodeContext>) -> OperationTable {
    let mut t = OperationTable::new();

    let c = ctx.clone();
    t.insert(names::GET_PATH, move |_| Ok(OpOutput::Path(c.path().to_path_buf())));

    let c = ctx.clone();
    t.insert(names::EXISTS, move |args| {
        let target = c.resolve(arg(names::EXISTS, args, 0)?);
        Ok(OpOutput::Bool(c.storage().path_exists(&target)))
    });

    let c = ctx.clone();
    t.insert(names::DIR_CREATE, move |args| {
        let name = arg(names::DIR_CREATE, args, 0)?;
        let target = c.resolve(name);
        trace!(op = names::DIR_CREATE, path = %target.display());
        c.storage().make_directory(&target, true)?;
        let node = builder::bind_created(&c, name, Descriptor::dir())?;
        Ok(OpOutput::Dir(node.into_dir()?))
    });

    let c = ctx.clone();
    t.insert(names::DIR_DELETE, move |args| {
        let target = c.resolve(arg(names::DIR_DELETE, args, 0)?);
        trace!(op = names::DIR_DELETE, path = %target.display());
        c.storage().remove_path(&target, RemoveOptions::FORCE_RECURSIVE)?;
        Ok(OpOutput::Unit)
    });

    let c = ctx.clone();
    t.insert(names::FILE_CREATE, move |args| {
        let name = arg(names::FILE_CREATE, args, 0)?;
        let data = args.get(1).copied().unwrap_or_default();
        let target = c.resolve(name);
        trace!(op = names::FILE_CREATE, path = %target.display());
        c.storage().write_text_file(&target, data)?;
        let spec = FileSpec {
            data: Some(data.into()),
            skip: false,
        };
        let node = builder::bind_created(&c, name, Descriptor::File(spec))?;
        Ok(OpOutput::File(node.into_file()?))
    });

    let c = ctx.clone();
    t.insert(names::FILE_DELETE, move |args| {
        let target = c.resolve(arg(names::FILE_DELETE, args, 0)?);
        trace!(op = names::FILE_DELETE, path = %target.display());
        c.storage().remove_path(&target, RemoveOptions::FORCE)?;
        Ok(OpOutput::Unit)
    });

    let c = ctx.clone();
    t.insert(names::FILE_READ, move |args| {
        let target = c.resolve(arg(names::FILE_READ, args, 0)?);
        Ok(OpOutput::Text(c.storage().read_text_file(&target)?))
    });

    let c = ctx.clone();
    t.insert(names::FILE_WRITE, move |args| {
        let target = c.resolve(arg(names::FILE_WRITE, args, 0)?);
        let data = arg(names::FILE_WRITE, args, 1)?;
        trace!(op = names::FILE_WRITE, path = %target.display());
        c.storage().write_text_file(&target, data)?;
        Ok(OpOutput::Unit)
    });

    let c = ctx.clone();
    t.insert(names::FILE_CLEAR, move |args| {
        let target = c.resolve(arg(names::FILE_CLEAR, args, 0)?);
        trace!(op = names::FILE_CLEAR, path = %target.display());
        c.storage().write_text_file(&target, "")?;
        Ok(OpOutput::Unit)
    });

    t
}

/// Default operations of a file node.
///
/// `file_create` and `file_write` fall back to the declared data, resolved
/// at call time, when no data argument is given.
pub fn file_operations(ctx: &Arc<NodeContext>) -> OperationTable {
    let mut t = OperationTable::new();

    let c = ctx.clone();
    t.insert(names::GET_PATH, move |_| Ok(OpOutput::Path(c.path().to_path_buf())));

    let c = ctx.clone();
    t.insert(names::EXISTS, move |_| Ok(OpOutput::Bool(c.storage().path_exists(c.path()))));

    for op in [names::FILE_CREATE, names::FILE_WRITE] {
        let c = ctx.clone();
        t.insert(op, move |args| {
            let data = match args.first() {
                Some(d) => d.to_string(),
                None => c.resolve_data(),
            };
            trace!(op = op, path = %c.path().display());
            c.storage().write_text_file(c.path(), &data)?;
            Ok(OpOutput::Unit)
        });
    }

    let c = ctx.clone();
    t.insert(names::FILE_READ, move |_| Ok(OpOutput::Text(c.storage().read_text_file(c.path())?)));

    let c = ctx.clone();
    t.insert(names::FILE_CLEAR, move |_| {
        trace!(op = names::FILE_CLEAR, path = %c.path().display());
        c.storage().write_text_file(c.path(), "")?;
        Ok(OpOutput::Unit)
    });

    let c = ctx.clone();
    t.insert(names::FILE_DELETE, move |_| {
        trace!(op = names::FILE_DELETE, path = %c.path().display());
        c.storage().remove_path(c.path(), RemoveOptions::FORCE)?;
        Ok(OpOutput::Unit)
    });

    t
}
