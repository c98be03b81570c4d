//! Built tree nodes.
//!
//! A node keeps its bound operations and its declared children on separate
//! surfaces: [`DirNode::call`] dispatches by operation name, while
//! [`DirNode::child`] looks up children by declared key. A child may share a
//! name with an operation without conflict.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::descriptor::NodeKind;
use crate::errors::{Result, TreeError};
use crate::tree::context::NodeContext;
use crate::tree::ops::{names, OpOutput, OperationTable};

fn invoke(ctx: &NodeContext, ops: &OperationTable, name: &str, args: &[&str]) -> Result<OpOutput> {
    let op = ops.get(name).ok_or_else(|| TreeError::UnknownOperation {
        name: name.to_string(),
        path: ctx.path().to_path_buf(),
    })?;
    trace!(op = name, path = %ctx.path().display(), "invoke");
    op(args)
}

#[derive(Clone, Debug)]
pub enum Node {
    File(FileNode),
    Dir(DirNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.context().kind()
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        match self {
            Node::File(f) => &f.ctx,
            Node::Dir(d) => &d.ctx,
        }
    }

    pub fn path(&self) -> &Path {
        self.context().path()
    }

    pub fn operations(&self) -> &OperationTable {
        match self {
            Node::File(f) => &f.ops,
            Node::Dir(d) => &d.ops,
        }
    }

    pub fn call(&self, name: &str, args: &[&str]) -> Result<OpOutput> {
        invoke(self.context(), self.operations(), name, args)
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            Node::Dir(d) => Some(d),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Dir(_) => None,
        }
    }

    pub fn into_dir(self) -> Result<DirNode> {
        match self {
            Node::Dir(d) => Ok(d),
            Node::File(f) => Err(mismatch(&f.ctx, NodeKind::Dir)),
        }
    }

    pub fn into_file(self) -> Result<FileNode> {
        match self {
            Node::File(f) => Ok(f),
            Node::Dir(d) => Err(mismatch(&d.ctx, NodeKind::File)),
        }
    }

    /// Write the declared tree to storage. See [`DirNode::materialize`].
    pub fn materialize(&self) -> Result<()> {
        match self {
            Node::File(f) => f.materialize(),
            Node::Dir(d) => d.materialize(),
        }
    }
}

fn mismatch(ctx: &NodeContext, expected: NodeKind) -> TreeError {
    TreeError::KindMismatch {
        name: ctx
            .key()
            .map(str::to_string)
            .unwrap_or_else(|| ctx.path().display().to_string()),
        expected: expected.as_str(),
        found: ctx.kind().as_str(),
    }
}

/// A file node: bound operations only.
#[derive(Clone)]
pub struct FileNode {
    ctx: Arc<NodeContext>,
    ops: OperationTable,
}

impl FileNode {
    pub(crate) fn new(ctx: Arc<NodeContext>, ops: OperationTable) -> Self {
        FileNode { ctx, ops }
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.ctx
    }

    pub fn path(&self) -> &Path {
        self.ctx.path()
    }

    pub fn operations(&self) -> &OperationTable {
        &self.ops
    }

    pub fn call(&self, name: &str, args: &[&str]) -> Result<OpOutput> {
        invoke(&self.ctx, &self.ops, name, args)
    }

    pub fn get_path(&self) -> Result<PathBuf> {
        self.call(names::GET_PATH, &[])?.into_path(names::GET_PATH)
    }

    pub fn exists(&self) -> Result<bool> {
        self.call(names::EXISTS, &[])?.into_bool(names::EXISTS)
    }

    /// Write `data`, or the declared data when `None`.
    pub fn file_create(&self, data: Option<&str>) -> Result<()> {
        let args: Vec<&str> = data.into_iter().collect();
        self.call(names::FILE_CREATE, &args)?.into_unit(names::FILE_CREATE)
    }

    pub fn file_read(&self) -> Result<String> {
        self.call(names::FILE_READ, &[])?.into_text(names::FILE_READ)
    }

    /// Replace the contents with `data`, or with the declared data when
    /// `None`.
    pub fn file_write(&self, data: Option<&str>) -> Result<()> {
        let args: Vec<&str> = data.into_iter().collect();
        self.call(names::FILE_WRITE, &args)?.into_unit(names::FILE_WRITE)
    }

    pub fn file_clear(&self) -> Result<()> {
        self.call(names::FILE_CLEAR, &[])?.into_unit(names::FILE_CLEAR)
    }

    pub fn file_delete(&self) -> Result<()> {
        self.call(names::FILE_DELETE, &[])?.into_unit(names::FILE_DELETE)
    }

    /// Create the parent directory if needed, then run `file_create` with
    /// the declared data. Skipped files are left alone.
    pub fn materialize(&self) -> Result<()> {
        if self.ctx.skip() {
            debug!(path = %self.path().display(), "skip flag set, not materializing");
            return Ok(());
        }
        if let Some(parent) = self.path().parent() {
            self.ctx.storage().make_directory(parent, true)?;
        }
        self.file_create(None)
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode")
            .field("path", &self.path())
            .field("ops", &self.ops)
            .finish()
    }
}

/// A directory node: bound operations plus one child per declared key.
///
/// Nodes returned by `dir_create` / `file_create` are not added to
/// `children`; the declared shape is fixed at build time.
#[derive(Clone)]
pub struct DirNode {
    ctx: Arc<NodeContext>,
    ops: OperationTable,
    children: BTreeMap<String, Node>,
}

impl DirNode {
    pub(crate) fn new(
        ctx: Arc<NodeContext>,
        ops: OperationTable,
        children: BTreeMap<String, Node>,
    ) -> Self {
        DirNode { ctx, ops, children }
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.ctx
    }

    pub fn path(&self) -> &Path {
        self.ctx.path()
    }

    pub fn operations(&self) -> &OperationTable {
        &self.ops
    }

    pub fn call(&self, name: &str, args: &[&str]) -> Result<OpOutput> {
        invoke(&self.ctx, &self.ops, name, args)
    }

    pub fn children(&self) -> &BTreeMap<String, Node> {
        &self.children
    }

    pub fn child(&self, key: &str) -> Result<&Node> {
        self.children.get(key).ok_or_else(|| TreeError::NoSuchChild {
            name: key.to_string(),
            path: self.path().to_path_buf(),
        })
    }

    /// Declared child `key`, which must be a directory.
    pub fn dir(&self, key: &str) -> Result<&DirNode> {
        match self.child(key)? {
            Node::Dir(d) => Ok(d),
            Node::File(f) => Err(mismatch(&f.ctx, NodeKind::Dir)),
        }
    }

    /// Declared child `key`, which must be a file.
    pub fn file(&self, key: &str) -> Result<&FileNode> {
        match self.child(key)? {
            Node::File(f) => Ok(f),
            Node::Dir(d) => Err(mismatch(&d.ctx, NodeKind::File)),
        }
    }

    pub fn get_path(&self) -> Result<PathBuf> {
        self.call(names::GET_PATH, &[])?.into_path(names::GET_PATH)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        self.call(names::EXISTS, &[name])?.into_bool(names::EXISTS)
    }

    /// Create `name` (and any missing ancestors) and return a node for it.
    pub fn dir_create(&self, name: &str) -> Result<DirNode> {
        self.call(names::DIR_CREATE, &[name])?.into_dir(names::DIR_CREATE)
    }

    pub fn dir_delete(&self, name: &str) -> Result<()> {
        self.call(names::DIR_DELETE, &[name])?.into_unit(names::DIR_DELETE)
    }

    /// Write `data` (empty when `None`) to `name`. Intermediate directories
    /// of a nested name must already exist.
    pub fn file_create(&self, name: &str, data: Option<&str>) -> Result<FileNode> {
        let mut args = vec![name];
        args.extend(data);
        self.call(names::FILE_CREATE, &args)?.into_file(names::FILE_CREATE)
    }

    pub fn file_delete(&self, name: &str) -> Result<()> {
        self.call(names::FILE_DELETE, &[name])?.into_unit(names::FILE_DELETE)
    }

    pub fn file_read(&self, name: &str) -> Result<String> {
        self.call(names::FILE_READ, &[name])?.into_text(names::FILE_READ)
    }

    pub fn file_write(&self, name: &str, data: &str) -> Result<()> {
        self.call(names::FILE_WRITE, &[name, data])?.into_unit(names::FILE_WRITE)
    }

    pub fn file_clear(&self, name: &str) -> Result<()> {
        self.call(names::FILE_CLEAR, &[name])?.into_unit(names::FILE_CLEAR)
    }

    /// Create this directory and everything declared below it, pre-order.
    /// File contents are resolved as they are written. A node with the skip
    /// flag is left out together with its subtree.
    pub fn materialize(&self) -> Result<()> {
        if self.ctx.skip() {
            debug!(path = %self.path().display(), "skip flag set, not materializing");
            return Ok(());
        }
        self.ctx.storage().make_directory(self.path(), true)?;
        for child in self.children.values() {
            child.materialize()?;
        }
        Ok(())
    }
}

impl fmt::Debug for DirNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirNode")
            .field("path", &self.path())
            .field("ops", &self.ops)
            .field("children", &self.children)
            .finish()
    }
}
