use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::descriptor::{Descriptor, FileData, NodeKind};
use crate::fs_op::backend::StorageBackend;
use crate::fs_op::path;
use crate::tree::binder::CustomOps;

/// Shared by every node of one build, and by nodes later derived from them
/// through create operations.
pub(crate) struct BuildEnv {
    pub(crate) storage: Arc<dyn StorageBackend>,
    pub(crate) custom: CustomOps,
}

/// Everything known about one tree position. Immutable once created.
pub struct NodeContext {
    path: PathBuf,
    parent_path: Option<PathBuf>,
    key: Option<String>,
    descriptor: Descriptor,
    env: Arc<BuildEnv>,
}

impl NodeContext {
    pub(crate) fn new(
        env: Arc<BuildEnv>,
        path: PathBuf,
        parent_path: Option<PathBuf>,
        key: Option<String>,
        descriptor: Descriptor,
    ) -> Arc<Self> {
        Arc::new(NodeContext {
            path,
            parent_path,
            key,
            descriptor,
            env,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` for the root of a build.
    pub fn parent_path(&self) -> Option<&Path> {
        self.parent_path.as_deref()
    }

    /// The key this node was declared (or created) under.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.descriptor.kind()
    }

    pub fn skip(&self) -> bool {
        self.descriptor.skip()
    }

    pub fn data(&self) -> Option<&FileData> {
        self.descriptor.data()
    }

    /// Resolve the declared data now. Files without data resolve to `""`.
    pub fn resolve_data(&self) -> String {
        self.data().map(FileData::resolve).unwrap_or_default()
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Descriptor>> {
        self.descriptor.children()
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.env.storage.as_ref()
    }

    /// Absolute path of `name` relative to this node.
    pub fn resolve(&self, name: &str) -> PathBuf {
        path::resolve(&self.path, name)
    }

    pub(crate) fn env(&self) -> &Arc<BuildEnv> {
        &self.env
    }
}

impl fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeContext")
            .field("path", &self.path)
            .field("parent_path", &self.parent_path)
            .field("key", &self.key)
            .field("kind", &self.kind())
            .field("skip", &self.skip())
            .finish()
    }
}
