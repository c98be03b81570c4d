use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::Descriptor;
use crate::errors::{DescriptorError, Result};
use crate::fs_op::backend::{NativeStorage, StorageBackend};
use crate::fs_op::path;
use crate::tree::binder::{bind, factories_for, CustomOps};
use crate::tree::context::{BuildEnv, NodeContext};
use crate::tree::node::{DirNode, FileNode, Node};
use crate::tree::ops::OperationTable;

/// Build a tree rooted at `root` on the native filesystem.
///
/// Building touches no storage: it only computes paths and binds
/// operations. Custom factories, when given, are bound after the defaults
/// for their node kind.
pub fn build(
    root: impl Into<PathBuf>,
    descriptor: &Descriptor,
    custom: Option<&CustomOps>,
) -> Result<Node> {
    let mut builder = TreeBuilder::new(root);
    if let Some(c) = custom {
        builder = builder.custom_ops(c.clone());
    }
    builder.build(descriptor)
}

/// Per-build options: root path, storage backend, custom operations.
#[derive(Clone)]
pub struct TreeBuilder {
    root: PathBuf,
    storage: Arc<dyn StorageBackend>,
    custom: CustomOps,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TreeBuilder {
            root: root.into(),
            storage: Arc::new(NativeStorage),
            custom: CustomOps::default(),
        }
    }

    pub fn storage<S: StorageBackend + 'static>(self, storage: S) -> Self {
        self.shared_storage(Arc::new(storage))
    }

    pub fn shared_storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = storage;
        self
    }

    pub fn custom_ops(mut self, custom: CustomOps) -> Self {
        self.custom = custom;
        self
    }

    pub fn file_ops<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Arc<NodeContext>) -> OperationTable + Send + Sync + 'static,
    {
        self.custom = self.custom.with_file_ops(factory);
        self
    }

    pub fn dir_ops<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Arc<NodeContext>) -> OperationTable + Send + Sync + 'static,
    {
        self.custom = self.custom.with_dir_ops(factory);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `descriptor` as a whole, then bind every node depth-first.
    pub fn build(&self, descriptor: &Descriptor) -> Result<Node> {
        validate(descriptor)?;
        let env = Arc::new(BuildEnv {
            storage: self.storage.clone(),
            custom: self.custom.clone(),
        });
        debug!(root = %self.root.display(), kind = %descriptor.kind(), "building tree");
        let node = build_node(&env, self.root.clone(), None, None, descriptor)?;
        debug!(root = %self.root.display(), "tree built");
        Ok(node)
    }
}

/// Check every declared key before any node is bound. Sibling keys must
/// name distinct paths below their directory.
fn validate(descriptor: &Descriptor) -> Result<()> {
    let Some(children) = descriptor.children() else {
        return Ok(());
    };
    let anchor = Path::new("");
    let mut seen: HashMap<PathBuf, &str> = HashMap::new();
    for (key, child) in children {
        path::validate_key(key).map_err(|e| DescriptorError::InvalidKey {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        if let Some(other) = seen.insert(path::resolve(anchor, key), key) {
            return Err(DescriptorError::InvalidKey {
                key: key.clone(),
                reason: format!("resolves to the same path as `{other}`"),
            }
            .into());
        }
        validate(child)?;
    }
    Ok(())
}

fn build_node(
    env: &Arc<BuildEnv>,
    path: PathBuf,
    parent: Option<&Path>,
    key: Option<&str>,
    descriptor: &Descriptor,
) -> Result<Node> {
    let ctx = NodeContext::new(
        env.clone(),
        path,
        parent.map(Path::to_path_buf),
        key.map(str::to_string),
        descriptor.clone(),
    );
    let ops = bind(&ctx, &factories_for(ctx.kind(), &env.custom));

    match descriptor {
        Descriptor::File(_) => Ok(Node::File(FileNode::new(ctx, ops))),
        Descriptor::Dir(spec) => {
            let mut children = BTreeMap::new();
            for (k, sub) in &spec.children {
                let child_path = ctx.resolve(k);
                let child = build_node(env, child_path, Some(ctx.path()), Some(k), sub)?;
                children.insert(k.clone(), child);
            }
            Ok(Node::Dir(DirNode::new(ctx, ops, children)))
        }
    }
}

/// Bind a fresh node for `name` below `parent`, sharing the parent's build
/// environment. Used by the create operations; the parent's declared
/// children are left as they are.
pub(crate) fn bind_created(
    parent: &NodeContext,
    name: &str,
    descriptor: Descriptor,
) -> Result<Node> {
    build_node(
        parent.env(),
        parent.resolve(name),
        Some(parent.path()),
        Some(name),
        &descriptor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TreeError;
    use crate::tree::ops::{names, OpOutput};

    fn sample() -> Descriptor {
        Descriptor::dir()
            .child("file1", Descriptor::file())
            .child(
                "dir1",
                Descriptor::dir()
                    .child("inner", Descriptor::file_with("x"))
                    .child("deeper", Descriptor::dir().child("leaf", Descriptor::file())),
            )
    }

    #[test]
    fn child_paths_follow_parent_paths() {
        let root = PathBuf::from("/fixture/root");
        let tree = build(&root, &sample(), None).unwrap().into_dir().unwrap();

        assert_eq!(tree.path(), root);
        assert!(tree.context().parent_path().is_none());
        assert_eq!(tree.file("file1").unwrap().path(), root.join("file1"));

        let dir1 = tree.dir("dir1").unwrap();
        assert_eq!(dir1.path(), root.join("dir1"));
        assert_eq!(dir1.context().parent_path(), Some(root.as_path()));
        let leaf = dir1.dir("deeper").unwrap().file("leaf").unwrap();
        assert_eq!(leaf.path(), root.join("dir1").join("deeper").join("leaf"));
        assert_eq!(leaf.context().key(), Some("leaf"));
    }

    #[test]
    fn children_match_declared_keys() {
        let tree = build("/r", &sample(), None).unwrap().into_dir().unwrap();
        let keys: Vec<_> = tree.children().keys().cloned().collect();
        assert_eq!(keys, vec!["dir1".to_string(), "file1".to_string()]);
        assert!(tree.dir("dir1").unwrap().children().contains_key("inner"));
    }

    #[test]
    fn root_may_be_a_file() {
        let node = build("/r/only.txt", &Descriptor::file(), None).unwrap();
        let file = node.into_file().unwrap();
        assert_eq!(file.get_path().unwrap(), PathBuf::from("/r/only.txt"));
    }

    #[test]
    fn child_named_like_an_operation_is_fine() {
        let desc = Descriptor::dir().child(names::GET_PATH, Descriptor::file());
        let tree = build("/r", &desc, None).unwrap().into_dir().unwrap();
        assert_eq!(tree.get_path().unwrap(), PathBuf::from("/r"));
        assert_eq!(
            tree.file(names::GET_PATH).unwrap().path(),
            Path::new("/r").join(names::GET_PATH)
        );
    }

    #[test]
    fn invalid_keys_fail_before_binding() {
        let desc = Descriptor::dir().child(
            "ok",
            Descriptor::dir().child("../escape", Descriptor::file()),
        );
        let err = build("/r", &desc, None).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Descriptor(DescriptorError::InvalidKey { ref key, .. }) if key == "../escape"
        ));

        let desc = Descriptor::dir()
            .child("a/b", Descriptor::file())
            .child("a//b", Descriptor::file());
        assert!(matches!(
            build("/r", &desc, None).unwrap_err(),
            TreeError::Descriptor(DescriptorError::InvalidKey { .. })
        ));
    }

    #[test]
    fn custom_ops_reach_every_node_of_their_kind() {
        let custom = CustomOps::new().with_file_ops(|ctx: &Arc<NodeContext>| {
            let key = ctx.key().unwrap_or_default().to_string();
            OperationTable::new().with("whoami", move |_| Ok(OpOutput::Text(key.clone())))
        });
        let tree = build("/r", &sample(), Some(&custom)).unwrap().into_dir().unwrap();
        let leaf = tree.dir("dir1").unwrap().dir("deeper").unwrap().file("leaf").unwrap();
        assert_eq!(leaf.call("whoami", &[]).unwrap().into_text("whoami").unwrap(), "leaf");
        assert!(matches!(
            tree.call("whoami", &[]).unwrap_err(),
            TreeError::UnknownOperation { .. }
        ));
    }
}
