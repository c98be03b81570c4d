use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::NodeKind;
use crate::tree::context::NodeContext;
use crate::tree::ops::{self, OperationTable};

/// Produces the operations of a node from its context.
pub type Factory = Arc<dyn Fn(&Arc<NodeContext>) -> OperationTable + Send + Sync>;

/// Caller-supplied operation factories, at most one per node kind. They are
/// bound after the defaults, so any name they define replaces the default
/// operation of the same name.
#[derive(Clone, Default)]
pub struct CustomOps {
    pub file: Option<Factory>,
    pub dir: Option<Factory>,
}

impl CustomOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_ops<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Arc<NodeContext>) -> OperationTable + Send + Sync + 'static,
    {
        self.file = Some(Arc::new(factory));
        self
    }

    pub fn with_dir_ops<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Arc<NodeContext>) -> OperationTable + Send + Sync + 'static,
    {
        self.dir = Some(Arc::new(factory));
        self
    }

    pub fn for_kind(&self, kind: NodeKind) -> Option<&Factory> {
        match kind {
            NodeKind::File => self.file.as_ref(),
            NodeKind::Dir => self.dir.as_ref(),
        }
    }
}

impl fmt::Debug for CustomOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomOps")
            .field("file", &self.file.is_some())
            .field("dir", &self.dir.is_some())
            .finish()
    }
}

/// The built-in factory for `kind`.
pub fn default_factory(kind: NodeKind) -> Factory {
    match kind {
        NodeKind::File => Arc::new(ops::file_operations),
        NodeKind::Dir => Arc::new(ops::dir_operations),
    }
}

/// Factories for a node of `kind`, in binding order: default first, then the
/// custom one if any.
pub fn factories_for(kind: NodeKind, custom: &CustomOps) -> Vec<Factory> {
    let mut out = vec![default_factory(kind)];
    if let Some(f) = custom.for_kind(kind) {
        out.push(f.clone());
    }
    out
}

/// Merge the tables produced by `factories` left to right. A later factory
/// replaces earlier operations of the same name. Names are not checked.
pub fn bind(ctx: &Arc<NodeContext>, factories: &[Factory]) -> OperationTable {
    let table = factories.iter().fold(OperationTable::new(), |mut table, factory| {
        table.merge(factory(ctx));
        table
    });
    debug!(path = %ctx.path().display(), kind = %ctx.kind(), ops = table.len(), "bound node");
    table
}
