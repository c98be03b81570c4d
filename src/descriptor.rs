//! Declarative description of a file/directory tree.
//!
//! Descriptors are plain data: they can be written in code with the
//! constructors below or loaded from TOML/JSON. A node must carry a `kind`
//! tag; everything else is optional.
//!
//! ```toml
//! kind = "dir"
//!
//! [children.file1]
//! kind = "file"
//! data = "hello"
//!
//! [children.dir1]
//! kind = "dir"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::errors::DescriptorError;

/// The two kinds of node a tree can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Dir,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Dir => "dir",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents declared for a file node.
///
/// A producer is called again every time the data is needed; its result is
/// never stored on the tree.
#[derive(Clone)]
pub enum FileData {
    Literal(String),
    Producer(Arc<dyn Fn() -> String + Send + Sync>),
}

impl FileData {
    pub fn resolve(&self) -> String {
        match self {
            FileData::Literal(s) => s.clone(),
            FileData::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for FileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileData::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            FileData::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for FileData {
    fn from(s: &str) -> Self {
        FileData::Literal(s.to_string())
    }
}

impl From<String> for FileData {
    fn from(s: String) -> Self {
        FileData::Literal(s)
    }
}

// Only literals can come from a config file.
impl<'de> Deserialize<'de> for FileData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(FileData::Literal)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSpec {
    #[serde(default)]
    pub data: Option<FileData>,
    /// Caller-defined marker. Default operations ignore it; materialization
    /// leaves skipped nodes out.
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirSpec {
    #[serde(default)]
    pub children: BTreeMap<String, Descriptor>,
    #[serde(default)]
    pub skip: bool,
}

/// One node of a tree description.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Descriptor {
    File(FileSpec),
    Dir(DirSpec),
}

impl Descriptor {
    /// An empty file.
    pub fn file() -> Self {
        Descriptor::File(FileSpec::default())
    }

    pub fn file_with(data: impl Into<FileData>) -> Self {
        Descriptor::File(FileSpec {
            data: Some(data.into()),
            skip: false,
        })
    }

    /// A file whose contents are produced on demand.
    pub fn file_lazy<F>(producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::file_with(FileData::Producer(Arc::new(producer)))
    }

    /// An empty directory.
    pub fn dir() -> Self {
        Descriptor::Dir(DirSpec::default())
    }

    /// Declare a child under this directory, replacing any child already
    /// declared under `key`. File descriptors have no children, so on them
    /// this returns the descriptor unchanged.
    pub fn child(self, key: impl Into<String>, desc: Descriptor) -> Self {
        match self {
            Descriptor::Dir(mut spec) => {
                spec.children.insert(key.into(), desc);
                Descriptor::Dir(spec)
            }
            file => file,
        }
    }

    /// Mark this node with the `skip` flag.
    pub fn skipped(mut self) -> Self {
        match &mut self {
            Descriptor::File(spec) => spec.skip = true,
            Descriptor::Dir(spec) => spec.skip = true,
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Descriptor::File(_) => NodeKind::File,
            Descriptor::Dir(_) => NodeKind::Dir,
        }
    }

    pub fn skip(&self) -> bool {
        match self {
            Descriptor::File(spec) => spec.skip,
            Descriptor::Dir(spec) => spec.skip,
        }
    }

    pub fn data(&self) -> Option<&FileData> {
        match self {
            Descriptor::File(spec) => spec.data.as_ref(),
            Descriptor::Dir(_) => None,
        }
    }

    /// Declared children, or `None` for a file.
    pub fn children(&self) -> Option<&BTreeMap<String, Descriptor>> {
        match self {
            Descriptor::File(_) => None,
            Descriptor::Dir(spec) => Some(&spec.children),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DescriptorError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a descriptor file, picking the format from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        let p = path.as_ref();
        let ext = p
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Self::from_toml_str(&fs::read_to_string(p)?),
            "json" => Self::from_json_str(&fs::read_to_string(p)?),
            _ => Err(DescriptorError::UnsupportedFormat(p.display().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn builders_produce_expected_shape() {
        let d = Descriptor::dir()
            .child("a", Descriptor::file_with("x"))
            .child("b", Descriptor::dir().skipped());
        assert_eq!(d.kind(), NodeKind::Dir);
        let kids = d.children().unwrap();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids["a"].data().unwrap().resolve(), "x");
        assert!(kids["b"].skip());
        assert!(!d.skip());
    }

    #[test]
    fn child_on_file_is_ignored() {
        let d = Descriptor::file().child("x", Descriptor::file());
        assert_eq!(d.kind(), NodeKind::File);
        assert!(d.children().is_none());
    }

    #[test]
    fn producer_runs_on_every_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let d = Descriptor::file_lazy(move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            format!("call {n}")
        });
        let data = d.data().unwrap();
        assert_eq!(data.resolve(), "call 0");
        assert_eq!(data.resolve(), "call 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn parses_toml() {
        let src = r#"
kind = "dir"

[children.file1]
kind = "file"
data = "hello"

[children.dir1]
kind = "dir"
skip = true

[children.dir1.children.inner]
kind = "file"
"#;
        let d = Descriptor::from_toml_str(src).unwrap();
        let kids = d.children().unwrap();
        assert_eq!(kids["file1"].data().unwrap().resolve(), "hello");
        assert!(kids["dir1"].skip());
        assert_eq!(kids["dir1"].children().unwrap()["inner"].kind(), NodeKind::File);
    }

    #[test]
    fn parses_json_with_absent_children() {
        let d = Descriptor::from_json_str(r#"{"kind":"dir"}"#).unwrap();
        assert!(d.children().unwrap().is_empty());
        let d = Descriptor::from_json_str(r#"{"kind":"dir","children":{}}"#).unwrap();
        assert!(d.children().unwrap().is_empty());
    }

    #[test]
    fn missing_kind_is_rejected() {
        let err = Descriptor::from_json_str(r#"{"children":{"a":{"kind":"file"}}}"#).unwrap_err();
        assert!(matches!(err, DescriptorError::Json(_)));
        let err = Descriptor::from_toml_str("kind = \"dir\"\n[children.a]\ndata = \"x\"\n")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Toml(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = Descriptor::from_path("tree.xml").unwrap_err();
        assert!(matches!(err, DescriptorError::UnsupportedFormat(_)));
    }
}
