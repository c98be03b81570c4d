use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while building or operating on a fixture tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Failure reported by the storage backend, passed through untouched.
    #[error(transparent)]
    Storage(#[from] io::Error),

    /// The descriptor could not be loaded or has an unusable shape.
    #[error("malformed descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("no operation `{name}` bound on `{path}`")]
    UnknownOperation { name: String, path: PathBuf },

    #[error("operation `{op}` requires argument #{index}")]
    MissingArgument { op: String, index: usize },

    #[error("operation `{op}` returned {found}, expected {expected}")]
    UnexpectedOutput {
        op: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("no declared child `{name}` under `{path}`")]
    NoSuchChild { name: String, path: PathBuf },

    #[error("`{name}` is a {found} node, expected {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised while reading or validating a descriptor. These happen
/// before any filesystem access for the tree itself.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("invalid TOML descriptor: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read descriptor file: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported descriptor format `{0}` (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("invalid child key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TreeError>;
