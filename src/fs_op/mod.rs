//! Filesystem primitives the tree operations are built on.
//!
//! `backend` defines the storage seam; `create`, `remove` and `stat` are the
//! `std::fs` helpers the native backend delegates to, and `path` holds the
//! join rules used to place every node.

pub mod backend;
pub mod create;
pub mod path;
pub mod remove;
pub mod stat;
