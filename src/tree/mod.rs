//! The operation tree: node contexts, operation tables, the binder that
//! merges them and the builder that walks a descriptor.

pub mod binder;
pub mod builder;
pub mod context;
pub mod node;
pub mod ops;
