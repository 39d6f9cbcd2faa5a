//! Structural traversal of values that may contain sensitive text.
//!
//! A type describes itself through [`Walk`]: a string leaf, a list of
//! children (optionally tagged), a lock-guarded shared node, or nothing worth
//! scanning. `#[derive(Walk)]` writes the description for structs and enums;
//! this module provides it for strings, std containers, primitives and
//! `Arc<RwLock<T>>` / `Arc<Mutex<T>>`.
//!
//! Shared nodes carry an identity so a traversal visits each one at most once,
//! which makes cyclic graphs safe to walk.

mod engine;
mod impls;

pub(crate) use engine::Walker;

/// A value the resolver can traverse.
pub trait Walk: Send + Sync {
    /// Read-only view of this value's structure.
    fn shape(&self) -> Shape<'_>;

    /// Mutable view of this value's structure.
    fn shape_mut(&mut self) -> ShapeMut<'_>;
}

/// Read-only structure of a [`Walk`] value.
pub enum Shape<'a> {
    /// A string leaf.
    Text(&'a str),
    /// Nested values, scanned independently.
    Children(Vec<Child<'a>>),
    /// A node reachable from several places, visited once per traversal.
    Shared(&'a dyn SharedWalk),
    /// Nothing to scan.
    Opaque,
}

/// Mutable structure of a [`Walk`] value.
pub enum ShapeMut<'a> {
    Text(&'a mut String),
    Children(Vec<ChildMut<'a>>),
    Shared(&'a dyn SharedWalk),
    Opaque,
}

/// A nested value with the tag that scopes its subtree.
pub struct Child<'a> {
    pub value: &'a dyn Walk,
    pub tag: Option<&'a str>,
}

impl<'a> Child<'a> {
    /// An untagged child; it inherits its parent's tag.
    pub fn new<T: Walk>(value: &'a T) -> Self {
        Self { value, tag: None }
    }

    /// A child whose subtree only sees policies tagged `tag` or untagged.
    pub fn tagged<T: Walk>(value: &'a T, tag: &'a str) -> Self {
        Self {
            value,
            tag: Some(tag),
        }
    }
}

/// Mutable counterpart of [`Child`].
pub struct ChildMut<'a> {
    pub value: &'a mut dyn Walk,
    pub tag: Option<&'a str>,
}

impl<'a> ChildMut<'a> {
    pub fn new<T: Walk>(value: &'a mut T) -> Self {
        Self { value, tag: None }
    }

    pub fn tagged<T: Walk>(value: &'a mut T, tag: &'a str) -> Self {
        Self {
            value,
            tag: Some(tag),
        }
    }
}

/// A lock-guarded node shared by reference count.
pub trait SharedWalk: Send + Sync {
    /// Address of the shared allocation; equal for every handle to the node.
    fn identity(&self) -> usize;

    /// Runs `visit` with the node read-locked.
    fn with_read(&self, visit: &mut dyn FnMut(&dyn Walk));

    /// Runs `visit` with the node write-locked.
    fn with_write(&self, visit: &mut dyn FnMut(&mut dyn Walk));
}
