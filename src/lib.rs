//! Ordered collections backed by an arena-allocated red-black tree.
//!
//! `RedBlackMap<T, U>` binds keys to payloads and `RedBlackSet<T>` stores bare keys. Both
//! share the same engine: nodes live in a [`TypedArena`](arena::TypedArena), refer to each
//! other through copyable handles, and every leaf slot points at a single shared sentinel
//! handle.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod entry;
pub mod arena;
pub mod red_black_tree;

/// Number of nodes allocated per arena chunk by `new()` constructors.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
