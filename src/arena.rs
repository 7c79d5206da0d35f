//! Fast, but limited allocator that owns the nodes of a tree.

use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A copyable reference to an object inside a `TypedArena<T>`.
///
/// `Handle::SENTINEL` is reserved: it never names an allocated object and can be shared freely
/// as a "no object here" marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

impl Handle {
    /// The reserved handle that no arena ever hands out.
    pub const SENTINEL: Handle = Handle {
        chunk_index: usize::MAX,
        block_index: usize::MAX,
    };

    /// Returns `true` if this handle is `Handle::SENTINEL`.
    pub fn is_sentinel(self) -> bool {
        self == Handle::SENTINEL
    }
}

/// A fast, but limited allocator that only allocates a single type of object.
///
/// Objects are never freed individually; all of them are dropped together when the arena is
/// cleared or dropped. Storage grows by whole chunks, so allocating never moves an object that
/// is already stored and handles stay valid for the lifetime of the arena.
///
/// # Examples
///
/// ```
/// use red_black_collections::arena::{Handle, TypedArena};
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.get(Handle::SENTINEL), None);
/// ```
pub struct TypedArena<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>` with a specific number of objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_collections::arena::TypedArena;
    ///
    /// // creates a new TypedArena<T> that contains a maximum of 1024 u32's per chunk
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            chunks: Vec::new(),
            chunk_size,
            len: 0,
            capacity: 0,
        }
    }

    /// Allocates an object in the typed arena and returns a `Handle` to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert!(!x.is_sentinel());
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.len == self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        self.len += 1;

        let chunk_index = self.chunks.len() - 1;
        let last_chunk = &mut self.chunks[chunk_index];
        last_chunk.push(value);
        Handle {
            chunk_index,
            block_index: last_chunk.len() - 1,
        }
    }

    /// Returns an immutable reference to an object in the typed arena. Returns `None` if the
    /// handle does not correspond to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.chunks
            .get(handle.chunk_index)
            .and_then(|chunk| chunk.get(handle.block_index))
    }

    /// Returns a mutable reference to an object in the typed arena. Returns `None` if the
    /// handle does not correspond to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get_mut(x), Some(&mut 0));
    /// ```
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.chunks
            .get_mut(handle.chunk_index)
            .and_then(|chunk| chunk.get_mut(handle.block_index))
    }

    /// Returns the number of objects in the typed arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the typed arena holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of objects the allocated chunks can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every object and releases all chunks. Handles obtained before the call must not be
    /// used afterwards.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle out of bounds.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle out of bounds.")
    }
}
