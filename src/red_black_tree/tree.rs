use crate::arena::{Handle, TypedArena};
use crate::entry::Entry;
use crate::red_black_tree::node::{Color, Node};
use crate::red_black_tree::{Error, Result};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Arena-backed red black tree shared by `RedBlackMap` and `RedBlackSet`.
///
/// Every leaf slot holds `Handle::SENTINEL`, which reads as a black node with no children. An
/// empty tree has the sentinel as its root.
pub struct Tree<T, U>
where
    T: Ord,
{
    arena: TypedArena<Node<T, U>>,
    root: Handle,
    len: usize,
}

impl<T, U> Tree<T, U>
where
    T: Ord,
{
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: Handle::SENTINEL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = Handle::SENTINEL;
        self.len = 0;
    }

    fn color(&self, handle: Handle) -> Color {
        self.arena.get(handle).map_or(Color::Black, |node| node.color)
    }

    fn parent(&self, handle: Handle) -> Option<Handle> {
        self.arena.get(handle).and_then(|node| node.parent)
    }

    // Points `parent`'s link to `old` at `new` instead, or makes `new` the root.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            None => {
                debug!("root moved to {:?}", new);
                self.root = new;
            },
            Some(parent) => {
                let parent_node = &mut self.arena[parent];
                if parent_node.left == old {
                    parent_node.left = new;
                } else {
                    parent_node.right = new;
                }
            },
        }
    }

    /// Promotes the right child of `x` into the position of `x`.
    ///
    /// Colors are left untouched and the red black invariants are not restored; the links are
    /// only consistent again once the whole call returns.
    ///
    /// # Panics
    ///
    /// Panics if `x` has no right child.
    pub fn rotate_left(&mut self, x: Handle) {
        let y = self.arena[x].right;
        assert!(!y.is_sentinel(), "Error: left rotation requires a right child.");
        trace!("rotating left at {:?}", x);

        let inner = self.arena[y].left;
        self.arena[x].right = inner;
        if let Some(inner_node) = self.arena.get_mut(inner) {
            inner_node.parent = Some(x);
        }

        let parent = self.arena[x].parent;
        self.arena[y].parent = parent;
        self.replace_child(parent, x, y);

        self.arena[y].left = x;
        self.arena[x].parent = Some(y);
    }

    /// Promotes the left child of `y` into the position of `y`. Mirror of `rotate_left`.
    ///
    /// # Panics
    ///
    /// Panics if `y` has no left child.
    pub fn rotate_right(&mut self, y: Handle) {
        let x = self.arena[y].left;
        assert!(!x.is_sentinel(), "Error: right rotation requires a left child.");
        trace!("rotating right at {:?}", y);

        let inner = self.arena[x].right;
        self.arena[y].left = inner;
        if let Some(inner_node) = self.arena.get_mut(inner) {
            inner_node.parent = Some(y);
        }

        let parent = self.arena[y].parent;
        self.arena[x].parent = parent;
        self.replace_child(parent, y, x);

        self.arena[x].right = y;
        self.arena[y].parent = Some(x);
    }

    /// Inserts a new red node for `key`. Equal keys are never replaced: the new node descends to
    /// the right of every equal key on its path.
    pub fn insert(&mut self, key: T, value: U) -> Handle {
        let mut new_node = Node::new(key, value);
        let mut parent = None;
        let mut is_left = false;
        let mut current = self.root;

        while let Some(node) = self.arena.get(current) {
            parent = Some(current);
            is_left = new_node.entry < node.entry;
            current = if is_left { node.left } else { node.right };
        }

        new_node.parent = parent;
        let handle = self.arena.allocate(new_node);
        match parent {
            None => self.root = handle,
            Some(parent) if is_left => self.arena[parent].left = handle,
            Some(parent) => self.arena[parent].right = handle,
        }
        self.len += 1;

        self.fix_insert(handle);
        handle
    }

    // Restores the color invariants after `z` was attached as a red leaf.
    fn fix_insert(&mut self, mut z: Handle) {
        while let Some(parent) = self.parent(z) {
            if self.color(parent) == Color::Black {
                break;
            }
            let grandparent = self
                .parent(parent)
                .expect("Expected a red node to have a parent.");

            if parent == self.arena[grandparent].left {
                let uncle = self.arena[grandparent].right;
                if self.color(uncle) == Color::Red {
                    trace!("red uncle under {:?}, recoloring", grandparent);
                    self.arena[parent].color = Color::Black;
                    self.arena[uncle].color = Color::Black;
                    self.arena[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.arena[parent].right {
                        trace!("inner left-right child {:?}", z);
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.arena[z].parent.expect("Expected a parent after rotation.");
                    self.arena[parent].color = Color::Black;
                    self.arena[grandparent].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.arena[grandparent].left;
                if self.color(uncle) == Color::Red {
                    trace!("red uncle under {:?}, recoloring", grandparent);
                    self.arena[parent].color = Color::Black;
                    self.arena[uncle].color = Color::Black;
                    self.arena[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.arena[parent].left {
                        trace!("inner right-left child {:?}", z);
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.arena[z].parent.expect("Expected a parent after rotation.");
                    self.arena[parent].color = Color::Black;
                    self.arena[grandparent].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }

        let root = self.root;
        self.arena[root].color = Color::Black;
    }

    // Returns the first node on the search path whose key equals `key`, or the sentinel.
    fn find<V>(&self, key: &V) -> Handle
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node) = self.arena.get(current) {
            match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => break,
            }
        }
        current
    }

    pub fn get<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.arena.get(self.find(key)).map(|node| &node.entry)
    }

    pub fn get_mut<V>(&mut self, key: &V) -> Option<&mut Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let handle = self.find(key);
        self.arena.get_mut(handle).map(|node| &mut node.entry)
    }

    pub fn floor<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut ret = None;
        while let Some(node) = self.arena.get(current) {
            match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => {
                    ret = Some(&node.entry);
                    current = node.right;
                },
                Ordering::Equal => return Some(&node.entry),
            }
        }
        ret
    }

    pub fn ceil<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut ret = None;
        while let Some(node) = self.arena.get(current) {
            match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => {
                    ret = Some(&node.entry);
                    current = node.left;
                },
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(&node.entry),
            }
        }
        ret
    }

    pub fn min(&self) -> Option<&Entry<T, U>> {
        let mut curr = self.arena.get(self.root)?;
        while let Some(left_node) = self.arena.get(curr.left) {
            curr = left_node;
        }
        Some(&curr.entry)
    }

    pub fn max(&self) -> Option<&Entry<T, U>> {
        let mut curr = self.arena.get(self.root)?;
        while let Some(right_node) = self.arena.get(curr.right) {
            curr = right_node;
        }
        Some(&curr.entry)
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut ret = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((handle, depth)) = stack.pop() {
            if let Some(node) = self.arena.get(handle) {
                ret = ret.max(depth);
                stack.push((node.left, depth + 1));
                stack.push((node.right, depth + 1));
            }
        }
        ret
    }

    /// Checks every red black invariant and returns the black height of the root: the number
    /// of black nodes below the root on any path down to the sentinel, the sentinel included.
    ///
    /// Keys equal to a node's key may sit in either subtree once rotations have moved them, so
    /// ordering is checked as `left <= key <= right`.
    pub fn validate(&self) -> Result<usize> {
        if self.color(Handle::SENTINEL) != Color::Black {
            return Err(Error::RedSentinel);
        }
        let root = match self.arena.get(self.root) {
            Some(root) => root,
            None if self.len == 0 => return Ok(0),
            None => {
                return Err(Error::LengthMismatch {
                    expected: self.len,
                    found: 0,
                })
            },
        };
        if root.color != Color::Black {
            return Err(Error::RedRoot);
        }
        if root.parent.is_some() {
            return Err(Error::ParentMismatch);
        }

        let mut expected_blacks = None;
        let mut count = 0;
        let mut stack: Vec<(Handle, Option<&T>, Option<&T>, usize)> =
            vec![(self.root, None, None, 0)];

        while let Some((handle, lower, upper, blacks)) = stack.pop() {
            let node = match self.arena.get(handle) {
                Some(node) => node,
                None => {
                    let blacks = blacks + 1;
                    match expected_blacks {
                        None => expected_blacks = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(Error::BlackHeightMismatch {
                                expected: expected - 1,
                                found: blacks - 1,
                            })
                        },
                        Some(_) => {},
                    }
                    continue;
                },
            };
            count += 1;

            let key = &node.entry.key;
            if lower.map_or(false, |lower| key < lower) || upper.map_or(false, |upper| key > upper)
            {
                return Err(Error::OrderViolation);
            }
            for &child in &[node.left, node.right] {
                if let Some(child_node) = self.arena.get(child) {
                    if child_node.parent != Some(handle) {
                        return Err(Error::ParentMismatch);
                    }
                    if node.color == Color::Red && child_node.color == Color::Red {
                        return Err(Error::ConsecutiveRed);
                    }
                }
            }

            let blacks = if node.color == Color::Black { blacks + 1 } else { blacks };
            stack.push((node.left, lower, Some(key), blacks));
            stack.push((node.right, Some(key), upper, blacks));
        }

        if count != self.len {
            return Err(Error::LengthMismatch {
                expected: self.len,
                found: count,
            });
        }
        // The root is black and counted on every path, so it is excluded here.
        Ok(expected_blacks.map_or(0, |blacks| blacks - 1))
    }

    /// Writes one line per node, visiting the right subtree, then the node, then the left
    /// subtree. `write_entry` renders the key (and payload) part of each line.
    pub fn write_tree<W, F>(&self, out: &mut W, mut write_entry: F) -> fmt::Result
    where
        W: fmt::Write,
        F: FnMut(&mut W, &Entry<T, U>) -> fmt::Result,
    {
        let mut stack: Vec<(Handle, usize, &str)> = Vec::new();
        let mut current = (self.root, 0, "Root:");
        loop {
            while let Some(node) = self.arena.get(current.0) {
                stack.push(current);
                current = (node.right, current.1 + 1, "R---");
            }
            let (handle, depth, prefix) = match stack.pop() {
                Some(frame) => frame,
                None => return Ok(()),
            };
            let node = &self.arena[handle];
            write!(out, "{:width$}{} ", "", prefix, width = depth * 4)?;
            write_entry(out, &node.entry)?;
            writeln!(out, " ({})", node.color)?;
            current = (node.left, depth + 1, "L---");
        }
    }

    pub fn iter(&self) -> TreeIter<'_, T, U> {
        TreeIter {
            tree: self,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

/// In-order iterator over the entries of a `Tree<T, U>`.
pub struct TreeIter<'a, T, U>
where
    T: Ord,
{
    tree: &'a Tree<T, U>,
    current: Handle,
    stack: Vec<&'a Node<T, U>>,
}

impl<'a, T, U> Iterator for TreeIter<'a, T, U>
where
    T: Ord,
{
    type Item = &'a Entry<T, U>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree: &'a Tree<T, U> = self.tree;
        while let Some(node) = tree.arena.get(self.current) {
            self.current = node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            self.current = node.right;
            &node.entry
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::arena::Handle;
    use crate::red_black_tree::node::Color;
    use crate::red_black_tree::Error;
    use std::fmt::Write;

    type Shape = Vec<(u32, Color, Option<u32>, Option<u32>, Option<u32>)>;

    fn key_of(tree: &Tree<u32, ()>, handle: Handle) -> Option<u32> {
        tree.arena.get(handle).map(|node| node.entry.key)
    }

    // Every node with its color and the keys of its parent and children, in key order.
    fn shape(tree: &Tree<u32, ()>) -> Shape {
        let mut ret = Vec::new();
        let mut stack = vec![tree.root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = tree.arena.get(handle) {
                ret.push((
                    node.entry.key,
                    node.color,
                    node.parent.and_then(|parent| key_of(tree, parent)),
                    key_of(tree, node.left),
                    key_of(tree, node.right),
                ));
                stack.push(node.left);
                stack.push(node.right);
            }
        }
        ret.sort_by_key(|node| node.0);
        ret
    }

    fn tree_from(keys: &[u32]) -> Tree<u32, ()> {
        let mut tree = Tree::new(16);
        for &key in keys {
            tree.insert(key, ());
        }
        tree
    }

    fn render(tree: &Tree<u32, ()>) -> String {
        let mut out = String::new();
        tree.write_tree(&mut out, |out, entry| write!(out, "{}", entry.key))
            .unwrap();
        out
    }

    #[test]
    fn test_empty() {
        let tree: Tree<u32, ()> = Tree::new(16);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.validate(), Ok(0));
        assert!(tree.min().is_none());
        assert_eq!(render(&tree), "");
    }

    #[test]
    fn test_single_insert_is_black_root() {
        let tree = tree_from(&[7]);
        assert_eq!(shape(&tree), vec![(7, Color::Black, None, None, None)]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn test_red_uncle_recolors() {
        let tree = tree_from(&[2, 1, 3, 4]);
        assert_eq!(
            shape(&tree),
            vec![
                (1, Color::Black, Some(2), None, None),
                (2, Color::Black, None, Some(1), Some(3)),
                (3, Color::Black, Some(2), None, Some(4)),
                (4, Color::Red, Some(3), None, None),
            ],
        );
    }

    #[test]
    fn test_line_case_rotates() {
        let tree = tree_from(&[3, 2, 1]);
        assert_eq!(
            shape(&tree),
            vec![
                (1, Color::Red, Some(2), None, None),
                (2, Color::Black, None, Some(1), Some(3)),
                (3, Color::Red, Some(2), None, None),
            ],
        );
    }

    #[test]
    fn test_triangle_case_rotates_twice() {
        for keys in &[[3, 1, 2], [1, 3, 2]] {
            let tree = tree_from(keys);
            assert_eq!(
                shape(&tree),
                vec![
                    (1, Color::Red, Some(2), None, None),
                    (2, Color::Black, None, Some(1), Some(3)),
                    (3, Color::Red, Some(2), None, None),
                ],
            );
        }
    }

    #[test]
    fn test_reference_shape() {
        let tree = tree_from(&[20, 15, 25, 10, 5, 1, 30, 35]);
        assert_eq!(key_of(&tree, tree.root), Some(20));
        assert_eq!(
            shape(&tree),
            vec![
                (1, Color::Red, Some(5), None, None),
                (5, Color::Black, Some(10), Some(1), None),
                (10, Color::Red, Some(20), Some(5), Some(15)),
                (15, Color::Black, Some(10), None, None),
                (20, Color::Black, None, Some(10), Some(30)),
                (25, Color::Red, Some(30), None, None),
                (30, Color::Black, Some(20), Some(25), Some(35)),
                (35, Color::Red, Some(30), None, None),
            ],
        );
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn test_rotate_left_then_right_restores_shape() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let before = shape(&tree);
        let root = tree.root;
        let pivot = tree.arena[root].right;

        tree.rotate_left(root);
        assert_eq!(tree.root, pivot);
        assert_eq!(tree.arena[root].parent, Some(pivot));
        assert_eq!(tree.arena[pivot].left, root);
        assert_eq!(key_of(&tree, tree.arena[root].right), Some(5));

        tree.rotate_right(pivot);
        assert_eq!(tree.root, root);
        assert_eq!(tree.arena[root].parent, None);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn test_rotate_right_then_left_below_root() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let before = shape(&tree);
        let node = tree.arena[tree.root].left;
        let pivot = tree.arena[node].left;

        tree.rotate_right(node);
        assert_eq!(tree.arena[tree.root].left, pivot);
        assert_eq!(key_of(&tree, tree.arena[pivot].right), Some(2));
        assert_eq!(key_of(&tree, tree.arena[node].left), None);

        tree.rotate_left(pivot);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn test_rotation_keeps_key_order() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let root = tree.root;
        tree.rotate_left(root);
        assert_eq!(
            tree.iter().map(|entry| entry.key).collect::<Vec<u32>>(),
            vec![1, 2, 3, 4, 5, 6, 7],
        );
    }

    #[test]
    #[should_panic]
    fn test_rotate_left_without_right_child() {
        let mut tree = tree_from(&[2, 1]);
        let root = tree.root;
        tree.rotate_left(root);
    }

    #[test]
    fn test_validate_detects_red_root() {
        let mut tree = tree_from(&[2, 1, 3]);
        let root = tree.root;
        tree.arena[root].color = Color::Red;
        assert_eq!(tree.validate(), Err(Error::RedRoot));
    }

    #[test]
    fn test_validate_detects_consecutive_red() {
        let mut tree = tree_from(&[2, 1, 3, 4]);
        let three = tree.arena[tree.root].right;
        tree.arena[three].color = Color::Red;
        assert_eq!(tree.validate(), Err(Error::ConsecutiveRed));
    }

    #[test]
    fn test_validate_detects_black_height_mismatch() {
        let mut tree = tree_from(&[2, 1, 3]);
        let one = tree.arena[tree.root].left;
        tree.arena[one].color = Color::Black;
        assert_eq!(
            tree.validate(),
            Err(Error::BlackHeightMismatch {
                expected: 1,
                found: 2
            }),
        );
    }

    #[test]
    fn test_validate_detects_unbalanced_rotation() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let root = tree.root;
        tree.rotate_left(root);
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_validate_detects_parent_mismatch() {
        let mut tree = tree_from(&[2, 1, 3]);
        let one = tree.arena[tree.root].left;
        let three = tree.arena[tree.root].right;
        tree.arena[one].parent = Some(three);
        assert_eq!(tree.validate(), Err(Error::ParentMismatch));
    }

    #[test]
    fn test_validate_detects_order_violation() {
        let mut tree = tree_from(&[2, 1, 3]);
        let one = tree.arena[tree.root].left;
        tree.arena[one].entry.key = 9;
        assert_eq!(tree.validate(), Err(Error::OrderViolation));
    }

    #[test]
    fn test_duplicates_go_right() {
        let mut tree = Tree::new(16);
        tree.insert(5, "first");
        tree.insert(5, "second");
        assert_eq!(tree.len(), 2);
        let root = tree.root;
        assert_eq!(tree.arena[root].entry.value, "first");
        let right = tree.arena[root].right;
        assert_eq!(tree.arena[right].entry.value, "second");
        assert_eq!(tree.get(&5).map(|entry| entry.value), Some("first"));
    }

    #[test]
    fn test_many_duplicates_stay_valid() {
        let mut tree = Tree::new(16);
        for i in 0..100 {
            tree.insert(i % 3, i);
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.iter().filter(|entry| entry.key == 1).count(), 33);
    }

    #[test]
    fn test_height_bound_sequential() {
        let mut tree = Tree::new(64);
        for i in 0..1000u32 {
            tree.insert(i, ());
            let n = f64::from(i + 2);
            assert!(tree.height() as f64 <= 2.0 * n.log2());
        }
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_render_reference_tree() {
        let tree = tree_from(&[20, 15, 25, 10, 5, 1, 30, 35]);
        let expected = concat!(
            "        R--- 35 (red)\n",
            "    R--- 30 (black)\n",
            "        L--- 25 (red)\n",
            "Root: 20 (black)\n",
            "        R--- 15 (black)\n",
            "    L--- 10 (red)\n",
            "        L--- 5 (black)\n",
            "            L--- 1 (red)\n",
        );
        assert_eq!(render(&tree), expected);
        assert_eq!(render(&tree), render(&tree));
    }

    #[test]
    fn test_floor_ceil() {
        let tree = tree_from(&[1, 3, 5]);
        assert!(tree.floor(&0).is_none());
        assert_eq!(tree.floor(&4).map(|entry| entry.key), Some(3));
        assert_eq!(tree.ceil(&4).map(|entry| entry.key), Some(5));
        assert!(tree.ceil(&6).is_none());
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_from(&[1, 2, 3]);
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert!(tree.get(&1).is_none());
        tree.insert(4, ());
        assert_eq!(tree.validate(), Ok(1));
    }
}
