//! Red-black tree over a slab of pooled nodes.

use super::RBTreeError;
use slab::Slab;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// Tree node. Links are slab indices; `parent` is only used to walk back up while
/// rebalancing and iterating.
#[derive(Debug)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) left: Option<usize>,
    pub(super) right: Option<usize>,
    pub(super) parent: Option<usize>,
    pub(super) color: Color,
}

/// Key ordering used by a tree.
pub trait Comparator<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys with a closure.
#[derive(Clone, Copy)]
pub struct ComparatorFn<F>(pub F);

impl<K, F> Comparator<K> for ComparatorFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for ComparatorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComparatorFn")
    }
}

/// An ordered map implemented as a red-black tree.
///
/// Nodes live in a [`Slab`]: removing an entry frees its slot and the next insertion
/// reuses it, so a tree that has reached its high-water mark stops allocating. Absent
/// children are treated as black leaves, there is no physical nil node.
///
/// The tree is not thread-safe; callers serialize access externally.
pub struct RBTree<K, V, C = NaturalOrder> {
    pub(super) nodes: Slab<Node<K, V>>,
    pub(super) root: Option<usize>,
    /// Structural change counter, checked by cursors.
    pub(super) mod_count: u64,
    comparator: C,
}

impl<K: Ord, V> RBTree<K, V, NaturalOrder> {
    /// Creates an empty tree ordered by `K: Ord`.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<K: Ord, V> Default for RBTree<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_capacity_and_comparator(0, comparator)
    }

    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
            mod_count: 0,
            comparator,
        }
    }

    /// Builds a balanced tree from entries sorted by strictly ascending key.
    ///
    /// Runs in linear time: no rebalancing happens, the nodes on the deepest
    /// incomplete level are colored red and every other node black.
    pub fn build_from_sorted<I>(entries: I, comparator: C) -> Result<Self, RBTreeError>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut iter = entries.into_iter();
        let size = iter.len();
        let mut tree = Self::with_capacity_and_comparator(size, comparator);
        if size == 0 {
            return Ok(tree);
        }

        let red_level = compute_red_level(size);
        let mut last = None;
        tree.root = tree.build_subtree(0, 0, size - 1, red_level, &mut iter, &mut last)?;
        Ok(tree)
    }

    fn build_subtree<I>(
        &mut self,
        level: usize,
        lo: usize,
        hi: usize,
        red_level: usize,
        iter: &mut I,
        last: &mut Option<usize>,
    ) -> Result<Option<usize>, RBTreeError>
    where
        I: Iterator<Item = (K, V)>,
    {
        let mid = lo + (hi - lo) / 2;

        let left = if lo < mid {
            self.build_subtree(level + 1, lo, mid - 1, red_level, iter, last)?
        } else {
            None
        };

        let (key, value) = iter.next().ok_or(RBTreeError::UnsortedInput)?;
        if let Some(previous) = *last {
            if self.comparator.compare(&self.nodes[previous].key, &key) != Ordering::Less {
                return Err(RBTreeError::UnsortedInput);
            }
        }

        let color = if level == red_level {
            Color::Red
        } else {
            Color::Black
        };
        let middle = self.nodes.insert(Node {
            key,
            value,
            left,
            right: None,
            parent: None,
            color,
        });
        if let Some(left) = left {
            self.nodes[left].parent = Some(middle);
        }
        *last = Some(middle);

        if mid < hi {
            let right = self.build_subtree(level + 1, mid + 1, hi, red_level, iter, last)?;
            self.nodes[middle].right = right;
            if let Some(right) = right {
                self.nodes[right].parent = Some(middle);
            }
        }

        Ok(Some(middle))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes the tree can hold before its node slab grows.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Removes every entry, keeping the node storage for reuse.
    pub fn clear(&mut self) {
        self.mod_count += 1;
        self.nodes.clear();
        self.root = None;
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub(super) fn find_node(&self, key: &K) -> Option<usize> {
        let mut current = self.root;
        while let Some(index) = current {
            let node = &self.nodes[index];
            current = match self.comparator.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(index),
            };
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|index| &self.nodes[index].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_node(key)
            .map(move |index| &mut self.nodes[index].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Associates `value` with `key`.
    ///
    /// An existing key has its value replaced in place and the old value returned;
    /// that is not a structural change.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.insert_entry(key, value).1
    }

    /// Returns the value for `key`, inserting `default()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let index = match self.find_node(&key) {
            Some(index) => index,
            None => self.insert_entry(key, default()).0,
        };
        &mut self.nodes[index].value
    }

    fn insert_entry(&mut self, key: K, value: V) -> (usize, Option<V>) {
        let Some(mut current) = self.root else {
            let index = self.nodes.insert(Node {
                key,
                value,
                left: None,
                right: None,
                parent: None,
                color: Color::Black,
            });
            self.root = Some(index);
            self.mod_count += 1;
            return (index, None);
        };

        loop {
            let ordering = self.comparator.compare(&key, &self.nodes[current].key);
            let next = match ordering {
                Ordering::Less => self.nodes[current].left,
                Ordering::Greater => self.nodes[current].right,
                Ordering::Equal => {
                    let old = mem::replace(&mut self.nodes[current].value, value);
                    return (current, Some(old));
                }
            };
            match next {
                Some(next) => current = next,
                None => {
                    let index = self.nodes.insert(Node {
                        key,
                        value,
                        left: None,
                        right: None,
                        parent: Some(current),
                        color: Color::Red,
                    });
                    if ordering == Ordering::Less {
                        self.nodes[current].left = Some(index);
                    } else {
                        self.nodes[current].right = Some(index);
                    }
                    self.fix_after_insertion(index);
                    self.mod_count += 1;
                    return (index, None);
                }
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.find_node(key)?;
        Some(self.delete_node(index))
    }

    pub fn first_key(&self) -> Option<&K> {
        self.first_node().map(|index| &self.nodes[index].key)
    }

    pub fn last_key(&self) -> Option<&K> {
        self.root
            .map(|root| self.rightmost(root))
            .map(|index| &self.nodes[index].key)
    }

    /// Visits every entry in key order with mutable access to the values.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let mut current = self.first_node();
        while let Some(index) = current {
            current = self.successor(index);
            let node = &mut self.nodes[index];
            f(&node.key, &mut node.value);
        }
    }

    pub(super) fn first_node(&self) -> Option<usize> {
        self.root.map(|root| self.leftmost(root))
    }

    fn leftmost(&self, mut index: usize) -> usize {
        while let Some(left) = self.nodes[index].left {
            index = left;
        }
        index
    }

    fn rightmost(&self, mut index: usize) -> usize {
        while let Some(right) = self.nodes[index].right {
            index = right;
        }
        index
    }

    pub(super) fn successor(&self, index: usize) -> Option<usize> {
        if let Some(right) = self.nodes[index].right {
            return Some(self.leftmost(right));
        }
        let mut child = index;
        let mut parent = self.nodes[index].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    /// Unlinks `index` and frees its slot, returning the entry it held.
    ///
    /// A node with two children takes its successor's entry and the successor's
    /// node is the one released.
    pub(super) fn delete_node(&mut self, index: usize) -> (K, V) {
        self.mod_count += 1;
        let mut p = index;

        if let (Some(_), Some(right)) = (self.nodes[p].left, self.nodes[p].right) {
            let s = self.leftmost(right);
            if let Some((a, b)) = self.nodes.get2_mut(p, s) {
                mem::swap(&mut a.key, &mut b.key);
                mem::swap(&mut a.value, &mut b.value);
            }
            p = s;
        }

        let replacement = self.nodes[p].left.or(self.nodes[p].right);
        if let Some(r) = replacement {
            let parent = self.nodes[p].parent;
            self.nodes[r].parent = parent;
            match parent {
                None => self.root = Some(r),
                Some(pp) if self.nodes[pp].left == Some(p) => self.nodes[pp].left = Some(r),
                Some(pp) => self.nodes[pp].right = Some(r),
            }
            self.nodes[p].left = None;
            self.nodes[p].right = None;
            self.nodes[p].parent = None;
            if self.nodes[p].color == Color::Black {
                self.fix_after_deletion(r);
            }
        } else if self.nodes[p].parent.is_none() {
            self.root = None;
        } else {
            if self.nodes[p].color == Color::Black {
                self.fix_after_deletion(p);
            }
            if let Some(pp) = self.nodes[p].parent {
                if self.nodes[pp].left == Some(p) {
                    self.nodes[pp].left = None;
                } else if self.nodes[pp].right == Some(p) {
                    self.nodes[pp].right = None;
                }
                self.nodes[p].parent = None;
            }
        }

        let node = self.nodes.remove(p);
        (node.key, node.value)
    }

    #[inline]
    fn parent_of(&self, index: Option<usize>) -> Option<usize> {
        index.and_then(|i| self.nodes[i].parent)
    }

    #[inline]
    fn left_of(&self, index: Option<usize>) -> Option<usize> {
        index.and_then(|i| self.nodes[i].left)
    }

    #[inline]
    fn right_of(&self, index: Option<usize>) -> Option<usize> {
        index.and_then(|i| self.nodes[i].right)
    }

    #[inline]
    fn color_of(&self, index: Option<usize>) -> Color {
        index.map_or(Color::Black, |i| self.nodes[i].color)
    }

    #[inline]
    fn set_color(&mut self, index: Option<usize>, color: Color) {
        if let Some(i) = index {
            self.nodes[i].color = color;
        }
    }

    fn rotate_left(&mut self, p: Option<usize>) {
        let Some(p) = p else { return };
        let Some(r) = self.nodes[p].right else { return };

        let r_left = self.nodes[r].left;
        self.nodes[p].right = r_left;
        if let Some(rl) = r_left {
            self.nodes[rl].parent = Some(p);
        }
        let parent = self.nodes[p].parent;
        self.nodes[r].parent = parent;
        match parent {
            None => self.root = Some(r),
            Some(pp) if self.nodes[pp].left == Some(p) => self.nodes[pp].left = Some(r),
            Some(pp) => self.nodes[pp].right = Some(r),
        }
        self.nodes[r].left = Some(p);
        self.nodes[p].parent = Some(r);
    }

    fn rotate_right(&mut self, p: Option<usize>) {
        let Some(p) = p else { return };
        let Some(l) = self.nodes[p].left else { return };

        let l_right = self.nodes[l].right;
        self.nodes[p].left = l_right;
        if let Some(lr) = l_right {
            self.nodes[lr].parent = Some(p);
        }
        let parent = self.nodes[p].parent;
        self.nodes[l].parent = parent;
        match parent {
            None => self.root = Some(l),
            Some(pp) if self.nodes[pp].right == Some(p) => self.nodes[pp].right = Some(l),
            Some(pp) => self.nodes[pp].left = Some(l),
        }
        self.nodes[l].right = Some(p);
        self.nodes[p].parent = Some(l);
    }

    fn fix_after_insertion(&mut self, index: usize) {
        let mut x = Some(index);
        self.set_color(x, Color::Red);

        while x.is_some() && x != self.root && self.color_of(self.parent_of(x)) == Color::Red {
            let xp = self.parent_of(x);
            let xpp = self.parent_of(xp);
            if xp == self.left_of(xpp) {
                let y = self.right_of(xpp);
                if self.color_of(y) == Color::Red {
                    self.set_color(xp, Color::Black);
                    self.set_color(y, Color::Black);
                    self.set_color(xpp, Color::Red);
                    x = xpp;
                } else {
                    if x == self.right_of(xp) {
                        x = xp;
                        self.rotate_left(x);
                    }
                    let xp = self.parent_of(x);
                    let xpp = self.parent_of(xp);
                    self.set_color(xp, Color::Black);
                    self.set_color(xpp, Color::Red);
                    self.rotate_right(xpp);
                }
            } else {
                let y = self.left_of(xpp);
                if self.color_of(y) == Color::Red {
                    self.set_color(xp, Color::Black);
                    self.set_color(y, Color::Black);
                    self.set_color(xpp, Color::Red);
                    x = xpp;
                } else {
                    if x == self.left_of(xp) {
                        x = xp;
                        self.rotate_right(x);
                    }
                    let xp = self.parent_of(x);
                    let xpp = self.parent_of(xp);
                    self.set_color(xp, Color::Black);
                    self.set_color(xpp, Color::Red);
                    self.rotate_left(xpp);
                }
            }
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    fn fix_after_deletion(&mut self, index: usize) {
        let mut x = Some(index);

        while x.is_some() && x != self.root && self.color_of(x) == Color::Black {
            if x == self.left_of(self.parent_of(x)) {
                let mut sib = self.right_of(self.parent_of(x));
                if self.color_of(sib) == Color::Red {
                    self.set_color(sib, Color::Black);
                    self.set_color(self.parent_of(x), Color::Red);
                    self.rotate_left(self.parent_of(x));
                    sib = self.right_of(self.parent_of(x));
                }

                if self.color_of(self.left_of(sib)) == Color::Black
                    && self.color_of(self.right_of(sib)) == Color::Black
                {
                    self.set_color(sib, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.right_of(sib)) == Color::Black {
                        self.set_color(self.left_of(sib), Color::Black);
                        self.set_color(sib, Color::Red);
                        self.rotate_right(sib);
                        sib = self.right_of(self.parent_of(x));
                    }
                    self.set_color(sib, self.color_of(self.parent_of(x)));
                    self.set_color(self.parent_of(x), Color::Black);
                    self.set_color(self.right_of(sib), Color::Black);
                    self.rotate_left(self.parent_of(x));
                    x = self.root;
                }
            } else {
                let mut sib = self.left_of(self.parent_of(x));
                if self.color_of(sib) == Color::Red {
                    self.set_color(sib, Color::Black);
                    self.set_color(self.parent_of(x), Color::Red);
                    self.rotate_right(self.parent_of(x));
                    sib = self.left_of(self.parent_of(x));
                }

                if self.color_of(self.right_of(sib)) == Color::Black
                    && self.color_of(self.left_of(sib)) == Color::Black
                {
                    self.set_color(sib, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.left_of(sib)) == Color::Black {
                        self.set_color(self.right_of(sib), Color::Black);
                        self.set_color(sib, Color::Red);
                        self.rotate_left(sib);
                        sib = self.left_of(self.parent_of(x));
                    }
                    self.set_color(sib, self.color_of(self.parent_of(x)));
                    self.set_color(self.parent_of(x), Color::Black);
                    self.set_color(self.left_of(sib), Color::Black);
                    self.rotate_right(self.parent_of(x));
                    x = self.root;
                }
            }
        }

        self.set_color(x, Color::Black);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Comparator<K>> fmt::Debug for RBTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Depth at which `build_from_sorted` colors nodes red: `floor(log2(size + 1))`.
pub(super) fn compute_red_level(size: usize) -> usize {
    (usize::BITS - 1 - (size + 1).leading_zeros()) as usize
}
