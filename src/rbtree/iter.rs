//! In-order traversal: borrowing iterators and detached fail-fast cursors.

use super::RBTreeError;
use super::tree::{Comparator, RBTree};

/// Borrowing in-order iterator.
pub struct Iter<'a, K, V, C> {
    tree: &'a RBTree<K, V, C>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V, C: Comparator<K>> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = self.tree.successor(index);
        self.remaining -= 1;
        let node = &self.tree.nodes[index];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C: Comparator<K>> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: self,
            next: self.first_node(),
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Opens a cursor positioned before the first entry.
    ///
    /// The cursor does not borrow the tree. Any structural change made to the tree
    /// other than through [`Cursor::remove`] invalidates it.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            next: self.first_node(),
            last_returned: None,
            expected_mod_count: self.mod_count,
        }
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a RBTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Detached in-order cursor with fail-fast modification detection.
#[derive(Debug, Clone)]
pub struct Cursor {
    next: Option<usize>,
    last_returned: Option<usize>,
    expected_mod_count: u64,
}

impl Cursor {
    /// Advances to the next entry of `tree`.
    pub fn next<'a, K, V, C: Comparator<K>>(
        &mut self,
        tree: &'a RBTree<K, V, C>,
    ) -> Result<Option<(&'a K, &'a V)>, RBTreeError> {
        if tree.mod_count != self.expected_mod_count {
            return Err(RBTreeError::ConcurrentModification);
        }
        let Some(index) = self.next else {
            return Ok(None);
        };
        self.next = tree.successor(index);
        self.last_returned = Some(index);
        let node = &tree.nodes[index];
        Ok(Some((&node.key, &node.value)))
    }

    /// Removes the entry returned by the last call to [`Cursor::next`].
    pub fn remove<K, V, C: Comparator<K>>(
        &mut self,
        tree: &mut RBTree<K, V, C>,
    ) -> Result<(K, V), RBTreeError> {
        if tree.mod_count != self.expected_mod_count {
            return Err(RBTreeError::ConcurrentModification);
        }
        let last = self.last_returned.take().ok_or(RBTreeError::IllegalState)?;

        // a node with two children receives its successor's entry on deletion
        if tree.nodes[last].left.is_some() && tree.nodes[last].right.is_some() {
            self.next = Some(last);
        }
        let removed = tree.delete_node(last);
        self.expected_mod_count = tree.mod_count;
        Ok(removed)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
