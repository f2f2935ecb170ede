#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator};

use crate::{AvlTree, Dir, Link, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.in_order(),
        }
    }

    /// Returns an iterator over the elements of the tree and their balance factors, in ascending
    /// key order.
    ///
    /// The iterator walks parent links and allocates nothing. Cloning it, or calling this method
    /// again, restarts the walk.
    pub fn in_order(&self) -> InOrder<'_, T> {
        InOrder {
            tree: self,
            cur: self.root,
            from: CameFrom::Parent,
        }
    }

    /// Returns an iterator over the elements of the tree in pre-order: each node is yielded before
    /// its left subtree, which is yielded before its right subtree.
    #[cfg(feature = "alloc")]
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum CameFrom {
    // `cur`'s subtree has not been entered yet.
    Parent,
    // `cur`'s left subtree is exhausted.
    LeftChild,
    // `cur` itself was just yielded.
    Here,
    // `cur`'s whole subtree is exhausted.
    RightChild,
}

/// An in-order iterator over `(element, balance factor)` pairs of an [`AvlTree`].
pub struct InOrder<'tree, T: TreeNode<Links<T>> + ?Sized> {
    tree: &'tree AvlTree<T>,
    cur: Link<T>,
    from: CameFrom,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for InOrder<'tree, T> {
    type Item = (&'tree T, i8);

    fn next(&mut self) -> Option<Self::Item> {
        let mut cur = self.cur?;

        loop {
            match self.from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = unsafe { self.tree.extreme_in_subtree(cur, Dir::Left) };

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next. Save off the
                    // iterator state and return it.
                    self.cur = Some(cur);
                    self.from = CameFrom::Here;

                    let factor = unsafe { self.tree.links(cur).factor() };
                    return Some((unsafe { cur.as_ref() }, factor));
                }

                CameFrom::Here => {
                    // The current node was just yielded.
                    match unsafe { self.tree.links(cur).right() } {
                        // If the right subtree is not empty, go there.
                        Some(right) => {
                            self.from = CameFrom::Parent;
                            cur = right;
                        }

                        None => self.from = CameFrom::RightChild,
                    }
                }

                CameFrom::RightChild => {
                    // Ascend until we arrive from a left child; that parent is the successor.
                    loop {
                        let Some(parent) = (unsafe { self.tree.links(cur).parent() }) else {
                            // The root's subtree is exhausted.
                            self.cur = None;
                            return None;
                        };

                        let dir = unsafe { self.tree.which_child(parent, cur) };
                        cur = parent;

                        if dir == Dir::Left {
                            break;
                        }
                    }

                    self.from = CameFrom::LeftChild;
                }
            }
        }
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> FusedIterator for InOrder<'_, T> {}

impl<T: TreeNode<Links<T>> + ?Sized> Clone for InOrder<'_, T> {
    fn clone(&self) -> Self {
        InOrder {
            tree: self.tree,
            cur: self.cur,
            from: self.from,
        }
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> fmt::Debug for InOrder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InOrder")
            .field("cur", &self.cur)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// An iterator over the elements of an [`AvlTree`] in ascending key order.
pub struct Iter<'tree, T: TreeNode<Links<T>> + ?Sized> {
    inner: InOrder<'tree, T>,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(node, _)| node)
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> FusedIterator for Iter<'_, T> {}

impl<T: TreeNode<Links<T>> + ?Sized> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// A pre-order iterator over the elements of an [`AvlTree`].
///
/// Pending right subtrees are kept on an explicit stack, which never holds more than one entry per
/// level of the tree.
#[cfg(feature = "alloc")]
pub struct PreOrder<'tree, T: TreeNode<Links<T>> + ?Sized> {
    tree: &'tree AvlTree<T>,
    stack: Vec<core::ptr::NonNull<T>>,
}

#[cfg(feature = "alloc")]
impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for PreOrder<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        unsafe {
            let links = self.tree.links(cur);

            // Push right first so the left subtree is visited first.
            self.stack.extend(links.right());
            self.stack.extend(links.left());

            Some(cur.as_ref())
        }
    }
}

#[cfg(feature = "alloc")]
impl<T: TreeNode<Links<T>> + ?Sized> FusedIterator for PreOrder<'_, T> {}

#[cfg(feature = "alloc")]
impl<T: TreeNode<Links<T>> + ?Sized> Clone for PreOrder<'_, T> {
    fn clone(&self) -> Self {
        PreOrder {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}
