//! An intrusive AVL tree.
#![no_std]

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A missing child has height 0 and a leaf has
//   height 1.
// - The balance factor of a node `x` is `f(x) = h(right(x)) - h(left(x))`.
// - A node is left-heavy if `f(x) < 0` and right-heavy if `f(x) > 0`.
//
// The fundamental invariants of an AVL tree are:
// 1. In-order traversal yields keys in non-decreasing order. Equal keys are inserted to the right
//    of their twin, but rotations may later move a twin to the left.
// 2. For every node `x`, `f(x) ∈ {-1, 0, 1}`.
//
// Factors are never recomputed from heights. Insertion and removal adjust them along the path to
// the root, and rotations adjust the two nodes whose children change.
//
// Corollaries:
// 3. A node with a single child has that child as a leaf.
// 4. A tree of height `h` has at least `m(h)` nodes, where `m(0) = 0`, `m(1) = 1` and
//    `m(h) = m(h - 1) + m(h - 2) + 1`. The height is therefore below `1.45 * log2(n + 2)`.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::{
    borrow::Borrow, cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not,
    pin::Pin, ptr::NonNull,
};

use cordyceps::Linked;

#[cfg(feature = "std")]
mod debug;
mod error;
mod iter;
#[cfg(any(test, feature = "model"))]
pub mod model;
#[cfg(feature = "alloc")]
mod set;
#[cfg(all(test, feature = "std"))]
mod tests;

pub use error::KeyNotFound;
#[cfg(feature = "alloc")]
pub use iter::PreOrder;
pub use iter::{InOrder, Iter};
#[cfg(feature = "alloc")]
pub use set::AvlSet;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// Each node stores the difference between the heights of its right and left subtrees. The
/// difference is kept up to date incrementally, so insertion and removal run in _O(log(n))_ time
/// without ever measuring a subtree.
///
/// The tree owns every node linked into it. Dropping the tree drops all of its nodes.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    /// The change in a parent's factor when the child in this direction grows by one level.
    #[inline]
    fn growth(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    factor: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

// SAFETY: the tree uniquely owns its nodes, so moving it across threads moves the nodes with it.
unsafe impl<T> Send for AvlTree<T> where T: TreeNode<Links<T>> + ?Sized + Send {}

// SAFETY: no `&self` method mutates the tree.
unsafe impl<T> Sync for AvlTree<T> where T: TreeNode<Links<T>> + ?Sized + Sync {}

unsafe impl<T: Send + ?Sized> Send for Links<T> {}

unsafe impl<T: Sync + ?Sized> Sync for Links<T> {}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the tree, counted in nodes along the longest path from the root.
    ///
    /// The height is read off the balance factors by following the taller child at every level,
    /// so this completes in _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            height += 1;

            let links = unsafe { self.links(cur) };
            opt_cur = if links.factor() < 0 {
                links.left()
            } else {
                links.right().or(links.left())
            };
        }

        height
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Some(root) = self.root {
            unsafe {
                assert_eq!(self.links(root).parent(), None, "root must not have a parent");
                self.assert_invariants_at(root, None, None);
            }
        }
    }

    // Checks the subtree rooted at `node` and returns its height.
    unsafe fn assert_invariants_at(
        &self,
        node: NonNull<T>,
        lower: Option<&T::Key>,
        upper: Option<&T::Key>,
    ) -> i32 {
        unsafe {
            let key = node.as_ref().key();

            // Ensure the node sits between its ancestors' keys.
            if let Some(lower) = lower {
                assert!(lower <= key, "{key:?} is left of its predecessor {lower:?}");
            }
            if let Some(upper) = upper {
                assert!(key <= upper, "{key:?} is right of its successor {upper:?}");
            }

            let mut heights = [0; 2];
            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = self.links(node).child(dir) {
                    // Ensure child's parent link points to this node.
                    let parent = self
                        .links(child)
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    let (lower, upper) = match dir {
                        Dir::Left => (lower, Some(key)),
                        Dir::Right => (Some(key), upper),
                    };
                    heights[dir as usize] = self.assert_invariants_at(child, lower, upper);
                }
            }

            let factor = self.links(node).factor();
            let [left, right] = heights;

            // Ensure the stored factor matches the measured one and is in range.
            assert_eq!(
                i32::from(factor),
                right - left,
                "stale balance factor at {key:?}"
            );
            assert!((-1..=1).contains(&factor), "unbalanced node {key:?}");

            1 + left.max(right)
        }
    }

    /// Returns a reference to the node corresponding to `key`.
    ///
    /// If the tree holds several equal keys, the one closest to the root is returned.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns `true` if the tree contains a node corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = self.links(cur).left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = self.links(cur).right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        let first = self.extreme_raw(Dir::Left)?;
        unsafe { Some(Pin::new_unchecked(first.as_ref())) }
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        let last = self.extreme_raw(Dir::Right)?;
        unsafe { Some(Pin::new_unchecked(last.as_ref())) }
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.extreme_raw(Dir::Left)?;
        unsafe { Some(self.remove_at(first)) }
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.extreme_raw(Dir::Right)?;
        unsafe { Some(self.remove_at(last)) }
    }

    fn extreme_raw(&self, dir: Dir) -> Link<T> {
        self.root.map(|root| unsafe { self.extreme_in_subtree(root, dir) })
    }

    // Returns the outermost node of the subtree in direction `dir`: the minimum for `Dir::Left`
    // and the maximum for `Dir::Right`.
    #[inline]
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(child) = unsafe { self.links(cur).child(dir) } {
            cur = child;
        }

        cur
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { self.links_mut(node).set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that the following conditions hold:
    // - `old_child` is a child node of `parent`.
    // - `new_child` is not a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            debug_assert_eq!(
                self.links(parent).child(dir),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );
            debug_assert!(
                new_child.is_none() || self.links(parent).child(!dir) != new_child,
                "`new_child` must not be a child of `parent`"
            );

            self.links_mut(parent).set_child(dir, new_child);
        }
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // The factors of affected nodes are not updated.
    unsafe fn rotate_at(&mut self, down: NonNull<T>, up: NonNull<T>) {
        unsafe {
            // - `down` becomes the `dir` child of `up`.
            // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let dir = if self.links(down).right() == Some(up) {
                Dir::Left
            } else {
                Dir::Right
            };

            debug_assert_eq!(self.links(up).parent(), Some(down));

            let across = self.links(up).child(dir);
            self.links_mut(down).set_child(!dir, across);
            self.maybe_set_parent(across, Some(down));

            self.links_mut(up).set_child(dir, Some(down));
            let parent = self.links_mut(down).set_parent(Some(up));
            self.links_mut(up).set_parent(parent);

            self.replace_child_or_set_root(parent, down, Some(up));
        }
    }

    // Rotates the subtree rooted at `node` to the left, returning the new subtree root.
    //
    // `node` must have a right child.
    unsafe fn rotate_left(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            let pivot = self
                .links(node)
                .right()
                .expect("left rotation requires a right child");

            self.rotate_at(node, pivot);

            let pivot_factor = self.links(pivot).factor();
            let node_factor = self.links(node).factor() - 1 - pivot_factor.max(0);
            self.links_mut(node).set_factor(node_factor);
            let pivot_factor = pivot_factor - 1 + node_factor.min(0);
            self.links_mut(pivot).set_factor(pivot_factor);

            tracing::trace!(
                node = ?node.as_ref().key(),
                pivot = ?pivot.as_ref().key(),
                node_factor,
                pivot_factor,
                "rotated left"
            );

            pivot
        }
    }

    // Rotates the subtree rooted at `node` to the right, returning the new subtree root.
    //
    // `node` must have a left child.
    unsafe fn rotate_right(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            let pivot = self
                .links(node)
                .left()
                .expect("right rotation requires a left child");

            self.rotate_at(node, pivot);

            let pivot_factor = self.links(pivot).factor();
            let node_factor = self.links(node).factor() + 1 - pivot_factor.min(0);
            self.links_mut(node).set_factor(node_factor);
            let pivot_factor = pivot_factor + 1 + node_factor.max(0);
            self.links_mut(pivot).set_factor(pivot_factor);

            tracing::trace!(
                node = ?node.as_ref().key(),
                pivot = ?pivot.as_ref().key(),
                node_factor,
                pivot_factor,
                "rotated right"
            );

            pivot
        }
    }

    // Restores the balance of `node`, whose factor is -2 or 2, and returns the new root of its
    // subtree.
    //
    // If the taller child leans the other way, it is first rotated outward (the zig-zag case).
    // The taller child being balanced is only possible after a removal, and is handled with a
    // single rotation.
    unsafe fn rebalance(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            let factor = self.links(node).factor();
            debug_assert!(factor.abs() == 2, "rebalance called with factor {factor}");

            let heavy = if factor < 0 { Dir::Left } else { Dir::Right };
            let child = self
                .links(node)
                .child(heavy)
                .expect("heavy side of an unbalanced node must not be empty");
            let zig_zag = self.links(child).factor() == (!heavy).growth();

            tracing::trace!(node = ?node.as_ref().key(), factor, zig_zag, "rebalancing");

            match (heavy, zig_zag) {
                (Dir::Left, false) => self.rotate_right(node),
                (Dir::Left, true) => {
                    self.rotate_left(child);
                    self.rotate_right(node)
                }
                (Dir::Right, false) => self.rotate_left(node),
                (Dir::Right, true) => {
                    self.rotate_right(child);
                    self.rotate_left(node)
                }
            }
        }
    }

    /// Inserts an item into the tree.
    ///
    /// An item whose key equals one already in the tree is not rejected. It is placed to the right
    /// of the existing item, so the tree behaves as an ordered multiset.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) {
        let ptr = T::into_ptr(item);

        unsafe { self.links_mut(ptr).clear() };

        let mut parent = match self.root {
            Some(root) => root,
            None => {
                // Tree is empty. Set `item` as the root and return.
                self.root = Some(ptr);
                return;
            }
        };

        // Descend the tree, looking for an empty child slot.
        let dir = loop {
            let ordering = unsafe { ptr.as_ref().key().cmp(parent.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Equal | Ordering::Greater => Dir::Right,
            };

            match unsafe { self.links(parent).child(dir) } {
                // Descend.
                Some(child) => parent = child,

                // Set `item` as child.
                None => break dir,
            }
        };

        unsafe {
            self.links_mut(parent).set_child(dir, Some(ptr));
            self.links_mut(ptr).set_parent(Some(parent));
        }

        self.rebalance_inserted(ptr);
    }

    // Performs a bottom-up rebalance of the tree after the insertion of `node`.
    //
    // Invariants:
    // - `node` is a leaf with factor 0, and its subtree has just grown from height 0 to 1.
    fn rebalance_inserted(&mut self, node: NonNull<T>) {
        let mut x = node;

        unsafe {
            debug_assert_eq!(self.links(x).factor(), 0);

            loop {
                // The subtree rooted at `x` grew by one level.
                if self.links(x).factor().abs() > 1 {
                    // A rotation after an insertion restores the height the subtree had before
                    // the insertion, so no ancestor is affected.
                    self.rebalance(x);
                    return;
                }

                let Some(parent) = self.links(x).parent() else {
                    return;
                };

                let dir = self.which_child(parent, x);
                if self.links_mut(parent).add_factor(dir.growth()) == 0 {
                    // The shorter side of `parent` caught up; its height is unchanged.
                    return;
                }

                x = parent;
            }
        }
    }

    /// Removes the node corresponding to `key` from the tree and returns it.
    ///
    /// If the tree holds several equal keys, the one closest to the root is removed. If no node
    /// corresponds to `key`, the tree is left untouched.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<T::Handle, KeyNotFound>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + fmt::Debug + ?Sized,
    {
        match self.get_raw(key) {
            Some(node) => Ok(unsafe { self.remove_at(node) }),
            None => {
                tracing::debug!(?key, "key not found for removal");
                Err(KeyNotFound)
            }
        }
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        // There are three possible cases:
        //
        // 1. `node` has two children.
        //
        //    In this case an in-order neighbor of `node` is removed from the tree and assumes
        //    `node`'s place and factor. The root, and any node keyed below the root, is replaced
        //    by its predecessor; any other node by its successor. The neighbor is searched within
        //    `node`'s own subtree.
        //
        //    The neighbor by definition has no child on the side facing `node`, so its removal
        //    matches case 2 or 3, and the shrunk slot is the one the neighbor vacated.
        //
        // 2. `node` has one child.
        //
        //    In this case the child is elevated to replace it.
        //
        // 3. `node` is a leaf.
        //
        //    In this case it is simply unlinked.
        //
        // In every case exactly one child slot of one node (the "retrace point") loses one level
        // of height, and the factors are corrected upward from there.

        unsafe {
            let parent = self.links(node).parent();
            let left = self.links(node).left();
            let right = self.links(node).right();

            let retrace = match (left, right) {
                (Some(left), Some(right)) => {
                    let toward = self.replacement_side(node);
                    let near = match toward {
                        Dir::Left => left,
                        Dir::Right => right,
                    };

                    // The neighbor is the outermost node of the `toward` subtree facing `node`.
                    let neighbor = self.extreme_in_subtree(near, !toward);
                    let neighbor_child = self.links(neighbor).child(toward);

                    let retrace = if neighbor == near {
                        // The neighbor keeps its own `toward` child, which is one level shorter
                        // than the subtree the neighbor used to root.
                        (neighbor, toward)
                    } else {
                        // Elevate the neighbor's child to replace it.
                        let neighbor_parent = self
                            .links(neighbor)
                            .parent()
                            .expect("neighbor below `near` must have a parent");
                        self.links_mut(neighbor_parent)
                            .set_child(!toward, neighbor_child);
                        self.maybe_set_parent(neighbor_child, Some(neighbor_parent));

                        self.links_mut(neighbor).set_child(toward, Some(near));
                        self.links_mut(near).set_parent(Some(neighbor));

                        (neighbor_parent, !toward)
                    };

                    let far = match toward {
                        Dir::Left => right,
                        Dir::Right => left,
                    };
                    self.links_mut(neighbor).set_child(!toward, Some(far));
                    self.links_mut(far).set_parent(Some(neighbor));

                    // Transfer the position and factor of `node` to `neighbor`.
                    let factor = self.links(node).factor();
                    self.links_mut(neighbor).set_factor(factor);
                    self.links_mut(neighbor).set_parent(parent);
                    self.replace_child_or_set_root(parent, node, Some(neighbor));

                    Some(retrace)
                }

                (Some(child), None) | (None, Some(child)) => {
                    let retrace = parent.map(|p| (p, self.which_child(p, node)));

                    self.replace_child_or_set_root(parent, node, Some(child));
                    self.links_mut(child).set_parent(parent);

                    retrace
                }

                (None, None) => {
                    let retrace = parent.map(|p| (p, self.which_child(p, node)));

                    self.replace_child_or_set_root(parent, node, None);

                    retrace
                }
            };

            if let Some((parent, dir)) = retrace {
                self.rebalance_removed(parent, dir);
            }

            self.links_mut(node).clear();

            T::from_ptr(node)
        }
    }

    // Chooses which neighbor replaces the two-child `node` on removal: the predecessor
    // (`Dir::Left`) or the successor (`Dir::Right`).
    unsafe fn replacement_side(&self, node: NonNull<T>) -> Dir {
        let Some(root) = self.root else {
            unreachable!("removing from an empty tree");
        };

        if root == node {
            return Dir::Left;
        }

        match unsafe { node.as_ref().key().cmp(root.as_ref().key()) } {
            Ordering::Less => Dir::Left,
            Ordering::Equal | Ordering::Greater => Dir::Right,
        }
    }

    // Performs a bottom-up rebalance of the tree after the `dir` subtree of `parent` lost one level
    // of height.
    //
    // Unlike insertion, a rotation does not necessarily end the retrace. If the new subtree root is
    // balanced, the rotated subtree is one level shorter than before the removal and the
    // shrinkage continues upward.
    unsafe fn rebalance_removed(&mut self, mut parent: NonNull<T>, mut dir: Dir) {
        unsafe {
            loop {
                let factor = self.links_mut(parent).add_factor(-dir.growth());

                let top = if factor.abs() > 1 {
                    let top = self.rebalance(parent);

                    if self.links(top).factor() != 0 {
                        // The rotation preserved the subtree's height.
                        return;
                    }

                    top
                } else if factor != 0 {
                    // `parent` was balanced; its taller side still sets the height.
                    return;
                } else {
                    parent
                };

                // The subtree rooted at `top` is one level shorter.
                let Some(grandparent) = self.links(top).parent() else {
                    return;
                };

                dir = self.which_child(grandparent, top);
                parent = grandparent;
            }
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.extreme_in_subtree(cur, Dir::Left);
                let parent = self.links(cur).parent();

                let right = self.links(cur).right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                self.links_mut(cur).clear();
                drop(T::from_ptr(cur));

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
    }

    // Support methods ========================================================

    #[inline]
    unsafe fn links<'a>(&self, node: NonNull<T>) -> &'a Links<T> {
        unsafe { T::links(node).as_ref() }
    }

    #[inline]
    unsafe fn links_mut<'a>(&mut self, node: NonNull<T>) -> &'a mut Links<T> {
        unsafe { T::links(node).as_mut() }
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { self.links(parent).left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                factor: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    fn factor(&self) -> i8 {
        unsafe { (*self.inner.get()).factor }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_factor(&mut self, factor: i8) {
        debug_assert!((-2..=2).contains(&factor), "factor {factor} out of range");
        self.inner.get_mut().factor = factor;
    }

    // Adds `delta` to the factor and returns the new factor.
    #[inline]
    fn add_factor(&mut self, delta: i8) -> i8 {
        let inner = self.inner.get_mut();
        inner.factor = inner.factor.checked_add(delta).unwrap();
        inner.factor
    }

    // Resets the links of a node that is not part of any tree.
    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.factor = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("factor", &self.factor())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}
