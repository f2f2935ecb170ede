extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, min_nodes_for_height, TestNode};

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    tree
}

fn in_order(tree: &AvlTree<TestNode>) -> Vec<(u32, i8)> {
    tree.in_order().map(|(node, factor)| (node.key, factor)).collect()
}

fn pre_order(tree: &AvlTree<TestNode>) -> Vec<u32> {
    tree.pre_order().map(|node| node.key).collect()
}

fn keys(tree: &AvlTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|node| node.key).collect()
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

// Calls `f` with every permutation of `0..n`.
fn for_each_permutation(n: u32, mut f: impl FnMut(&[u32])) {
    fn permute(prefix: &mut Vec<u32>, rest: &mut Vec<u32>, f: &mut impl FnMut(&[u32])) {
        if rest.is_empty() {
            f(prefix);
            return;
        }

        for i in 0..rest.len() {
            let key = rest.remove(i);
            prefix.push(key);
            permute(prefix, rest, f);
            prefix.pop();
            rest.insert(i, key);
        }
    }

    permute(&mut Vec::new(), &mut (0..n).collect(), &mut f);
}

#[test]
fn permutations_find() {
    for n in 4..=6 {
        for_each_permutation(n, insert_find_all);
    }
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        let node = tree.remove(key).expect("item not found");
        assert_eq!(node.key, *key);
        tree.assert_invariants();
    }
    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn permutations_remove() {
    for n in 4..=7 {
        for_each_permutation(n, insert_remove_all);
    }
}

#[test]
fn remove_in_every_order() {
    // Builds the same tree each time and tears it down in every possible order.
    let base: Vec<u32> = (0..7).map(|i| i * 10).collect();

    for_each_permutation(7, |order| {
        let mut tree = tree_of(&base);
        let mut remaining = base.clone();

        for &i in order {
            let key = base[i as usize];
            assert_eq!(tree.remove(&key).map(|node| node.key), Ok(key));
            tree.assert_invariants();

            remaining.retain(|&k| k != key);
            assert_eq!(keys(&tree), remaining);
        }

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    });
}

#[test]
fn balanced_round_trip() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);

    assert_eq!(tree.root.map(|root| unsafe { root.as_ref().key }), Some(5));
    assert_eq!(
        in_order(&tree),
        [(1, 0), (3, 0), (4, 0), (5, 0), (7, 0), (8, 0), (9, 0)]
    );
    assert_eq!(pre_order(&tree), [5, 3, 1, 4, 8, 7, 9]);

    // 3 sits left of the root, so it is replaced by its predecessor.
    assert_eq!(tree.remove(&3).map(|node| node.key), Ok(3));
    tree.assert_invariants();
    assert_eq!(pre_order(&tree), [5, 1, 4, 8, 7, 9]);

    // 8 sits right of the root, so it is replaced by its successor.
    assert_eq!(tree.remove(&8).map(|node| node.key), Ok(8));
    tree.assert_invariants();
    assert_eq!(pre_order(&tree), [5, 1, 4, 9, 7]);
    assert_eq!(in_order(&tree), [(1, 1), (4, 0), (5, 0), (7, 0), (9, -1)]);
}

#[test]
fn ascending_inserts_rebalance() {
    let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.height(), 3);
    assert_eq!(pre_order(&tree), [4, 2, 1, 3, 6, 5, 7]);
    assert!(in_order(&tree).iter().all(|&(_, factor)| factor == 0));
}

#[test]
fn descending_inserts_rebalance() {
    let tree = tree_of(&[7, 6, 5, 4, 3, 2, 1]);

    assert_eq!(tree.height(), 3);
    assert_eq!(pre_order(&tree), [4, 2, 1, 3, 6, 5, 7]);
}

#[test]
fn zig_zag_inserts() {
    // Left-right case.
    let tree = tree_of(&[3, 1, 2]);
    assert_eq!(pre_order(&tree), [2, 1, 3]);

    // Right-left case.
    let tree = tree_of(&[1, 3, 2]);
    assert_eq!(pre_order(&tree), [2, 1, 3]);
}

#[test]
fn rotation_continues_after_removal() {
    // Removing 7 unbalances 6, and the rotation there shrinks the left subtree of the root 9,
    // which must then be rotated as well.
    let mut tree = tree_of(&[7, 16, 14, 19, 0, 6, 10, 9, 5, 13, 17, 15]);
    assert_eq!(pre_order(&tree), [9, 6, 0, 5, 7, 14, 10, 13, 17, 16, 15, 19]);
    assert_eq!(tree.height(), 5);

    assert_eq!(tree.remove(&7).map(node_key), Ok(7));
    tree.assert_invariants();
    assert_eq!(pre_order(&tree), [14, 9, 5, 0, 6, 10, 13, 17, 16, 15, 19]);
    assert_eq!(tree.height(), 4);
}

#[test]
fn remove_missing_is_noop() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
    let before = (in_order(&tree), pre_order(&tree));

    assert_eq!(tree.remove(&6).map(node_key), Err(KeyNotFound));
    assert_eq!(tree.remove(&100).map(node_key), Err(KeyNotFound));

    assert_eq!((in_order(&tree), pre_order(&tree)), before);

    let mut empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(empty.remove(&0).map(node_key), Err(KeyNotFound));
    assert!(empty.is_empty());
}

#[allow(clippy::boxed_local)]
fn node_key(node: Box<TestNode>) -> u32 {
    node.key
}

#[test]
fn duplicates_go_right() {
    let mut tree = tree_of(&[1, 1]);

    let root = tree.root.unwrap();
    assert!(unsafe { tree.links(root).right() }.is_some());
    assert!(unsafe { tree.links(root).left() }.is_none());

    tree.insert(TestNode::new(1));
    tree.insert(TestNode::new(0));
    tree.insert(TestNode::new(1));
    tree.assert_invariants();
    assert_eq!(keys(&tree), [0, 1, 1, 1, 1]);

    while tree.remove(&1).is_ok() {
        tree.assert_invariants();
    }
    assert_eq!(keys(&tree), [0]);
}

#[test]
fn first_and_last() {
    let mut tree = tree_of(&[4, 2, 9, 7]);

    assert_eq!(tree.first().map(|n| n.key), Some(2));
    assert_eq!(tree.last().map(|n| n.key), Some(9));

    assert_eq!(tree.pop_first().map(node_key), Some(2));
    assert_eq!(tree.pop_last().map(node_key), Some(9));
    tree.assert_invariants();
    assert_eq!(keys(&tree), [4, 7]);
}

#[test]
fn traversals_restart() {
    let tree = tree_of(&[2, 1, 3]);

    let mut iter = tree.in_order();
    assert_eq!(iter.next().map(|(n, _)| n.key), Some(1));

    let rest = iter.clone();
    assert_eq!(iter.map(|(n, _)| n.key).collect::<Vec<_>>(), [2, 3]);
    assert_eq!(rest.map(|(n, _)| n.key).collect::<Vec<_>>(), [2, 3]);
    assert_eq!(in_order(&tree), [(1, 0), (2, 0), (3, 0)]);

    let mut pre = tree.pre_order();
    assert_eq!(pre.next().map(|n| n.key), Some(2));
    assert_eq!(pre.clone().count(), 2);
    assert_eq!(pre.map(|n| n.key).collect::<Vec<_>>(), [1, 3]);

    let empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(empty.in_order().next().map(|(n, _)| n.key), None);
    assert_eq!(empty.pre_order().next().map(|n| n.key), None);
}

#[test]
fn clear_empties_tree() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);

    tree.insert(TestNode::new(1));
    tree.assert_invariants();
    assert_eq!(keys(&tree), [1]);
}

#[test]
fn dotgraph_labels_factors() {
    let tree = tree_of(&[2, 1, 3, 4]);

    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.starts_with("digraph \"graph-t\""));
    assert!(out.contains("[label=\"2:1\"]"));
    assert!(out.contains("[label=\"4:0\"]"));
    assert!(out.contains("\"grapht-0\" -> \"grapht-1\";"));

    let mut out = String::new();
    AvlTree::<TestNode>::new().dotgraph("e", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-e\" {}");
}

#[test]
fn height_bound() {
    for n in 0..200u32 {
        let keys: Vec<u32> = (0..n).collect();
        let tree = tree_of(&keys);

        assert!(min_nodes_for_height(tree.height()) <= n as usize);
    }
}

#[test]
fn min_nodes() {
    let expected = [0, 1, 2, 4, 7, 12, 20, 33];
    for (height, &nodes) in expected.iter().enumerate() {
        assert_eq!(min_nodes_for_height(height), nodes);
    }
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn remove_all_in_any_order(keys in proptest::collection::vec(0u32..64, 0..128)) {
        let mut tree = tree_of(&keys);

        let mut order = keys.clone();
        order.reverse();
        order.sort_by_key(|k| k.wrapping_mul(2_654_435_761));

        for key in &order {
            prop_assert_eq!(tree.remove(key).map(node_key), Ok(*key));
            tree.assert_invariants();
        }

        prop_assert!(tree.is_empty());
    }
}
