extern crate std;

use std::{collections::BTreeMap, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, KeyNotFound, Links, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// Returns the fewest nodes an AVL tree of the given height can hold.
pub fn min_nodes_for_height(height: usize) -> usize {
    let (mut shorter, mut taller) = (0, 1);

    match height {
        0 => 0,
        _ => {
            for _ in 1..height {
                (shorter, taller) = (taller, taller + shorter + 1);
            }
            taller
        }
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// A sorted multiset of keys, counting duplicates.
#[derive(Default)]
struct Multiset {
    counts: BTreeMap<u32, usize>,
    len: usize,
}

impl Multiset {
    fn insert(&mut self, value: u32) {
        *self.counts.entry(value).or_default() += 1;
        self.len += 1;
    }

    fn remove(&mut self, value: u32) -> Option<u32> {
        let count = self.counts.get_mut(&value)?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&value);
        }
        self.len -= 1;
        Some(value)
    }

    fn first(&self) -> Option<u32> {
        self.counts.keys().next().copied()
    }

    fn last(&self) -> Option<u32> {
        self.counts.keys().next_back().copied()
    }

    fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts
            .iter()
            .flat_map(|(&value, &count)| core::iter::repeat(value).take(count))
    }
}

/// Runs `ops` against both an [`AvlTree`] and a `BTreeMap`-backed multiset, asserting that they
/// agree after every operation and that the tree stays balanced.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut model = Multiset::default();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    #[inline]
    #[allow(clippy::boxed_local)]
    fn node_key(node: Box<TestNode>) -> u32 {
        node.key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                model.insert(value);
                avl.insert(TestNode::new(value));
            }

            FinalOp::Get(value) => {
                let from_model = model.counts.contains_key(&value).then_some(value);
                let from_avl = avl.get(&value).map(|node| node.key);

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(avl.contains_key(&value), from_model.is_some());
            }

            FinalOp::Remove(value) => {
                let from_model = model.remove(value).ok_or(KeyNotFound);
                let from_avl = avl.remove(&value).map(node_key);

                if !model.counts.contains_key(&value) {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_model = model.first();
                let from_avl = avl.first().map(|node| node.key);

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_model = model.first().and_then(|value| model.remove(value));
                let from_avl = avl.pop_first().map(node_key);

                if let Some(value) = from_model.filter(|v| !model.counts.contains_key(v)) {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_model = model.last();
                let from_avl = avl.last().map(|node| node.key);

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_model = model.last().and_then(|value| model.remove(value));
                let from_avl = avl.pop_last().map(node_key);

                if let Some(value) = from_model.filter(|v| !model.counts.contains_key(v)) {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_model, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(model.len == 0, avl.is_empty());
        assert!(model.iter().eq(avl.iter().map(|node| node.key)));
        assert!(
            min_nodes_for_height(avl.height()) <= model.len,
            "height {} too large for {} nodes",
            avl.height(),
            model.len
        );
    }
}
