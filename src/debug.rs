use core::ptr::NonNull;
use std::{collections::VecDeque, fmt, string::String};

use crate::{AvlTree, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: fmt::Display,
{
    /// Writes the tree to `w` as a Graphviz digraph, one rank per tree level.
    ///
    /// Each node is labeled `key:factor`, and missing children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<T: ?Sized> {
            Node(NonNull<T>, usize),
            Missing(u32),
        }

        use fmt::Write;

        // Keys may repeat, so nodes are identified by visit order instead.
        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, 0));
        let mut next_id = 1;

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let (node, id) = match item {
                    Item::Node(node, id) => (node, id),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = unsafe { node.as_ref().key() };
                let factor = unsafe { self.links(node).factor() };
                write!(w, "\"graph{name}-{id}\" [label=\"{key}:{factor}\"]; ")?;

                let children = unsafe { [self.links(node).left(), self.links(node).right()] };
                for child in children {
                    match child {
                        Some(child) => {
                            let child_id = next_id;
                            next_id += 1;

                            queue.push_back(Item::Node(child, child_id));
                            writeln!(
                                edges,
                                "\"graph{name}-{id}\" -> \"graph{name}-{child_id}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                edges,
                                "\"graph{name}-{id}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}
