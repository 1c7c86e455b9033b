//! Graphviz rendering of tree shapes.

use alloc::string::{String, ToString};
use alloc::vec;
use core::fmt;

use crate::node_ref::NodeRef;

/// A tree shape that formats as a Graphviz `digraph`.
///
/// Nodes are named after [`NodeRef::id`], and `render` supplies each label.
/// Double quotes in labels are escaped.
pub struct Dot<'a, K, V, M, F> {
    root: Option<NodeRef<'a, K, V, M>>,
    render: F,
}

impl<'a, K, V, M, F> Dot<'a, K, V, M, F>
where
    M: Copy,
    F: Fn(NodeRef<'a, K, V, M>) -> String,
{
    pub fn new(root: Option<NodeRef<'a, K, V, M>>, render: F) -> Self {
        Dot { root, render }
    }
}

impl<'a, K, V, M, F> fmt::Display for Dot<'a, K, V, M, F>
where
    M: Copy,
    F: Fn(NodeRef<'a, K, V, M>) -> String,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph G {{")?;
        let mut stack = vec![];
        stack.extend(self.root);
        while let Some(node) = stack.pop() {
            let label = (self.render)(node).replace('"', "\\\"");
            writeln!(f, "    node{} [label = \"{label}\"]", node.id())?;
            if let Some((left, right)) = node.children() {
                writeln!(f, "    node{} -> node{}", node.id(), left.id())?;
                writeln!(f, "    node{} -> node{}", node.id(), right.id())?;
                stack.push(right);
                stack.push(left);
            }
        }
        writeln!(f, "}}")
    }
}

/// Renders the tree below `root` in Graphviz DOT syntax.
///
/// # Examples
///
/// ```
/// use leaf_tree::{dot, AvlTree};
///
/// let tree = AvlTree::from([(1, "one"), (2, "two")]);
/// let graph = dot::to_dot(tree.root(), |node| match node.value() {
///     Some(value) => format!("{}: {value}", node.key()),
///     None => format!("{} (h = {})", node.key(), node.meta().get()),
/// });
/// assert!(graph.starts_with("digraph G {"));
/// assert!(graph.contains("[label = \"2 (h = 1)\"]"));
/// assert_eq!(graph.matches("->").count(), 2);
/// ```
pub fn to_dot<'a, K, V, M, F>(root: Option<NodeRef<'a, K, V, M>>, render: F) -> String
where
    M: Copy,
    F: Fn(NodeRef<'a, K, V, M>) -> String,
{
    Dot::new(root, render).to_string()
}
