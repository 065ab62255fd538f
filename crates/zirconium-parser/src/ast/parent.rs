//! Parent and sibling navigation.
//!
//! Nodes hold no back-pointers. [`ParentMap`] is built once over a finished
//! tree and answers parent, children and sibling queries by [`NodeId`].

use rustc_hash::FxHashMap;
use zirconium_core::NodeId;

use super::node::Node;
use super::stmt::SourceFile;

/// Parent links for every node reachable from a root.
pub struct ParentMap<'ast> {
    nodes: FxHashMap<NodeId, Node<'ast>>,
    parents: FxHashMap<NodeId, NodeId>,
}

impl<'ast> ParentMap<'ast> {
    /// Index every node under `file`.
    pub fn build(file: &'ast SourceFile<'ast>) -> Self {
        Self::from_root(Node::SourceFile(file))
    }

    /// Index every node under an arbitrary root.
    pub fn from_root(root: Node<'ast>) -> Self {
        let mut map = Self {
            nodes: FxHashMap::default(),
            parents: FxHashMap::default(),
        };
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            map.nodes.insert(node.id(), node);
            for child in node.children() {
                map.parents.insert(child.id(), node.id());
                pending.push(child);
            }
        }
        map
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<Node<'ast>> {
        self.nodes.get(&id).copied()
    }

    /// The parent of a node, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<Node<'ast>> {
        self.parents.get(&id).and_then(|parent| self.node(*parent))
    }

    /// Direct children of a node in source order.
    pub fn children(&self, id: NodeId) -> Vec<Node<'ast>> {
        self.node(id).map(|n| n.children()).unwrap_or_default()
    }

    /// The children of this node's parent, excluding the node itself.
    pub fn siblings(&self, id: NodeId) -> Vec<Node<'ast>> {
        match self.parent(id) {
            Some(parent) => parent.children().into_iter().filter(|n| n.id() != id).collect(),
            None => Vec::new(),
        }
    }

    /// Walk up from a node to the root, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = Node<'ast>> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let node = current?;
            current = self.parent(node.id());
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, NodeKind, Stmt};
    use crate::{ParserOptions, parse};
    use bumpalo::Bump;

    #[test]
    fn parent_of_binary_operand() {
        let arena = Bump::new();
        let file = parse("$x = 1 + 2", &arena, ParserOptions::default());
        let map = ParentMap::build(file);

        let Stmt::Variable(stmt) = file.statements[0] else {
            panic!("expected variable statement");
        };
        let Expr::Binary(sum) = stmt.declaration.initializer else {
            panic!("expected binary initializer");
        };
        let parent = map.parent(sum.left.id()).unwrap();
        assert_eq!(parent.kind(), NodeKind::BinaryExpression);
        assert_eq!(map.siblings(sum.left.id()).len(), 1);
        assert!(map.parent(file.meta.id).is_none());
    }

    #[test]
    fn ancestors_reach_root() {
        let arena = Bump::new();
        let file = parse("if $a {\n  print $b\n}", &arena, ParserOptions::default());
        let map = ParentMap::build(file);
        let leaf = map
            .nodes
            .values()
            .find(|n| matches!(n, Node::Expr(Expr::Identifier(i)) if i.name == "b"))
            .copied()
            .unwrap();
        let kinds: Vec<NodeKind> = map.ancestors(leaf.id()).map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::SimpleCallExpression,
                NodeKind::ExpressionStatement,
                NodeKind::Block,
                NodeKind::IfStatement,
                NodeKind::SourceFile,
            ]
        );
    }

    #[test]
    fn every_node_indexed_once() {
        let arena = Bump::new();
        let file = parse("print [1, 2, 3]", &arena, ParserOptions::default());
        let map = ParentMap::build(file);
        // SourceFile, ExpressionStatement, SimpleCall, Identifier, Array, 3 numbers
        assert_eq!(map.len(), 8);
        assert_eq!(map.children(file.meta.id).len(), 1);
    }
}
