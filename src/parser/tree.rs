//! An arena tree built from parse events. Reference consumer of the event
//! protocol described in [`crate::parser::events`].

use crate::parser::events::{Diagnostic, Event, EventSink, Span};
use crate::term::{self, TermId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in a parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub term: TermId,
    pub span: Span,
    pub children: Vec<NodeId>,
    /// Made by a shift rather than a reduction
    pub token: bool,
    pub skipped: bool,
    /// Part of a repetition. Spliced into a parent of the same term.
    pub repeat: bool,
}

/// A parse tree. There may be several roots when skipped content sits
/// around the top node.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    errors: Vec<Diagnostic>,
}

impl Tree {
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Errors recovered from while building the tree
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Returns a one-line representation of the tree: `Name[child child]`.
    /// Untagged terms are replaced by their children.
    pub fn visualize<S: AsRef<str>>(&self, names: &[S]) -> String {
        // Regular function rather than a closure, since it recurses
        fn traverse<S: AsRef<str>>(tree: &Tree, id: NodeId, names: &[S], out: &mut Vec<String>) {
            let node = tree.node(id);
            if !term::is_tagged(node.term) {
                for child in &node.children {
                    traverse(tree, *child, names, out);
                }
                return;
            }

            let mut inner = Vec::new();
            for child in &node.children {
                traverse(tree, *child, names, &mut inner);
            }
            let name = term::display(node.term, names);
            if inner.is_empty() {
                out.push(name);
            } else {
                out.push(format!("{}[{}]", name, inner.join(" ")));
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            traverse(self, *root, names, &mut out);
        }
        out.join(" ")
    }

    /// Returns the frontier of the tree: the terms of its tokens, left to
    /// right
    pub fn frontier(&self) -> Vec<TermId> {
        fn traverse(tree: &Tree, id: NodeId, out: &mut Vec<TermId>) {
            let node = tree.node(id);
            if node.token && node.children.is_empty() {
                out.push(node.term);
            }
            for child in &node.children {
                traverse(tree, *child, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            traverse(self, *root, &mut out);
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    pending: Vec<NodeId>,
    errors: Vec<Diagnostic>,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        Default::default()
    }

    fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Removes `count` pending items that precede the last `keep` ones
    fn take(&mut self, count: usize, keep: usize) -> Vec<NodeId> {
        let end = self.pending.len().saturating_sub(keep);
        let start = end.saturating_sub(count);
        self.pending.drain(start..end).collect()
    }

    pub fn finish(self) -> Tree {
        Tree {
            nodes: self.nodes,
            roots: self.pending,
            errors: self.errors,
        }
    }
}

impl EventSink for TreeBuilder {
    fn event(&mut self, event: Event) {
        match event {
            Event::Shift {
                term,
                span,
                children,
                skipped,
            } => {
                let children = self.take(children, 0);
                let id = self.add(Node {
                    term,
                    span,
                    children,
                    token: true,
                    skipped,
                    repeat: false,
                });
                self.pending.push(id);
            }
            Event::Reduce {
                term,
                span,
                children,
                hoisted,
                repeat,
                skipped,
                ..
            } => {
                let mut flat = Vec::with_capacity(children);
                let mut spliced = false;
                for child in self.take(children, hoisted) {
                    let node = &self.nodes[child.0];
                    if node.repeat && node.term == term {
                        flat.extend_from_slice(&node.children);
                        spliced = true;
                    } else {
                        flat.push(child);
                    }
                }
                let id = self.add(Node {
                    term,
                    span,
                    children: flat,
                    token: false,
                    skipped,
                    repeat: repeat || spliced,
                });
                let at = self.pending.len().saturating_sub(hoisted);
                self.pending.insert(at, id);
            }
            Event::Error(diagnostic) => self.errors.push(diagnostic),
        }
    }
}
