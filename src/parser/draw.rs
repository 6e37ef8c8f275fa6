use std::io::Write;

use log::debug;

use crate::errors::{Error, Result};
use crate::parser::tree::{NodeId, Tree};
use crate::term;

type Dot2Node = NodeId;
type Dot2Edge = (Dot2Node, Dot2Node);

struct Graph<'a, S> {
    tree: &'a Tree,
    names: &'a [S],
    nodes: Vec<Dot2Node>,
    edges: Vec<Dot2Edge>,
}

impl<'a, S: AsRef<str>> Graph<'a, S> {
    fn new(tree: &'a Tree, names: &'a [S]) -> Self {
        let mut nodes = Vec::with_capacity(tree.len());
        let mut edges = Vec::with_capacity(tree.len());
        let mut todo: Vec<NodeId> = tree.roots().iter().rev().copied().collect();

        while let Some(id) = todo.pop() {
            nodes.push(id);
            for child in tree.node(id).children.iter().rev() {
                edges.push((id, *child));
                todo.push(*child);
            }
        }
        Graph {
            tree,
            names,
            nodes,
            edges,
        }
    }
}

impl<'a, S: AsRef<str>> dot2::Labeller<'a> for Graph<'a, S> {
    type Node = Dot2Node;
    type Edge = Dot2Edge;
    type Subgraph = ();

    fn graph_id(&'a self) -> dot2::Result<dot2::Id<'a>> {
        dot2::Id::new("tree")
    }

    fn node_id(&'a self, n: &Dot2Node) -> dot2::Result<dot2::Id<'a>> {
        dot2::Id::new(format!("N{}", n.0))
    }

    fn node_label(&'a self, n: &Dot2Node) -> dot2::Result<dot2::label::Text<'a>> {
        let node = self.tree.node(*n);
        Ok(dot2::label::Text::label(format!(
            "{} {}..{}",
            term::display(node.term, self.names),
            node.span.start,
            node.span.end
        )))
    }
}

impl<'a, S: AsRef<str>> dot2::GraphWalk<'a> for Graph<'a, S> {
    type Node = Dot2Node;
    type Edge = Dot2Edge;
    type Subgraph = ();

    fn nodes(&'a self) -> dot2::Nodes<'a, Dot2Node> {
        (&self.nodes[..]).into()
    }

    fn edges(&'a self) -> dot2::Edges<'a, Dot2Edge> {
        (&self.edges[..]).into()
    }

    fn source(&'a self, e: &Dot2Edge) -> Dot2Node {
        e.0
    }

    fn target(&'a self, e: &Dot2Edge) -> Dot2Node {
        e.1
    }
}

impl Tree {
    /// Writes the tree as a Graphviz digraph, every node labelled with its
    /// term name and span
    pub fn render_dot<S: AsRef<str>, W: Write>(&self, names: &[S], writer: &mut W) -> Result<()> {
        let graph = Graph::new(self, names);
        debug!("rendering {} nodes", graph.nodes.len());
        dot2::render(&graph, writer).map_err(|e| Error::Render(format!("{:?}", e)))
    }
}
