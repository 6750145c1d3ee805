//! Immutable dataflow graph and its builder.

use crate::node::{Node, NodeId, NodeKind, OpDesc, ValueDesc};
use crate::GraphError;

/// An immutable dataflow graph snapshot.
///
/// Node ids index into `nodes`. Every edge endpoint is guaranteed to be in
/// range; whether the endpoint has the expected kind is left to the
/// consumer, which reports its own invariant violations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Build a graph from raw nodes, validating every edge endpoint.
    ///
    /// Used when nodes come from outside the builder (e.g. deserialized).
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let len = nodes.len();
        for (idx, node) in nodes.iter().enumerate() {
            let here = node_id(idx);
            let dangling = node
                .inputs
                .iter()
                .map(|&from| (from, here))
                .chain(node.outputs.iter().map(|&to| (here, to)))
                .find(|&(from, to)| from.index() >= len || to.index() >= len);
            if let Some((from, to)) = dangling {
                return Err(GraphError::DanglingEdge { from, to, len });
            }
        }
        tracing::trace!(nodes = len, "graph validated");
        Ok(Self { nodes })
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes with their ids, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node_id(idx), node))
    }

    /// All operation nodes, in id order.
    pub fn ops(&self) -> impl Iterator<Item = (NodeId, &Node, &OpDesc)> + '_ {
        self.nodes()
            .filter_map(|(id, node)| node.as_op().map(|op| (id, node, op)))
    }

    /// All value nodes, in id order.
    pub fn values(&self) -> impl Iterator<Item = (NodeId, &Node, &ValueDesc)> + '_ {
        self.nodes()
            .filter_map(|(id, node)| node.as_value().map(|value| (id, node, value)))
    }

    pub fn op_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_op()).count()
    }

    pub fn value_count(&self) -> usize {
        self.nodes.len() - self.op_count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consume the graph, returning its nodes (e.g. for serialization).
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

/// Incremental graph construction.
///
/// ```text
/// let mut b = GraphBuilder::new();
/// let x = b.add_value(ValueDesc::tensor("x", DataType::Float32, [4, 4]));
/// let y = b.add_value(ValueDesc::tensor("y", DataType::Float32, [4, 4]));
/// b.add_op("relu", &[x], &[y]);
/// let graph = b.build()?;
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    /// First edge added with an out-of-range endpoint.
    dangling: Option<(NodeId, NodeId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value node with no edges.
    pub fn add_value(&mut self, value: ValueDesc) -> NodeId {
        self.push(NodeKind::Value(value))
    }

    /// Add an operation reading `inputs` and writing `outputs`.
    pub fn add_op(&mut self, op_type: &str, inputs: &[NodeId], outputs: &[NodeId]) -> NodeId {
        self.add_op_with_attrs(OpDesc::new(op_type), inputs, outputs)
    }

    /// Add an operation with a fully specified payload.
    pub fn add_op_with_attrs(
        &mut self,
        op: OpDesc,
        inputs: &[NodeId],
        outputs: &[NodeId],
    ) -> NodeId {
        let id = self.push(NodeKind::Op(op));
        for &input in inputs {
            self.add_edge(input, id);
        }
        for &output in outputs {
            self.add_edge(id, output);
        }
        id
    }

    /// Add a raw directed edge `from -> to`.
    ///
    /// Endpoints are checked by [`build`](Self::build); the kinds of the
    /// endpoints are not checked at all.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(from.index()) {
            node.outputs.push(to);
        }
        if let Some(node) = self.nodes.get_mut(to.index()) {
            node.inputs.push(from);
        }
        if from.index() >= self.nodes.len() || to.index() >= self.nodes.len() {
            self.dangling.get_or_insert((from, to));
        }
    }

    /// Finish construction.
    pub fn build(self) -> Result<Graph, GraphError> {
        if let Some((from, to)) = self.dangling {
            return Err(GraphError::DanglingEdge {
                from,
                to,
                len: self.nodes.len(),
            });
        }
        Graph::from_nodes(self.nodes)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = node_id(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }
}

/// Convert a node index into a [`NodeId`]. Indices past `u32::MAX` saturate.
#[inline]
fn node_id(idx: usize) -> NodeId {
    NodeId::new(u32::try_from(idx).unwrap_or(u32::MAX))
}
