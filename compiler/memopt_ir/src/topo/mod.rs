//! Topological traversal of operation nodes.
//!
//! Both strategies treat the graph as a directed graph over *all* nodes
//! (edges follow `Node::outputs`) and then keep only operations, so an
//! operation that writes a value always precedes every operation that
//! reads it.
//!
//! Different strategies produce different (equally valid) orders. The order
//! matters to consumers that number execution steps, such as lifetime
//! collection: it changes which values appear to be alive together.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::graph::Graph;
use crate::node::NodeId;
use crate::GraphError;

/// Topological ordering strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortKind {
    /// Kahn's algorithm with a FIFO ready queue, ties broken by node id.
    #[default]
    Kahn,
    /// Reverse postorder of a depth-first search from every source node.
    DepthFirst,
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKind::Kahn => "ts",
            SortKind::DepthFirst => "dfs",
        })
    }
}

/// Unrecognized sort strategy name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort kind `{0}` (expected `ts` or `dfs`)")]
pub struct ParseSortKindError(String);

impl FromStr for SortKind {
    type Err = ParseSortKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ts" | "kahn" => Ok(SortKind::Kahn),
            "dfs" | "depth-first" => Ok(SortKind::DepthFirst),
            _ => Err(ParseSortKindError(s.to_string())),
        }
    }
}

/// Return the graph's operation nodes in topological order.
///
/// Fails with [`GraphError::Cycle`] if the graph is not acyclic.
pub fn topology_sort(graph: &Graph, kind: SortKind) -> Result<Vec<NodeId>, GraphError> {
    let order = match kind {
        SortKind::Kahn => kahn_order(graph)?,
        SortKind::DepthFirst => depth_first_order(graph)?,
    };

    let ops: Vec<NodeId> = order
        .into_iter()
        .filter(|&id| graph.node(id).is_op())
        .collect();

    tracing::trace!(%kind, ops = ops.len(), "topological order computed");
    Ok(ops)
}

/// In-degree of every node, counting duplicate edges.
fn in_degrees(graph: &Graph) -> Vec<usize> {
    let mut degrees = vec![0usize; graph.len()];
    for (_, node) in graph.nodes() {
        for succ in &node.outputs {
            degrees[succ.index()] += 1;
        }
    }
    degrees
}

fn kahn_order(graph: &Graph) -> Result<Vec<NodeId>, GraphError> {
    let mut degrees = in_degrees(graph);
    let mut ready: VecDeque<NodeId> = graph
        .nodes()
        .filter(|(id, _)| degrees[id.index()] == 0)
        .map(|(id, _)| id)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &succ in &graph.node(id).outputs {
            let degree = &mut degrees[succ.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(succ);
            }
        }
    }

    if order.len() < graph.len() {
        let stuck = graph
            .nodes()
            .find(|(id, _)| degrees[id.index()] > 0)
            .map(|(id, _)| id);
        if let Some(node) = stuck {
            return Err(GraphError::Cycle { node });
        }
    }
    Ok(order)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Iterative DFS with an explicit stack to avoid recursion depth issues on
/// long chains. Roots are visited in id order; successors in edge order.
fn depth_first_order(graph: &Graph) -> Result<Vec<NodeId>, GraphError> {
    let degrees = in_degrees(graph);
    let mut marks = vec![Mark::Unvisited; graph.len()];
    let mut postorder = Vec::with_capacity(graph.len());

    // Sources first; any node left unvisited afterwards lies on a cycle and
    // is picked up by the second sweep, which then reports it.
    let sources = graph.nodes().filter(|(id, _)| degrees[id.index()] == 0);
    let roots: Vec<NodeId> = sources.chain(graph.nodes()).map(|(id, _)| id).collect();

    for root in roots {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        marks[root.index()] = Mark::OnStack;
        // Stack entries: (node, index of the next successor to visit).
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let (id, next) = *top;
            if let Some(&succ) = graph.node(id).outputs.get(next) {
                top.1 += 1;
                match marks[succ.index()] {
                    Mark::Unvisited => {
                        marks[succ.index()] = Mark::OnStack;
                        stack.push((succ, 0));
                    }
                    Mark::OnStack => return Err(GraphError::Cycle { node: succ }),
                    Mark::Done => {}
                }
            } else {
                marks[id.index()] = Mark::Done;
                postorder.push(id);
                stack.pop();
            }
        }
    }

    postorder.reverse();
    Ok(postorder)
}
