//! Dataflow graph model for the memopt memory planner.
//!
//! This crate provides:
//!
//! - **Graph nodes** ([`Node`], [`NodeKind`]): every node is either an
//!   operation ([`OpDesc`]) or a value ([`ValueDesc`]). Edges are stored on
//!   both endpoints: an operation lists the values it reads and writes, a
//!   value lists the operations that write and read it.
//!
//! - **Element and variable types** ([`DataType`], [`VarType`]): enough
//!   type information to estimate a tensor's byte footprint.
//!
//! - **Topological traversal** ([`topology_sort`], [`SortKind`]): yields
//!   operation nodes in a valid execution order using a selectable strategy.
//!
//! # Design
//!
//! The graph is an immutable snapshot once built. [`GraphBuilder`] is the
//! only way to construct one and validates every edge endpoint on
//! [`build`](GraphBuilder::build). Analysis passes borrow `&Graph` and never
//! mutate it.

mod dtype;
pub mod graph;
mod node;
pub mod topo;

pub use dtype::{DataType, VarType};
pub use graph::{Graph, GraphBuilder};
pub use node::{Attribute, Node, NodeId, NodeKind, OpDesc, ValueDesc, DYNAMIC_DIM};
pub use topo::{topology_sort, ParseSortKindError, SortKind};

/// Operation type that feeds external inputs into the graph.
pub const FEED_OP: &str = "feed";

/// Operation type that extracts graph outputs for the caller.
pub const FETCH_OP: &str = "fetch";

/// Structural error in a dataflow graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge refers to a node id outside the graph.
    #[error("edge {from} -> {to} refers to a node outside the graph ({len} nodes)")]
    DanglingEdge { from: NodeId, to: NodeId, len: usize },
    /// The graph contains a cycle reachable through `node`.
    #[error("graph contains a cycle through node {node}")]
    Cycle { node: NodeId },
}
