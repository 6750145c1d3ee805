//! Fatal errors raised by the memory planning pass.
//!
//! Any of these aborts the pass before a plan is published.

use memopt_ir::{GraphError, NodeId};

use crate::SessionId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A weight's declared shape has a negative (unknown) dimension, so its
    /// persistent footprint cannot be computed.
    #[error("shape of persistable value `{name}` has a negative dimension: {shape:?}")]
    NegativePersistentDim { name: String, shape: Vec<i64> },

    /// A node adjacent to a value is not an operation. Values only connect
    /// to operations in a well-formed graph.
    #[error("value `{value}` is connected to node {neighbor}, which is not an operation")]
    NonOpNeighbor { value: String, neighbor: NodeId },

    /// A plan was already published for this session and pass.
    #[error("a `{pass}` result is already published for session {session}")]
    AlreadyPublished { session: SessionId, pass: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
