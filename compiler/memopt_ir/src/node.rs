//! Graph node types.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{DataType, VarType};

/// Marker for a dimension whose extent is only known at run time.
///
/// Any negative dimension is treated as unknown; this is the canonical one.
pub const DYNAMIC_DIM: i64 = -1;

/// Node ID within a [`Graph`](crate::Graph).
///
/// IDs are dense indices into the graph's node list, allocated
/// sequentially from 0 by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new node ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Operation attribute. Carried through the graph, never interpreted by
/// the memory planner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
}

/// Operation payload.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpDesc {
    /// Operator type name, e.g. `"matmul"` or [`FEED_OP`](crate::FEED_OP).
    pub op_type: String,
    pub attrs: FxHashMap<String, Attribute>,
}

impl OpDesc {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            attrs: FxHashMap::default(),
        }
    }
}

/// Value payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueDesc {
    /// Variable name. Several value nodes may share one name when the same
    /// variable is written more than once.
    pub name: String,
    /// Weights and parameters that outlive a single execution.
    pub persistable: bool,
    pub var_type: VarType,
    pub dtype: DataType,
    /// Declared shape. Negative entries are unknown dimensions.
    pub shape: Vec<i64>,
}

impl ValueDesc {
    /// A non-persistent dense tensor.
    pub fn tensor(name: impl Into<String>, dtype: DataType, shape: impl Into<Vec<i64>>) -> Self {
        Self {
            name: name.into(),
            persistable: false,
            var_type: VarType::DenseTensor,
            dtype,
            shape: shape.into(),
        }
    }

    /// A persistent dense tensor (weight or parameter).
    pub fn weight(name: impl Into<String>, dtype: DataType, shape: impl Into<Vec<i64>>) -> Self {
        Self {
            persistable: true,
            ..Self::tensor(name, dtype, shape)
        }
    }

    /// Same value with a different storage category.
    #[must_use]
    pub fn with_var_type(mut self, var_type: VarType) -> Self {
        self.var_type = var_type;
        self
    }

    /// Returns `true` if any declared dimension is unknown.
    pub fn has_dynamic_dim(&self) -> bool {
        self.shape.iter().any(|&d| d < 0)
    }
}

/// Node kind: an operation or a value. The two kinds share no payload.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Op(OpDesc),
    Value(ValueDesc),
}

/// A graph node with its incident edges.
///
/// For an operation, `inputs` are the values it reads and `outputs` the
/// values it writes. For a value, `inputs` are the operations that write
/// it and `outputs` the operations that read it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub inputs: SmallVec<[NodeId; 4]>,
    pub outputs: SmallVec<[NodeId; 4]>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self.kind, NodeKind::Op(_))
    }

    #[inline]
    pub fn as_op(&self) -> Option<&OpDesc> {
        match &self.kind {
            NodeKind::Op(op) => Some(op),
            NodeKind::Value(_) => None,
        }
    }

    #[inline]
    pub fn as_value(&self) -> Option<&ValueDesc> {
        match &self.kind {
            NodeKind::Value(value) => Some(value),
            NodeKind::Op(_) => None,
        }
    }

    /// Operation type name, if this is an operation.
    #[inline]
    pub fn op_type(&self) -> Option<&str> {
        self.as_op().map(|op| op.op_type.as_str())
    }
}
