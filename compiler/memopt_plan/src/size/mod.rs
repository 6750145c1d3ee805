//! Size estimation: static byte footprints of reusable tensors.
//!
//! # Algorithm
//!
//! 1. **Denylist.** Any value written or read by an operator in
//!    [`DENIED_OP_TYPES`] is excluded by name. These operators either run
//!    sub-graphs, alias or reinterpret their operands, or hand tensors back
//!    to the caller, so sharing storage with their operands is unsafe.
//! 2. **Footprint.** Every remaining non-persistable dense tensor is sized
//!    as the product of its dimensions times its element width, with each
//!    unknown dimension replaced by [`FAKE_BATCH_SIZE`].
//!
//! Persistable values never enter the table. Values that share a name
//! share one entry; the last node in id order decides its size.

use rustc_hash::{FxHashMap, FxHashSet};

use memopt_ir::{Graph, Node, NodeId, ValueDesc};

use crate::PlanError;

/// Estimated bytes per value name.
pub type SizeTable = FxHashMap<String, u64>;

/// Operators whose operands and results are never reused.
pub const DENIED_OP_TYPES: &[&str] = &[
    "while",
    "conditional_block",
    "conditional_block_infer",
    "tensorrt_engine",
    "merge_lod_tensor",
    "merge_lod_tensor_infer",
    "equal",
    "sequence_pool",
    "recurrent",
    "lod_reset",
    "fetch",
    "share_data",
];

/// Stand-in extent for dimensions unknown at compile time (usually batch).
pub const FAKE_BATCH_SIZE: u64 = 1;

/// Estimate the size of every reusable tensor in `graph`.
///
/// # Errors
///
/// [`PlanError::NonOpNeighbor`] if a value is connected to anything other
/// than an operation.
pub fn estimate_sizes(graph: &Graph) -> Result<SizeTable, PlanError> {
    let mut denied: FxHashSet<&str> = FxHashSet::default();
    for (_, node, value) in graph.values() {
        if touches_denied_op(graph, node, value)? {
            denied.insert(value.name.as_str());
        }
    }

    let mut sizes = SizeTable::default();
    for (_, _, value) in graph.values() {
        if value.persistable
            || !value.var_type.is_tensor()
            || denied.contains(value.name.as_str())
        {
            continue;
        }
        sizes.insert(value.name.clone(), estimated_size(value));
    }

    tracing::debug!(
        sized = sizes.len(),
        denied = denied.len(),
        "tensor sizes estimated"
    );
    Ok(sizes)
}

/// Check every writer and reader of `value`. Each must be an operation.
fn touches_denied_op(graph: &Graph, node: &Node, value: &ValueDesc) -> Result<bool, PlanError> {
    let mut denied = false;
    for &neighbor in node.inputs.iter().chain(&node.outputs) {
        let op_type = op_type_of(graph, neighbor, value)?;
        denied |= DENIED_OP_TYPES.contains(&op_type);
    }
    Ok(denied)
}

fn op_type_of<'g>(graph: &'g Graph, id: NodeId, value: &ValueDesc) -> Result<&'g str, PlanError> {
    graph
        .node(id)
        .op_type()
        .ok_or_else(|| PlanError::NonOpNeighbor {
            value: value.name.clone(),
            neighbor: id,
        })
}

/// Product of the dimensions, unknown ones counted as [`FAKE_BATCH_SIZE`],
/// times the element width. Saturates at `u64::MAX`.
fn estimated_size(value: &ValueDesc) -> u64 {
    value
        .shape
        .iter()
        .map(|&dim| u64::try_from(dim).unwrap_or(FAKE_BATCH_SIZE))
        .fold(1u64, u64::saturating_mul)
        .saturating_mul(value.dtype.size_of())
}
