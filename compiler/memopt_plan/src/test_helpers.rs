//! Shared test utilities for the planning phases. Only compiled in test
//! builds.

use memopt_ir::{DataType, Graph, GraphBuilder, NodeId, ValueDesc, VarType};

use crate::{Lifetime, LifetimeTable, SizeTable};

/// Shorthand for a float32 activation with the given shape.
pub(crate) fn act(name: &str, shape: &[i64]) -> ValueDesc {
    ValueDesc::tensor(name, DataType::Float32, shape)
}

/// Shorthand for a float32 weight with the given shape.
pub(crate) fn weight(name: &str, shape: &[i64]) -> ValueDesc {
    ValueDesc::weight(name, DataType::Float32, shape)
}

/// Build a graph or fail the test.
pub(crate) fn build(builder: GraphBuilder) -> Graph {
    match builder.build() {
        Ok(graph) => graph,
        Err(err) => panic!("test graph rejected: {err}"),
    }
}

/// `feed -> x -> fc(w) -> h -> relu -> y -> fetch -> out`
///
/// Returns the graph and the ids of `x`, `w`, `h`, `y`.
pub(crate) fn mlp_graph() -> (Graph, [NodeId; 4]) {
    let mut b = GraphBuilder::new();
    let x = b.add_value(act("x", &[-1, 16]));
    let w = b.add_value(weight("w", &[16, 32]));
    let h = b.add_value(act("h", &[-1, 32]));
    let y = b.add_value(act("y", &[-1, 32]));
    let out = b.add_value(act("out", &[]).with_var_type(VarType::FetchList));
    b.add_op("feed", &[], &[x]);
    b.add_op("fc", &[x, w], &[h]);
    b.add_op("relu", &[h], &[y]);
    b.add_op("fetch", &[y], &[out]);
    (build(b), [x, w, h, y])
}

/// Lifetime table from `(name, start, end)` triples, in order.
pub(crate) fn lifetimes(entries: &[(&str, u32, u32)]) -> LifetimeTable {
    entries
        .iter()
        .map(|&(name, start, end)| (name, Lifetime::new(start, end)))
        .collect()
}

/// Size table from `(name, bytes)` pairs.
pub(crate) fn sizes(entries: &[(&str, u64)]) -> SizeTable {
    entries
        .iter()
        .map(|&(name, bytes)| (name.to_string(), bytes))
        .collect()
}
