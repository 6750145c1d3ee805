//! Lifetime collection: discrete live intervals per value.
//!
//! Operations are visited in a topological order chosen by [`SortKind`].
//! Each visited operation is one execution step. A value's lifetime starts
//! at the first step that reads or writes it and ends at the last such
//! step; the start never moves once recorded.
//!
//! Three kinds of values get special handling:
//!
//! - Outputs of [`FEED_OP`] are externally fed inputs. They get the
//!   open-ended lifetime `(0, +inf)` so nothing is ever packed with them.
//! - Persistable values (weights) are never tracked. Their footprint is
//!   summed into an informational total instead, except for values adjacent
//!   to a [`FETCH_OP`], whose descriptors carry no usable tensor shape.
//! - Everything else is tracked by name, so several nodes sharing a name
//!   merge into one interval.

use rustc_hash::{FxHashMap, FxHashSet};

use memopt_ir::{topology_sort, Graph, Node, SortKind, ValueDesc, FEED_OP, FETCH_OP};

use crate::{to_mib, PlanError};

/// Closed interval of execution steps during which a value is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lifetime {
    pub start: u32,
    pub end: u32,
}

impl Lifetime {
    /// End step standing in for "+infinity".
    pub const OPEN_END: u32 = u32::MAX;

    /// Interval `[start, end]`. Requires `start <= end`.
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "lifetime start {start} after end {end}");
        Self { start, end }
    }

    /// Single-step interval.
    #[inline]
    pub fn at(step: u32) -> Self {
        Self::new(step, step)
    }

    /// `(0, +inf)`: alive for the whole execution.
    #[inline]
    pub fn open() -> Self {
        Self::new(0, Self::OPEN_END)
    }

    #[inline]
    pub fn is_open_ended(self) -> bool {
        self.end == Self::OPEN_END
    }

    /// Closed-interval overlap test.
    #[inline]
    pub fn overlaps(self, other: Lifetime) -> bool {
        self.end >= other.start && other.end >= self.start
    }
}

/// Value name to lifetime, iterated in first-recorded order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LifetimeTable {
    order: Vec<String>,
    spans: FxHashMap<String, Lifetime>,
}

impl LifetimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Lifetime> {
        self.spans.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.spans.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Lifetime)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.spans.get(name).map(|&span| (name.as_str(), span)))
    }

    /// Set `name`'s lifetime, replacing any earlier one. A replaced entry
    /// keeps its original position in the iteration order.
    pub fn insert(&mut self, name: impl Into<String>, lifetime: Lifetime) {
        let name = name.into();
        if !self.spans.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.spans.insert(name, lifetime);
    }

    /// Record a read or write of `name` at `step`: a first use opens
    /// `[step, step]`, later uses only push the end forward.
    fn record_use(&mut self, name: &str, step: u32) {
        if let Some(span) = self.spans.get_mut(name) {
            span.end = span.end.max(step);
        } else {
            self.insert(name, Lifetime::at(step));
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Lifetime)> for LifetimeTable {
    fn from_iter<I: IntoIterator<Item = (S, Lifetime)>>(iter: I) -> Self {
        let mut table = LifetimeTable::new();
        for (name, lifetime) in iter {
            table.insert(name, lifetime);
        }
        table
    }
}

/// Result of [`collect_lifetimes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifetimeReport {
    pub lifetimes: LifetimeTable,
    /// Bytes held by distinct persistable values. Informational only.
    pub persistent_bytes: u64,
    /// Number of operations visited.
    pub steps: u32,
}

/// Collect a lifetime for every trackable value in `graph`.
///
/// # Errors
///
/// - [`PlanError::Graph`] if the graph has a cycle.
/// - [`PlanError::NegativePersistentDim`] if a counted weight has an
///   unknown dimension.
pub fn collect_lifetimes(graph: &Graph, sort_kind: SortKind) -> Result<LifetimeReport, PlanError> {
    let order = topology_sort(graph, sort_kind)?;

    let mut lifetimes = LifetimeTable::new();
    let mut counted_weights: FxHashSet<&str> = FxHashSet::default();
    let mut persistent_bytes = 0u64;
    let mut step = 0u32;

    for op_id in order {
        let op_node = graph.node(op_id);
        let Some(op) = op_node.as_op() else {
            continue;
        };

        if op.op_type == FEED_OP {
            for &out in &op_node.outputs {
                if let Some(value) = graph.node(out).as_value() {
                    lifetimes.insert(value.name.as_str(), Lifetime::open());
                }
            }
        } else {
            for &id in op_node.inputs.iter().chain(&op_node.outputs) {
                let value_node = graph.node(id);
                let Some(value) = value_node.as_value() else {
                    continue;
                };

                if value.persistable {
                    if touches_fetch(graph, value_node) {
                        continue;
                    }
                    let bytes = persistent_size(value)?;
                    if counted_weights.insert(value.name.as_str()) {
                        persistent_bytes = persistent_bytes.saturating_add(bytes);
                    }
                    continue;
                }

                lifetimes.record_use(&value.name, step);
            }
        }

        step = step.saturating_add(1);
    }

    tracing::info!(
        persistent_mib = to_mib(persistent_bytes),
        weights = counted_weights.len(),
        "persistable params in main graph"
    );
    tracing::debug!(%sort_kind, steps = step, values = lifetimes.len(), "lifetimes collected");

    Ok(LifetimeReport {
        lifetimes,
        persistent_bytes,
        steps: step,
    })
}

/// Whether any operation writing or reading this value is a [`FETCH_OP`].
fn touches_fetch(graph: &Graph, value_node: &Node) -> bool {
    value_node
        .inputs
        .iter()
        .chain(&value_node.outputs)
        .any(|&id| graph.node(id).op_type() == Some(FETCH_OP))
}

/// Exact byte footprint of a weight. Every dimension must be known.
fn persistent_size(value: &ValueDesc) -> Result<u64, PlanError> {
    let mut elements = 1u64;
    for &dim in &value.shape {
        let Ok(dim) = u64::try_from(dim) else {
            return Err(PlanError::NegativePersistentDim {
                name: value.name.clone(),
                shape: value.shape.clone(),
            });
        };
        elements = elements.saturating_mul(dim);
    }
    Ok(elements.saturating_mul(value.dtype.size_of()))
}
