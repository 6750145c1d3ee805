//! Reuse planning: greedy clustering of non-overlapping values.
//!
//! # Algorithm
//!
//! 1. **Candidates.** Values present in both the lifetime table and the
//!    size table, in lifetime-table order. Anything missing from either
//!    table is dropped without complaint.
//! 2. **Overlap graph.** Two candidates are adjacent iff their closed
//!    intervals overlap. Adjacency is symmetric and recomputed on every
//!    call.
//! 3. **Order.** Candidates are stably sorted by size, largest first.
//! 4. **Greedy packing.** Each unassigned candidate opens a cluster and
//!    becomes its anchor. The rest of the sorted list is scanned forward;
//!    an unassigned candidate joins if it is adjacent to nobody already in
//!    the cluster, and its own neighbors are then added to the cluster's
//!    accumulated adjacency.
//!
//! Because the anchor is the first and largest member, the cluster's
//! allocation is the anchor's size and every member fits in it.
//!
//! Candidates are addressed by index into a local array; all adjacency
//! sets hold indices, never names or references.
//!
//! # Complexity
//!
//! O(n^2) for the overlap graph and O(n^2) for packing.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::lifetime::{Lifetime, LifetimeTable};
use crate::size::SizeTable;
use crate::to_mib;

/// Storage sharing plan for one compile.
///
/// Every planned value maps to the anchor of its cluster; every anchor
/// maps to the byte size of the shared allocation. Both maps are ordered
/// by name so repeated runs print identically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReusePlan {
    /// Value name to the name of its cluster's anchor.
    pub node2cluster: BTreeMap<String, String>,
    /// Anchor name to the shared allocation size in bytes.
    pub cluster_size: BTreeMap<String, u64>,
}

impl ReusePlan {
    /// Anchor of the cluster `name` was placed in.
    pub fn cluster_of(&self, name: &str) -> Option<&str> {
        self.node2cluster.get(name).map(String::as_str)
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_size.len()
    }

    /// Values placed in `anchor`'s cluster (the anchor included), by name.
    pub fn members<'a>(&'a self, anchor: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.node2cluster
            .iter()
            .filter(move |(_, cluster)| cluster.as_str() == anchor)
            .map(|(name, _)| name.as_str())
    }

    /// Total bytes of all shared allocations.
    pub fn planned_bytes(&self) -> u64 {
        self.cluster_size
            .values()
            .fold(0u64, |acc, &size| acc.saturating_add(size))
    }

    pub fn is_empty(&self) -> bool {
        self.node2cluster.is_empty()
    }

    /// Summary of this plan against the sizes it was computed from.
    pub fn stats(&self, sizes: &SizeTable) -> PlanStats {
        let unplanned_bytes = self
            .node2cluster
            .keys()
            .filter_map(|name| sizes.get(name))
            .fold(0u64, |acc, &size| acc.saturating_add(size));
        PlanStats {
            candidates: self.node2cluster.len(),
            clusters: self.cluster_count(),
            unplanned_bytes,
            planned_bytes: self.planned_bytes(),
        }
    }
}

/// Informational summary of a [`ReusePlan`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanStats {
    pub candidates: usize,
    pub clusters: usize,
    /// Bytes needed if every candidate had its own allocation.
    pub unplanned_bytes: u64,
    /// Bytes needed with the plan applied.
    pub planned_bytes: u64,
}

impl PlanStats {
    pub fn saved_bytes(&self) -> u64 {
        self.unplanned_bytes.saturating_sub(self.planned_bytes)
    }
}

struct Candidate<'a> {
    name: &'a str,
    size: u64,
    lifetime: Lifetime,
    /// Indices of overlapping candidates.
    adj: FxHashSet<usize>,
}

/// Partition reusable values into clusters of mutually disjoint lifetimes.
pub fn make_reuse_plan(lifetimes: &LifetimeTable, sizes: &SizeTable) -> ReusePlan {
    let mut candidates: Vec<Candidate<'_>> = lifetimes
        .iter()
        .filter_map(|(name, lifetime)| {
            sizes.get(name).map(|&size| Candidate {
                name,
                size,
                lifetime,
                adj: FxHashSet::default(),
            })
        })
        .collect();

    let n = candidates.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if candidates[i].lifetime.overlaps(candidates[j].lifetime) {
                candidates[i].adj.insert(j);
                candidates[j].adj.insert(i);
            }
        }
    }

    // Stable: equal sizes keep lifetime-table order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&idx| Reverse(candidates[idx].size));

    let mut cluster_of: Vec<Option<usize>> = vec![None; n];
    let mut next_cluster = 0usize;
    let mut plan = ReusePlan::default();

    for (pos, &anchor_idx) in order.iter().enumerate() {
        if cluster_of[anchor_idx].is_some() {
            continue;
        }
        let cluster = next_cluster;
        next_cluster += 1;

        let anchor = &candidates[anchor_idx];
        cluster_of[anchor_idx] = Some(cluster);
        plan.cluster_size.insert(anchor.name.to_string(), anchor.size);
        plan.node2cluster
            .insert(anchor.name.to_string(), anchor.name.to_string());

        let mut cluster_adj = anchor.adj.clone();
        let mut members = 1usize;
        for &idx in &order[pos + 1..] {
            if cluster_of[idx].is_some() || cluster_adj.contains(&idx) {
                continue;
            }
            cluster_of[idx] = Some(cluster);
            plan.node2cluster
                .insert(candidates[idx].name.to_string(), anchor.name.to_string());
            cluster_adj.extend(candidates[idx].adj.iter().copied());
            members += 1;
        }

        tracing::debug!(
            cluster,
            anchor = anchor.name,
            size = anchor.size,
            members,
            "cluster planned"
        );
    }

    let stats = plan.stats(sizes);
    tracing::info!(
        candidates = stats.candidates,
        clusters = stats.clusters,
        unplanned_mib = to_mib(stats.unplanned_bytes),
        planned_mib = to_mib(stats.planned_bytes),
        "reuse plan made"
    );

    plan
}

#[cfg(test)]
mod tests;
