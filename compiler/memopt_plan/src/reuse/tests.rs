use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use crate::lifetime::{Lifetime, LifetimeTable};
use crate::test_helpers::{lifetimes, sizes};

use super::{make_reuse_plan, PlanStats, ReusePlan};

fn map<V: Clone>(entries: &[(&str, V)]) -> BTreeMap<String, V> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn names(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|&(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// a(100, [0,2]), b(50, [3,5]), c(80, [1,4]): `a` and `b` share, `c`
/// overlaps both and gets its own cluster.
#[test]
fn three_candidate_example() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 2), ("b", 3, 5), ("c", 1, 4)]),
        &sizes(&[("a", 100), ("b", 50), ("c", 80)]),
    );

    assert_eq!(plan.node2cluster, names(&[("a", "a"), ("b", "a"), ("c", "c")]));
    assert_eq!(plan.cluster_size, map(&[("a", 100u64), ("c", 80)]));
    assert_eq!(plan.cluster_count(), 2);
    assert_eq!(plan.members("a").collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(plan.cluster_of("c"), Some("c"));
}

#[test]
fn empty_inputs_give_empty_plan() {
    let plan = make_reuse_plan(&LifetimeTable::new(), &sizes(&[]));
    assert!(plan.is_empty());
    assert_eq!(plan.cluster_count(), 0);
    assert_eq!(plan, ReusePlan::default());
}

/// Values missing from either table are silently dropped.
#[test]
fn only_values_in_both_tables_are_planned() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 1), ("no_size", 2, 3)]),
        &sizes(&[("a", 10), ("no_lifetime", 20)]),
    );
    assert_eq!(plan.node2cluster, names(&[("a", "a")]));
    assert_eq!(plan.cluster_of("no_size"), None);
    assert_eq!(plan.cluster_of("no_lifetime"), None);
}

#[test]
fn all_overlapping_means_one_cluster_each() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 5), ("b", 1, 4), ("c", 2, 3)]),
        &sizes(&[("a", 1), ("b", 2), ("c", 3)]),
    );
    assert_eq!(plan.cluster_count(), 3);
    for name in ["a", "b", "c"] {
        assert_eq!(plan.cluster_of(name), Some(name));
    }
}

#[test]
fn disjoint_chain_collapses_into_largest() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 0), ("b", 1, 1), ("c", 2, 2), ("d", 3, 3)]),
        &sizes(&[("a", 8), ("b", 64), ("c", 16), ("d", 32)]),
    );
    assert_eq!(plan.cluster_size, map(&[("b", 64u64)]));
    assert!(plan.node2cluster.values().all(|anchor| anchor == "b"));
}

/// A candidate disjoint from the anchor but overlapping an earlier member
/// must not join: membership is checked against everyone placed so far.
#[test]
fn adjacency_accumulates_over_members() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 1), ("b", 2, 3), ("c", 3, 4)]),
        &sizes(&[("a", 100), ("b", 50), ("c", 40)]),
    );
    assert_eq!(plan.node2cluster, names(&[("a", "a"), ("b", "a"), ("c", "c")]));
    assert_eq!(plan.cluster_size, map(&[("a", 100u64), ("c", 40)]));
}

/// Touching endpoints count as overlap.
#[test]
fn shared_step_prevents_sharing() {
    let plan = make_reuse_plan(
        &lifetimes(&[("a", 0, 2), ("b", 2, 4)]),
        &sizes(&[("a", 10), ("b", 10)]),
    );
    assert_eq!(plan.cluster_count(), 2);
}

/// Equal sizes keep lifetime-table order, so the first-recorded value
/// anchors.
#[test]
fn ties_follow_lifetime_order() {
    let plan = make_reuse_plan(
        &lifetimes(&[("late", 5, 6), ("early", 0, 1), ("mid", 0, 6)]),
        &sizes(&[("early", 10), ("late", 10), ("mid", 10)]),
    );
    assert_eq!(
        plan.node2cluster,
        names(&[("late", "late"), ("early", "late"), ("mid", "mid")])
    );
}

/// Open-ended lifetimes overlap everything.
#[test]
fn open_ended_value_never_shares() {
    let mut table: LifetimeTable = lifetimes(&[("a", 0, 0), ("b", 9, 9)]);
    table.insert("x", Lifetime::open());
    let plan = make_reuse_plan(&table, &sizes(&[("x", 1_000), ("a", 1), ("b", 1)]));

    assert_eq!(plan.members("x").collect::<Vec<_>>(), vec!["x"]);
    assert_eq!(plan.cluster_of("a"), Some("a"));
    assert_eq!(plan.cluster_of("b"), Some("a"));
}

#[test]
fn stats_report_savings() {
    let s = sizes(&[("a", 100), ("b", 50), ("c", 80)]);
    let plan = make_reuse_plan(&lifetimes(&[("a", 0, 2), ("b", 3, 5), ("c", 1, 4)]), &s);

    let stats = plan.stats(&s);
    assert_eq!(
        stats,
        PlanStats {
            candidates: 3,
            clusters: 2,
            unplanned_bytes: 230,
            planned_bytes: 180,
        }
    );
    assert_eq!(stats.saved_bytes(), 50);
}

#[test]
fn repeated_runs_are_identical() {
    let table = lifetimes(&[("a", 0, 3), ("b", 1, 2), ("c", 4, 6), ("d", 3, 5), ("e", 7, 8)]);
    let s = sizes(&[("a", 7), ("b", 7), ("c", 3), ("d", 7), ("e", 1)]);
    let first = make_reuse_plan(&table, &s);
    for _ in 0..8 {
        assert_eq!(make_reuse_plan(&table, &s), first);
    }
}
