use pretty_assertions::assert_eq;

use crate::pass::SessionId;
use crate::test_helpers::{lifetimes, sizes};
use crate::{make_reuse_plan, PlanError, ReusePlan};

use super::PassResultStore;

const PASS: &str = "memory_optimize_pass";

fn sample_plan() -> ReusePlan {
    make_reuse_plan(&lifetimes(&[("a", 0, 1), ("b", 2, 3)]), &sizes(&[("a", 4), ("b", 2)]))
}

#[test]
fn put_then_get() {
    let store = PassResultStore::new();
    assert!(store.is_empty());

    let published = store.put(SessionId::new(1), PASS, sample_plan());
    assert!(published.is_ok());
    assert_eq!(store.get(SessionId::new(1), PASS).as_deref(), Some(&sample_plan()));
    assert!(store.contains(SessionId::new(1), PASS));
    assert_eq!(store.len(), 1);
}

#[test]
fn sessions_are_isolated() {
    let store = PassResultStore::new();
    assert!(store.put(SessionId::new(1), PASS, sample_plan()).is_ok());

    assert_eq!(store.get(SessionId::new(2), PASS), None);
    assert_eq!(store.get(SessionId::new(1), "other_pass"), None);
}

#[test]
fn second_write_is_rejected_and_first_kept() {
    let store = PassResultStore::new();
    assert!(store.put(SessionId::new(7), PASS, sample_plan()).is_ok());

    let second = store.put(SessionId::new(7), PASS, ReusePlan::default());
    assert_eq!(
        second,
        Err(PlanError::AlreadyPublished {
            session: SessionId::new(7),
            pass: PASS.to_string(),
        })
    );
    assert_eq!(store.get(SessionId::new(7), PASS).as_deref(), Some(&sample_plan()));
}

#[test]
fn clear_session_allows_republish() {
    let store = PassResultStore::new();
    assert!(store.put(SessionId::new(3), PASS, sample_plan()).is_ok());
    assert!(store.put(SessionId::new(3), "other_pass", sample_plan()).is_ok());
    assert!(store.put(SessionId::new(4), PASS, sample_plan()).is_ok());

    assert_eq!(store.clear_session(SessionId::new(3)), 2);
    assert!(!store.contains(SessionId::new(3), PASS));
    assert!(store.contains(SessionId::new(4), PASS));
    assert!(store.put(SessionId::new(3), PASS, ReusePlan::default()).is_ok());
}
