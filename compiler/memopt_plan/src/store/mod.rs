//! Process-wide results of analysis passes, keyed by session.
//!
//! Downstream consumers (the storage rewriter and the runtime allocator)
//! read plans from here after compilation. Each `(session, pass)` key is
//! written at most once; concurrent sessions write disjoint keys and never
//! observe each other's entries.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::pass::SessionId;
use crate::reuse::ReusePlan;
use crate::PlanError;

/// Concurrent write-once store of published plans.
#[derive(Debug, Default)]
pub struct PassResultStore {
    results: DashMap<(SessionId, &'static str), Arc<ReusePlan>>,
}

impl PassResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `plan` under `(session, pass)`.
    ///
    /// # Errors
    ///
    /// [`PlanError::AlreadyPublished`] if the key was already written. The
    /// stored plan is left untouched.
    pub fn put(
        &self,
        session: SessionId,
        pass: &'static str,
        plan: ReusePlan,
    ) -> Result<Arc<ReusePlan>, PlanError> {
        match self.results.entry((session, pass)) {
            Entry::Occupied(_) => Err(PlanError::AlreadyPublished {
                session,
                pass: pass.to_string(),
            }),
            Entry::Vacant(slot) => {
                let plan = Arc::new(plan);
                slot.insert(Arc::clone(&plan));
                tracing::trace!(%session, pass, "plan published");
                Ok(plan)
            }
        }
    }

    pub fn get(&self, session: SessionId, pass: &'static str) -> Option<Arc<ReusePlan>> {
        self.results
            .get(&(session, pass))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, session: SessionId, pass: &'static str) -> bool {
        self.results.contains_key(&(session, pass))
    }

    /// Drop every result published for `session`, returning how many were
    /// removed. Needed before the same session id compiles again.
    pub fn clear_session(&self, session: SessionId) -> usize {
        let before = self.results.len();
        self.results.retain(|(owner, _), _| *owner != session);
        before.saturating_sub(self.results.len())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests;
