//! The memory optimization pass: lifetimes, sizes, plan, publish.

use std::fmt;
use std::sync::Arc;

use memopt_ir::{Graph, SortKind};

use crate::lifetime::collect_lifetimes;
use crate::reuse::{make_reuse_plan, ReusePlan};
use crate::size::estimate_sizes;
use crate::store::PassResultStore;
use crate::{MemoryOptimConfig, PlanError};

/// Identifier of one compile session (one predictor being built).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SessionId(u64);

impl SessionId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything one invocation of the pass reads.
#[derive(Clone, Copy, Debug)]
pub struct Argument<'g> {
    pub graph: &'g Graph,
    pub config: MemoryOptimConfig,
    pub session: SessionId,
}

impl<'g> Argument<'g> {
    /// Argument with the default configuration.
    pub fn new(graph: &'g Graph, session: SessionId) -> Self {
        Self {
            graph,
            config: MemoryOptimConfig::default(),
            session,
        }
    }

    #[must_use]
    pub fn with_config(self, config: MemoryOptimConfig) -> Self {
        Self { config, ..self }
    }
}

/// Stateless memory optimization pass.
///
/// One instance may be shared by any number of concurrent sessions: all
/// intermediate tables live on the stack of a single call.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryOptimizePass;

impl MemoryOptimizePass {
    /// Key under which plans are published.
    pub const NAME: &'static str = "memory_optimize_pass";

    pub fn name(self) -> &'static str {
        Self::NAME
    }

    /// Compute a reuse plan for `graph` without publishing it.
    ///
    /// A graph with no operations is not an error: it yields an empty plan
    /// and a warning.
    pub fn plan(self, graph: &Graph, sort_kind: SortKind) -> Result<ReusePlan, PlanError> {
        if graph.op_count() == 0 {
            tracing::warn!(nodes = graph.len(), "graph has no operations; nothing to reuse");
        }

        let report = collect_lifetimes(graph, sort_kind)?;
        let sizes = estimate_sizes(graph)?;
        Ok(make_reuse_plan(&report.lifetimes, &sizes))
    }

    /// Run the pass for one session and publish the plan into `store`.
    ///
    /// Returns `Ok(None)` without touching `store` when memory
    /// optimization is disabled. On error nothing is published.
    pub fn run(
        self,
        argument: &Argument<'_>,
        store: &PassResultStore,
    ) -> Result<Option<Arc<ReusePlan>>, PlanError> {
        let _span = tracing::debug_span!(
            "memory_optimize_pass",
            session = %argument.session,
            sort = %argument.config.sort_kind,
        )
        .entered();

        if !argument.config.enable_memory_optim {
            tracing::debug!("memory optimization disabled; skipping");
            return Ok(None);
        }

        let plan = self.plan(argument.graph, argument.config.sort_kind)?;
        let published = store.put(argument.session, Self::NAME, plan)?;
        Ok(Some(published))
    }
}
