//! Per-compile configuration for the memory planning pass.

use memopt_ir::SortKind;

/// Environment variable naming the default [`SortKind`] (`ts` or `dfs`).
const SORT_ENV: &str = "MEMOPT_SORT";

/// Options read by [`MemoryOptimizePass`](crate::MemoryOptimizePass).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryOptimConfig {
    /// When `false` the pass does nothing and publishes nothing.
    pub enable_memory_optim: bool,
    /// Traversal order used to number execution steps.
    pub sort_kind: SortKind,
}

impl Default for MemoryOptimConfig {
    fn default() -> Self {
        MemoryOptimConfig {
            enable_memory_optim: true,
            sort_kind: SortKind::default(),
        }
    }
}

impl MemoryOptimConfig {
    /// Defaults, with the sort kind taken from `MEMOPT_SORT` when it is set
    /// to a recognized strategy. An unrecognized value is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(SORT_ENV) {
            match raw.parse() {
                Ok(kind) => config.sort_kind = kind,
                Err(err) => tracing::warn!(%err, "ignoring {SORT_ENV}"),
            }
        }
        config
    }

    /// Same config with memory optimization switched off.
    #[must_use]
    pub fn disabled(self) -> Self {
        MemoryOptimConfig {
            enable_memory_optim: false,
            ..self
        }
    }

    #[must_use]
    pub fn with_sort_kind(self, sort_kind: SortKind) -> Self {
        MemoryOptimConfig { sort_kind, ..self }
    }
}
