//! Static memory reuse planning for compiled dataflow graphs.
//!
//! Intermediate tensors whose live ranges never overlap can share one
//! storage allocation. This crate finds such groups in three phases:
//!
//! - **Lifetime collection** ([`collect_lifetimes`]): walks operations in
//!   a chosen topological order and records, per value name, the interval
//!   of execution steps during which it must stay allocated.
//!
//! - **Size estimation** ([`estimate_sizes`]): computes a byte footprint
//!   for every non-persistent dense tensor that no reuse-incompatible
//!   operator touches.
//!
//! - **Reuse planning** ([`make_reuse_plan`]): builds the interval-overlap
//!   graph over values that have both a lifetime and a size, then greedily
//!   packs them, largest first, into clusters of mutually disjoint values.
//!
//! [`MemoryOptimizePass`] runs the three phases for one compile and
//! publishes the resulting [`ReusePlan`] into a [`PassResultStore`] keyed
//! by session.
//!
//! # Design
//!
//! The pass holds no state. Every table is allocated fresh inside a call
//! and dropped before it returns, so one pass instance can serve many
//! concurrent compile sessions. The only shared mutable structure is the
//! store, which callers own and pass in explicitly.
//!
//! # Tracing
//!
//! Phases emit `tracing` events under the `memopt_plan` target:
//! `RUST_LOG=memopt_plan=debug` shows table sizes and every cluster.

mod config;
mod error;
pub mod lifetime;
pub mod pass;
pub mod reuse;
pub mod size;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use config::MemoryOptimConfig;
pub use error::PlanError;
pub use lifetime::{collect_lifetimes, Lifetime, LifetimeReport, LifetimeTable};
pub use pass::{Argument, MemoryOptimizePass, SessionId};
pub use reuse::{make_reuse_plan, PlanStats, ReusePlan};
pub use size::{estimate_sizes, SizeTable, DENIED_OP_TYPES, FAKE_BATCH_SIZE};
pub use store::PassResultStore;

/// Bytes per mebibyte, for human-readable log fields.
const MIB: f64 = 1_048_576.0;

/// Convert a byte count to mebibytes for logging.
#[allow(
    clippy::cast_precision_loss,
    reason = "log output only; exact for sizes under 2^53 bytes"
)]
pub(crate) fn to_mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}
