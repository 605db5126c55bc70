//! Trace-driven cache hierarchy simulator library.
//!
//! This crate models a two-level (L1, L2) set-associative cache hierarchy
//! backed by main memory and replays a trace of read/write requests against
//! it. It provides:
//! 1. **Address decomposition:** Per-level tag/index/offset splitting and
//!    block-address reassembly with sequential-neighbor wraparound.
//! 2. **Set-associative storage:** Per-set LRU rank bookkeeping, victim
//!    selection, and write-back dirty-bit eviction.
//! 3. **Stream-buffer prefetching:** N streams of M sequential block
//!    addresses per level, with their own LRU discipline.
//! 4. **Hierarchy control:** The cross-level miss/hit/eviction decision tree
//!    and per-level counter attribution.
//! 5. **Trace ingestion and reporting:** Line-oriented trace parsing,
//!    aggregate statistics, and the final contents/measurements report.

/// Per-level cache model (set-associative store, stream buffers, counters).
pub mod cache;
/// Common types (address decomposition, error taxonomy).
pub mod common;
/// Simulator configuration (defaults, geometry validation).
pub mod config;
/// Hierarchy controller and trace ingestion.
pub mod sim;
/// Statistics counters, content snapshots, and report rendering.
pub mod stats;

/// Root configuration type; use `SimConfig::default()` or deserialize from JSON.
pub use crate::config::SimConfig;
/// Hierarchy controller; owns both cache levels for a run.
pub use crate::sim::Hierarchy;
