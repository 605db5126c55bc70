//! Hierarchy Decision-Tree Unit Tests.
//!
//! End-to-end counter checks for hand-traced request sequences: single
//! level, write-back cascades across two levels, and prefetcher
//! interaction at each level.

use crate::common::{hierarchy, run};

// ──────────────────────────────────────────────────────────
// Single level, no prefetching
// ──────────────────────────────────────────────────────────

#[test]
fn test_single_level_miss_then_hit() {
    // 16-byte blocks, direct-mapped 1024-byte L1, no L2.
    let mut sim = hierarchy(16, 1024, 1, 0, 0, 0, 0);
    run(&mut sim, "r 0\nr 0\nw 10\n");
    let l1 = &sim.l1().stats;
    assert_eq!(l1.reads, 2);
    assert_eq!(l1.read_misses, 1);
    assert_eq!(l1.writes, 1);
    assert_eq!(l1.write_misses, 1);
    assert_eq!(l1.writebacks, 0);
    assert_eq!(l1.prefetches, 0);
    assert_eq!(l1.memory_traffic, 2);
    assert!((l1.miss_rate() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(sim.requests(), 3);
    assert!(sim.l2().is_absent());
}

#[test]
fn test_single_level_dirty_eviction_writes_back_to_memory() {
    // One set, one way: the second miss displaces the dirty block.
    let mut sim = hierarchy(16, 16, 1, 0, 0, 0, 0);
    run(&mut sim, "w 0\nr 100\n");
    let l1 = &sim.l1().stats;
    assert_eq!(l1.write_misses, 1);
    assert_eq!(l1.read_misses, 1);
    assert_eq!(l1.writebacks, 1);
    // Two demand fills plus one write-back.
    assert_eq!(l1.memory_traffic, 3);
}

#[test]
fn test_clean_eviction_costs_no_writeback() {
    let mut sim = hierarchy(16, 16, 1, 0, 0, 0, 0);
    run(&mut sim, "r 0\nr 100\n");
    let l1 = &sim.l1().stats;
    assert_eq!(l1.writebacks, 0);
    assert_eq!(l1.memory_traffic, 2);
}

// ──────────────────────────────────────────────────────────
// Two levels
// ──────────────────────────────────────────────────────────

#[test]
fn test_l1_hit_never_reaches_l2() {
    let mut sim = hierarchy(16, 1024, 2, 8192, 4, 0, 0);
    run(&mut sim, "r 0\nr 0\nr 0\n");
    assert_eq!(sim.l1().stats.reads, 3);
    assert_eq!(sim.l1().stats.read_misses, 1);
    // Only the first request fell through.
    assert_eq!(sim.l2().stats.reads, 1);
    assert_eq!(sim.l2().stats.read_misses, 1);
    assert_eq!(sim.l2().stats.memory_traffic, 1);
}

#[test]
fn test_l1_miss_falls_through_as_read_regardless_of_kind() {
    let mut sim = hierarchy(16, 1024, 2, 8192, 4, 0, 0);
    run(&mut sim, "w 0\n");
    assert_eq!(sim.l1().stats.writes, 1);
    assert_eq!(sim.l1().stats.write_misses, 1);
    assert_eq!(sim.l1().stats.memory_traffic, 0);
    assert_eq!(sim.l2().stats.reads, 1);
    assert_eq!(sim.l2().stats.writes, 0);
    assert_eq!(sim.l2().stats.memory_traffic, 1);
}

#[test]
fn test_writeback_cascade_through_l2() {
    // Direct-mapped 32-byte L1 (2 sets), direct-mapped 64-byte L2
    // (4 sets). Both writes land in L1 set 0 and L2 set 0.
    let mut sim = hierarchy(16, 32, 1, 64, 1, 0, 0);
    run(&mut sim, "w 0\nw 40\n");
    let l1 = &sim.l1().stats;
    let l2 = &sim.l2().stats;
    assert_eq!(l1.writes, 2);
    assert_eq!(l1.write_misses, 2);
    // Block 0, dirty in L1, is displaced by block 4 and written to L2.
    assert_eq!(l1.writebacks, 1);
    assert_eq!(l1.memory_traffic, 0);
    assert_eq!(l2.reads, 2);
    assert_eq!(l2.read_misses, 2);
    // The write-back from L1 hits L2 (block 0 was filled there first).
    assert_eq!(l2.writes, 1);
    assert_eq!(l2.write_misses, 0);
    // Installing block 4 in L2 then displaces the dirtied block 0 to
    // memory.
    assert_eq!(l2.writebacks, 1);
    assert_eq!(l2.memory_traffic, 3);
}

// ──────────────────────────────────────────────────────────
// Prefetching
// ──────────────────────────────────────────────────────────

#[test]
fn test_l1_prefetch_hit_suppresses_miss_and_skips_l2() {
    // No L2, so the single stream buffer attaches to L1.
    let mut sim = hierarchy(16, 1024, 1, 0, 0, 1, 4);
    run(&mut sim, "r 0\nr 10\n");
    let l1 = &sim.l1().stats;
    assert_eq!(l1.reads, 2);
    // The second read misses the cache but hits the stream (block 1
    // was staged), so only the first read counts as a miss.
    assert_eq!(l1.read_misses, 1);
    // 4 staged on allocation + 1 restaged on the stream hit.
    assert_eq!(l1.prefetches, 5);
    // 1 demand fill + 5 prefetch fetches.
    assert_eq!(l1.memory_traffic, 6);
    assert!((l1.miss_rate() - 0.5).abs() < 1e-9);
}

#[test]
fn test_prefetcher_attaches_to_l2_when_present() {
    let mut sim = hierarchy(16, 32, 1, 256, 1, 1, 2);
    run(&mut sim, "r 0\nr 10\n");
    let l1 = &sim.l1().stats;
    let l2 = &sim.l2().stats;
    // Both reads miss the (tiny, cold) L1.
    assert_eq!(l1.read_misses, 2);
    assert_eq!(l1.prefetches, 0);
    assert_eq!(l1.memory_traffic, 0);
    assert_eq!(l2.reads, 2);
    // The second fall-through hits the L2 stream buffer: no demand
    // miss is charged and no demand fill is fetched.
    assert_eq!(l2.read_misses, 1);
    // 2 staged on allocation + 1 restaged on the stream hit.
    assert_eq!(l2.prefetches, 3);
    // 1 demand fill + 3 prefetch fetches.
    assert_eq!(l2.memory_traffic, 4);
}

#[test]
fn test_prefetch_only_counters_stay_zero() {
    let mut sim = hierarchy(16, 1024, 1, 0, 0, 1, 4);
    run(&mut sim, "r 0\nr 10\nw 20\n");
    assert_eq!(sim.l2().stats.prefetch_reads, 0);
    assert_eq!(sim.l2().stats.prefetch_read_misses, 0);
}
