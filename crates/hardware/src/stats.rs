//! Per-level counters and the end-of-run report.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cache::CacheLevel;
use crate::sim::Hierarchy;

/// Event counters for one cache level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    /// Demand reads issued to this level.
    pub reads: u64,
    /// Demand reads that missed both the tag store and the prefetcher.
    pub read_misses: u64,
    /// Demand writes issued to this level, write-backs from above included.
    pub writes: u64,
    /// Demand writes that missed both the tag store and the prefetcher.
    pub write_misses: u64,
    /// Dirty lines displaced from this level.
    pub writebacks: u64,
    /// Block fetches issued by this level's prefetcher.
    pub prefetches: u64,
    /// Block transfers between this level and main memory.
    pub memory_traffic: u64,
    /// Reads issued on behalf of a prefetcher above. Always zero here:
    /// prefetch fills bypass the lower level. Reported for completeness.
    pub prefetch_reads: u64,
    /// Misses among [`Self::prefetch_reads`]. Always zero here.
    pub prefetch_read_misses: u64,
}

impl LevelStats {
    /// Combined miss rate, `(read misses + write misses) / (reads + writes)`.
    /// Zero when the level saw no accesses.
    pub fn miss_rate(&self) -> f64 {
        let accesses = self.reads + self.writes;
        if accesses == 0 {
            0.0
        } else {
            (self.read_misses + self.write_misses) as f64 / accesses as f64
        }
    }

    /// Demand read miss rate, `read misses / reads`. Zero when the level
    /// saw no reads.
    pub fn demand_read_miss_rate(&self) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            self.read_misses as f64 / self.reads as f64
        }
    }
}

/// Renders the configuration echo, the final cache and stream-buffer
/// contents, and the measurement lines for a finished run.
///
/// The layout is byte-stable so runs can be diffed against reference
/// outputs: fixed-width labels, lowercase unprefixed hex for tags and
/// block addresses, contents in LRU order with a trailing `D` marker on
/// dirty lines.
pub fn render_report(sim: &Hierarchy, trace_file: &str) -> String {
    let cfg = sim.config();
    let mut out = String::new();
    out.push_str("===== Simulator configuration =====\n");
    let _ = writeln!(out, "BLOCKSIZE:  {}", cfg.block_bytes);
    let _ = writeln!(out, "L1_SIZE:    {}", cfg.l1.size_bytes);
    let _ = writeln!(out, "L1_ASSOC:   {}", cfg.l1.assoc);
    let _ = writeln!(out, "L2_SIZE:    {}", cfg.l2.size_bytes);
    let _ = writeln!(out, "L2_ASSOC:   {}", cfg.l2.assoc);
    let _ = writeln!(out, "PREF_N:     {}", cfg.l1.stream_count + cfg.l2.stream_count);
    let _ = writeln!(out, "PREF_M:     {}", cfg.l1.stream_depth + cfg.l2.stream_depth);
    let _ = writeln!(out, "trace_file: {trace_file}");

    push_cache_contents(&mut out, sim.l1());
    push_stream_contents(&mut out, sim.l1());
    push_cache_contents(&mut out, sim.l2());
    push_stream_contents(&mut out, sim.l2());
    if !sim.l2().is_absent() {
        out.push('\n');
    }

    let l1 = &sim.l1().stats;
    let l2 = &sim.l2().stats;
    out.push_str("===== Measurements =====\n");
    let _ = writeln!(out, "a. L1 reads:                   {}", l1.reads);
    let _ = writeln!(out, "b. L1 read misses:             {}", l1.read_misses);
    let _ = writeln!(out, "c. L1 writes:                  {}", l1.writes);
    let _ = writeln!(out, "d. L1 write misses:            {}", l1.write_misses);
    let _ = writeln!(out, "e. L1 miss rate:               {:.4}", l1.miss_rate());
    let _ = writeln!(out, "f. L1 writebacks:              {}", l1.writebacks);
    let _ = writeln!(out, "g. L1 prefetches:              {}", l1.prefetches);
    let _ = writeln!(out, "h. L2 reads (demand):          {}", l2.reads);
    let _ = writeln!(out, "i. L2 read misses (demand):    {}", l2.read_misses);
    let _ = writeln!(out, "j. L2 reads (prefetch):        {}", l2.prefetch_reads);
    let _ = writeln!(out, "k. L2 read misses (prefetch):  {}", l2.prefetch_read_misses);
    let _ = writeln!(out, "l. L2 writes:                  {}", l2.writes);
    let _ = writeln!(out, "m. L2 write misses:            {}", l2.write_misses);
    let _ = writeln!(out, "n. L2 miss rate:               {:.4}", l2.demand_read_miss_rate());
    let _ = writeln!(out, "o. L2 writebacks:              {}", l2.writebacks);
    let _ = writeln!(out, "p. L2 prefetches:              {}", l2.prefetches);
    let _ = writeln!(out, "q. memory traffic:             {}", l1.memory_traffic + l2.memory_traffic);
    out
}

/// Emits `===== Lx contents =====` followed by one `set      N:` line per
/// occupied set, ways in LRU order. Nothing at all for an absent level.
/// The section starts with a newline and ends without one, so the next
/// section's leading newline terminates the last set line.
fn push_cache_contents(out: &mut String, level: &CacheLevel) {
    if level.is_absent() {
        return;
    }
    let _ = write!(out, "\n===== {} contents =====", level.label());
    for (set, lines) in level.store_contents().into_iter().enumerate() {
        if lines.is_empty() {
            continue;
        }
        let _ = write!(out, "\nset      {set}: ");
        for (tag, dirty) in lines {
            let _ = write!(out, "  {tag:x} {}", if dirty { "D" } else { " " });
        }
    }
}

/// Emits the stream-buffer section for one level: a bare newline when the
/// level has no live prefetcher (closing the preceding contents section),
/// otherwise the header and one row of block addresses per valid stream
/// in LRU order.
fn push_stream_contents(out: &mut String, level: &CacheLevel) {
    if !level.has_prefetcher() {
        out.push('\n');
        return;
    }
    out.push_str("\n\n===== Stream Buffer(s) contents =====\n");
    for blocks in level.prefetch_contents() {
        for block in blocks {
            let _ = write!(out, " {block:x} ");
        }
        out.push('\n');
    }
}
