//! The two-level hierarchy controller.
//!
//! [`Hierarchy`] owns both levels and routes every trace request through
//! the decision tree: classify at L1, fall through to L2 on a demand miss
//! that the L1 prefetcher cannot satisfy, write back displaced dirty
//! lines to the level below, then install top-down.

pub mod trace;

use tracing::debug;

use crate::cache::{Access, CacheLevel, InstallPolicy};
use crate::common::error::{ConfigError, TraceError};
use crate::config::SimConfig;

use self::trace::TraceRequest;

/// A configured L1/L2 pair plus the request counter.
#[derive(Debug)]
pub struct Hierarchy {
    config: SimConfig,
    l1: CacheLevel,
    l2: CacheLevel,
    requests: u64,
}

impl Hierarchy {
    /// Builds both levels from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] in the geometry.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            l1: CacheLevel::new("L1", config.block_bytes, &config.l1)?,
            l2: CacheLevel::new("L2", config.block_bytes, &config.l2)?,
            requests: 0,
        })
    }

    /// The configuration the hierarchy was built from.
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The first-level cache.
    pub const fn l1(&self) -> &CacheLevel {
        &self.l1
    }

    /// The second-level cache. Absent when configured with zero size.
    pub const fn l2(&self) -> &CacheLevel {
        &self.l2
    }

    /// Number of requests processed so far.
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    /// Runs one demand access through the hierarchy.
    ///
    /// L1 classification decides the path: a tag hit refreshes in place; a
    /// miss satisfied by the L1 prefetcher installs without touching L2 or
    /// the miss counters; a full miss becomes a read request to L2 (or
    /// memory traffic when L2 is absent). L2 is classified before L1's
    /// write-back runs, because the write-back mutates L2.
    pub fn request(&mut self, addr: u32, access: Access) {
        self.requests += 1;
        match access {
            Access::Read => self.l1.stats.reads += 1,
            Access::Write => self.l1.stats.writes += 1,
        }
        let l1_seen = self.l1.classify(addr);
        debug!(
            addr = format_args!("{addr:#x}"),
            ?access,
            hit = l1_seen.cache_hit,
            prefetch_hit = l1_seen.prefetch_hit,
            "L1 lookup"
        );

        if l1_seen.cache_hit {
            self.l1.install(
                addr,
                access,
                InstallPolicy {
                    lower_is_terminal: self.l2.is_absent(),
                    update_prefetch: l1_seen.prefetch_hit,
                    count_miss: false,
                },
            );
            return;
        }

        if l1_seen.prefetch_hit {
            // The prefetcher supplies the block, so L2 is never consulted
            // and no miss is charged. A displaced dirty line still goes
            // down.
            self.l1.evict_dirty(addr, &mut self.l2);
            self.l1.install(
                addr,
                access,
                InstallPolicy {
                    lower_is_terminal: self.l2.is_absent(),
                    update_prefetch: true,
                    count_miss: false,
                },
            );
            return;
        }

        match access {
            Access::Read => self.l1.stats.read_misses += 1,
            Access::Write => self.l1.stats.write_misses += 1,
        }

        if self.l2.is_absent() {
            self.l1.stats.memory_traffic += 1;
            self.l1.evict_dirty(addr, &mut self.l2);
            self.l1.install(
                addr,
                access,
                InstallPolicy {
                    lower_is_terminal: true,
                    update_prefetch: true,
                    count_miss: false,
                },
            );
            return;
        }

        // L1 misses fall through as reads regardless of the demand kind.
        self.l2.stats.reads += 1;
        let l2_seen = self.l2.classify(addr);
        if !l2_seen.cache_hit && !l2_seen.prefetch_hit {
            self.l2.stats.read_misses += 1;
            self.l2.stats.memory_traffic += 1;
        }
        self.l1.evict_dirty(addr, &mut self.l2);
        self.l2.install(
            addr,
            Access::Read,
            InstallPolicy {
                lower_is_terminal: true,
                update_prefetch: !l2_seen.cache_hit || l2_seen.prefetch_hit,
                count_miss: false,
            },
        );
        self.l1.install(
            addr,
            access,
            InstallPolicy {
                lower_is_terminal: false,
                update_prefetch: true,
                count_miss: false,
            },
        );
    }

    /// Drains a trace, feeding every request through [`Self::request`].
    /// Returns the number of requests processed.
    ///
    /// # Errors
    ///
    /// Stops at the first [`TraceError`] and returns it.
    pub fn replay<I>(&mut self, requests: I) -> Result<u64, TraceError>
    where
        I: IntoIterator<Item = Result<TraceRequest, TraceError>>,
    {
        for req in requests {
            let req = req?;
            self.request(req.addr, req.access);
        }
        Ok(self.requests)
    }
}
