//! A single cache level: set-associative storage plus an optional
//! stream-buffer prefetcher, with the counters both feed.

pub mod store;
pub mod stream;

use tracing::trace;

use crate::common::addr::AddressDecoder;
use crate::common::error::ConfigError;
use crate::config::LevelConfig;
use crate::stats::LevelStats;

use self::store::SetAssociativeStore;
use self::stream::StreamBufferPrefetcher;

/// Demand access kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// A load.
    Read,
    /// A store. Installs the block dirty.
    Write,
}

impl Access {
    /// Whether this access marks the installed line dirty.
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// Where a request was found at one level, computed before any state
/// changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// A valid way in the target set matches the tag.
    pub cache_hit: bool,
    /// A valid prefetch stream holds the block.
    pub prefetch_hit: bool,
}

/// How an [`CacheLevel::install`] should account for itself.
#[derive(Clone, Copy, Debug)]
pub struct InstallPolicy {
    /// The level below this one is main memory, so a write-back displaced
    /// inside the install goes straight to traffic.
    pub lower_is_terminal: bool,
    /// Steer the prefetcher after the fill.
    pub update_prefetch: bool,
    /// Count a miss and one unit of traffic if the fill replaced a
    /// different tag and the prefetcher did not already hold the block.
    /// Set only for requests whose classification was not counted by the
    /// caller, such as write-backs arriving from the level above.
    pub count_miss: bool,
}

#[derive(Debug)]
struct Inner {
    decoder: AddressDecoder,
    store: SetAssociativeStore,
    prefetch: StreamBufferPrefetcher,
}

/// One level of the hierarchy. A level configured with zero size is
/// *absent*: it keeps its label and zeroed counters but holds no state,
/// and requests fall through it to memory.
#[derive(Debug)]
pub struct CacheLevel {
    label: &'static str,
    inner: Option<Inner>,
    /// Event counters for this level.
    pub stats: LevelStats,
}

impl CacheLevel {
    /// Builds a level from its geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a nonzero size does not divide into a
    /// power-of-two number of sets of `assoc` ways.
    pub fn new(label: &'static str, block_bytes: u32, cfg: &LevelConfig) -> Result<Self, ConfigError> {
        let inner = if cfg.size_bytes == 0 {
            None
        } else {
            cfg.validate(label, block_bytes)?;
            let set_count = cfg.set_count(block_bytes);
            let decoder = AddressDecoder::new(block_bytes, set_count);
            Some(Inner {
                decoder,
                store: SetAssociativeStore::new(set_count, cfg.assoc),
                prefetch: StreamBufferPrefetcher::new(decoder, cfg.stream_count, cfg.stream_depth),
            })
        };
        Ok(Self {
            label,
            inner,
            stats: LevelStats::default(),
        })
    }

    /// Display label, `"L1"` or `"L2"`.
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Whether this level was configured with zero size.
    pub const fn is_absent(&self) -> bool {
        self.inner.is_none()
    }

    /// Looks `addr` up in the tag store and the prefetch streams without
    /// touching either. An absent level misses everything.
    pub fn classify(&self, addr: u32) -> Classification {
        self.inner.as_ref().map_or_else(Classification::default, |inner| {
            let d = inner.decoder.decode(addr);
            Classification {
                cache_hit: !inner.store.is_miss(&d),
                prefetch_hit: inner.prefetch.enabled()
                    && !inner.prefetch.is_miss(inner.decoder.block_addr(&d)),
            }
        })
    }

    /// Writes back the dirty eviction candidate of `addr`'s set, if any,
    /// before `addr` is installed. The victim becomes a write request to
    /// `lower`; when `lower` is absent it is charged to this level's
    /// memory traffic instead.
    pub fn evict_dirty(&mut self, addr: u32, lower: &mut Self) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let d = inner.decoder.decode(addr);
        let Some((way, victim_addr)) = inner.store.dirty_victim(&d, addr) else {
            return;
        };
        trace!(level = self.label, victim = format_args!("{victim_addr:#x}"), "write-back");
        if lower.is_absent() {
            self.stats.memory_traffic += 1;
        } else {
            let seen = lower.classify(victim_addr);
            lower.stats.writes += 1;
            lower.install(
                victim_addr,
                Access::Write,
                InstallPolicy {
                    lower_is_terminal: true,
                    update_prefetch: !(seen.cache_hit && !seen.prefetch_hit),
                    count_miss: true,
                },
            );
        }
        if let Some(inner) = self.inner.as_mut() {
            inner.store.clear_dirty(d.index, way);
        }
        self.stats.writebacks += 1;
    }

    /// Places `addr` into the tag store, refreshing on a hit and filling
    /// on a miss, then steers the prefetcher. Counter attribution follows
    /// `policy`; prefetch fetches always add to both the prefetch count
    /// and memory traffic.
    pub fn install(&mut self, addr: u32, access: Access, policy: InstallPolicy) {
        let Some(inner) = self.inner.as_mut() else {
            return;
        };
        let d = inner.decoder.decode(addr);
        let prefetch_missed =
            !inner.prefetch.enabled() || inner.prefetch.is_miss(inner.decoder.block_addr(&d));
        let outcome = inner.store.install(&d, addr, access.is_write(), true);
        if outcome.retry_writeback {
            self.stats.writebacks += 1;
            if policy.lower_is_terminal {
                self.stats.memory_traffic += 1;
            }
        }
        if policy.count_miss && outcome.tag_mismatch && prefetch_missed {
            match access {
                Access::Read => self.stats.read_misses += 1,
                Access::Write => self.stats.write_misses += 1,
            }
            self.stats.memory_traffic += 1;
        }
        if outcome.completed && policy.update_prefetch && inner.prefetch.enabled() {
            let issued = inner.prefetch.record_access(&d);
            self.stats.prefetches += issued;
            self.stats.memory_traffic += issued;
        }
    }

    /// Valid lines of every set in LRU order, for the final dump. Empty
    /// when the level is absent.
    pub fn store_contents(&self) -> Vec<Vec<(u32, bool)>> {
        self.inner.as_ref().map_or_else(Vec::new, |inner| {
            (0..inner.store.set_count())
                .map(|set| inner.store.set_contents(set))
                .collect()
        })
    }

    /// Valid prefetch streams in LRU order, for the final dump.
    pub fn prefetch_contents(&self) -> Vec<Vec<u32>> {
        self.inner
            .as_ref()
            .map_or_else(Vec::new, |inner| inner.prefetch.contents())
    }

    /// Whether this level carries a live prefetch unit.
    pub fn has_prefetcher(&self) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.prefetch.enabled())
    }
}
