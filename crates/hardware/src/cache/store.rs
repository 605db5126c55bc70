//! Set-associative storage for one cache level.
//!
//! Each set holds `assoc` ways of `{valid, dirty, tag, lru}` state; no data
//! payload is modeled. LRU is kept as an explicit rank per way: rank 0 is
//! most recently used, rank `assoc - 1` is the eviction candidate, and the
//! ranks of a set form a permutation of `0..assoc` at all times.

use crate::common::addr::DecodedAddr;

/// One way of one set. Created invalid at construction and only ever
/// overwritten or invalidated, never destroyed.
#[derive(Clone, Debug, Default)]
struct CacheLine {
    valid: bool,
    dirty: bool,
    tag: u32,
    /// Raw request address last installed. Re-decoded when the line is
    /// written back, and displayed in content dumps.
    addr: u32,
    lru: u32,
}

/// What [`SetAssociativeStore::install`] did, reported to the owning level
/// so counters can be attributed there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstallOutcome {
    /// A way was refreshed or filled. False only when no way satisfied the
    /// completion condition (a silent no-op; configuration error, not a
    /// runtime fault).
    pub completed: bool,
    /// The filled way previously held a different tag: a true fill rather
    /// than a hit refresh. Stored tags are compared even for invalid ways.
    pub tag_mismatch: bool,
    /// The single-iteration dirty retry fired: the eviction candidate held
    /// modified data that was displaced inside this install.
    pub retry_writeback: bool,
}

/// Set-associative tag store with per-set LRU rank bookkeeping.
#[derive(Debug)]
pub struct SetAssociativeStore {
    sets: Vec<Vec<CacheLine>>,
    assoc: u32,
}

impl SetAssociativeStore {
    /// Builds a store with `set_count` sets of `assoc` ways each. Every way
    /// starts invalid with its LRU rank equal to its way index.
    pub fn new(set_count: u32, assoc: u32) -> Self {
        let sets = (0..set_count)
            .map(|_| {
                (0..assoc)
                    .map(|way| CacheLine {
                        lru: way,
                        ..CacheLine::default()
                    })
                    .collect()
            })
            .collect();
        Self { sets, assoc }
    }

    /// True unless some valid way in the target set matches the tag.
    /// A store with no sets always misses.
    pub fn is_miss(&self, d: &DecodedAddr) -> bool {
        self.sets
            .get(d.index as usize)
            .is_none_or(|set| !set.iter().any(|l| l.valid && l.tag == d.tag))
    }

    /// Way indices of one set ordered by LRU rank, most recent first.
    fn lru_order(&self, index: u32) -> Vec<usize> {
        let set = &self.sets[index as usize];
        let mut order: Vec<usize> = (0..set.len()).collect();
        order.sort_unstable_by_key(|&way| set[way].lru);
        order
    }

    /// Promotes a way to rank 0, demoting every way that was more recently
    /// used by one. Ranks remain a permutation of `0..assoc`.
    pub fn touch_lru(&mut self, index: u32, way: usize) {
        let set = &mut self.sets[index as usize];
        let pivot = set[way].lru;
        for line in set.iter_mut() {
            if line.lru < pivot {
                line.lru += 1;
            }
        }
        set[way].lru = 0;
        self.debug_assert_permutation(index);
    }

    /// Refreshes (on a tag match) or fills (on a miss) a line for `d`.
    ///
    /// Ways are scanned most-recent-first; a way is a candidate if it is a
    /// valid tag match, or if it holds rank `assoc - 1` and `update_lru` is
    /// set. The first candidate resolves as:
    /// - a valid *dirty* tag match: refresh tag and address, keep the dirty
    ///   bit, promote;
    /// - any way that is not both valid and dirty (this covers clean hits,
    ///   invalid ways, and already-written-back victims): overwrite with
    ///   `dirty = is_write`, promote;
    /// - a valid dirty non-matching eviction candidate: clear its dirty bit,
    ///   record the displaced write-back, and rescan once.
    ///
    /// The caller must have run its dirty-eviction pass before installing,
    /// so the retry path fires only for victims that pass escaped.
    pub fn install(
        &mut self,
        d: &DecodedAddr,
        addr: u32,
        is_write: bool,
        update_lru: bool,
    ) -> InstallOutcome {
        let mut outcome = InstallOutcome {
            completed: false,
            tag_mismatch: false,
            retry_writeback: false,
        };
        if self.sets.is_empty() {
            return outcome;
        }
        let order = self.lru_order(d.index);
        let mut retried = false;
        'rescan: loop {
            for &way in &order {
                let line = &self.sets[d.index as usize][way];
                let tag_hit = line.valid && line.tag == d.tag;
                let lru_candidate = line.lru == self.assoc - 1 && update_lru;
                if !(tag_hit || lru_candidate) {
                    continue;
                }
                if line.valid && line.dirty && line.tag == d.tag {
                    let line = &mut self.sets[d.index as usize][way];
                    line.addr = addr;
                    line.tag = d.tag;
                    line.valid = true;
                    if update_lru {
                        self.touch_lru(d.index, way);
                    }
                    outcome.completed = true;
                    return outcome;
                } else if !(line.valid && line.dirty) {
                    outcome.tag_mismatch = line.tag != d.tag;
                    let line = &mut self.sets[d.index as usize][way];
                    line.addr = addr;
                    line.tag = d.tag;
                    line.valid = true;
                    line.dirty = is_write;
                    if update_lru {
                        self.touch_lru(d.index, way);
                    }
                    outcome.completed = true;
                    return outcome;
                } else if !retried {
                    retried = true;
                    outcome.retry_writeback = true;
                    self.sets[d.index as usize][way].dirty = false;
                    continue 'rescan;
                }
            }
            return outcome;
        }
    }

    /// The line the next install in this set would displace, when that line
    /// is dirty: the way at rank `assoc - 1` that is valid, modified, and
    /// holds an address other than the incoming one. Only the eviction
    /// candidate is considered, never a lower-ranked way.
    pub fn dirty_victim(&self, d: &DecodedAddr, addr: u32) -> Option<(usize, u32)> {
        self.sets.get(d.index as usize).and_then(|set| {
            set.iter()
                .enumerate()
                .find(|(_, l)| l.lru == self.assoc - 1 && l.valid && l.dirty && l.addr != addr)
                .map(|(way, l)| (way, l.addr))
        })
    }

    /// Marks a way clean after its contents were written back.
    pub fn clear_dirty(&mut self, index: u32, way: usize) {
        self.sets[index as usize][way].dirty = false;
    }

    /// Valid `(tag, dirty)` pairs of one set in LRU order, most recent
    /// first. Used for the final contents dump.
    pub fn set_contents(&self, index: u32) -> Vec<(u32, bool)> {
        self.lru_order(index)
            .into_iter()
            .filter_map(|way| {
                let line = &self.sets[index as usize][way];
                line.valid.then_some((line.tag, line.dirty))
            })
            .collect()
    }

    /// Current LRU ranks of one set, by way index. Diagnostic accessor for
    /// invariant checks.
    pub fn lru_ranks(&self, index: u32) -> Vec<u32> {
        self.sets[index as usize].iter().map(|l| l.lru).collect()
    }

    /// Number of sets.
    pub fn set_count(&self) -> u32 {
        self.sets.len() as u32
    }

    fn debug_assert_permutation(&self, index: u32) {
        if cfg!(debug_assertions) {
            let mut ranks = self.lru_ranks(index);
            ranks.sort_unstable();
            debug_assert!(
                ranks.iter().enumerate().all(|(i, &r)| r == i as u32),
                "LRU ranks of set {index} are not a permutation"
            );
        }
    }
}
