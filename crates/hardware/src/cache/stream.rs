//! Stream-buffer prefetcher.
//!
//! A prefetch unit holds `stream_count` streams of `stream_depth` block
//! addresses each. Streams carry their own LRU ranks, permutation-style
//! like the cache sets. A stream is (re)filled with the `stream_depth`
//! blocks that sequentially follow the block being accessed; every slot
//! filled counts as one issued prefetch and one unit of memory traffic.

use crate::common::addr::{AddressDecoder, DecodedAddr};

#[derive(Clone, Debug)]
struct PrefetchStream {
    valid: bool,
    lru: u32,
    blocks: Vec<u32>,
}

/// A bank of sequential stream buffers in front of one cache level.
#[derive(Debug)]
pub struct StreamBufferPrefetcher {
    decoder: AddressDecoder,
    streams: Vec<PrefetchStream>,
    depth: u32,
}

impl StreamBufferPrefetcher {
    /// Builds a prefetcher with `stream_count` streams of `depth` blocks.
    /// Either dimension being zero yields a disabled unit.
    pub fn new(decoder: AddressDecoder, stream_count: u32, depth: u32) -> Self {
        let (streams, depth) = if stream_count == 0 || depth == 0 {
            (Vec::new(), 0)
        } else {
            let streams = (0..stream_count)
                .map(|i| PrefetchStream {
                    valid: false,
                    lru: i,
                    blocks: vec![0; depth as usize],
                })
                .collect();
            (streams, depth)
        };
        Self {
            decoder,
            streams,
            depth,
        }
    }

    /// Whether this unit participates in lookups at all.
    pub fn enabled(&self) -> bool {
        !self.streams.is_empty()
    }

    /// True unless some valid stream holds `block`. Invalid streams are
    /// never consulted, whatever their slots contain.
    pub fn is_miss(&self, block: u32) -> bool {
        !self
            .streams
            .iter()
            .any(|s| s.valid && s.blocks.contains(&block))
    }

    /// Stream indices ordered by LRU rank, most recent first.
    fn lru_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.streams.len()).collect();
        order.sort_unstable_by_key(|&i| self.streams[i].lru);
        order
    }

    /// Reacts to a demand access that reached this unit, steering streams
    /// and returning the number of block fetches issued.
    ///
    /// Streams are walked most-recent-first twice in lockstep per step of
    /// the walk: first looking for an invalid stream to allocate (issuing a
    /// full refill of `depth` blocks), then for a valid stream holding the
    /// accessed block (issuing one fetch per slot at or before the match,
    /// then refilling the whole stream and promoting it). If the walk ends
    /// with neither, the stream at rank `stream_count - 1` is replaced
    /// wholesale, again issuing `depth` fetches.
    pub fn record_access(&mut self, d: &DecodedAddr) -> u64 {
        if !self.enabled() {
            return 0;
        }
        let block = self.decoder.block_addr(d);
        let order = self.lru_order();
        for &idx in &order {
            if !self.streams[idx].valid {
                self.refill(idx, d);
                self.streams[idx].valid = true;
                self.touch_lru(Some(idx), block);
                return u64::from(self.depth);
            }
            if let Some(offset) = self.streams[idx].blocks.iter().position(|&b| b == block) {
                let issued = offset as u64 + 1;
                self.refill(idx, d);
                self.touch_lru(Some(idx), block);
                return issued;
            }
        }
        // No free stream and no match: displace the LRU stream.
        let victim = order.last().copied().unwrap_or(0);
        self.refill(victim, d);
        self.streams[victim].valid = true;
        self.touch_lru(Some(victim), block);
        u64::from(self.depth)
    }

    /// Overwrites a stream with the `depth` blocks following `d`. Slot `k`
    /// receives the reassembled address of `(tag, index + 1 + k)`, with
    /// index wraparound carrying into the tag.
    fn refill(&mut self, idx: usize, d: &DecodedAddr) {
        for k in 0..self.depth {
            let next = self.decoder.reassemble(d.tag, d.index + 1 + k);
            self.streams[idx].blocks[k as usize] = next;
        }
    }

    /// Promotes a stream to rank 0. When no stream reference is given, the
    /// pivot is found by content: the first stream (by slot position) whose
    /// head slot equals `head_block`, its slot position standing in for a
    /// rank. Falls back to demoting everything below the bottom rank when
    /// nothing matches.
    pub fn touch_lru(&mut self, reference: Option<usize>, head_block: u32) {
        let pivot = match reference {
            Some(idx) => self.streams[idx].lru,
            None => self
                .streams
                .iter()
                .position(|s| s.valid && s.blocks.first() == Some(&head_block))
                .map_or_else(|| self.streams.len() as u32 - 1, |pos| pos as u32),
        };
        for s in &mut self.streams {
            if s.lru < pivot {
                s.lru += 1;
            } else if s.lru == pivot {
                s.lru = 0;
            }
        }
    }

    /// Valid streams in LRU order, most recent first, each as its full
    /// block list. Used for the final contents dump.
    pub fn contents(&self) -> Vec<Vec<u32>> {
        self.lru_order()
            .into_iter()
            .filter_map(|idx| {
                let s = &self.streams[idx];
                s.valid.then(|| s.blocks.clone())
            })
            .collect()
    }
}
