//! Address decomposition for one cache level.
//!
//! Every level splits a 32-bit request address into `{tag, index, offset}`
//! using bit widths fixed by its geometry, and reassembles `{tag, index}`
//! pairs back into block addresses when computing the sequential neighbors a
//! stream buffer should stage. Both directions are pure functions of the
//! geometry; the decoder holds no mutable state.

/// Width of a request address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Low `bits` set, as a `u32` (`bits` may be the full word width).
#[inline]
const fn low_mask(bits: u32) -> u32 {
    (((1u64) << bits) - 1) as u32
}

/// Decoded fields of one request address, relative to a level's geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddr {
    /// Tag bits (the address above index and offset).
    pub tag: u32,
    /// Set index within the level.
    pub index: u32,
    /// Byte offset within the block. Never compared; retained for dumps.
    pub offset: u32,
}

/// Splits addresses into `{tag, index, offset}` and reassembles block
/// addresses, with fixed bit widths derived from block size and set count.
#[derive(Clone, Copy, Debug)]
pub struct AddressDecoder {
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
    set_count: u32,
}

impl AddressDecoder {
    /// Builds a decoder for a level with `block_bytes`-byte blocks and
    /// `set_count` sets. Both must be non-zero powers of two (validated by
    /// the configuration layer before any decoder is constructed).
    pub fn new(block_bytes: u32, set_count: u32) -> Self {
        let offset_bits = block_bytes.trailing_zeros();
        let index_bits = set_count.trailing_zeros();
        Self {
            offset_bits,
            index_bits,
            tag_bits: ADDRESS_BITS - offset_bits - index_bits,
            set_count,
        }
    }

    /// Number of sets this decoder indexes.
    #[inline]
    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    /// Splits a raw address into its tag, set index, and block offset.
    #[inline]
    pub fn decode(&self, addr: u32) -> DecodedAddr {
        let offset = addr & low_mask(self.offset_bits);
        let index = (addr >> self.offset_bits) & low_mask(self.index_bits);
        let tag = (u64::from(addr) >> (self.offset_bits + self.index_bits)) as u32;
        DecodedAddr { tag, index, offset }
    }

    /// Block address (`(tag << index_bits) | index`, offset implicitly zero)
    /// for a possibly out-of-range `{tag, index}` pair.
    ///
    /// This is the inverse of [`decode`](Self::decode) used to name the
    /// sequential neighbors of a block (`reassemble(tag, index + k)`). The
    /// wraparound policy when a field overflows:
    /// - an overflowing index ripples its quotient into the tag and is
    ///   reduced by one set count, then modulo the set count again;
    /// - an overflowing tag is zeroed and the index is reduced by a further
    ///   set count (wrapping).
    pub fn reassemble(&self, tag: u32, index: u32) -> u32 {
        let mut tag = tag;
        let mut index = index;
        if index >= self.set_count {
            tag = tag.wrapping_add(index / self.set_count);
            index -= self.set_count;
        }
        if u64::from(tag) >= (1u64 << self.tag_bits) {
            tag = 0;
            index = index.wrapping_sub(self.set_count);
        }
        ((tag & low_mask(self.tag_bits)) << self.index_bits) | (index & low_mask(self.index_bits))
    }

    /// Block address of an already-decoded request.
    #[inline]
    pub fn block_addr(&self, d: &DecodedAddr) -> u32 {
        self.reassemble(d.tag, d.index)
    }
}
