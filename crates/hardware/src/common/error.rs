//! Error taxonomy for the simulator.
//!
//! Two fatal families exist, matching the two external inputs:
//! 1. **`ConfigError`:** Invalid cache geometry, detected at construction,
//!    before any request is replayed.
//! 2. **`TraceError`:** A malformed trace record (or trace I/O failure);
//!    aborts the replay immediately with no partial-statistics guarantee.
//!
//! Everything else is a total function over a validated configuration.
//! Internal inconsistencies (an LRU rank set losing its permutation
//! property) are programming defects guarded by debug assertions, not
//! modeled failures.

use thiserror::Error;

/// Invalid cache geometry, rejected before any level is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Block size must be a non-zero power of two.
    #[error("block size {0} is not a power of two")]
    BlockSizeNotPowerOfTwo(u32),

    /// A non-empty level needs a non-zero associativity.
    #[error("{level} has size {size} but zero associativity")]
    ZeroAssociativity {
        /// Level name ("L1" or "L2").
        level: &'static str,
        /// Configured total size in bytes.
        size: u32,
    },

    /// Total size must divide evenly into `assoc`-way sets of blocks.
    #[error("{level} size {size} does not divide into {assoc}-way sets of {block}-byte blocks")]
    GeometryMismatch {
        /// Level name ("L1" or "L2").
        level: &'static str,
        /// Configured total size in bytes.
        size: u32,
        /// Configured associativity.
        assoc: u32,
        /// Block size in bytes.
        block: u32,
    },

    /// The derived set count must be a power of two for index extraction.
    #[error("{level} derived set count {sets} is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Level name ("L1" or "L2").
        level: &'static str,
        /// Derived set count.
        sets: u32,
    },
}

/// Fatal trace-input errors. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Operation code was neither `r` nor `w`.
    #[error("trace line {line}: unknown request type {op:?}")]
    UnknownOp {
        /// 1-based trace line number.
        line: usize,
        /// The offending operation token.
        op: String,
    },

    /// Address field did not parse as a hexadecimal 32-bit value.
    #[error("trace line {line}: malformed address {text:?}")]
    BadAddress {
        /// 1-based trace line number.
        line: usize,
        /// The offending address token.
        text: String,
    },

    /// Line held an operation code but no address.
    #[error("trace line {line}: missing address field")]
    MissingAddress {
        /// 1-based trace line number.
        line: usize,
    },

    /// Underlying reader failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
