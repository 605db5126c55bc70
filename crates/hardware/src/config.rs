//! Configuration for the cache hierarchy simulator.
//!
//! This module defines the geometry of both cache levels and their stream
//! buffers. It provides:
//! 1. **Defaults:** Baseline geometry used when a field is omitted.
//! 2. **Structures:** `SimConfig` (shared block size plus both levels) and
//!    `LevelConfig` (one level's size, associativity, and stream buffers).
//! 3. **Validation:** Power-of-two and divisibility checks performed before
//!    any level is constructed, per the construction-time error contract.
//!
//! Configuration is supplied as JSON (`SimConfig::from_json`) or assembled
//! directly by the CLI from positional arguments.

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default geometry constants used when fields are omitted.
mod defaults {
    /// Default block size in bytes, shared by both levels.
    pub const BLOCK_BYTES: u32 = 32;

    /// Default L1 total size in bytes (8 KiB).
    pub const L1_SIZE: u32 = 8192;

    /// Default L1 associativity.
    pub const L1_ASSOC: u32 = 4;
}

/// Root configuration: one shared block size plus both level geometries.
///
/// A `size_bytes` of zero marks a level absent: L2 is normally the level
/// disabled this way, while a zero-size L1 only appears in degenerate test
/// configurations.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::SimConfig;
///
/// let json = r#"{
///     "block_bytes": 16,
///     "l1": { "size_bytes": 1024, "assoc": 2 },
///     "l2": { "size_bytes": 8192, "assoc": 4,
///             "stream_count": 4, "stream_depth": 4 }
/// }"#;
/// let config = SimConfig::from_json(json).unwrap();
/// assert_eq!(config.block_bytes, 16);
/// assert_eq!(config.l2.stream_count, 4);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimConfig {
    /// Block size in bytes, shared by both levels. Power of two.
    #[serde(default = "SimConfig::default_block_bytes")]
    pub block_bytes: u32,

    /// L1 geometry.
    #[serde(default = "LevelConfig::default_l1")]
    pub l1: LevelConfig,

    /// L2 geometry. Absent (all zero) by default.
    #[serde(default)]
    pub l2: LevelConfig,
}

impl SimConfig {
    /// Returns the default shared block size in bytes.
    fn default_block_bytes() -> u32 {
        defaults::BLOCK_BYTES
    }

    /// Deserializes a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed documents.
    /// Geometry is *not* checked here; call [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks the geometry invariants of both levels.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: non-power-of-two block size,
    /// a sized level with zero associativity, size not divisible into sets,
    /// or a derived set count that is not a power of two.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_bytes == 0 || !self.block_bytes.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(self.block_bytes));
        }
        self.l1.validate("L1", self.block_bytes)?;
        self.l2.validate("L2", self.block_bytes)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            block_bytes: defaults::BLOCK_BYTES,
            l1: LevelConfig::default_l1(),
            l2: LevelConfig::default(),
        }
    }
}

/// Geometry of one cache level and its stream-buffer prefetcher.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LevelConfig {
    /// Total size in bytes. Zero marks the level absent.
    #[serde(default)]
    pub size_bytes: u32,

    /// Associativity (ways per set).
    #[serde(default)]
    pub assoc: u32,

    /// Stream-buffer count (N). Zero disables prefetching at this level.
    #[serde(default)]
    pub stream_count: u32,

    /// Blocks staged per stream (M).
    #[serde(default)]
    pub stream_depth: u32,
}

impl LevelConfig {
    /// Returns the default L1 geometry.
    fn default_l1() -> Self {
        Self {
            size_bytes: defaults::L1_SIZE,
            assoc: defaults::L1_ASSOC,
            stream_count: 0,
            stream_depth: 0,
        }
    }

    /// Derived set count (`size / (assoc * block)`); zero for absent levels.
    pub fn set_count(&self, block_bytes: u32) -> u32 {
        if self.size_bytes == 0 {
            0
        } else {
            self.size_bytes / (self.assoc * block_bytes)
        }
    }

    /// Checks this level's geometry against the shared block size.
    pub(crate) fn validate(&self, level: &'static str, block_bytes: u32) -> Result<(), ConfigError> {
        if self.size_bytes == 0 {
            return Ok(());
        }
        if self.assoc == 0 {
            return Err(ConfigError::ZeroAssociativity {
                level,
                size: self.size_bytes,
            });
        }
        let way_bytes = self.assoc * block_bytes;
        if self.size_bytes % way_bytes != 0 {
            return Err(ConfigError::GeometryMismatch {
                level,
                size: self.size_bytes,
                assoc: self.assoc,
                block: block_bytes,
            });
        }
        let sets = self.size_bytes / way_bytes;
        if !sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo { level, sets });
        }
        Ok(())
    }
}
