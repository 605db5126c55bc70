//! Configuration Tests.
//!
//! Covers defaults, JSON deserialization with partial fields, derived
//! set counts, and every geometry rejection.

use cachesim_core::common::error::ConfigError;
use cachesim_core::config::{LevelConfig, SimConfig};

#[test]
fn test_config_default() {
    let config = SimConfig::default();
    assert_eq!(config.block_bytes, 32);
    assert_eq!(config.l1.size_bytes, 8192);
    assert_eq!(config.l1.assoc, 4);
    assert_eq!(config.l2.size_bytes, 0);
    assert_eq!(config.l1.stream_count, 0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_json_partial_fields() {
    let config = SimConfig::from_json(
        r#"{
            "block_bytes": 16,
            "l1": { "size_bytes": 1024, "assoc": 2 },
            "l2": { "size_bytes": 8192, "assoc": 4, "stream_count": 3, "stream_depth": 4 }
        }"#,
    )
    .expect("valid json");
    assert_eq!(config.block_bytes, 16);
    assert_eq!(config.l1.size_bytes, 1024);
    assert_eq!(config.l1.stream_count, 0);
    assert_eq!(config.l2.stream_count, 3);
    assert_eq!(config.l2.stream_depth, 4);
    assert!(config.validate().is_ok());
}

#[test]
fn test_set_count_derivation() {
    let level = LevelConfig {
        size_bytes: 1024,
        assoc: 2,
        stream_count: 0,
        stream_depth: 0,
    };
    assert_eq!(level.set_count(16), 32);
    assert_eq!(LevelConfig::default().set_count(16), 0);
}

#[test]
fn test_rejects_non_power_of_two_block() {
    let config = SimConfig {
        block_bytes: 24,
        ..SimConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::BlockSizeNotPowerOfTwo(24))
    );
}

#[test]
fn test_rejects_sized_level_with_zero_assoc() {
    let mut config = SimConfig::default();
    config.l1.assoc = 0;
    assert_eq!(
        config.validate(),
        Err(ConfigError::ZeroAssociativity {
            level: "L1",
            size: 8192,
        })
    );
}

#[test]
fn test_rejects_indivisible_size() {
    let mut config = SimConfig::default();
    config.l2 = LevelConfig {
        size_bytes: 1000,
        assoc: 2,
        stream_count: 0,
        stream_depth: 0,
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::GeometryMismatch {
            level: "L2",
            size: 1000,
            assoc: 2,
            block: 32,
        })
    );
}

#[test]
fn test_rejects_non_power_of_two_set_count() {
    let config = SimConfig {
        block_bytes: 16,
        l1: LevelConfig {
            size_bytes: 48,
            assoc: 1,
            stream_count: 0,
            stream_depth: 0,
        },
        l2: LevelConfig::default(),
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::SetCountNotPowerOfTwo {
            level: "L1",
            sets: 3,
        })
    );
}

#[test]
fn test_absent_level_skips_geometry_checks() {
    // Zero size marks the level absent; its other fields are ignored.
    let mut config = SimConfig::default();
    config.l2 = LevelConfig {
        size_bytes: 0,
        assoc: 0,
        stream_count: 7,
        stream_depth: 0,
    };
    assert!(config.validate().is_ok());
}
