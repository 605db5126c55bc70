//! Common building blocks shared across the simulator.
//!
//! This module provides the pieces every level of the hierarchy depends on:
//! 1. **Address decomposition:** Tag/index/offset splitting and block-address
//!    reassembly, parameterized per cache geometry.
//! 2. **Error taxonomy:** Construction-time configuration errors and fatal
//!    trace-input errors.

/// Address decomposition and reassembly.
pub mod addr;

/// Error types for configuration and trace input.
pub mod error;

pub use addr::{AddressDecoder, DecodedAddr};
pub use error::{ConfigError, TraceError};
