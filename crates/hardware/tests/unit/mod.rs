//! # Unit Components
//!
//! This module is the hub for the simulator's unit tests, one file per
//! component of the model.


/// Configuration defaults, JSON deserialization, and geometry validation.
pub mod config;

/// The cross-level decision tree and counter attribution.
pub mod hierarchy;




/// Trace line parsing.
pub mod trace;
