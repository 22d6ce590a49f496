//! # Nova Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Ship registry and world fixtures
//! - Benchmark scenarios

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
