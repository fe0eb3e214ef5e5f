//! # Nav Test Utilities
//!
//! Shared testing utilities for the navigation crates:
//! - Determinism test harness
//! - World fixture builders
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
