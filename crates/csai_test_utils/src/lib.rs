//! # CSAI Test Utilities
//!
//! Shared testing utilities for all crates:
//! - An in-memory fake host implementing `AiCallback`
//! - Standard ARM unit definitions
//! - Determinism harness for order logs
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
