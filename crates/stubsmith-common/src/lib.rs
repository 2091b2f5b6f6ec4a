//! Common types and utilities for the stubsmith code fix engine.
//!
//! This crate provides foundational types used across all stubsmith crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Source spans (`ByteSpan`)
//! - Engine limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::ByteSpan;

// Centralized limits and thresholds
pub mod limits;
