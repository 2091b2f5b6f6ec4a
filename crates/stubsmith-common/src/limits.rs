//! Centralized limits for the stub synthesis engine.
//!
//! Snapshots come from an external host and are not trusted to be acyclic or
//! shallow. Every recursive walk in the solver and the renderer is bounded by
//! one of these constants.

/// Maximum depth for generic type instantiation.
///
/// `instantiate_type` returns its input unchanged once this depth is
/// exceeded. Real signatures never come close; a hit indicates a malformed
/// self-referential snapshot.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum number of base-type links walked from a target type.
///
/// Bounds the abstract chain walk when a host hands over a cyclic base
/// graph (`class A : B`, `class B : A`).
pub const MAX_BASE_CHAIN_DEPTH: usize = 64;

/// Maximum number of `overridden` links followed for a single member.
///
/// Used by satisfaction propagation and by modifier restoration along the
/// virtual chain.
pub const MAX_OVERRIDE_CHAIN_DEPTH: usize = 64;

/// Maximum nesting depth when rendering a type as text.
pub const MAX_DISPLAY_DEPTH: u32 = 32;
