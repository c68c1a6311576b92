//! Fluxa AMM Core Protocol Constants
//!
//! This module defines the fundamental protocol parameters and boundaries that govern
//! the operation of the Fluxa AMM. These constants are crucial for maintaining protocol
//! security, economic stability, and operational functionality across all implementations.

/// The minimum tick index supported in the protocol.
///
/// Defines the lowest possible price representation in the system.
/// At this tick, the price is approximately `1.0001^(-887272)`.
pub const MIN_TICK: i32 = -887272;

/// The maximum tick index supported in the protocol.
///
/// Defines the highest possible price representation in the system.
/// At this tick, the price is approximately `1.0001^887272`.
pub const MAX_TICK: i32 = 887272;

/// The minimum √price limit for swaps, in Q64.96 fixed-point format.
///
/// Equal to `sqrtRatioAtTick(MIN_TICK)`. Fits in a `u128`; the matching
/// `MAX_SQRT_RATIO` does not (it needs the full 160-bit domain), so that one is a
/// function instead — see [`crate::math::tick_math::max_sqrt_ratio`].
pub const MIN_SQRT_RATIO: u128 = 4295128739;

/// Swap fees are denominated in hundredths of a bip: units of `1e-6`.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Number of fractional bits in a Q64.96 √price (used throughout `math/*.rs` to shift
/// between a plain integer and its Q64.96 fixed-point representation).
pub const RESOLUTION_SQRT_PRICE: u32 = 96;

/// Number of fractional bits in a Q128.128 fee-growth accumulator.
pub const RESOLUTION_FEE_GROWTH: u32 = 128;
