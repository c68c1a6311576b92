//! Fixed-point arithmetic for the Fluxa AMM core.
//!
//! Every price/amount conversion in the engine depends on a faithful 512-bit
//! intermediate product. [`full_math`] is the only module allowed to see raw
//! 512-bit magnitudes; everything above it composes `mul_div`/`mul_div_rounding_up`
//! instead of reaching for a wider integer type itself.
pub mod full_math;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;
