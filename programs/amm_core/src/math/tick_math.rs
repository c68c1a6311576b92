//! Tick ↔ √price conversion.
//!
//! Replaces the teacher's `tick_to_sqrt_price_q64`/`sqrt_price_q64_to_tick` (a
//! `binary_pow` over a 20-entry table of Q64.64 powers of `sqrt(1.0001)`, inverted
//! for negative ticks) with the Q64.96-domain equivalent this engine's wider
//! fixed-point format requires: a 20-entry table of Q128.128 factors, one per bit of
//! `|tick|` (`MAX_TICK < 2^20`, so bits 0..19 cover the full domain).
use crate::constants::{RESOLUTION_FEE_GROWTH, RESOLUTION_SQRT_PRICE};
use crate::error::PoolError;
use primitive_types::U256;

/// One factor per bit of `|tick|`, each `sqrt(1.0001)^(2^i)` in Q128.128, i.e.
/// scaled by `2^128`. Selected by the bits of `abs_tick` and folded together with a
/// running `>> 128` after each multiply, mirroring the teacher's `binary_pow` shape
/// one width class up (Q64.64 doubling -> Q128.128 doubling).
const FACTORS: [u128; 20] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x09aa508b5b7a84e1c677de54f3e99bc9,
    0x005d6af8dedb81196699c329225ee604,
    0x0002216e584f5fa1ea926041bedfe98,
    0x0000048a170391f7dc42444e8fa2,
];

/// `MAX_SQRT_RATIO = sqrtRatioAtTick(MAX_TICK)`. A function rather than a constant
/// like [`crate::constants::MIN_SQRT_RATIO`] because it does not fit in a `u128` —
/// it needs the full 160-bit domain (see `constants.rs`'s doc comment on
/// `MIN_SQRT_RATIO`).
pub fn max_sqrt_ratio() -> U256 {
    U256::from_dec_str("1461446703485210103287273052203988822378723970342")
        .expect("MAX_SQRT_RATIO literal is a valid decimal string")
}

pub fn min_sqrt_ratio() -> U256 {
    U256::from(crate::constants::MIN_SQRT_RATIO)
}

/// Returns the Q64.96 √price `ceil(sqrt(1.0001^tick) * 2^96)` for `tick` in
/// `[MIN_TICK, MAX_TICK]`.
///
/// Built by multiplying together the `FACTORS` entries selected by the set bits of
/// `|tick|` (each a Q128.128 number, folded with a `>> 128` after every multiply so
/// the running product stays a Q128.128 value throughout), inverting via
/// `U256::MAX / ratio` when `tick` is negative, then narrowing from Q128.128 to
/// Q64.96 with a round-up bias (`>> 32` plus one if any of the dropped bits were
/// set) so the result is always an upper bound on the true value.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, PoolError> {
    use crate::constants::{MAX_TICK, MIN_TICK};

    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PoolError::TickOutOfRange);
    }

    let abs_tick = tick.unsigned_abs();

    let mut ratio: U256 = if abs_tick & 0x1 != 0 {
        U256::from(FACTORS[0])
    } else {
        U256::one() << RESOLUTION_FEE_GROWTH
    };

    for (i, factor) in FACTORS.iter().enumerate().skip(1) {
        if abs_tick & (1u32 << i) != 0 {
            ratio = (ratio * U256::from(*factor)) >> RESOLUTION_FEE_GROWTH;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Narrow Q128.128 -> Q64.96, rounding up so the result is `ceil(... * 2^96)`.
    let narrowing_shift = RESOLUTION_FEE_GROWTH - RESOLUTION_SQRT_PRICE;
    let shifted = ratio >> narrowing_shift;
    let remainder = ratio - (shifted << narrowing_shift);
    let sqrt_price = if remainder.is_zero() { shifted } else { shifted + U256::one() };

    Ok(sqrt_price)
}

/// Returns the unique `tick` such that `sqrt_ratio_at_tick(tick) <= sqrt_price_x96 <
/// sqrt_ratio_at_tick(tick + 1)`, for `sqrt_price_x96` in
/// `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
///
/// `sqrt_ratio_at_tick` is strictly monotone in `tick` (invariant 6, §8), so the
/// inverse is found by binary search over `[MIN_TICK, MAX_TICK]` rather than by
/// porting the teacher's Babylonian-sqrt inverse (which cannot give the exact floor
/// semantics this contract demands at domain boundaries) or a hand-rolled bit-scan
/// inverse (which cannot be checked against a reference without running the
/// toolchain). This is the same shape as the teacher's own
/// `price_math::optimized_binary_search`, widened from a ±10-tick local refinement
/// window to the full domain since there is no coarse lookup table for the Q64.96
/// factors above.
pub fn tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, PoolError> {
    use crate::constants::{MAX_TICK, MIN_TICK};

    if sqrt_price_x96 < min_sqrt_ratio() || sqrt_price_x96 >= max_sqrt_ratio() {
        return Err(PoolError::SqrtPriceOutOfRange);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    // Invariant: sqrt_ratio_at_tick(low) <= sqrt_price_x96 <= sqrt_ratio_at_tick(high).
    while low < high {
        // Bias the midpoint up so `low == high - 1` still makes progress.
        let mid = low + (high - low + 1) / 2;
        let mid_ratio = sqrt_ratio_at_tick(mid)?;
        if mid_ratio <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bounds_match_published_constants() {
        assert_eq!(sqrt_ratio_at_tick(crate::constants::MIN_TICK).unwrap(), min_sqrt_ratio());
        assert_eq!(sqrt_ratio_at_tick(crate::constants::MAX_TICK).unwrap(), max_sqrt_ratio());
    }

    #[test]
    fn zero_tick_is_unity() {
        // sqrt(1.0001^0) * 2^96 == 2^96 exactly.
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), U256::one() << 96);
    }

    #[test]
    fn out_of_range_ticks_are_rejected() {
        assert_eq!(
            sqrt_ratio_at_tick(crate::constants::MAX_TICK + 1).unwrap_err(),
            PoolError::TickOutOfRange
        );
        assert_eq!(
            sqrt_ratio_at_tick(crate::constants::MIN_TICK - 1).unwrap_err(),
            PoolError::TickOutOfRange
        );
    }

    #[test]
    fn is_strictly_monotone_spot_check() {
        let ticks = [-887272, -10000, -100, -1, 0, 1, 100, 10000, 887272];
        let mut prev = None;
        for t in ticks {
            let r = sqrt_ratio_at_tick(t).unwrap();
            if let Some(p) = prev {
                assert!(r > p, "sqrt_ratio_at_tick must be strictly increasing");
            }
            prev = Some(r);
        }
    }

    proptest! {
        #[test]
        fn round_trip_tick_to_sqrt_to_tick(tick in -887272i32..=887272i32) {
            let ratio = sqrt_ratio_at_tick(tick).unwrap();
            prop_assert_eq!(tick_at_sqrt_ratio(ratio).unwrap(), tick);
        }

        #[test]
        fn monotone_on_random_pairs(a in -887272i32..=887272i32, b in -887272i32..=887272i32) {
            let ra = sqrt_ratio_at_tick(a).unwrap();
            let rb = sqrt_ratio_at_tick(b).unwrap();
            match a.cmp(&b) {
                std::cmp::Ordering::Less => prop_assert!(ra < rb),
                std::cmp::Ordering::Equal => prop_assert_eq!(ra, rb),
                std::cmp::Ordering::Greater => prop_assert!(ra > rb),
            }
        }
    }
}
