//! √price math: amount deltas between two √prices, and the next √price reached by
//! adding a given input or output amount.
//!
//! Not present in the MVP teacher — its own "MVP Simplification" comments extend
//! implicitly to this subsystem too: `pool_state.rs::calculate_token_amounts`
//! computes amount deltas inline with `mul_fixed`/`div_fixed` rather than through a
//! named module. This factors that inline logic into the four functions below, on
//! `full_math::mul_div{,_rounding_up}`, each with its own documented rounding
//! contract (the inline teacher version had none), matching the *shape* of
//! `calculate_token_amounts` — branch on where the current tick sits relative to the
//! position range — from §4.3/§4.8 of the spec this crate implements.
use crate::constants::RESOLUTION_SQRT_PRICE;
use crate::error::PoolError;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use primitive_types::U256;

fn q96() -> U256 {
    U256::one() << RESOLUTION_SQRT_PRICE
}

/// `L * (sqrtB - sqrtA) * 2^96 / (sqrtA * sqrtB)`, with `sqrtA <= sqrtB`. Computed in
/// the two-step form `mulDiv(L << 96, sqrtB - sqrtA, sqrtB) / sqrtA` so the product
/// `sqrtA * sqrtB` is never materialized outside the 512-bit intermediate `mulDiv`
/// already widens into.
///
/// Rounds up when `round_up`, matching the teacher's own
/// `get_amount_0_delta(..., round_up: bool)` contract, restated over Q64.96/`U256`
/// instead of Q64.64/`u128`.
pub fn get_amount0_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, PoolError> {
    let (sqrt_lower, sqrt_upper) = order(sqrt_ratio_a, sqrt_ratio_b);
    if sqrt_lower.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    let numerator1 = U256::from(liquidity) << RESOLUTION_SQRT_PRICE;
    let numerator2 = sqrt_upper - sqrt_lower;

    if round_up {
        let inner = mul_div_rounding_up(numerator1, numerator2, sqrt_upper)?;
        super::full_math::div_rounding_up(inner, sqrt_lower)
    } else {
        let inner = mul_div(numerator1, numerator2, sqrt_upper)?;
        Ok(inner / sqrt_lower)
    }
}

/// `L * (sqrtB - sqrtA) / 2^96`, with `sqrtA <= sqrtB`.
pub fn get_amount1_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, PoolError> {
    let (sqrt_lower, sqrt_upper) = order(sqrt_ratio_a, sqrt_ratio_b);
    let numerator = U256::from(liquidity) * (sqrt_upper - sqrt_lower);

    if round_up {
        super::full_math::div_rounding_up(numerator, q96())
    } else {
        Ok(numerator / q96())
    }
}

fn order(a: U256, b: U256) -> (U256, U256) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Signed form of [`get_amount0_delta`]: rounds up when `liquidity >= 0`, down when
/// `liquidity < 0`, and returns the signed magnitude (positive = pool receives token0,
/// negative = pool pays it out).
pub fn get_amount0_delta_signed(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: i128,
) -> Result<ethnum::I256, PoolError> {
    let magnitude = get_amount0_delta(sqrt_ratio_a, sqrt_ratio_b, liquidity.unsigned_abs(), liquidity >= 0)?;
    to_signed(magnitude, liquidity >= 0)
}

/// Signed form of [`get_amount1_delta`].
pub fn get_amount1_delta_signed(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: i128,
) -> Result<ethnum::I256, PoolError> {
    let magnitude = get_amount1_delta(sqrt_ratio_a, sqrt_ratio_b, liquidity.unsigned_abs(), liquidity >= 0)?;
    to_signed(magnitude, liquidity >= 0)
}

fn to_signed(magnitude: U256, positive: bool) -> Result<ethnum::I256, PoolError> {
    let mut bytes = [0u8; 32];
    magnitude.to_big_endian(&mut bytes);
    let unsigned = ethnum::U256::from_be_bytes(bytes);
    if unsigned > ethnum::I256::MAX.as_u256() {
        return Err(PoolError::MathOverflow);
    }
    let value = unsigned.as_i256();
    Ok(if positive { value } else { -value })
}

/// The next √price reached by adding `amount_in` of token0 (if `zero_for_one`) or
/// token1 (otherwise) to the pool.
///
/// For token0 in (price moves down): `sqrtNext = L * sqrtP * 2^96 / (L * 2^96 +
/// amountIn * sqrtP)`, rounding up — a larger `sqrtNext` understates how far the
/// price actually moved, which keeps the pool's promised output a conservative lower
/// bound (see §4.3's rounding-direction rationale).
/// For token1 in (price moves up): `sqrtNext = sqrtP + amountIn * 2^96 / L`,
/// rounding down for the same reason in the opposite direction.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, PoolError> {
    if sqrt_price.is_zero() || liquidity == 0 {
        return Err(PoolError::MathOverflow);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
    }
}

/// Dual of [`get_next_sqrt_price_from_input`] for exact-output swaps: the √price
/// reached by removing `amount_out` of token1 (if `zero_for_one`) or token0
/// (otherwise) from the pool. Fails [`PoolError::MathOverflow`] if a required
/// intermediate does not fit — callers clamp at the relevant protocol boundary
/// instead of propagating the failure as a user-visible error (§4.3).
pub fn get_next_sqrt_price_from_output(
    sqrt_price: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, PoolError> {
    if sqrt_price.is_zero() || liquidity == 0 {
        return Err(PoolError::MathOverflow);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
    }
}

fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, PoolError> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }
    let numerator1 = U256::from(liquidity) << RESOLUTION_SQRT_PRICE;

    if add {
        let product = amount.checked_mul(sqrt_price).ok_or(PoolError::MathOverflow)?;
        let denominator = numerator1.checked_add(product).ok_or(PoolError::MathOverflow)?;
        mul_div_rounding_up(numerator1, sqrt_price, denominator)
    } else {
        let product = amount.checked_mul(sqrt_price).ok_or(PoolError::MathOverflow)?;
        if numerator1 <= product {
            return Err(PoolError::MathOverflow);
        }
        let denominator = numerator1 - product;
        mul_div_rounding_up(numerator1, sqrt_price, denominator)
    }
}

fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, PoolError> {
    if add {
        let quotient = if amount <= U256::from(u128::MAX) {
            (amount << RESOLUTION_SQRT_PRICE) / U256::from(liquidity)
        } else {
            mul_div(amount, U256::one() << RESOLUTION_SQRT_PRICE, U256::from(liquidity))?
        };
        sqrt_price.checked_add(quotient).ok_or(PoolError::MathOverflow)
    } else {
        let quotient = super::full_math::div_rounding_up(amount << RESOLUTION_SQRT_PRICE, U256::from(liquidity))?;
        if sqrt_price <= quotient {
            return Err(PoolError::MathOverflow);
        }
        Ok(sqrt_price - quotient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount0_delta_is_zero_at_equal_price() {
        let p = U256::one() << 96;
        assert_eq!(get_amount0_delta(p, p, 1_000_000, true).unwrap(), U256::zero());
        assert_eq!(get_amount0_delta(p, p, 1_000_000, false).unwrap(), U256::zero());
    }

    #[test]
    fn amount1_delta_matches_hand_computed_value() {
        // sqrtA = 1<<96 (price 1.0), sqrtB = 2<<96 (price 4.0), L = 1<<96.
        // amount1 = L*(sqrtB-sqrtA)/2^96 = (1<<96)*(1<<96)/(1<<96) = 1<<96.
        let sqrt_a = U256::one() << 96;
        let sqrt_b = U256::from(2u8) << 96;
        let l = 1u128 << 96;
        let amount1 = get_amount1_delta(sqrt_a, sqrt_b, l, false).unwrap();
        assert_eq!(amount1, U256::one() << 96);
    }

    #[test]
    fn round_up_never_produces_less_than_round_down() {
        let sqrt_a = U256::one() << 96;
        let sqrt_b = sqrt_a + U256::from(12345u64);
        let l = 7_654_321u128;
        let down = get_amount0_delta(sqrt_a, sqrt_b, l, false).unwrap();
        let up = get_amount0_delta(sqrt_a, sqrt_b, l, true).unwrap();
        assert!(up >= down);
    }

    #[test]
    fn next_sqrt_price_from_input_moves_price_in_expected_direction() {
        let sqrt_price = U256::one() << 96;
        let liquidity = 10u128.pow(18);
        let amount_in = U256::from(1_000_000u64);

        let down = get_next_sqrt_price_from_input(sqrt_price, liquidity, amount_in, true).unwrap();
        assert!(down <= sqrt_price);

        let up = get_next_sqrt_price_from_input(sqrt_price, liquidity, amount_in, false).unwrap();
        assert!(up >= sqrt_price);
    }
}
