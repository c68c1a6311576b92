//! One tick-range step of a swap.
//!
//! New module; grounded on `position_manager.rs`'s swap fee/amount bookkeeping (the
//! `fee_growth_global_{a,b}` accumulation and per-step amount tracking) and on
//! `pool_state.rs::Tick::cross`'s wrapping-subtract idiom, generalized from "whole
//! swap at once" to "one tick-range step, from the current √price toward a target,"
//! per §4.4.
use crate::constants::FEE_DENOMINATOR;
use crate::error::PoolError;
use crate::math::full_math::mul_div_rounding_up;
use crate::math::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use ethnum::I256;
use primitive_types::U256;

/// The result of moving the price across one step of a swap: the √price the step
/// actually reached, and the amounts consumed/produced along the way.
pub struct SwapStep {
    pub sqrt_ratio_next: U256,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee_amount: U256,
}

/// Consumes up to `amount_remaining` of a swap moving from `sqrt_ratio_current`
/// toward `sqrt_ratio_target`, at liquidity `liquidity` and fee `fee_pips` (parts
/// per million of input). `exact_in = amount_remaining >= 0`;
/// `zero_for_one = sqrt_ratio_current >= sqrt_ratio_target`.
///
/// Implements the five-step algorithm of §4.4: hypothetical full-step consumption,
/// clamping to whichever of `amount_remaining` or the full step is smaller, final
/// amount recomputation (reusing the specified side when the step completed), an
/// output cap for exact-output, and fee computed either as "whatever's left of the
/// input" (step didn't reach the target) or `ceil(amountIn * feePips / (1e6 -
/// feePips))` (step reached the target).
pub fn compute_swap_step(
    sqrt_ratio_current: U256,
    sqrt_ratio_target: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<SwapStep, PoolError> {
    let zero_for_one = sqrt_ratio_current >= sqrt_ratio_target;
    let exact_in = amount_remaining >= I256::ZERO;

    let sqrt_ratio_next;
    let mut amount_in = U256::zero();
    let mut amount_out = U256::zero();

    if exact_in {
        let amount_remaining_less_fee = mul_div_u256_from_i256(
            amount_remaining,
            U256::from(FEE_DENOMINATOR - fee_pips),
            U256::from(FEE_DENOMINATOR),
        )?;
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_ratio_target, sqrt_ratio_current, liquidity, true)?
        } else {
            get_amount1_delta(sqrt_ratio_current, sqrt_ratio_target, liquidity, true)?
        };

        if amount_remaining_less_fee >= amount_in {
            sqrt_ratio_next = sqrt_ratio_target;
        } else {
            sqrt_ratio_next = get_next_sqrt_price_from_input(
                sqrt_ratio_current,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?;
        }
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_ratio_target, sqrt_ratio_current, liquidity, false)?
        } else {
            get_amount0_delta(sqrt_ratio_current, sqrt_ratio_target, liquidity, false)?
        };

        let amount_remaining_magnitude = (-amount_remaining).as_u256();
        let amount_remaining_magnitude = ethnum_u256_to_primitive(amount_remaining_magnitude)?;

        if amount_remaining_magnitude >= amount_out {
            sqrt_ratio_next = sqrt_ratio_target;
        } else {
            sqrt_ratio_next = get_next_sqrt_price_from_output(
                sqrt_ratio_current,
                liquidity,
                amount_remaining_magnitude,
                zero_for_one,
            )?;
        }
    }

    let reached_target = sqrt_ratio_target == sqrt_ratio_next;

    // Final amounts: reuse the specified side's value when the step reached the
    // target exactly; otherwise recompute both against the step's actual endpoint.
    if zero_for_one {
        amount_in = if reached_target && exact_in {
            amount_in
        } else {
            get_amount0_delta(sqrt_ratio_next, sqrt_ratio_current, liquidity, true)?
        };
        amount_out = if reached_target && !exact_in {
            amount_out
        } else {
            get_amount1_delta(sqrt_ratio_next, sqrt_ratio_current, liquidity, false)?
        };
    } else {
        amount_in = if reached_target && exact_in {
            amount_in
        } else {
            get_amount1_delta(sqrt_ratio_current, sqrt_ratio_next, liquidity, true)?
        };
        amount_out = if reached_target && !exact_in {
            amount_out
        } else {
            get_amount0_delta(sqrt_ratio_current, sqrt_ratio_next, liquidity, false)?
        };
    }

    // Output cap: defends against off-by-one in rounded math for exact-output swaps.
    if !exact_in {
        let cap = ethnum_u256_to_primitive((-amount_remaining).as_u256())?;
        if amount_out > cap {
            amount_out = cap;
        }
    }

    let fee_amount = if exact_in && sqrt_ratio_next != sqrt_ratio_target {
        // Step didn't reach the target: whatever's left of amount_remaining becomes
        // the fee, so the user spends exactly the amount they specified.
        let remaining = ethnum_u256_to_primitive(amount_remaining.as_u256())?;
        remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, U256::from(fee_pips), U256::from(FEE_DENOMINATOR - fee_pips))?
    };

    Ok(SwapStep { sqrt_ratio_next, amount_in, amount_out, fee_amount })
}

/// `floor(amount_remaining * numerator / denominator)`, where `amount_remaining`
/// is known non-negative (the exact-in branch only calls this when `amount_remaining
/// >= 0`).
fn mul_div_u256_from_i256(amount_remaining: I256, numerator: U256, denominator: U256) -> Result<U256, PoolError> {
    let magnitude = ethnum_u256_to_primitive(amount_remaining.as_u256())?;
    crate::math::full_math::mul_div(magnitude, numerator, denominator)
}

fn ethnum_u256_to_primitive(x: ethnum::U256) -> Result<U256, PoolError> {
    let bytes = x.to_be_bytes();
    Ok(U256::from_big_endian(&bytes))
}
