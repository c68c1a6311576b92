//! Per-tick liquidity and fee-growth bookkeeping.
//!
//! Grounded on `pool_state.rs`'s free-standing `Tick` type (not the zero-copy
//! `TickData` above, whose doc comment notes "MVP Simplification: Skipping
//! fee_growth_outside_... and oracle fields") — `Tick::cross` already implements
//! the wrapping-subtract "outside" semantics this engine needs. This restates it
//! over `U256` fee-growth fields and folds in the `maxLiquidityPerTick`/
//! flip-on-zero-crossing bookkeeping `TickData::update_on_liquidity_change` had,
//! since both halves of the teacher are needed and neither alone is complete.
use crate::error::PoolError;
use primitive_types::U256;

/// The state Fluxa tracks for one initialized tick boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInfo {
    /// Sum of `|liquidityDelta|` over every position referencing this tick as
    /// either boundary. Garbage-collection counter: the tick is cleared once this
    /// returns to zero.
    pub liquidity_gross: u128,
    /// Sum of `liquidityDelta` over positions with this tick as their lower bound,
    /// minus the sum over positions with it as their upper bound. Added to (or
    /// subtracted from, depending on swap direction) `pool.liquidity` when the swap
    /// crosses this tick.
    pub liquidity_net: i128,
    /// Q128.128 fee-growth accumulators "outside" this tick, i.e. on the side away
    /// from the current price. Wrap modulo 2^256; every consumer subtracts against
    /// its own snapshot so the wrap is self-cancelling.
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
    pub initialized: bool,
}

impl TickInfo {
    /// Applies a liquidity change of `liquidity_delta` at this tick, used as either
    /// the lower (`is_upper = false`) or upper (`is_upper = true`) boundary of a
    /// position. Returns whether the tick's initialized state flipped (gross
    /// liquidity crossed zero in either direction), which the caller uses to flip
    /// the tick bitmap bit.
    ///
    /// On first initialization (`liquidity_gross` was zero before this call),
    /// `fee_growth_outside_{0,1}` is seeded with the pool's current global fee
    /// growth if `tick <= tick_current`, otherwise left at zero — per §4.5, this is
    /// what makes `cross`'s later wrapping-subtract correctly reflect "growth on the
    /// far side of this tick" from the moment it becomes relevant.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
        is_upper: bool,
        max_liquidity_per_tick: u128,
    ) -> Result<bool, PoolError> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = if liquidity_delta >= 0 {
            liquidity_gross_before
                .checked_add(liquidity_delta as u128)
                .ok_or(PoolError::LiquidityOverflow)?
        } else {
            liquidity_gross_before
                .checked_sub(liquidity_delta.unsigned_abs())
                .ok_or(PoolError::LiquidityUnderflow)?
        };

        if liquidity_gross_after > max_liquidity_per_tick {
            return Err(PoolError::LiquidityOverflow);
        }

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // First reference to this tick: seed the fee-growth-outside snapshot.
            if tick <= tick_current {
                self.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
                self.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
            }
            self.initialized = true;
        }

        self.liquidity_gross = liquidity_gross_after;
        self.liquidity_net = if is_upper {
            self.liquidity_net.checked_sub(liquidity_delta).ok_or(PoolError::LiquidityOverflow)?
        } else {
            self.liquidity_net.checked_add(liquidity_delta).ok_or(PoolError::LiquidityOverflow)?
        };

        Ok(flipped)
    }

    /// Clears this tick's state entirely once `liquidity_gross` has returned to
    /// zero. The bitmap bit is unset by the caller; this just drops the
    /// fee-growth snapshot so a future re-initialization starts clean.
    pub fn clear(&mut self) {
        *self = TickInfo::default();
    }

    /// Inverts the fee-growth-outside fields when a swap crosses this tick: the
    /// "outside" side flips from one side of the tick to the other, so each field
    /// becomes the global accumulator minus its previous value. Wrapping
    /// subtraction is required here — see the module's top-level doc comment.
    /// Returns `liquidity_net`, which the caller adds to (or subtracts from,
    /// depending on swap direction) the pool's active liquidity.
    pub fn cross(&mut self, fee_growth_global_0_x128: U256, fee_growth_global_1_x128: U256) -> i128 {
        self.fee_growth_outside_0_x128 =
            fee_growth_global_0_x128.overflowing_sub(self.fee_growth_outside_0_x128).0;
        self.fee_growth_outside_1_x128 =
            fee_growth_global_1_x128.overflowing_sub(self.fee_growth_outside_1_x128).0;
        self.liquidity_net
    }
}

/// Returns `(feeGrowthInside0, feeGrowthInside1)` for the range `[tick_lower,
/// tick_upper)`, given the two boundary ticks' current state and the pool's global
/// fee growth. All subtractions are wrapping modulo 2^256 — see §4.5.
pub fn get_fee_growth_inside(
    tick_lower: i32,
    lower: &TickInfo,
    tick_upper: i32,
    upper: &TickInfo,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let (fee_growth_below_0, fee_growth_below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.overflowing_sub(lower.fee_growth_outside_0_x128).0,
            fee_growth_global_1_x128.overflowing_sub(lower.fee_growth_outside_1_x128).0,
        )
    };

    let (fee_growth_above_0, fee_growth_above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.overflowing_sub(upper.fee_growth_outside_0_x128).0,
            fee_growth_global_1_x128.overflowing_sub(upper.fee_growth_outside_1_x128).0,
        )
    };

    (
        fee_growth_global_0_x128
            .overflowing_sub(fee_growth_below_0)
            .0
            .overflowing_sub(fee_growth_above_0)
            .0,
        fee_growth_global_1_x128
            .overflowing_sub(fee_growth_below_1)
            .0
            .overflowing_sub(fee_growth_above_1)
            .0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_flips_on_first_and_last_liquidity() {
        let mut tick = TickInfo::default();
        let flipped_on_init = tick.update(10, 0, 100, U256::zero(), U256::zero(), false, u128::MAX).unwrap();
        assert!(flipped_on_init);
        assert_eq!(tick.liquidity_gross, 100);
        assert_eq!(tick.liquidity_net, 100);

        let flipped_on_add = tick.update(10, 0, 50, U256::zero(), U256::zero(), false, u128::MAX).unwrap();
        assert!(!flipped_on_add);

        let flipped_on_remove =
            tick.update(10, 0, -150, U256::zero(), U256::zero(), false, u128::MAX).unwrap();
        assert!(flipped_on_remove);
        assert_eq!(tick.liquidity_gross, 0);
    }

    #[test]
    fn upper_boundary_negates_liquidity_net() {
        let mut tick = TickInfo::default();
        tick.update(10, 0, 100, U256::zero(), U256::zero(), true, u128::MAX).unwrap();
        assert_eq!(tick.liquidity_net, -100);
    }

    #[test]
    fn exceeding_max_liquidity_per_tick_fails() {
        let mut tick = TickInfo::default();
        let err = tick.update(10, 0, 100, U256::zero(), U256::zero(), false, 50).unwrap_err();
        assert_eq!(err, PoolError::LiquidityOverflow);
    }

    #[test]
    fn seeds_fee_growth_outside_only_when_at_or_below_current_tick() {
        let mut below = TickInfo::default();
        below.update(-10, 0, 100, U256::from(5u8), U256::from(7u8), false, u128::MAX).unwrap();
        assert_eq!(below.fee_growth_outside_0_x128, U256::from(5u8));

        let mut above = TickInfo::default();
        above.update(10, 0, 100, U256::from(5u8), U256::from(7u8), false, u128::MAX).unwrap();
        assert_eq!(above.fee_growth_outside_0_x128, U256::zero());
    }

    #[test]
    fn fee_growth_inside_sums_to_global_when_price_is_inside_range() {
        let lower = TickInfo { fee_growth_outside_0_x128: U256::from(3u8), ..Default::default() };
        let upper = TickInfo { fee_growth_outside_0_x128: U256::from(2u8), ..Default::default() };
        let global = U256::from(10u8);

        let (inside, _) = get_fee_growth_inside(-10, &lower, 10, &upper, 0, global, U256::zero());
        // below = lower.outside = 3 (tick_current >= lower), above = upper.outside = 2 (tick_current < upper)
        // inside = global - below - above = 10 - 3 - 2 = 5
        assert_eq!(inside, U256::from(5u8));
    }

    #[test]
    fn clear_resets_to_default() {
        let mut tick = TickInfo::default();
        tick.update(10, 0, 100, U256::from(5u8), U256::from(5u8), false, u128::MAX).unwrap();
        tick.clear();
        assert_eq!(tick.liquidity_gross, 0);
        assert!(!tick.initialized);
    }
}
