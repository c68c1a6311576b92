//! Per-owner, per-range liquidity positions.
//!
//! Grounded on `position.rs`'s `PositionData` (whose doc comment notes the MVP
//! omits "fee growth snapshots, and owed tokens... for simplification") extended
//! with `position_manager.rs`'s fee-accrual update (`fee_growth_delta =
//! fee_growth_global.wrapping_sub(position.fee_growth_inside)`, `tokens_owed +=
//! liquidity * fee_growth_delta / Q64`, `saturating_add` into the owed balance) —
//! restated over the Q128.128 `U256` fee-growth domain this engine uses instead of
//! the teacher's Q64.64 `u128`.
use crate::constants::RESOLUTION_FEE_GROWTH;
use crate::error::PoolError;
use crate::math::full_math::mul_div;
use primitive_types::U256;
use std::collections::HashMap;

/// Identifies a position: its owner and the tick range it covers. Plain tuple
/// rather than a newtype — see the data-model decision this crate follows for
/// Solana-style 32-byte owner identifiers with no Anchor `Pubkey` dependency.
pub type PositionKey = ([u8; 32], i32, i32);

/// The state Fluxa tracks for one owner's liquidity position over one tick range.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionInfo {
    pub liquidity: u128,
    /// Snapshot of `feeGrowthInside{0,1}` as of the last time this position's
    /// liquidity or owed tokens were touched. The next touch computes the delta
    /// against the pool's current `feeGrowthInside` and folds it into
    /// `tokens_owed`, then overwrites this snapshot.
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Token amounts this position has accrued (swap fees, plus principal
    /// returned by `burn`) and has not yet withdrawn via `collect`.
    pub tokens_owed_0: u128,
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    /// Applies a liquidity change of `liquidity_delta` to this position and rolls
    /// forward its fee-growth snapshot, crediting `tokens_owed` with whatever
    /// accrued since the last update. Matches Uniswap's `Position.update`: even a
    /// zero liquidity delta ("poke") still harvests fees, which is how a position
    /// with zero liquidity can still have nonzero `tokens_owed` to collect.
    ///
    /// Fails [`PoolError::PokeWithoutLiquidity`] if `liquidity_delta == 0` and the
    /// position currently holds no liquidity — there would be nothing to harvest
    /// and no liquidity to adjust.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), PoolError> {
        if liquidity_delta == 0 && self.liquidity == 0 {
            return Err(PoolError::PokeWithoutLiquidity);
        }

        let liquidity_next = if liquidity_delta >= 0 {
            self.liquidity.checked_add(liquidity_delta as u128).ok_or(PoolError::LiquidityOverflow)?
        } else {
            self.liquidity
                .checked_sub(liquidity_delta.unsigned_abs())
                .ok_or(PoolError::LiquidityUnderflow)?
        };

        let fee_growth_delta_0 =
            fee_growth_inside_0_x128.overflowing_sub(self.fee_growth_inside_0_last_x128).0;
        let fee_growth_delta_1 =
            fee_growth_inside_1_x128.overflowing_sub(self.fee_growth_inside_1_last_x128).0;

        let tokens_owed_delta_0 = mul_div_to_u128(U256::from(self.liquidity), fee_growth_delta_0)?;
        let tokens_owed_delta_1 = mul_div_to_u128(U256::from(self.liquidity), fee_growth_delta_1)?;

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;
        self.tokens_owed_0 = self.tokens_owed_0.saturating_add(tokens_owed_delta_0);
        self.tokens_owed_1 = self.tokens_owed_1.saturating_add(tokens_owed_delta_1);

        Ok(())
    }
}

/// `liquidity * fee_growth_delta / 2^128`, narrowed to `u128`. The product fits
/// comfortably inside `U256` (a `u128` times a 256-bit fee-growth delta is at most
/// 384 bits before the shift, but `mul_div`'s 512-bit intermediate covers it), and
/// the quotient is bounded by `u128::MAX` in practice since fee growth per position
/// is vanishingly unlikely to exceed that in any real pool.
fn mul_div_to_u128(liquidity: U256, fee_growth_delta: U256) -> Result<u128, PoolError> {
    let owed = mul_div(liquidity, fee_growth_delta, U256::one() << RESOLUTION_FEE_GROWTH)?;
    if owed > U256::from(u128::MAX) {
        return Err(PoolError::MathOverflow);
    }
    Ok(owed.as_u128())
}

/// Owner-and-range-keyed position store. A thin wrapper over a `HashMap` rather
/// than Solana PDAs, since custody and account derivation are outside this
/// engine's scope (see [`crate::ledger::AssetLedger`]).
#[derive(Debug, Default)]
pub struct PositionStore {
    positions: HashMap<PositionKey, PositionInfo>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self { positions: HashMap::new() }
    }

    pub fn get(&self, key: &PositionKey) -> PositionInfo {
        self.positions.get(key).copied().unwrap_or_default()
    }

    pub fn get_mut_or_default(&mut self, key: PositionKey) -> &mut PositionInfo {
        self.positions.entry(key).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_accrues_fees_proportional_to_liquidity() {
        let mut position = PositionInfo { liquidity: 1_000, ..Default::default() };
        // fee_growth_delta = 2^128 means "1 token owed per unit of liquidity".
        position.update(0, U256::one() << 128, U256::zero()).unwrap();
        assert_eq!(position.tokens_owed_0, 1_000);
        assert_eq!(position.tokens_owed_1, 0);
    }

    #[test]
    fn update_rejects_poke_on_empty_position() {
        let mut position = PositionInfo::default();
        let err = position.update(0, U256::zero(), U256::zero()).unwrap_err();
        assert_eq!(err, PoolError::PokeWithoutLiquidity);
    }

    #[test]
    fn update_accrues_fees_before_applying_new_liquidity_delta() {
        let mut position = PositionInfo { liquidity: 1_000, ..Default::default() };
        position.update(500, U256::one() << 128, U256::zero()).unwrap();
        // Fees computed against the liquidity *before* this call's delta is applied.
        assert_eq!(position.tokens_owed_0, 1_000);
        assert_eq!(position.liquidity, 1_500);
    }

    #[test]
    fn liquidity_underflow_is_rejected() {
        let mut position = PositionInfo { liquidity: 100, ..Default::default() };
        let err = position.update(-200, U256::zero(), U256::zero()).unwrap_err();
        assert_eq!(err, PoolError::LiquidityUnderflow);
    }

    #[test]
    fn store_returns_default_for_unknown_key() {
        let store = PositionStore::new();
        let key: PositionKey = ([0u8; 32], -10, 10);
        assert_eq!(store.get(&key).liquidity, 0);
    }
}
