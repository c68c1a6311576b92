//! Fluxa AMM Core Error Definitions
//!
//! This module defines the typed failure modes of the concentrated-liquidity
//! engine. Every public `Pool` operation returns `Result<T, PoolError>`; there is no
//! partial-failure mode — an operation either fully applies or this error is returned
//! and the pool's state is left exactly as it was before the call.
//!
//! Errors fall into three bands, matching the engine's own classification:
//! - Invariant errors (`MathOverflow`, `DivisionByZero`, `LiquidityOverflow`,
//!   `LiquidityUnderflow`) indicate a bug in the implementation or an impossible
//!   state. They are not expected to occur in correct operation.
//! - Input errors (`InvalidTickRange`, `TickNotSpaced`, `TickOutOfRange`,
//!   `SqrtPriceOutOfRange`, `InvalidSqrtPriceLimit`, `ZeroAmount`,
//!   `NotInitialized`, `AlreadyInitialized`, `PokeWithoutLiquidity`) are surfaced to
//!   the caller with the pool state unchanged.
//! - External errors (`Ledger`) wrap a failure from the asset ledger the pool
//!   transacts with; the pool's state is rolled back to its pre-call value.
use crate::ledger::LedgerError;

/// Core error codes for the Fluxa AMM concentrated-liquidity engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// A mutating call was attempted while the pool's reentrancy gate was held.
    #[error("pool is locked for reentrant access")]
    Reentrancy,

    /// An operation other than `initialize` was attempted on a pool whose price
    /// has never been set.
    #[error("pool has not been initialized")]
    NotInitialized,

    /// `initialize` was called on a pool that already has a price.
    #[error("pool has already been initialized")]
    AlreadyInitialized,

    /// `tickLower >= tickUpper`, or either tick lies outside `[MIN_TICK, MAX_TICK]`.
    #[error("tick range is invalid")]
    InvalidTickRange,

    /// A tick is not an integer multiple of the pool's `tickSpacing`.
    #[error("tick is not a multiple of the pool's tick spacing")]
    TickNotSpaced,

    /// A tick index lies outside `[MIN_TICK, MAX_TICK]`.
    #[error("tick is out of range")]
    TickOutOfRange,

    /// A √price lies outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    #[error("sqrt price is out of range")]
    SqrtPriceOutOfRange,

    /// A swap's `sqrtPriceLimit` does not lie strictly between the starting price
    /// and the protocol bound in the direction of travel.
    #[error("sqrt price limit is invalid for the requested swap direction")]
    InvalidSqrtPriceLimit,

    /// A `mint`/`burn`/`swap` amount of zero was supplied where a non-zero amount
    /// is required.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// A tick's `liquidityGross` would exceed `maxLiquidityPerTick`.
    #[error("liquidity at a tick would exceed the per-tick maximum")]
    LiquidityOverflow,

    /// A liquidity subtraction (position burn or tick cross) would underflow.
    #[error("liquidity underflow")]
    LiquidityUnderflow,

    /// A 256-bit arithmetic operation overflowed its domain.
    #[error("math operation overflowed")]
    MathOverflow,

    /// A `mulDiv`-family operation was asked to divide by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// `burn(0)` ("poke") was called on a position that has never held liquidity.
    #[error("cannot poke a position that has never held liquidity")]
    PokeWithoutLiquidity,

    /// The external asset ledger rejected a transfer; the triggering operation is
    /// aborted and the pool's state is unchanged.
    #[error("asset ledger rejected a transfer: {0}")]
    Ledger(#[from] LedgerError),
}
