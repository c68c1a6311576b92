//! Asset ledger interface.
//!
//! Custody, transfer, and authentication of the two tokens a pool trades are
//! explicitly out of scope for this engine (see the crate's module docs). The pool
//! transacts with those concerns through this trait, injected at construction time,
//! instead of holding token balances itself — the concentrated-liquidity math never
//! needs to know whether the tokens it is accounting for live in SPL token accounts,
//! ERC-20 balances, or an in-memory test double.
//!
//! This mirrors the single CPI pair each of the teacher's instruction handlers made
//! around its call into `Pool::swap`/`Pool::mint` (`token::transfer` in/out of the
//! pool's vaults), generalized from a concrete SPL call site to a capability the
//! engine can call without knowing its implementation.

/// Opaque identifier for a token amount's owner (depositor or recipient). This
/// engine treats it as an opaque 32-byte handle — interpreting it (as a public key,
/// an account id, or anything else) is entirely the ledger implementation's concern.
pub type TokenOwner = [u8; 32];

/// Identifies one of the pool's two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSide {
    Token0,
    Token1,
}

/// A failure reported by the asset ledger. The pool treats every variant the same
/// way: abort the triggering operation and leave pool state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The payer does not hold enough of the token to cover the requested transfer.
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// The ledger rejected the transfer for a reason specific to its own
    /// implementation (e.g. a frozen account, a paused token).
    #[error("transfer rejected by asset ledger")]
    TransferRejected,
}

/// The external collaborator that custodies and moves the pool's two tokens.
///
/// Implementations must not re-enter the pool synchronously from within
/// `transfer_from`/`transfer` in a way that bypasses the pool's reentrancy gate —
/// the gate (`PoolLockGuard`, see `pool.rs`) is exactly what protects the engine
/// against a malicious ledger that tries to.
pub trait AssetLedger {
    /// Pulls `amount` of `side` from `from` into the pool's custody. Called once
    /// per swap/mint, after all internal state has been staged, never before.
    fn transfer_from(
        &mut self,
        from: TokenOwner,
        side: TokenSide,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Releases `amount` of `side` from the pool's custody to `to`.
    fn transfer(
        &mut self,
        to: TokenOwner,
        side: TokenSide,
        amount: u128,
    ) -> Result<(), LedgerError>;
}
