//! A concentrated-liquidity constant-function market maker core engine.
//!
//! This crate implements the price/liquidity/fee accounting of a Uniswap-V3-style
//! pool as a plain Rust library: ticks, a Q64.96 √price representation, Q128.128
//! fee-growth accumulators, and a tick bitmap for jumping between initialized
//! ticks during a swap. It does not itself hold custody of tokens or authenticate
//! callers — see [`ledger::AssetLedger`], the trait a caller supplies to let the
//! engine pull and pay out the two tokens it trades.
//!
//! The entry point is [`pool::Pool`], whose five public operations —
//! `initialize`, `mint`, `burn`, `collect`, and `swap` — are the whole of the
//! engine's public surface.
pub mod constants;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_bitmap;

pub use error::PoolError;
pub use ledger::{AssetLedger, LedgerError, TokenOwner, TokenSide};
pub use pool::{Pool, Slot0};
pub use position::{PositionInfo, PositionKey};
pub use tick::TickInfo;
