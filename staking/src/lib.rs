//! Stake ledger for the Poline protocol.
//!
//! Owns each participant's collateral, oracle eligibility, and unstake
//! cooldown state. Stake is simultaneously voting weight and slashable
//! collateral; the ledger is the single writer of `total_staked` and the
//! cached per-participant oracle flag.
//!
//! Slashing is exposed only to authorized callers (the voting engines) and
//! is a leaf operation: it mutates ledger state and forwards a burn to the
//! token ledger capability, never calling back into the invoking engine.

pub mod engine;
pub mod error;
pub mod record;
pub mod token;

pub use engine::{StakeEvent, StakingEngine, StakingSnapshot};
pub use error::StakingError;
pub use record::StakeRecord;
pub use token::TokenLedger;
