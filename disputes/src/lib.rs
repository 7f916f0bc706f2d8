//! Appeals engine for the Poline protocol.
//!
//! A resolved oracle event can be challenged by any participant holding the
//! dispute stake. Each challenge opens (or reopens) a dispute that runs its
//! own stake-weighted overturn/uphold vote; losers are slashed at a severity
//! that escalates with the round, and an unsuccessful challenger forfeits
//! half their challenge stake. A resolved dispute can be escalated up to a
//! round cap by posting 1.5x the previous challenge stake; the final round's
//! resolution is binding.

pub mod dispute;
pub mod engine;
pub mod error;

pub use dispute::{Dispute, DisputeStatus, DisputeVote};
pub use engine::{DisputeEngineEvent, DisputeResolution, DisputeSnapshot};
pub use error::DisputeError;
