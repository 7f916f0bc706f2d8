//! Event resolution engine for the Poline protocol.
//!
//! Oracle events are stake-weighted yes/no votes on real-world facts. Voting
//! weight is snapshotted at cast time; quorum is measured against the live
//! total stake at resolution time; losing-side voters forfeit a fraction of
//! their snapshot weight. A resolved event can be reopened by the appeals
//! engine (marked `Disputed`) and its outcome flipped if a dispute overturns
//! the community's decision.

pub mod engine;
pub mod error;
pub mod event;

pub use engine::{OracleEngineEvent, OracleSnapshot, OracleVoting};
pub use error::OracleError;
pub use event::{EventStatus, OracleEvent, VoteRecord};
