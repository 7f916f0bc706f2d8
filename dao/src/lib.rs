//! Governance orchestrator for the Poline protocol.
//!
//! Proposals are gated by circle membership and scope, thresholded on token
//! voting power, voted with snapshot weights, and executed against an
//! arbitrary target after a timelock. Quorum is measured against the live
//! total stake at queue time, like oracle event resolution.

pub mod engine;
pub mod error;
pub mod executor;
pub mod proposal;

pub use engine::{DaoEvent, DaoSnapshot, PolineDao};
pub use error::DaoError;
pub use executor::ProposalExecutor;
pub use proposal::{Proposal, ProposalStatus, ProposalType, ProposalVote, VoteSupport};
