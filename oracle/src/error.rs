use poline_types::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("event description must not be empty")]
    EmptyDescription,

    #[error("event {0} already exists")]
    DuplicateEvent(EntityId),

    #[error("event {0} not found")]
    NotFound(EntityId),

    #[error("event {id} is {status}, expected {expected}")]
    InvalidStatus {
        id: EntityId,
        status: &'static str,
        expected: &'static str,
    },

    #[error("voting on event {0} has closed")]
    VotingClosed(EntityId),

    #[error("voting on event {id} is still open: {remaining_secs}s remaining")]
    VotingStillOpen { id: EntityId, remaining_secs: u64 },

    #[error("{0} is not an eligible oracle")]
    NotAnOracle(String),

    #[error("{voter} has already voted on event {id}")]
    AlreadyVoted { id: EntityId, voter: String },

    #[error("quorum not reached on event {id}: {participating} of {required} required weight")]
    QuorumNotReached {
        id: EntityId,
        participating: u128,
        required: u128,
    },

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error(transparent)]
    Staking(#[from] poline_staking::StakingError),
}
