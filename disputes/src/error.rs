use poline_types::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisputeError {
    #[error("event {0} not found")]
    EventNotFound(EntityId),

    #[error("event {id} is {status}, only resolved events can be challenged")]
    EventNotResolved { id: EntityId, status: &'static str },

    #[error("event {event} already has a dispute in progress")]
    DisputeInProgress { event: EntityId },

    #[error("dispute {0} not found")]
    NotFound(EntityId),

    #[error("dispute {id} is {status}, expected {expected}")]
    InvalidStatus {
        id: EntityId,
        status: &'static str,
        expected: &'static str,
    },

    #[error("voting on dispute {0} has closed")]
    VotingClosed(EntityId),

    #[error("voting on dispute {id} is still open: {remaining_secs}s remaining")]
    VotingStillOpen { id: EntityId, remaining_secs: u64 },

    #[error("{0} is not an eligible oracle")]
    NotAnOracle(String),

    #[error("{voter} has already voted on dispute {id}")]
    AlreadyVoted { id: EntityId, voter: String },

    #[error("a stake of {required} is required, {held} held")]
    InsufficientStake { required: u128, held: u128 },

    #[error("dispute {id} has reached the maximum of {max_rounds} rounds")]
    MaxRoundsReached { id: EntityId, max_rounds: u32 },

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error(transparent)]
    Oracle(#[from] poline_oracle::OracleError),

    #[error(transparent)]
    Staking(#[from] poline_staking::StakingError),
}
