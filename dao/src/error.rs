use poline_types::{EntityId, ProposalScope};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("proposal description must not be empty")]
    EmptyDescription,

    #[error("proposal {0} already exists")]
    DuplicateProposal(EntityId),

    #[error("proposal {0} not found")]
    NotFound(EntityId),

    #[error("circle {0} not found")]
    CircleNotFound(EntityId),

    #[error("circle {0} is not active")]
    CircleInactive(EntityId),

    #[error("{proposer} is not a member of circle {circle}")]
    NotCircleMember { circle: EntityId, proposer: String },

    #[error("circle {circle} does not cover the {scope:?} scope")]
    ScopeNotCovered {
        circle: EntityId,
        scope: ProposalScope,
    },

    #[error("a voting power of {required} is required to propose, {held} held")]
    InsufficientVotingPower { required: u128, held: u128 },

    #[error("proposal {id} is {status}, expected {expected}")]
    InvalidStatus {
        id: EntityId,
        status: &'static str,
        expected: &'static str,
    },

    #[error("voting on proposal {0} has closed")]
    VotingClosed(EntityId),

    #[error("voting on proposal {id} is still open: {remaining_secs}s remaining")]
    VotingStillOpen { id: EntityId, remaining_secs: u64 },

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: EntityId, voter: String },

    #[error("quorum not reached on proposal {id}: {participating} of {required} required weight")]
    QuorumNotReached {
        id: EntityId,
        participating: u128,
        required: u128,
    },

    #[error("timelock on proposal {id} not elapsed: {remaining_secs}s remaining")]
    TimelockNotElapsed { id: EntityId, remaining_secs: u64 },

    #[error("execution of proposal {id} failed: {reason}")]
    ExecutionFailed { id: EntityId, reason: String },

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),
}
