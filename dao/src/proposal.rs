//! Proposal records, types, and per-proposal vote state.

use poline_types::{Address, EntityId, ProposalScope, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Proposal lifecycle.
///
/// `Active → {Defeated, Queued}` on queue, `Queued → {Executed,
/// ExecutionFailed}` on execute. `ExecutionFailed` is retry-eligible: a
/// further execute attempt may still succeed. Cancellation is allowed from
/// any non-terminal state, including mid-vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Active,
    Defeated,
    Queued,
    Executed,
    ExecutionFailed,
    Cancelled,
}

impl ProposalStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Defeated => "defeated",
            Self::Queued => "queued",
            Self::Executed => "executed",
            Self::ExecutionFailed => "execution_failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Defeated | Self::Executed | Self::Cancelled)
    }
}

/// What a proposal asks the community to do; determines the circle scope
/// required to submit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalType {
    OracleEvent,
    ProtocolRule,
    DisputeParams,
    CommunityFund,
    CircleManagement,
    General,
}

impl ProposalType {
    /// The circle scope a proposer's circle must cover. Types without a more
    /// specific mapping fall back to the general governance scope.
    pub fn scope(&self) -> ProposalScope {
        match self {
            Self::OracleEvent => ProposalScope::Oracle,
            Self::ProtocolRule => ProposalScope::ProtocolRules,
            Self::DisputeParams => ProposalScope::Dispute,
            Self::CommunityFund => ProposalScope::Community,
            Self::CircleManagement | Self::General => ProposalScope::Governance,
        }
    }
}

/// Ballot options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteSupport {
    Against,
    For,
    Abstain,
}

/// A single proposal vote with its frozen token-power weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVote {
    pub support: VoteSupport,
    pub weight: u128,
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: EntityId,
    pub proposer: Address,
    pub circle_id: EntityId,
    pub proposal_type: ProposalType,
    pub description: String,
    /// Target address of the encoded call performed on execution.
    pub target: Address,
    /// Opaque call data handed to the executor unchanged.
    pub payload: Vec<u8>,
    pub created_at: Timestamp,
    pub voting_starts: Timestamp,
    pub voting_ends: Timestamp,
    pub for_weight: u128,
    pub against_weight: u128,
    pub abstain_weight: u128,
    pub status: ProposalStatus,
    /// Set when the proposal is queued: earliest execution time.
    pub execution_time: Option<Timestamp>,
    /// Reason reported by the most recent failed execution attempt.
    pub last_execution_error: Option<String>,
    pub votes: HashMap<Address, ProposalVote>,
    pub voters: Vec<Address>,
}

impl Proposal {
    pub fn has_voted(&self, who: &Address) -> bool {
        self.votes.contains_key(who)
    }

    pub fn participating_weight(&self) -> u128 {
        self.for_weight
            .saturating_add(self.against_weight)
            .saturating_add(self.abstain_weight)
    }
}
