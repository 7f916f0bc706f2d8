//! Dispute records and per-round vote state.

use poline_types::{Address, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dispute alternates `Voting → Resolved` across escalation rounds; only
/// these two states exist. At most one dispute record exists per event and
/// its id is stable across rounds and re-challenges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStatus {
    Voting,
    Resolved,
}

impl DisputeStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Voting => "voting",
            Self::Resolved => "resolved",
        }
    }
}

/// A single dispute vote with its frozen weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeVote {
    /// True votes to overturn the standing decision, false to uphold it.
    pub overturn: bool,
    pub weight: u128,
}

/// A challenge against a resolved oracle event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dispute {
    pub id: EntityId,
    pub event_id: EntityId,
    pub challenger: Address,
    pub challenge_stake: u128,
    pub round: u32,
    pub created_at: Timestamp,
    pub voting_deadline: Timestamp,
    pub overturn_weight: u128,
    pub uphold_weight: u128,
    pub status: DisputeStatus,
    /// Result of the most recently resolved round.
    pub overturned: bool,
    pub votes: HashMap<Address, DisputeVote>,
    /// Cast order, kept for deterministic slashing iteration.
    pub voters: Vec<Address>,
}

impl Dispute {
    pub fn has_voted(&self, who: &Address) -> bool {
        self.votes.contains_key(who)
    }

    /// Reset per-round vote state for a new round or re-challenge.
    pub(crate) fn reset_round(&mut self, deadline: Timestamp) {
        self.overturn_weight = 0;
        self.uphold_weight = 0;
        self.overturned = false;
        self.votes.clear();
        self.voters.clear();
        self.status = DisputeStatus::Voting;
        self.voting_deadline = deadline;
    }
}
