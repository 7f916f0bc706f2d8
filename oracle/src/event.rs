//! Oracle event records and per-event vote state.

use poline_types::{Address, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle of an oracle event.
///
/// `Voting → Resolved` and `Voting → Cancelled` are the ordinary paths.
/// The appeals engine may mark any event `Disputed` and later restore it to
/// `Resolved` (possibly with a flipped outcome) when the dispute concludes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Voting,
    Resolved,
    Disputed,
    Cancelled,
}

impl EventStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Voting => "voting",
            Self::Resolved => "resolved",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A single cast vote with its frozen weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub support: bool,
    /// Stake-derived weight captured at cast time, never adjusted afterward.
    pub weight: u128,
}

/// A yes/no question about the real world, resolved by stake-weighted vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleEvent {
    pub id: EntityId,
    pub description: String,
    pub creator: Address,
    pub created_at: Timestamp,
    pub voting_deadline: Timestamp,
    pub status: EventStatus,
    /// Meaningful only once the event has been resolved.
    pub outcome: Option<bool>,
    pub yes_weight: u128,
    pub no_weight: u128,
    pub votes: HashMap<Address, VoteRecord>,
    /// Cast order, kept for deterministic slashing iteration.
    pub voters: Vec<Address>,
}

impl OracleEvent {
    pub fn has_voted(&self, who: &Address) -> bool {
        self.votes.contains_key(who)
    }

    pub fn participating_weight(&self) -> u128 {
        self.yes_weight.saturating_add(self.no_weight)
    }
}
