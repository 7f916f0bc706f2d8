//! Per-participant stake record.

use poline_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Stake state for a single participant.
///
/// `is_oracle` is a cached derived flag: it is set or cleared only when a
/// stake or slash mutation moves `amount` across the minimum-stake line.
/// It is never recomputed lazily, and an administrative change to the
/// minimum does not resync existing flags — that staleness is deliberate
/// and asserted by tests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Currently staked amount (raw units).
    pub amount: u128,

    /// When the participant first staked (or re-staked from zero).
    pub staked_at: Timestamp,

    /// Pending unstake request, if any (cooldown start).
    pub unstake_requested_at: Option<Timestamp>,

    /// Cached oracle eligibility, updated only at stake/slash mutations.
    pub is_oracle: bool,
}

impl StakeRecord {
    pub fn new(staked_at: Timestamp) -> Self {
        Self {
            amount: 0,
            staked_at,
            unstake_requested_at: None,
            is_oracle: false,
        }
    }
}
