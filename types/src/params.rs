//! Protocol parameters — every governance-tunable value in one place.
//!
//! Fractions are expressed in basis points (10_000 = 100%). Engines copy the
//! fields they own at construction time; administrative parameter updates on
//! an engine change future behavior only and never retroactively recompute
//! derived state (in particular cached oracle eligibility).

use serde::{Deserialize, Serialize};

/// All protocol parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    // ── Staking ──────────────────────────────────────────────────────────
    /// Cooldown (seconds) between an unstake request and its completion.
    pub unstake_cooldown_secs: u64,

    /// Minimum stake (raw units) for oracle eligibility.
    pub minimum_stake: u128,

    // ── Oracle events ────────────────────────────────────────────────────
    /// Quorum for event resolution: yes+no weight must reach this fraction
    /// of the live total stake (basis points).
    pub event_quorum_bps: u32,

    /// Fraction of a losing voter's snapshot weight that is slashed (bps).
    pub event_slash_bps: u32,

    /// Minimum event voting period in seconds.
    pub min_event_voting_period_secs: u64,

    // ── Disputes ─────────────────────────────────────────────────────────
    /// Stake a challenger must hold to open a round-1 dispute.
    pub dispute_stake: u128,

    /// Voting period (seconds) for each dispute round.
    pub dispute_voting_period_secs: u64,

    /// Maximum number of escalation rounds; the final round is binding.
    pub max_dispute_rounds: u32,

    /// Required stake multiplier per escalation (basis points, 15000 = 1.5x).
    pub escalation_multiplier_bps: u32,

    /// Base slash fraction for dispute losers (bps); round 0 would pay this.
    pub dispute_slash_base_bps: u32,

    /// Additional slash fraction per round (bps): round r pays base + step*r.
    pub dispute_slash_step_bps: u32,

    // ── Governance ───────────────────────────────────────────────────────
    /// Minimum token voting power required to submit a proposal.
    pub proposal_threshold: u128,

    /// Quorum for proposal queuing: for+against+abstain weight must reach
    /// this fraction of the live total stake (basis points).
    pub proposal_quorum_bps: u32,

    /// Minimum proposal voting period in seconds; shorter requests are clamped up.
    pub min_proposal_voting_period_secs: u64,

    /// Delay (seconds) between queuing a passed proposal and its execution.
    pub timelock_delay_secs: u64,
}

impl ProtocolParams {
    /// Poline defaults — the intended configuration for the live community.
    pub fn poline_defaults() -> Self {
        Self {
            unstake_cooldown_secs: 7 * 24 * 3600, // 7 days
            minimum_stake: 100,

            event_quorum_bps: 3000, // 30%
            event_slash_bps: 1000,  // 10%
            min_event_voting_period_secs: 24 * 3600, // 1 day

            dispute_stake: 500,
            dispute_voting_period_secs: 3 * 24 * 3600, // 3 days
            max_dispute_rounds: 3,
            escalation_multiplier_bps: 15_000, // 1.5x
            dispute_slash_base_bps: 1000,      // 10%
            dispute_slash_step_bps: 500,       // +5% per round

            proposal_threshold: 100,
            proposal_quorum_bps: 3000, // 30%
            min_proposal_voting_period_secs: 3 * 24 * 3600, // 3 days
            timelock_delay_secs: 2 * 24 * 3600, // 2 days
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_one_dispute_slash_is_fifteen_percent() {
        let p = ProtocolParams::poline_defaults();
        assert_eq!(p.dispute_slash_base_bps + p.dispute_slash_step_bps, 1500);
    }

    #[test]
    fn defaults_serialize_roundtrip() {
        let p = ProtocolParams::poline_defaults();
        let json = serde_json::to_string(&p).unwrap();
        let back: ProtocolParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.minimum_stake, p.minimum_stake);
        assert_eq!(back.escalation_multiplier_bps, p.escalation_multiplier_bps);
    }
}
