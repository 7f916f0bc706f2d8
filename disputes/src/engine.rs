//! The appeals engine.

use crate::dispute::{Dispute, DisputeStatus, DisputeVote};
use crate::error::DisputeError;
use poline_oracle::{EventStatus, OracleVoting};
use poline_staking::{StakingEngine, TokenLedger};
use poline_types::{Address, EntityId, ProtocolParams, Timestamp};
use poline_utils::math::bps_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Notifications emitted by the appeals engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeEngineEvent {
    DisputeOpened {
        id: EntityId,
        event: EntityId,
        challenger: Address,
        challenge_stake: u128,
        round: u32,
    },
    VoteCast {
        id: EntityId,
        voter: Address,
        overturn: bool,
        weight: u128,
    },
    DisputeResolved {
        id: EntityId,
        event: EntityId,
        round: u32,
        overturned: bool,
        overturn_weight: u128,
        uphold_weight: u128,
    },
    LoserSlashed {
        id: EntityId,
        voter: Address,
        amount: u128,
    },
    ChallengerSlashed {
        id: EntityId,
        challenger: Address,
        amount: u128,
    },
    DisputeEscalated {
        id: EntityId,
        round: u32,
        challenger: Address,
        challenge_stake: u128,
    },
    ParametersUpdated {
        dispute_stake: u128,
        voting_period_secs: u64,
        max_rounds: u32,
        escalation_multiplier_bps: u32,
        slash_base_bps: u32,
        slash_step_bps: u32,
    },
}

/// Escalating challenge rounds against resolved oracle events.
///
/// The engine's identity address must be registered as an authorized slasher
/// with the stake ledger and as a controller with the event resolution
/// engine: resolving a round slashes losers under that identity and pushes
/// the verdict back into the event's status and outcome.
pub struct DisputeResolution {
    admin: Address,
    identity: Address,
    disputes: HashMap<EntityId, Dispute>,
    /// Each event has at most one dispute record, reused across rounds.
    by_event: HashMap<EntityId, EntityId>,
    dispute_stake: u128,
    voting_period_secs: u64,
    max_rounds: u32,
    escalation_multiplier_bps: u32,
    slash_base_bps: u32,
    slash_step_bps: u32,
    pending_events: Vec<DisputeEngineEvent>,
}

impl DisputeResolution {
    pub fn new(admin: Address, identity: Address, params: &ProtocolParams) -> Self {
        Self {
            admin,
            identity,
            disputes: HashMap::new(),
            by_event: HashMap::new(),
            dispute_stake: params.dispute_stake,
            voting_period_secs: params.dispute_voting_period_secs,
            max_rounds: params.max_dispute_rounds,
            escalation_multiplier_bps: params.escalation_multiplier_bps,
            slash_base_bps: params.dispute_slash_base_bps,
            slash_step_bps: params.dispute_slash_step_bps,
            pending_events: Vec::new(),
        }
    }

    /// Address under which this engine calls the stake ledger and the event
    /// resolution engine.
    pub fn identity(&self) -> &Address {
        &self.identity
    }

    /// Slash fraction (bps) applied to losing voters of the given round.
    fn round_slash_bps(&self, round: u32) -> u32 {
        self.slash_base_bps
            .saturating_add(self.slash_step_bps.saturating_mul(round))
    }

    /// Challenge a resolved event. Reuses the event's existing dispute record
    /// on a re-challenge, resetting it to round 1.
    pub fn open_dispute(
        &mut self,
        challenger: &Address,
        event_id: EntityId,
        now: Timestamp,
        staking: &StakingEngine,
        oracle: &mut OracleVoting,
    ) -> Result<EntityId, DisputeError> {
        let event = oracle
            .get_event(event_id)
            .ok_or(DisputeError::EventNotFound(event_id))?;
        if event.status != EventStatus::Resolved {
            return Err(DisputeError::EventNotResolved {
                id: event_id,
                status: event.status.name(),
            });
        }
        if let Some(existing) = self.by_event.get(&event_id) {
            if self.disputes[existing].status == DisputeStatus::Voting {
                return Err(DisputeError::DisputeInProgress { event: event_id });
            }
        }
        let held = staking.stake_of(challenger);
        if held < self.dispute_stake {
            return Err(DisputeError::InsufficientStake {
                required: self.dispute_stake,
                held,
            });
        }

        let deadline = now.plus_secs(self.voting_period_secs);
        let id = match self.by_event.get(&event_id) {
            // Re-challenge: reset the existing record back to round 1.
            Some(&id) => {
                let dispute = self.disputes.get_mut(&id).expect("indexed dispute exists");
                dispute.challenger = challenger.clone();
                dispute.challenge_stake = self.dispute_stake;
                dispute.round = 1;
                dispute.reset_round(deadline);
                id
            }
            None => {
                let id = EntityId::derive("dispute", event_id.as_bytes(), challenger, now);
                self.disputes.insert(
                    id,
                    Dispute {
                        id,
                        event_id,
                        challenger: challenger.clone(),
                        challenge_stake: self.dispute_stake,
                        round: 1,
                        created_at: now,
                        voting_deadline: deadline,
                        overturn_weight: 0,
                        uphold_weight: 0,
                        status: DisputeStatus::Voting,
                        overturned: false,
                        votes: HashMap::new(),
                        voters: Vec::new(),
                    },
                );
                self.by_event.insert(event_id, id);
                id
            }
        };

        oracle.mark_disputed(&self.identity, event_id)?;
        info!(dispute = %id, event = %event_id, challenger = %challenger, "dispute opened");
        self.pending_events.push(DisputeEngineEvent::DisputeOpened {
            id,
            event: event_id,
            challenger: challenger.clone(),
            challenge_stake: self.dispute_stake,
            round: 1,
        });
        Ok(id)
    }

    /// Cast an overturn/uphold vote on the current round.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: EntityId,
        overturn: bool,
        now: Timestamp,
        staking: &StakingEngine,
    ) -> Result<(), DisputeError> {
        let dispute = self.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        if dispute.status != DisputeStatus::Voting {
            return Err(DisputeError::InvalidStatus {
                id,
                status: dispute.status.name(),
                expected: DisputeStatus::Voting.name(),
            });
        }
        if now > dispute.voting_deadline {
            return Err(DisputeError::VotingClosed(id));
        }
        if !staking.is_oracle(voter) {
            return Err(DisputeError::NotAnOracle(voter.to_string()));
        }
        if dispute.has_voted(voter) {
            return Err(DisputeError::AlreadyVoted {
                id,
                voter: voter.to_string(),
            });
        }

        let weight = staking.stake_of(voter);
        if overturn {
            dispute.overturn_weight = dispute.overturn_weight.saturating_add(weight);
        } else {
            dispute.uphold_weight = dispute.uphold_weight.saturating_add(weight);
        }
        dispute
            .votes
            .insert(voter.clone(), DisputeVote { overturn, weight });
        dispute.voters.push(voter.clone());

        self.pending_events.push(DisputeEngineEvent::VoteCast {
            id,
            voter: voter.clone(),
            overturn,
            weight,
        });
        Ok(())
    }

    /// Resolve the current round after its deadline.
    ///
    /// The round overturns the standing decision iff overturn weight strictly
    /// exceeds uphold weight (a tie upholds). Losing voters are slashed at
    /// `base + step × round` of their snapshot weight; if the decision is
    /// upheld the challenger additionally forfeits half the challenge stake.
    /// The verdict is pushed back into the event resolution engine, flipping
    /// the event outcome when overturned.
    pub fn resolve_dispute(
        &mut self,
        caller: &Address,
        id: EntityId,
        now: Timestamp,
        staking: &mut StakingEngine,
        oracle: &mut OracleVoting,
        token: &mut dyn TokenLedger,
    ) -> Result<bool, DisputeError> {
        if *caller != self.admin {
            return Err(DisputeError::Unauthorized(caller.to_string()));
        }
        let dispute = self.disputes.get(&id).ok_or(DisputeError::NotFound(id))?;
        if dispute.status != DisputeStatus::Voting {
            return Err(DisputeError::InvalidStatus {
                id,
                status: dispute.status.name(),
                expected: DisputeStatus::Voting.name(),
            });
        }
        if now <= dispute.voting_deadline {
            return Err(DisputeError::VotingStillOpen {
                id,
                remaining_secs: dispute
                    .voting_deadline
                    .as_secs()
                    .saturating_sub(now.as_secs())
                    .saturating_add(1),
            });
        }

        let overturned = dispute.overturn_weight > dispute.uphold_weight;
        let slash_bps = self.round_slash_bps(dispute.round);
        let penalties: Vec<(Address, u128)> = dispute
            .voters
            .iter()
            .filter_map(|voter| {
                let vote = &dispute.votes[voter];
                if vote.overturn == overturned {
                    return None;
                }
                let amount = bps_of(vote.weight, slash_bps);
                (amount > 0).then(|| (voter.clone(), amount))
            })
            .collect();
        let challenger_penalty =
            (!overturned).then(|| (dispute.challenger.clone(), dispute.challenge_stake / 2));
        let event_id = dispute.event_id;
        let round = dispute.round;
        let (overturn_weight, uphold_weight) = (dispute.overturn_weight, dispute.uphold_weight);

        let dispute = self.disputes.get_mut(&id).expect("checked above");
        dispute.status = DisputeStatus::Resolved;
        dispute.overturned = overturned;

        info!(dispute = %id, event = %event_id, round, overturned, "dispute resolved");
        self.pending_events.push(DisputeEngineEvent::DisputeResolved {
            id,
            event: event_id,
            round,
            overturned,
            overturn_weight,
            uphold_weight,
        });

        let identity = self.identity.clone();
        for (voter, amount) in penalties {
            let reason = format!("losing side of dispute {id} round {round}");
            let applied = staking.slash_stake(&identity, &voter, amount, &reason, token)?;
            if applied > 0 {
                self.pending_events
                    .push(DisputeEngineEvent::LoserSlashed { id, voter, amount: applied });
            }
        }
        if let Some((challenger, amount)) = challenger_penalty {
            let reason = format!("failed challenge on dispute {id}");
            let applied = staking.slash_stake(&identity, &challenger, amount, &reason, token)?;
            if applied > 0 {
                self.pending_events.push(DisputeEngineEvent::ChallengerSlashed {
                    id,
                    challenger,
                    amount: applied,
                });
            }
        }

        oracle.apply_dispute_outcome(&identity, event_id, overturned)?;
        Ok(overturned)
    }

    /// Escalate a resolved dispute to the next round. The escalator becomes
    /// the new challenger and must hold the multiplied challenge stake; the
    /// prior round's votes are cleared and the event is re-flagged disputed.
    pub fn escalate_dispute(
        &mut self,
        escalator: &Address,
        id: EntityId,
        now: Timestamp,
        staking: &StakingEngine,
        oracle: &mut OracleVoting,
    ) -> Result<u32, DisputeError> {
        let dispute = self.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        if dispute.status != DisputeStatus::Resolved {
            return Err(DisputeError::InvalidStatus {
                id,
                status: dispute.status.name(),
                expected: DisputeStatus::Resolved.name(),
            });
        }
        if dispute.round >= self.max_rounds {
            return Err(DisputeError::MaxRoundsReached {
                id,
                max_rounds: self.max_rounds,
            });
        }
        let required = bps_of(dispute.challenge_stake, self.escalation_multiplier_bps);
        let held = staking.stake_of(escalator);
        if held < required {
            return Err(DisputeError::InsufficientStake { required, held });
        }

        dispute.round += 1;
        dispute.challenger = escalator.clone();
        dispute.challenge_stake = required;
        dispute.reset_round(now.plus_secs(self.voting_period_secs));
        let round = dispute.round;
        let event_id = dispute.event_id;

        oracle.mark_disputed(&self.identity, event_id)?;
        info!(dispute = %id, round, challenger = %escalator, "dispute escalated");
        self.pending_events.push(DisputeEngineEvent::DisputeEscalated {
            id,
            round,
            challenger: escalator.clone(),
            challenge_stake: required,
        });
        Ok(round)
    }

    /// Change dispute parameters for future calls.
    #[allow(clippy::too_many_arguments)]
    pub fn update_parameters(
        &mut self,
        caller: &Address,
        dispute_stake: u128,
        voting_period_secs: u64,
        max_rounds: u32,
        escalation_multiplier_bps: u32,
        slash_base_bps: u32,
        slash_step_bps: u32,
    ) -> Result<(), DisputeError> {
        if *caller != self.admin {
            return Err(DisputeError::Unauthorized(caller.to_string()));
        }
        self.dispute_stake = dispute_stake;
        self.voting_period_secs = voting_period_secs;
        self.max_rounds = max_rounds;
        self.escalation_multiplier_bps = escalation_multiplier_bps;
        self.slash_base_bps = slash_base_bps;
        self.slash_step_bps = slash_step_bps;
        self.pending_events.push(DisputeEngineEvent::ParametersUpdated {
            dispute_stake,
            voting_period_secs,
            max_rounds,
            escalation_multiplier_bps,
            slash_base_bps,
            slash_step_bps,
        });
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn get_dispute(&self, id: EntityId) -> Option<&Dispute> {
        self.disputes.get(&id)
    }

    pub fn dispute_for_event(&self, event_id: EntityId) -> Option<&Dispute> {
        self.by_event
            .get(&event_id)
            .and_then(|id| self.disputes.get(id))
    }

    pub fn drain_events(&mut self) -> Vec<DisputeEngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> DisputeSnapshot {
        DisputeSnapshot {
            admin: self.admin.clone(),
            identity: self.identity.clone(),
            disputes: self.disputes.clone(),
            by_event: self.by_event.clone(),
            dispute_stake: self.dispute_stake,
            voting_period_secs: self.voting_period_secs,
            max_rounds: self.max_rounds,
            escalation_multiplier_bps: self.escalation_multiplier_bps,
            slash_base_bps: self.slash_base_bps,
            slash_step_bps: self.slash_step_bps,
        }
    }

    pub fn restore(snapshot: DisputeSnapshot) -> Self {
        Self {
            admin: snapshot.admin,
            identity: snapshot.identity,
            disputes: snapshot.disputes,
            by_event: snapshot.by_event,
            dispute_stake: snapshot.dispute_stake,
            voting_period_secs: snapshot.voting_period_secs,
            max_rounds: snapshot.max_rounds,
            escalation_multiplier_bps: snapshot.escalation_multiplier_bps,
            slash_base_bps: snapshot.slash_base_bps,
            slash_step_bps: snapshot.slash_step_bps,
            pending_events: Vec::new(),
        }
    }
}

/// Serializable snapshot of engine state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisputeSnapshot {
    pub admin: Address,
    pub identity: Address,
    pub disputes: HashMap<EntityId, Dispute>,
    pub by_event: HashMap<EntityId, EntityId>,
    pub dispute_stake: u128,
    pub voting_period_secs: u64,
    pub max_rounds: u32,
    pub escalation_multiplier_bps: u32,
    pub slash_base_bps: u32,
    pub slash_step_bps: u32,
}
