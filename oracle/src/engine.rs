//! The event resolution engine.

use crate::error::OracleError;
use crate::event::{EventStatus, OracleEvent, VoteRecord};
use poline_staking::{StakingEngine, TokenLedger};
use poline_types::{Address, EntityId, ProtocolParams, Timestamp};
use poline_utils::math::bps_of;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Notifications emitted by the event resolution engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEngineEvent {
    EventCreated {
        id: EntityId,
        description: String,
        voting_deadline: Timestamp,
    },
    VoteCast {
        id: EntityId,
        voter: Address,
        support: bool,
        weight: u128,
    },
    EventResolved {
        id: EntityId,
        outcome: bool,
        yes_weight: u128,
        no_weight: u128,
    },
    MinoritySlashed {
        id: EntityId,
        voter: Address,
        amount: u128,
    },
    EventDisputed {
        id: EntityId,
    },
    DisputeOutcomeApplied {
        id: EntityId,
        overturned: bool,
        outcome: bool,
    },
    EventCancelled {
        id: EntityId,
    },
    ParametersUpdated {
        quorum_bps: u32,
        slash_bps: u32,
        min_voting_period_secs: u64,
    },
    ControllerAuthorized {
        controller: Address,
    },
}

/// Stake-weighted yes/no voting on oracle events.
///
/// The engine carries its own identity address, registered with the stake
/// ledger as an authorized slasher; minority slashing at resolution runs
/// under that identity. Privileged operations are open to the admin and to
/// authorized controllers (the appeals engine's identity in particular).
pub struct OracleVoting {
    admin: Address,
    identity: Address,
    controllers: HashSet<Address>,
    events: HashMap<EntityId, OracleEvent>,
    quorum_bps: u32,
    slash_bps: u32,
    min_voting_period_secs: u64,
    pending_events: Vec<OracleEngineEvent>,
}

impl OracleVoting {
    pub fn new(admin: Address, identity: Address, params: &ProtocolParams) -> Self {
        Self {
            admin,
            identity,
            controllers: HashSet::new(),
            events: HashMap::new(),
            quorum_bps: params.event_quorum_bps,
            slash_bps: params.event_slash_bps,
            min_voting_period_secs: params.min_event_voting_period_secs,
            pending_events: Vec::new(),
        }
    }

    /// Address under which this engine calls the stake ledger.
    pub fn identity(&self) -> &Address {
        &self.identity
    }

    fn require_privileged(&self, caller: &Address) -> Result<(), OracleError> {
        if *caller != self.admin && !self.controllers.contains(caller) {
            return Err(OracleError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Authorize a controller (e.g. the appeals engine) for privileged calls.
    pub fn authorize_controller(
        &mut self,
        caller: &Address,
        controller: Address,
    ) -> Result<(), OracleError> {
        if *caller != self.admin {
            return Err(OracleError::Unauthorized(caller.to_string()));
        }
        self.pending_events.push(OracleEngineEvent::ControllerAuthorized {
            controller: controller.clone(),
        });
        self.controllers.insert(controller);
        Ok(())
    }

    /// Open a new event for voting. The requested period is clamped up to the
    /// configured minimum; the deadline is `now + period`.
    pub fn create_event(
        &mut self,
        caller: &Address,
        description: &str,
        voting_period_secs: u64,
        now: Timestamp,
    ) -> Result<EntityId, OracleError> {
        self.require_privileged(caller)?;
        if description.trim().is_empty() {
            return Err(OracleError::EmptyDescription);
        }
        let id = EntityId::derive("event", description.as_bytes(), caller, now);
        if self.events.contains_key(&id) {
            return Err(OracleError::DuplicateEvent(id));
        }

        let period = voting_period_secs.max(self.min_voting_period_secs);
        let voting_deadline = now.plus_secs(period);
        self.events.insert(
            id,
            OracleEvent {
                id,
                description: description.to_string(),
                creator: caller.clone(),
                created_at: now,
                voting_deadline,
                status: EventStatus::Voting,
                outcome: None,
                yes_weight: 0,
                no_weight: 0,
                votes: HashMap::new(),
                voters: Vec::new(),
            },
        );
        info!(event = %id, deadline = %voting_deadline, "oracle event created");
        self.pending_events.push(OracleEngineEvent::EventCreated {
            id,
            description: description.to_string(),
            voting_deadline,
        });
        Ok(id)
    }

    /// Cast a yes/no vote. The voter must currently be an eligible oracle;
    /// their weight is their stake at this instant, frozen into the vote.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: EntityId,
        support: bool,
        now: Timestamp,
        staking: &StakingEngine,
    ) -> Result<(), OracleError> {
        let event = self.events.get_mut(&id).ok_or(OracleError::NotFound(id))?;
        if event.status != EventStatus::Voting {
            return Err(OracleError::InvalidStatus {
                id,
                status: event.status.name(),
                expected: EventStatus::Voting.name(),
            });
        }
        if now > event.voting_deadline {
            return Err(OracleError::VotingClosed(id));
        }
        if !staking.is_oracle(voter) {
            return Err(OracleError::NotAnOracle(voter.to_string()));
        }
        if event.has_voted(voter) {
            return Err(OracleError::AlreadyVoted {
                id,
                voter: voter.to_string(),
            });
        }

        let weight = staking.stake_of(voter);
        if support {
            event.yes_weight = event.yes_weight.saturating_add(weight);
        } else {
            event.no_weight = event.no_weight.saturating_add(weight);
        }
        event.votes.insert(voter.clone(), VoteRecord { support, weight });
        event.voters.push(voter.clone());

        self.pending_events.push(OracleEngineEvent::VoteCast {
            id,
            voter: voter.clone(),
            support,
            weight,
        });
        Ok(())
    }

    /// Resolve an event after its deadline.
    ///
    /// Quorum is `yes + no ≥ quorum_bps` of the LIVE total stake at this
    /// moment, not a snapshot from vote-open. The outcome is `yes > no`
    /// (a tie resolves to No). Every losing-side voter forfeits `slash_bps`
    /// of their snapshot weight; slashes that truncate to zero are skipped.
    pub fn resolve_event(
        &mut self,
        caller: &Address,
        id: EntityId,
        now: Timestamp,
        staking: &mut StakingEngine,
        token: &mut dyn TokenLedger,
    ) -> Result<bool, OracleError> {
        self.require_privileged(caller)?;
        let event = self.events.get(&id).ok_or(OracleError::NotFound(id))?;
        if event.status != EventStatus::Voting {
            return Err(OracleError::InvalidStatus {
                id,
                status: event.status.name(),
                expected: EventStatus::Voting.name(),
            });
        }
        if now <= event.voting_deadline {
            return Err(OracleError::VotingStillOpen {
                id,
                remaining_secs: event
                    .voting_deadline
                    .as_secs()
                    .saturating_sub(now.as_secs())
                    .saturating_add(1),
            });
        }

        let participating = event.participating_weight();
        let required = bps_of(staking.total_staked(), self.quorum_bps);
        if participating < required {
            return Err(OracleError::QuorumNotReached {
                id,
                participating,
                required,
            });
        }

        let outcome = event.yes_weight > event.no_weight;
        let penalties: Vec<(Address, u128)> = event
            .voters
            .iter()
            .filter_map(|voter| {
                let vote = &event.votes[voter];
                if vote.support == outcome {
                    return None;
                }
                let amount = bps_of(vote.weight, self.slash_bps);
                (amount > 0).then(|| (voter.clone(), amount))
            })
            .collect();
        let (yes_weight, no_weight) = (event.yes_weight, event.no_weight);

        let event = self.events.get_mut(&id).expect("checked above");
        event.status = EventStatus::Resolved;
        event.outcome = Some(outcome);

        info!(event = %id, outcome, yes_weight, no_weight, "oracle event resolved");
        self.pending_events.push(OracleEngineEvent::EventResolved {
            id,
            outcome,
            yes_weight,
            no_weight,
        });
        let identity = self.identity.clone();
        for (voter, amount) in penalties {
            let reason = format!("minority vote on event {id}");
            let applied = staking.slash_stake(&identity, &voter, amount, &reason, token)?;
            if applied > 0 {
                self.pending_events.push(OracleEngineEvent::MinoritySlashed {
                    id,
                    voter,
                    amount: applied,
                });
            }
        }
        Ok(outcome)
    }

    /// Flag an event as under dispute. Deliberately not gated on the current
    /// status; the caller (the appeals engine) enforces its own precondition
    /// that only resolved events can be challenged.
    pub fn mark_disputed(&mut self, caller: &Address, id: EntityId) -> Result<(), OracleError> {
        self.require_privileged(caller)?;
        let event = self.events.get_mut(&id).ok_or(OracleError::NotFound(id))?;
        event.status = EventStatus::Disputed;
        self.pending_events.push(OracleEngineEvent::EventDisputed { id });
        Ok(())
    }

    /// Conclude a dispute on an event: restore it to `Resolved`, flipping the
    /// recorded outcome when the dispute overturned the original decision.
    pub fn apply_dispute_outcome(
        &mut self,
        caller: &Address,
        id: EntityId,
        overturned: bool,
    ) -> Result<(), OracleError> {
        self.require_privileged(caller)?;
        let event = self.events.get_mut(&id).ok_or(OracleError::NotFound(id))?;
        if event.status != EventStatus::Disputed {
            return Err(OracleError::InvalidStatus {
                id,
                status: event.status.name(),
                expected: EventStatus::Disputed.name(),
            });
        }
        if overturned {
            event.outcome = event.outcome.map(|o| !o);
        }
        event.status = EventStatus::Resolved;
        let outcome = event.outcome.unwrap_or(false);
        info!(event = %id, overturned, outcome, "dispute outcome applied");
        self.pending_events.push(OracleEngineEvent::DisputeOutcomeApplied {
            id,
            overturned,
            outcome,
        });
        Ok(())
    }

    /// Cancel an event that is still in its voting window.
    pub fn cancel_event(&mut self, caller: &Address, id: EntityId) -> Result<(), OracleError> {
        self.require_privileged(caller)?;
        let event = self.events.get_mut(&id).ok_or(OracleError::NotFound(id))?;
        if event.status != EventStatus::Voting {
            return Err(OracleError::InvalidStatus {
                id,
                status: event.status.name(),
                expected: EventStatus::Voting.name(),
            });
        }
        event.status = EventStatus::Cancelled;
        self.pending_events.push(OracleEngineEvent::EventCancelled { id });
        Ok(())
    }

    /// Change quorum, slash fraction and minimum period for future calls.
    pub fn update_parameters(
        &mut self,
        caller: &Address,
        quorum_bps: u32,
        slash_bps: u32,
        min_voting_period_secs: u64,
    ) -> Result<(), OracleError> {
        if *caller != self.admin {
            return Err(OracleError::Unauthorized(caller.to_string()));
        }
        self.quorum_bps = quorum_bps;
        self.slash_bps = slash_bps;
        self.min_voting_period_secs = min_voting_period_secs;
        self.pending_events.push(OracleEngineEvent::ParametersUpdated {
            quorum_bps,
            slash_bps,
            min_voting_period_secs,
        });
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn get_event(&self, id: EntityId) -> Option<&OracleEvent> {
        self.events.get(&id)
    }

    pub fn drain_events(&mut self) -> Vec<OracleEngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> OracleSnapshot {
        OracleSnapshot {
            admin: self.admin.clone(),
            identity: self.identity.clone(),
            controllers: self.controllers.clone(),
            events: self.events.clone(),
            quorum_bps: self.quorum_bps,
            slash_bps: self.slash_bps,
            min_voting_period_secs: self.min_voting_period_secs,
        }
    }

    pub fn restore(snapshot: OracleSnapshot) -> Self {
        Self {
            admin: snapshot.admin,
            identity: snapshot.identity,
            controllers: snapshot.controllers,
            events: snapshot.events,
            quorum_bps: snapshot.quorum_bps,
            slash_bps: snapshot.slash_bps,
            min_voting_period_secs: snapshot.min_voting_period_secs,
            pending_events: Vec::new(),
        }
    }
}

/// Serializable snapshot of engine state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub admin: Address,
    pub identity: Address,
    pub controllers: HashSet<Address>,
    pub events: HashMap<EntityId, OracleEvent>,
    pub quorum_bps: u32,
    pub slash_bps: u32,
    pub min_voting_period_secs: u64,
}
