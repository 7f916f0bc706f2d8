//! The governance engine.

use crate::error::DaoError;
use crate::executor::ProposalExecutor;
use crate::proposal::{Proposal, ProposalStatus, ProposalType, ProposalVote, VoteSupport};
use poline_circles::CircleRegistry;
use poline_staking::{StakingEngine, TokenLedger};
use poline_types::{Address, EntityId, ProtocolParams, Timestamp};
use poline_utils::math::bps_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Notifications emitted by the governance engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoEvent {
    ProposalCreated {
        id: EntityId,
        proposer: Address,
        circle: EntityId,
        proposal_type: ProposalType,
        voting_ends: Timestamp,
    },
    VoteCast {
        id: EntityId,
        voter: Address,
        support: VoteSupport,
        weight: u128,
    },
    ProposalDefeated {
        id: EntityId,
        for_weight: u128,
        against_weight: u128,
        quorum_reached: bool,
    },
    ProposalQueued {
        id: EntityId,
        execution_time: Timestamp,
    },
    ProposalExecuted {
        id: EntityId,
    },
    ProposalExecutionFailed {
        id: EntityId,
        reason: String,
    },
    ProposalCancelled {
        id: EntityId,
        by: Address,
    },
    ParametersUpdated {
        proposal_threshold: u128,
        quorum_bps: u32,
        min_voting_period_secs: u64,
        timelock_delay_secs: u64,
    },
}

/// Proposal lifecycle with circle gating, token-power voting, and timelocked
/// execution.
pub struct PolineDao {
    admin: Address,
    /// Only this role (or the admin) may execute queued proposals.
    executor_role: Address,
    proposals: HashMap<EntityId, Proposal>,
    proposal_threshold: u128,
    quorum_bps: u32,
    min_voting_period_secs: u64,
    timelock_delay_secs: u64,
    pending_events: Vec<DaoEvent>,
}

impl PolineDao {
    pub fn new(admin: Address, executor_role: Address, params: &ProtocolParams) -> Self {
        Self {
            admin,
            executor_role,
            proposals: HashMap::new(),
            proposal_threshold: params.proposal_threshold,
            quorum_bps: params.proposal_quorum_bps,
            min_voting_period_secs: params.min_proposal_voting_period_secs,
            timelock_delay_secs: params.timelock_delay_secs,
            pending_events: Vec::new(),
        }
    }

    /// Submit a proposal through a circle whose scope covers its type.
    ///
    /// All preconditions — membership, scope, voting-power threshold — are
    /// checked before any state is created; a rejected proposal leaves no
    /// trace.
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        proposer: &Address,
        circle_id: EntityId,
        proposal_type: ProposalType,
        description: &str,
        target: Address,
        payload: Vec<u8>,
        voting_period_secs: u64,
        now: Timestamp,
        circles: &CircleRegistry,
        token: &dyn TokenLedger,
    ) -> Result<EntityId, DaoError> {
        if description.trim().is_empty() {
            return Err(DaoError::EmptyDescription);
        }
        let circle = circles
            .circle(circle_id)
            .ok_or(DaoError::CircleNotFound(circle_id))?;
        if !circle.active {
            return Err(DaoError::CircleInactive(circle_id));
        }
        if !circle.is_member(proposer) {
            return Err(DaoError::NotCircleMember {
                circle: circle_id,
                proposer: proposer.to_string(),
            });
        }
        let scope = proposal_type.scope();
        if !circle.scopes.contains(scope) {
            return Err(DaoError::ScopeNotCovered {
                circle: circle_id,
                scope,
            });
        }
        let power = token.get_votes(proposer);
        if power < self.proposal_threshold {
            return Err(DaoError::InsufficientVotingPower {
                required: self.proposal_threshold,
                held: power,
            });
        }
        let id = EntityId::derive("proposal", description.as_bytes(), proposer, now);
        if self.proposals.contains_key(&id) {
            return Err(DaoError::DuplicateProposal(id));
        }

        let period = voting_period_secs.max(self.min_voting_period_secs);
        let voting_ends = now.plus_secs(period);
        self.proposals.insert(
            id,
            Proposal {
                id,
                proposer: proposer.clone(),
                circle_id,
                proposal_type,
                description: description.to_string(),
                target,
                payload,
                created_at: now,
                voting_starts: now,
                voting_ends,
                for_weight: 0,
                against_weight: 0,
                abstain_weight: 0,
                status: ProposalStatus::Active,
                execution_time: None,
                last_execution_error: None,
                votes: HashMap::new(),
                voters: Vec::new(),
            },
        );
        info!(proposal = %id, proposer = %proposer, ?proposal_type, "proposal created");
        self.pending_events.push(DaoEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            circle: circle_id,
            proposal_type,
            voting_ends,
        });
        Ok(id)
    }

    /// Cast a for/against/abstain vote. Weight is the voter's token voting
    /// power at cast time, frozen into the vote.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: EntityId,
        support: VoteSupport,
        now: Timestamp,
        token: &dyn TokenLedger,
    ) -> Result<(), DaoError> {
        let proposal = self.proposals.get_mut(&id).ok_or(DaoError::NotFound(id))?;
        if proposal.status != ProposalStatus::Active {
            return Err(DaoError::InvalidStatus {
                id,
                status: proposal.status.name(),
                expected: ProposalStatus::Active.name(),
            });
        }
        if now > proposal.voting_ends {
            return Err(DaoError::VotingClosed(id));
        }
        if proposal.has_voted(voter) {
            return Err(DaoError::AlreadyVoted {
                id,
                voter: voter.to_string(),
            });
        }

        let weight = token.get_votes(voter);
        match support {
            VoteSupport::For => proposal.for_weight = proposal.for_weight.saturating_add(weight),
            VoteSupport::Against => {
                proposal.against_weight = proposal.against_weight.saturating_add(weight)
            }
            VoteSupport::Abstain => {
                proposal.abstain_weight = proposal.abstain_weight.saturating_add(weight)
            }
        }
        proposal
            .votes
            .insert(voter.clone(), ProposalVote { support, weight });
        proposal.voters.push(voter.clone());

        self.pending_events.push(DaoEvent::VoteCast {
            id,
            voter: voter.clone(),
            support,
            weight,
        });
        Ok(())
    }

    /// Close voting on a proposal. Quorum counts all three buckets against
    /// the LIVE total stake; failing quorum is a terminal transition to
    /// `Defeated` even though it is also reported as an error on this call.
    /// A quorate proposal is defeated when against ≥ for, otherwise queued
    /// behind the timelock. Returns true when queued.
    pub fn queue(
        &mut self,
        id: EntityId,
        now: Timestamp,
        staking: &StakingEngine,
    ) -> Result<bool, DaoError> {
        let proposal = self.proposals.get_mut(&id).ok_or(DaoError::NotFound(id))?;
        if proposal.status != ProposalStatus::Active {
            return Err(DaoError::InvalidStatus {
                id,
                status: proposal.status.name(),
                expected: ProposalStatus::Active.name(),
            });
        }
        if now <= proposal.voting_ends {
            return Err(DaoError::VotingStillOpen {
                id,
                remaining_secs: proposal
                    .voting_ends
                    .as_secs()
                    .saturating_sub(now.as_secs())
                    .saturating_add(1),
            });
        }

        let participating = proposal.participating_weight();
        let required = bps_of(staking.total_staked(), self.quorum_bps);
        if participating < required {
            proposal.status = ProposalStatus::Defeated;
            let (for_weight, against_weight) = (proposal.for_weight, proposal.against_weight);
            self.pending_events.push(DaoEvent::ProposalDefeated {
                id,
                for_weight,
                against_weight,
                quorum_reached: false,
            });
            return Err(DaoError::QuorumNotReached {
                id,
                participating,
                required,
            });
        }

        if proposal.against_weight >= proposal.for_weight {
            proposal.status = ProposalStatus::Defeated;
            let (for_weight, against_weight) = (proposal.for_weight, proposal.against_weight);
            info!(proposal = %id, for_weight, against_weight, "proposal defeated");
            self.pending_events.push(DaoEvent::ProposalDefeated {
                id,
                for_weight,
                against_weight,
                quorum_reached: true,
            });
            return Ok(false);
        }

        let execution_time = now.plus_secs(self.timelock_delay_secs);
        proposal.status = ProposalStatus::Queued;
        proposal.execution_time = Some(execution_time);
        info!(proposal = %id, execution_time = %execution_time, "proposal queued");
        self.pending_events.push(DaoEvent::ProposalQueued { id, execution_time });
        Ok(true)
    }

    /// Execute a queued proposal after its timelock. A failed target call
    /// moves the proposal to `ExecutionFailed`, from which execution may be
    /// retried.
    pub fn execute(
        &mut self,
        caller: &Address,
        id: EntityId,
        now: Timestamp,
        executor: &mut dyn ProposalExecutor,
    ) -> Result<(), DaoError> {
        if *caller != self.executor_role && *caller != self.admin {
            return Err(DaoError::Unauthorized(caller.to_string()));
        }
        let proposal = self.proposals.get_mut(&id).ok_or(DaoError::NotFound(id))?;
        if !matches!(
            proposal.status,
            ProposalStatus::Queued | ProposalStatus::ExecutionFailed
        ) {
            return Err(DaoError::InvalidStatus {
                id,
                status: proposal.status.name(),
                expected: ProposalStatus::Queued.name(),
            });
        }
        let execution_time = proposal
            .execution_time
            .expect("queued proposal has an execution time");
        if now < execution_time {
            return Err(DaoError::TimelockNotElapsed {
                id,
                remaining_secs: execution_time.as_secs().saturating_sub(now.as_secs()),
            });
        }

        match executor.execute(&proposal.target, &proposal.payload) {
            Ok(()) => {
                proposal.status = ProposalStatus::Executed;
                proposal.last_execution_error = None;
                info!(proposal = %id, "proposal executed");
                self.pending_events.push(DaoEvent::ProposalExecuted { id });
                Ok(())
            }
            Err(reason) => {
                proposal.status = ProposalStatus::ExecutionFailed;
                proposal.last_execution_error = Some(reason.clone());
                warn!(proposal = %id, reason, "proposal execution failed");
                self.pending_events.push(DaoEvent::ProposalExecutionFailed {
                    id,
                    reason: reason.clone(),
                });
                Err(DaoError::ExecutionFailed { id, reason })
            }
        }
    }

    /// Cancel a proposal from any non-terminal state. Allowed to the proposer
    /// and the admin, at any time including mid-vote.
    pub fn cancel(&mut self, caller: &Address, id: EntityId) -> Result<(), DaoError> {
        let proposal = self.proposals.get_mut(&id).ok_or(DaoError::NotFound(id))?;
        if *caller != proposal.proposer && *caller != self.admin {
            return Err(DaoError::Unauthorized(caller.to_string()));
        }
        if proposal.status.is_terminal() {
            return Err(DaoError::InvalidStatus {
                id,
                status: proposal.status.name(),
                expected: "a non-terminal status",
            });
        }
        proposal.status = ProposalStatus::Cancelled;
        info!(proposal = %id, by = %caller, "proposal cancelled");
        self.pending_events.push(DaoEvent::ProposalCancelled {
            id,
            by: caller.clone(),
        });
        Ok(())
    }

    /// Change governance parameters for future calls.
    pub fn update_parameters(
        &mut self,
        caller: &Address,
        proposal_threshold: u128,
        quorum_bps: u32,
        min_voting_period_secs: u64,
        timelock_delay_secs: u64,
    ) -> Result<(), DaoError> {
        if *caller != self.admin {
            return Err(DaoError::Unauthorized(caller.to_string()));
        }
        self.proposal_threshold = proposal_threshold;
        self.quorum_bps = quorum_bps;
        self.min_voting_period_secs = min_voting_period_secs;
        self.timelock_delay_secs = timelock_delay_secs;
        self.pending_events.push(DaoEvent::ParametersUpdated {
            proposal_threshold,
            quorum_bps,
            min_voting_period_secs,
            timelock_delay_secs,
        });
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn get_proposal(&self, id: EntityId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn drain_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> DaoSnapshot {
        DaoSnapshot {
            admin: self.admin.clone(),
            executor_role: self.executor_role.clone(),
            proposals: self.proposals.clone(),
            proposal_threshold: self.proposal_threshold,
            quorum_bps: self.quorum_bps,
            min_voting_period_secs: self.min_voting_period_secs,
            timelock_delay_secs: self.timelock_delay_secs,
        }
    }

    pub fn restore(snapshot: DaoSnapshot) -> Self {
        Self {
            admin: snapshot.admin,
            executor_role: snapshot.executor_role,
            proposals: snapshot.proposals,
            proposal_threshold: snapshot.proposal_threshold,
            quorum_bps: snapshot.quorum_bps,
            min_voting_period_secs: snapshot.min_voting_period_secs,
            timelock_delay_secs: snapshot.timelock_delay_secs,
            pending_events: Vec::new(),
        }
    }
}

/// Serializable snapshot of engine state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaoSnapshot {
    pub admin: Address,
    pub executor_role: Address,
    pub proposals: HashMap<EntityId, Proposal>,
    pub proposal_threshold: u128,
    pub quorum_bps: u32,
    pub min_voting_period_secs: u64,
    pub timelock_delay_secs: u64,
}
