//! The Poline node — owns and wires every protocol engine.

use crate::error::NodeError;
use crate::token::InMemoryTokenLedger;
use poline_circles::{CircleEvent, CircleRegistry, CircleSnapshot};
use poline_dao::{DaoEvent, DaoSnapshot, PolineDao};
use poline_disputes::{DisputeEngineEvent, DisputeResolution, DisputeSnapshot};
use poline_oracle::{OracleEngineEvent, OracleSnapshot, OracleVoting};
use poline_staking::{StakeEvent, StakingEngine, StakingSnapshot};
use poline_types::{Address, ProtocolParams};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Identity under which the event resolution engine calls the stake ledger.
const ORACLE_IDENTITY: &str = "pln_oracle_engine";
/// Identity under which the appeals engine calls its peers.
const APPEALS_IDENTITY: &str = "pln_appeals_engine";
/// Role allowed to execute queued proposals.
const EXECUTOR_IDENTITY: &str = "pln_executor";

/// One entry of the merged audit log.
///
/// Replaying these in order reconstructs the terminal state of every entity
/// without reading any engine's mutable state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    Stake(StakeEvent),
    Circle(CircleEvent),
    Oracle(OracleEngineEvent),
    Dispute(DisputeEngineEvent),
    Dao(DaoEvent),
}

/// All five engines plus the token ledger, wired for cross-component calls.
pub struct PolineNode {
    pub staking: StakingEngine,
    pub circles: CircleRegistry,
    pub oracle: OracleVoting,
    pub disputes: DisputeResolution,
    pub dao: PolineDao,
    pub token: InMemoryTokenLedger,
    params: ProtocolParams,
}

impl PolineNode {
    /// Construct a node with freshly wired engines: the oracle and appeals
    /// identities are authorized as slashers, and the appeals identity as an
    /// oracle controller.
    pub fn new(admin: Address, params: ProtocolParams) -> Result<Self, NodeError> {
        let oracle_identity = Address::new(ORACLE_IDENTITY);
        let appeals_identity = Address::new(APPEALS_IDENTITY);
        let executor_identity = Address::new(EXECUTOR_IDENTITY);

        let mut staking = StakingEngine::new(admin.clone(), &params);
        let circles = CircleRegistry::new(admin.clone());
        let mut oracle = OracleVoting::new(admin.clone(), oracle_identity.clone(), &params);
        let disputes = DisputeResolution::new(admin.clone(), appeals_identity.clone(), &params);
        let dao = PolineDao::new(admin.clone(), executor_identity, &params);

        staking.authorize_slasher(&admin, oracle_identity)?;
        staking.authorize_slasher(&admin, appeals_identity.clone())?;
        oracle.authorize_controller(&admin, appeals_identity)?;

        info!("poline node wired");
        Ok(Self {
            staking,
            circles,
            oracle,
            disputes,
            dao,
            token: InMemoryTokenLedger::new(),
            params,
        })
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// The address allowed to execute queued proposals.
    pub fn executor_role() -> Address {
        Address::new(EXECUTOR_IDENTITY)
    }

    /// Drain every engine's pending notifications into one merged log,
    /// grouped per engine in a fixed order.
    pub fn drain_audit_log(&mut self) -> Vec<AuditEvent> {
        let mut log = Vec::new();
        log.extend(self.staking.drain_events().into_iter().map(AuditEvent::Stake));
        log.extend(self.circles.drain_events().into_iter().map(AuditEvent::Circle));
        log.extend(self.oracle.drain_events().into_iter().map(AuditEvent::Oracle));
        log.extend(self.disputes.drain_events().into_iter().map(AuditEvent::Dispute));
        log.extend(self.dao.drain_events().into_iter().map(AuditEvent::Dao));
        log
    }

    /// Serialize the full protocol state.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            params: self.params.clone(),
            staking: self.staking.snapshot(),
            circles: self.circles.snapshot(),
            oracle: self.oracle.snapshot(),
            disputes: self.disputes.snapshot(),
            dao: self.dao.snapshot(),
            token: self.token.clone(),
        }
    }

    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, NodeError> {
        Ok(bincode::serialize(&self.snapshot())?)
    }

    /// Rebuild a node from a snapshot. Authorization wiring is part of each
    /// engine's snapshot, so nothing is re-registered here.
    pub fn restore(snapshot: NodeSnapshot) -> Self {
        Self {
            params: snapshot.params,
            staking: StakingEngine::restore(snapshot.staking),
            circles: CircleRegistry::restore(snapshot.circles),
            oracle: OracleVoting::restore(snapshot.oracle),
            disputes: DisputeResolution::restore(snapshot.disputes),
            dao: PolineDao::restore(snapshot.dao),
            token: snapshot.token,
        }
    }

    pub fn restore_bytes(bytes: &[u8]) -> Result<Self, NodeError> {
        Ok(Self::restore(bincode::deserialize(bytes)?))
    }
}

/// Serializable snapshot of the whole protocol.
#[derive(Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub params: ProtocolParams,
    pub staking: StakingSnapshot,
    pub circles: CircleSnapshot,
    pub oracle: OracleSnapshot,
    pub disputes: DisputeSnapshot,
    pub dao: DaoSnapshot,
    pub token: InMemoryTokenLedger,
}
