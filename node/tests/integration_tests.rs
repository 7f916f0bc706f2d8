//! Integration tests exercising the full protocol across engine boundaries:
//! staking → circles → oracle voting → disputes → governance, wired the way
//! `PolineNode` wires them in production.

use poline_circles::CircleEvent;
use poline_dao::{ProposalExecutor, ProposalStatus, ProposalType, VoteSupport};
use poline_disputes::DisputeStatus;
use poline_node::{AuditEvent, PolineNode};
use poline_oracle::{EventStatus, OracleEngineEvent};
use poline_staking::{StakeEvent, TokenLedger};
use poline_types::{Address, EntityId, ProposalScope, ProtocolParams, ScopeSet, Timestamp};
use std::collections::HashMap;

const DAY: u64 = 24 * 3600;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn addr(s: &str) -> Address {
    Address::new(format!("pln_{s}"))
}

fn admin() -> Address {
    addr("admin")
}

fn ts(secs: u64) -> Timestamp {
    Timestamp::new(secs)
}

fn make_node() -> PolineNode {
    PolineNode::new(admin(), ProtocolParams::poline_defaults()).expect("wire node")
}

/// Node with a lowered oracle minimum so small test stakes remain eligible.
fn make_node_min_stake(minimum_stake: u128) -> PolineNode {
    let params = ProtocolParams {
        minimum_stake,
        ..ProtocolParams::poline_defaults()
    };
    PolineNode::new(admin(), params).expect("wire node")
}

fn stake(node: &mut PolineNode, who: &str, amount: u128) -> Address {
    let a = addr(who);
    node.staking.stake(&a, amount, ts(0)).unwrap();
    a
}

#[derive(Default)]
struct RecordingExecutor {
    fail: bool,
    calls: Vec<(Address, Vec<u8>)>,
}

impl ProposalExecutor for RecordingExecutor {
    fn execute(&mut self, target: &Address, payload: &[u8]) -> Result<(), String> {
        self.calls.push((target.clone(), payload.to_vec()));
        if self.fail {
            Err("target unavailable".to_string())
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Oracle eligibility at the exact minimum
// ---------------------------------------------------------------------------

#[test]
fn exact_minimum_stake_grants_then_one_unit_slash_revokes_oracle_status() {
    let mut node = make_node();
    let alice = stake(&mut node, "alice", 100); // exactly minimum_stake
    assert!(node.staking.is_oracle(&alice));

    node.staking
        .slash_stake(&admin(), &alice, 1, "probe", &mut node.token)
        .unwrap();
    assert!(!node.staking.is_oracle(&alice));
    assert_eq!(node.staking.stake_of(&alice), 99);
}

// ---------------------------------------------------------------------------
// 2. Event resolution with quorum against the live total
// ---------------------------------------------------------------------------

#[test]
fn event_resolves_yes_and_slashes_the_minority_voter() {
    let mut node = make_node_min_stake(50);
    let yes_voter = stake(&mut node, "alice", 100);
    let no_voter = stake(&mut node, "bob", 60);
    stake(&mut node, "bystander", 340); // totalStaked = 500, 30% quorum = 150

    let event = node
        .oracle
        .create_event(&admin(), "harvest succeeded", DAY, ts(0))
        .unwrap();
    node.oracle
        .cast_vote(&yes_voter, event, true, ts(1), &node.staking)
        .unwrap();
    node.oracle
        .cast_vote(&no_voter, event, false, ts(2), &node.staking)
        .unwrap();

    // Participation 160 ≥ 150: quorum passes.
    let outcome = node
        .oracle
        .resolve_event(&admin(), event, ts(DAY + 1), &mut node.staking, &mut node.token)
        .unwrap();
    assert!(outcome);

    // The losing voter forfeits 10% of the 60-weight snapshot.
    assert_eq!(node.staking.stake_of(&no_voter), 54);
    assert_eq!(node.staking.stake_of(&yes_voter), 100);
    assert_eq!(node.staking.total_staked(), 494);

    let record = node.oracle.get_event(event).unwrap();
    assert_eq!(record.status, EventStatus::Resolved);
    assert_eq!(record.outcome, Some(true));
}

#[test]
fn staking_after_votes_were_cast_can_break_quorum() {
    let mut node = make_node();
    let voter = stake(&mut node, "alice", 150);
    stake(&mut node, "bystander", 350); // total 500, quorum 150

    let event = node.oracle.create_event(&admin(), "flood", DAY, ts(0)).unwrap();
    node.oracle
        .cast_vote(&voter, event, true, ts(1), &node.staking)
        .unwrap();

    // Quorum is computed against the total at resolution time: a large stake
    // arriving after the vote raises the bar above the cast participation.
    stake(&mut node, "latecomer", 1000);
    let result = node
        .oracle
        .resolve_event(&admin(), event, ts(DAY + 1), &mut node.staking, &mut node.token);
    assert!(result.is_err());
    assert_eq!(node.oracle.get_event(event).unwrap().status, EventStatus::Voting);
}

// ---------------------------------------------------------------------------
// 3. Disputes and escalation
// ---------------------------------------------------------------------------

/// A resolved event (outcome Yes) on a node with lowered minimum stake.
fn resolved_event(node: &mut PolineNode) -> EntityId {
    let voter = stake(node, "original_voter", 1000);
    let event = node.oracle.create_event(&admin(), "drought", DAY, ts(0)).unwrap();
    node.oracle
        .cast_vote(&voter, event, true, ts(1), &node.staking)
        .unwrap();
    node.oracle
        .resolve_event(&admin(), event, ts(DAY + 1), &mut node.staking, &mut node.token)
        .unwrap();
    event
}

#[test]
fn dispute_overturns_event_and_slashes_round_one_losers_fifteen_percent() {
    let mut node = make_node();
    let event = resolved_event(&mut node);

    let challenger = stake(&mut node, "challenger", 600);
    let dispute = node
        .disputes
        .open_dispute(&challenger, event, ts(DAY + 2), &node.staking, &mut node.oracle)
        .unwrap();
    assert_eq!(node.oracle.get_event(event).unwrap().status, EventStatus::Disputed);

    let overturner = stake(&mut node, "overturner", 300);
    let upholder = stake(&mut node, "upholder", 100);
    node.disputes
        .cast_vote(&overturner, dispute, true, ts(DAY + 3), &node.staking)
        .unwrap();
    node.disputes
        .cast_vote(&upholder, dispute, false, ts(DAY + 3), &node.staking)
        .unwrap();

    let overturned = node
        .disputes
        .resolve_dispute(
            &admin(),
            dispute,
            ts(DAY + 2 + 3 * DAY + 1),
            &mut node.staking,
            &mut node.oracle,
            &mut node.token,
        )
        .unwrap();
    assert!(overturned);

    // 300 overturn vs 100 uphold: the upholder loses 15% of weight in round 1.
    assert_eq!(node.staking.stake_of(&upholder), 85);
    assert_eq!(node.staking.stake_of(&challenger), 600);

    let record = node.oracle.get_event(event).unwrap();
    assert_eq!(record.status, EventStatus::Resolved);
    assert_eq!(record.outcome, Some(false)); // flipped from Yes

    // Escalating to round 2 demands 1.5x the prior challenge stake.
    let short = stake(&mut node, "short", 700);
    let result = node
        .disputes
        .escalate_dispute(&short, dispute, ts(DAY + 2 + 3 * DAY + 1), &node.staking, &mut node.oracle);
    assert!(result.is_err());

    let escalator = stake(&mut node, "escalator", 800);
    let round = node
        .disputes
        .escalate_dispute(&escalator, dispute, ts(DAY + 2 + 3 * DAY + 1), &node.staking, &mut node.oracle)
        .unwrap();
    assert_eq!(round, 2);
    assert_eq!(node.disputes.get_dispute(dispute).unwrap().challenge_stake, 750);
    assert_eq!(node.oracle.get_event(event).unwrap().status, EventStatus::Disputed);
}

#[test]
fn failed_challenge_costs_half_the_challenge_stake() {
    let mut node = make_node();
    let event = resolved_event(&mut node);
    let challenger = stake(&mut node, "challenger", 600);
    let dispute = node
        .disputes
        .open_dispute(&challenger, event, ts(DAY + 2), &node.staking, &mut node.oracle)
        .unwrap();

    let upholder = stake(&mut node, "upholder", 400);
    node.disputes
        .cast_vote(&upholder, dispute, false, ts(DAY + 3), &node.staking)
        .unwrap();

    let overturned = node
        .disputes
        .resolve_dispute(
            &admin(),
            dispute,
            ts(DAY + 2 + 3 * DAY + 1),
            &mut node.staking,
            &mut node.oracle,
            &mut node.token,
        )
        .unwrap();
    assert!(!overturned);
    assert_eq!(node.staking.stake_of(&challenger), 350); // lost 500 / 2
    assert_eq!(node.disputes.get_dispute(dispute).unwrap().status, DisputeStatus::Resolved);
    assert_eq!(node.oracle.get_event(event).unwrap().outcome, Some(true));
}

// ---------------------------------------------------------------------------
// 4. Governance lifecycle
// ---------------------------------------------------------------------------

fn governors_circle(node: &mut PolineNode) -> EntityId {
    node.circles
        .create_circle(
            &admin(),
            "governors",
            ScopeSet::single(ProposalScope::Governance).with(ProposalScope::Community),
            0,
            ts(0),
        )
        .unwrap()
}

#[test]
fn below_threshold_proposal_is_rejected_with_no_state() {
    let mut node = make_node();
    let circle = governors_circle(&mut node);
    let alice = addr("alice");
    node.circles.add_member(&admin(), circle, alice.clone()).unwrap();
    node.token.mint(&alice, 99, "grant"); // threshold is 100

    let result = node.dao.propose(
        &alice,
        circle,
        ProposalType::General,
        "plant trees",
        addr("treasury"),
        vec![],
        3 * DAY,
        ts(0),
        &node.circles,
        &node.token,
    );
    assert!(result.is_err());
    assert!(node
        .drain_audit_log()
        .iter()
        .all(|e| !matches!(e, AuditEvent::Dao(_))));
}

#[test]
fn proposal_runs_from_submission_through_timelocked_execution() {
    let mut node = make_node();
    let circle = governors_circle(&mut node);
    let alice = addr("alice");
    let bob = addr("bob");
    node.circles.add_member(&admin(), circle, alice.clone()).unwrap();
    node.token.mint(&alice, 600, "grant");
    node.token.mint(&bob, 200, "grant");
    stake(&mut node, "whale", 1000); // quorum denominator: 30% = 300

    let id = node
        .dao
        .propose(
            &alice,
            circle,
            ProposalType::CommunityFund,
            "fund the seed library",
            addr("treasury"),
            vec![0xAA],
            3 * DAY,
            ts(0),
            &node.circles,
            &node.token,
        )
        .unwrap();

    node.dao
        .cast_vote(&alice, id, VoteSupport::For, ts(1), &node.token)
        .unwrap();
    node.dao
        .cast_vote(&bob, id, VoteSupport::Against, ts(1), &node.token)
        .unwrap();

    let close = ts(3 * DAY + 1);
    assert!(node.dao.queue(id, close, &node.staking).unwrap());

    let mut executor = RecordingExecutor::default();
    let execute_at = close.plus_secs(2 * DAY);
    node.dao
        .execute(&PolineNode::executor_role(), id, execute_at, &mut executor)
        .unwrap();

    assert_eq!(node.dao.get_proposal(id).unwrap().status, ProposalStatus::Executed);
    assert_eq!(executor.calls, vec![(addr("treasury"), vec![0xAA])]);
}

#[test]
fn failed_execution_can_be_retried() {
    let mut node = make_node();
    let circle = governors_circle(&mut node);
    let alice = addr("alice");
    node.circles.add_member(&admin(), circle, alice.clone()).unwrap();
    node.token.mint(&alice, 600, "grant");
    stake(&mut node, "whale", 1000);

    let id = node
        .dao
        .propose(
            &alice,
            circle,
            ProposalType::General,
            "rotate the signers",
            addr("registry"),
            vec![],
            3 * DAY,
            ts(0),
            &node.circles,
            &node.token,
        )
        .unwrap();
    node.dao
        .cast_vote(&alice, id, VoteSupport::For, ts(1), &node.token)
        .unwrap();
    node.dao.queue(id, ts(3 * DAY + 1), &node.staking).unwrap();
    let execute_at = ts(3 * DAY + 1 + 2 * DAY);

    let mut executor = RecordingExecutor { fail: true, ..Default::default() };
    assert!(node
        .dao
        .execute(&PolineNode::executor_role(), id, execute_at, &mut executor)
        .is_err());
    assert_eq!(
        node.dao.get_proposal(id).unwrap().status,
        ProposalStatus::ExecutionFailed
    );

    executor.fail = false;
    node.dao
        .execute(&PolineNode::executor_role(), id, execute_at, &mut executor)
        .unwrap();
    assert_eq!(node.dao.get_proposal(id).unwrap().status, ProposalStatus::Executed);
}

// ---------------------------------------------------------------------------
// 5. Audit log replay and snapshots
// ---------------------------------------------------------------------------

#[test]
fn audit_log_replay_reconstructs_stake_and_event_state() {
    let mut node = make_node_min_stake(50);
    let yes_voter = stake(&mut node, "alice", 100);
    let no_voter = stake(&mut node, "bob", 60);
    stake(&mut node, "bystander", 340);

    let event = node.oracle.create_event(&admin(), "storm", DAY, ts(0)).unwrap();
    node.oracle
        .cast_vote(&yes_voter, event, true, ts(1), &node.staking)
        .unwrap();
    node.oracle
        .cast_vote(&no_voter, event, false, ts(2), &node.staking)
        .unwrap();
    node.oracle
        .resolve_event(&admin(), event, ts(DAY + 1), &mut node.staking, &mut node.token)
        .unwrap();

    // Replay the merged log into a naive model without reading engine state.
    let mut stakes: HashMap<Address, u128> = HashMap::new();
    let mut outcomes: HashMap<EntityId, bool> = HashMap::new();
    for entry in node.drain_audit_log() {
        match entry {
            AuditEvent::Stake(StakeEvent::Staked { who, new_stake, .. }) => {
                stakes.insert(who, new_stake);
            }
            AuditEvent::Stake(StakeEvent::Slashed { who, remaining, .. }) => {
                stakes.insert(who, remaining);
            }
            AuditEvent::Stake(StakeEvent::Unstaked { who, .. }) => {
                stakes.insert(who, 0);
            }
            AuditEvent::Oracle(OracleEngineEvent::EventResolved { id, outcome, .. })
            | AuditEvent::Oracle(OracleEngineEvent::DisputeOutcomeApplied { id, outcome, .. }) => {
                outcomes.insert(id, outcome);
            }
            _ => {}
        }
    }

    for (who, amount) in &stakes {
        assert_eq!(node.staking.stake_of(who), *amount);
    }
    assert_eq!(
        outcomes[&event],
        node.oracle.get_event(event).unwrap().outcome.unwrap()
    );
}

#[test]
fn snapshot_roundtrip_preserves_cross_engine_wiring() {
    let mut node = make_node();
    let event = resolved_event(&mut node);
    let challenger = stake(&mut node, "challenger", 600);
    node.disputes
        .open_dispute(&challenger, event, ts(DAY + 2), &node.staking, &mut node.oracle)
        .unwrap();
    let circle = governors_circle(&mut node);
    let alice = addr("alice");
    node.circles.add_member(&admin(), circle, alice.clone()).unwrap();

    let bytes = node.snapshot_bytes().unwrap();
    let mut restored = PolineNode::restore_bytes(&bytes).unwrap();

    assert_eq!(restored.staking.total_staked(), node.staking.total_staked());
    assert_eq!(
        restored.oracle.get_event(event).unwrap().status,
        EventStatus::Disputed
    );
    assert!(restored.circles.is_member(circle, &alice));
    assert!(restored
        .circles
        .drain_events()
        .is_empty());

    // The restored appeals engine can still drive the restored oracle: its
    // controller authorization survived the round-trip.
    let dispute = restored.disputes.dispute_for_event(event).unwrap().id;
    restored
        .disputes
        .resolve_dispute(
            &admin(),
            dispute,
            ts(DAY + 2 + 3 * DAY + 1),
            &mut restored.staking,
            &mut restored.oracle,
            &mut restored.token,
        )
        .unwrap();
}

#[test]
fn circle_membership_events_are_audited() {
    let mut node = make_node();
    let circle = governors_circle(&mut node);
    let alice = addr("alice");
    node.circles.add_member(&admin(), circle, alice.clone()).unwrap();

    let log = node.drain_audit_log();
    assert!(log.iter().any(|e| matches!(
        e,
        AuditEvent::Circle(CircleEvent::MemberAdded { member, .. }) if *member == alice
    )));
}
