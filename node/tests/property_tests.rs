//! Property tests for the stake accounting and quorum invariants.

use poline_node::PolineNode;
use poline_types::{Address, ProtocolParams, Timestamp};
use proptest::prelude::*;

const DAY: u64 = 24 * 3600;
const ACCOUNTS: usize = 5;

fn addr(i: usize) -> Address {
    Address::new(format!("pln_user_{i}"))
}

fn admin() -> Address {
    Address::new("pln_admin")
}

/// One randomized mutation against the stake ledger.
#[derive(Clone, Debug)]
enum Op {
    Stake { who: usize, amount: u128 },
    Slash { who: usize, amount: u128 },
    RequestUnstake { who: usize },
    CompleteUnstake { who: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 1u128..10_000).prop_map(|(who, amount)| Op::Stake { who, amount }),
        (0..ACCOUNTS, 0u128..10_000).prop_map(|(who, amount)| Op::Slash { who, amount }),
        (0..ACCOUNTS).prop_map(|who| Op::RequestUnstake { who }),
        (0..ACCOUNTS).prop_map(|who| Op::CompleteUnstake { who }),
    ]
}

proptest! {
    /// The global total always equals the sum of individual stakes, and no
    /// slash ever drives a record negative.
    #[test]
    fn total_staked_equals_sum_of_amounts(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let params = ProtocolParams::poline_defaults();
        let mut node = PolineNode::new(admin(), params.clone()).unwrap();
        let mut now = Timestamp::new(0);

        for op in ops {
            now = now.plus_secs(1);
            match op {
                Op::Stake { who, amount } => {
                    node.staking.stake(&addr(who), amount, now).unwrap();
                }
                Op::Slash { who, amount } => {
                    let before = node.staking.stake_of(&addr(who));
                    let applied = node
                        .staking
                        .slash_stake(&admin(), &addr(who), amount, "test", &mut node.token)
                        .unwrap();
                    prop_assert_eq!(applied, amount.min(before));
                    prop_assert_eq!(node.staking.stake_of(&addr(who)), before - applied);
                }
                Op::RequestUnstake { who } => {
                    // Fails when there is no stake or a request is pending.
                    let _ = node.staking.request_unstake(&addr(who), now);
                }
                Op::CompleteUnstake { who } => {
                    now = now.plus_secs(params.unstake_cooldown_secs);
                    let _ = node.staking.complete_unstake(&addr(who), now);
                }
            }

            let sum: u128 = (0..ACCOUNTS).map(|i| node.staking.stake_of(&addr(i))).sum();
            prop_assert_eq!(node.staking.total_staked(), sum);
        }
    }

    /// Oracle eligibility reflects the amount at the most recent stake/slash
    /// mutation, measured against the minimum in force at that moment.
    #[test]
    fn oracle_flag_tracks_last_mutation(
        amounts in prop::collection::vec(1u128..300, 1..20),
        slashes in prop::collection::vec(0u128..300, 0..20),
    ) {
        let params = ProtocolParams::poline_defaults();
        let mut node = PolineNode::new(admin(), params.clone()).unwrap();
        let alice = Address::new("pln_alice");
        let mut now = Timestamp::new(0);

        for amount in amounts {
            now = now.plus_secs(1);
            node.staking.stake(&alice, amount, now).unwrap();
            prop_assert_eq!(
                node.staking.is_oracle(&alice),
                node.staking.stake_of(&alice) >= params.minimum_stake
            );
        }
        for amount in slashes {
            node.staking
                .slash_stake(&admin(), &alice, amount, "test", &mut node.token)
                .unwrap();
            prop_assert_eq!(
                node.staking.is_oracle(&alice),
                node.staking.stake_of(&alice) >= params.minimum_stake
            );
        }
    }

    /// Quorum is evaluated against the total stake at resolution time, so
    /// stake arriving after votes were cast can push a previously quorate
    /// event below quorum. This documents the manipulation sensitivity of
    /// the live-denominator rule.
    #[test]
    fn quorum_denominator_is_live(late_stake in 0u128..5_000) {
        let params = ProtocolParams::poline_defaults();
        let mut node = PolineNode::new(admin(), params.clone()).unwrap();
        let voter = Address::new("pln_voter");
        node.staking.stake(&voter, 200, Timestamp::new(0)).unwrap();
        node.staking.stake(&Address::new("pln_rest"), 300, Timestamp::new(0)).unwrap();

        let event = node
            .oracle
            .create_event(&admin(), "live quorum probe", DAY, Timestamp::new(0))
            .unwrap();
        node.oracle
            .cast_vote(&voter, event, true, Timestamp::new(1), &node.staking)
            .unwrap();

        if late_stake > 0 {
            node.staking
                .stake(&Address::new("pln_late"), late_stake, Timestamp::new(2))
                .unwrap();
        }

        let total = node.staking.total_staked();
        let required = total * u128::from(params.event_quorum_bps) / 10_000;
        let result = node.oracle.resolve_event(
            &admin(),
            event,
            Timestamp::new(DAY + 1),
            &mut node.staking,
            &mut node.token,
        );
        prop_assert_eq!(result.is_ok(), 200 >= required);
    }

    /// Voting weight is frozen at cast time: later stake changes never move
    /// a recorded tally.
    #[test]
    fn vote_weights_are_immutable_snapshots(extra in 1u128..10_000) {
        let params = ProtocolParams::poline_defaults();
        let mut node = PolineNode::new(admin(), params).unwrap();

        let voter = Address::new("pln_voter");
        node.staking.stake(&voter, 150, Timestamp::new(0)).unwrap();
        let event = node
            .oracle
            .create_event(&admin(), "snapshot probe", DAY, Timestamp::new(0))
            .unwrap();
        node.oracle
            .cast_vote(&voter, event, true, Timestamp::new(1), &node.staking)
            .unwrap();

        node.staking.stake(&voter, extra, Timestamp::new(2)).unwrap();
        prop_assert_eq!(node.oracle.get_event(event).unwrap().yes_weight, 150);
    }
}
