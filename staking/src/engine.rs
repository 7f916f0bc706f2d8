//! The staking engine — stake lifecycle, cooldown unstaking, and slashing.

use crate::error::StakingError;
use crate::record::StakeRecord;
use crate::token::TokenLedger;
use poline_types::{Address, ProtocolParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Notifications emitted by the staking engine.
///
/// These are the durable audit trail: replaying them in order reconstructs
/// every participant's stake and the global total without re-deriving
/// anything from mutable state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeEvent {
    Staked {
        who: Address,
        amount: u128,
        new_stake: u128,
    },
    UnstakeRequested {
        who: Address,
        at: Timestamp,
    },
    UnstakeCancelled {
        who: Address,
    },
    Unstaked {
        who: Address,
        amount: u128,
    },
    Slashed {
        who: Address,
        requested: u128,
        applied: u128,
        remaining: u128,
        reason: String,
    },
    OracleStatusChanged {
        who: Address,
        is_oracle: bool,
    },
    ParametersUpdated {
        unstake_cooldown_secs: u64,
        minimum_stake: u128,
    },
    SlasherAuthorized {
        slasher: Address,
    },
}

/// The stake ledger — the single writer of all stake collateral state.
///
/// Every mutating entry point takes `&mut self`, so a reentrant call chain
/// back into the ledger mid-mutation is unrepresentable; the slash path in
/// particular only touches ledger state plus the token capability and
/// performs no callbacks.
pub struct StakingEngine {
    admin: Address,
    authorized_slashers: HashSet<Address>,
    records: HashMap<Address, StakeRecord>,
    total_staked: u128,
    unstake_cooldown_secs: u64,
    minimum_stake: u128,
    pending_events: Vec<StakeEvent>,
}

impl StakingEngine {
    pub fn new(admin: Address, params: &ProtocolParams) -> Self {
        Self {
            admin,
            authorized_slashers: HashSet::new(),
            records: HashMap::new(),
            total_staked: 0,
            unstake_cooldown_secs: params.unstake_cooldown_secs,
            minimum_stake: params.minimum_stake,
            pending_events: Vec::new(),
        }
    }

    /// Add collateral for `who`. Cancels any pending unstake request and
    /// flips oracle eligibility on if the new amount reaches the minimum.
    pub fn stake(
        &mut self,
        who: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let record = self
            .records
            .entry(who.clone())
            .or_insert_with(|| StakeRecord::new(now));

        let new_amount = record
            .amount
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        if record.amount == 0 {
            record.staked_at = now;
        }
        record.amount = new_amount;
        if record.unstake_requested_at.take().is_some() {
            self.pending_events
                .push(StakeEvent::UnstakeCancelled { who: who.clone() });
        }
        self.total_staked = new_total;

        let became_oracle = !record.is_oracle && record.amount >= self.minimum_stake;
        if became_oracle {
            record.is_oracle = true;
        }

        info!(who = %who, amount, new_stake = record.amount, "stake added");
        self.pending_events.push(StakeEvent::Staked {
            who: who.clone(),
            amount,
            new_stake: new_amount,
        });
        if became_oracle {
            self.pending_events.push(StakeEvent::OracleStatusChanged {
                who: who.clone(),
                is_oracle: true,
            });
        }
        Ok(())
    }

    /// Start the unstake cooldown for `who`.
    pub fn request_unstake(&mut self, who: &Address, now: Timestamp) -> Result<(), StakingError> {
        let record = self
            .records
            .get_mut(who)
            .filter(|r| r.amount > 0)
            .ok_or_else(|| StakingError::NoStake(who.to_string()))?;
        if record.unstake_requested_at.is_some() {
            return Err(StakingError::UnstakeAlreadyRequested(who.to_string()));
        }
        record.unstake_requested_at = Some(now);
        self.pending_events.push(StakeEvent::UnstakeRequested {
            who: who.clone(),
            at: now,
        });
        Ok(())
    }

    /// Complete a pending unstake once the cooldown has elapsed. Zeroes the
    /// record and clears oracle eligibility.
    pub fn complete_unstake(&mut self, who: &Address, now: Timestamp) -> Result<u128, StakingError> {
        let record = self
            .records
            .get_mut(who)
            .ok_or_else(|| StakingError::NoStake(who.to_string()))?;
        let requested_at = record
            .unstake_requested_at
            .ok_or_else(|| StakingError::NoUnstakeRequested(who.to_string()))?;
        if !requested_at.has_expired(self.unstake_cooldown_secs, now) {
            return Err(StakingError::CooldownNotComplete {
                remaining_secs: requested_at.remaining(self.unstake_cooldown_secs, now),
            });
        }

        let released = record.amount;
        record.amount = 0;
        record.unstake_requested_at = None;
        let was_oracle = std::mem::replace(&mut record.is_oracle, false);
        self.total_staked = self
            .total_staked
            .checked_sub(released)
            .ok_or(StakingError::Overflow)?;

        info!(who = %who, released, "unstake completed");
        self.pending_events.push(StakeEvent::Unstaked {
            who: who.clone(),
            amount: released,
        });
        if was_oracle {
            self.pending_events.push(StakeEvent::OracleStatusChanged {
                who: who.clone(),
                is_oracle: false,
            });
        }
        Ok(released)
    }

    /// Clear a pending unstake request without penalty.
    pub fn cancel_unstake(&mut self, who: &Address) -> Result<(), StakingError> {
        let record = self
            .records
            .get_mut(who)
            .ok_or_else(|| StakingError::NoStake(who.to_string()))?;
        if record.unstake_requested_at.take().is_none() {
            return Err(StakingError::NoUnstakeRequested(who.to_string()));
        }
        self.pending_events
            .push(StakeEvent::UnstakeCancelled { who: who.clone() });
        Ok(())
    }

    /// Slash `user` by up to `amount`, clamped to their current stake, and
    /// forward a matching burn to the token ledger. Returns the applied
    /// amount; a slash that clamps to zero is skipped entirely (no burn,
    /// no event).
    ///
    /// Restricted to the admin and authorized slashers (the voting engines).
    pub fn slash_stake(
        &mut self,
        caller: &Address,
        user: &Address,
        amount: u128,
        reason: &str,
        token: &mut dyn TokenLedger,
    ) -> Result<u128, StakingError> {
        if *caller != self.admin && !self.authorized_slashers.contains(caller) {
            return Err(StakingError::Unauthorized(caller.to_string()));
        }

        let Some(record) = self.records.get_mut(user) else {
            return Ok(0);
        };
        let applied = amount.min(record.amount);
        if applied == 0 {
            return Ok(0);
        }

        record.amount -= applied;
        self.total_staked = self
            .total_staked
            .checked_sub(applied)
            .ok_or(StakingError::Overflow)?;
        let lost_oracle = record.is_oracle && record.amount < self.minimum_stake;
        if lost_oracle {
            record.is_oracle = false;
        }
        let remaining = record.amount;

        token.slash(user, applied, reason);

        info!(user = %user, requested = amount, applied, remaining, reason, "stake slashed");
        self.pending_events.push(StakeEvent::Slashed {
            who: user.clone(),
            requested: amount,
            applied,
            remaining,
            reason: reason.to_string(),
        });
        if lost_oracle {
            self.pending_events.push(StakeEvent::OracleStatusChanged {
                who: user.clone(),
                is_oracle: false,
            });
        }
        Ok(applied)
    }

    /// Change the cooldown and minimum stake for subsequent calls only.
    ///
    /// Existing `is_oracle` flags are NOT recomputed: eligibility is cached
    /// at stake/slash mutations and a parameter change leaves it stale until
    /// the next mutation. That staleness is deliberate.
    pub fn update_parameters(
        &mut self,
        caller: &Address,
        unstake_cooldown_secs: u64,
        minimum_stake: u128,
    ) -> Result<(), StakingError> {
        if *caller != self.admin {
            return Err(StakingError::Unauthorized(caller.to_string()));
        }
        self.unstake_cooldown_secs = unstake_cooldown_secs;
        self.minimum_stake = minimum_stake;
        self.pending_events.push(StakeEvent::ParametersUpdated {
            unstake_cooldown_secs,
            minimum_stake,
        });
        Ok(())
    }

    /// Authorize an engine identity to call `slash_stake`.
    pub fn authorize_slasher(
        &mut self,
        caller: &Address,
        slasher: Address,
    ) -> Result<(), StakingError> {
        if *caller != self.admin {
            return Err(StakingError::Unauthorized(caller.to_string()));
        }
        self.pending_events.push(StakeEvent::SlasherAuthorized {
            slasher: slasher.clone(),
        });
        self.authorized_slashers.insert(slasher);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Current staked amount of `who` (zero if unknown).
    pub fn stake_of(&self, who: &Address) -> u128 {
        self.records.get(who).map(|r| r.amount).unwrap_or(0)
    }

    /// Cached oracle eligibility of `who`.
    pub fn is_oracle(&self, who: &Address) -> bool {
        self.records.get(who).is_some_and(|r| r.is_oracle)
    }

    /// Global total of all staked amounts.
    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    /// Whether `who` has a pending unstake request whose cooldown has elapsed.
    pub fn can_unstake(&self, who: &Address, now: Timestamp) -> bool {
        self.records
            .get(who)
            .and_then(|r| r.unstake_requested_at)
            .is_some_and(|at| at.has_expired(self.unstake_cooldown_secs, now))
    }

    /// Full record of `who`, if any.
    pub fn record_of(&self, who: &Address) -> Option<&StakeRecord> {
        self.records.get(who)
    }

    /// Drain pending notifications for the node to process.
    pub fn drain_events(&mut self) -> Vec<StakeEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Serialize ledger state for persistence.
    pub fn snapshot(&self) -> StakingSnapshot {
        StakingSnapshot {
            admin: self.admin.clone(),
            authorized_slashers: self.authorized_slashers.clone(),
            records: self.records.clone(),
            total_staked: self.total_staked,
            unstake_cooldown_secs: self.unstake_cooldown_secs,
            minimum_stake: self.minimum_stake,
        }
    }

    /// Restore ledger state from a persisted snapshot.
    pub fn restore(snapshot: StakingSnapshot) -> Self {
        Self {
            admin: snapshot.admin,
            authorized_slashers: snapshot.authorized_slashers,
            records: snapshot.records,
            total_staked: snapshot.total_staked,
            unstake_cooldown_secs: snapshot.unstake_cooldown_secs,
            minimum_stake: snapshot.minimum_stake,
            pending_events: Vec::new(),
        }
    }
}

/// Serializable snapshot of ledger state for persistence across restarts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingSnapshot {
    pub admin: Address,
    pub authorized_slashers: HashSet<Address>,
    pub records: HashMap<Address, StakeRecord>,
    pub total_staked: u128,
    pub unstake_cooldown_secs: u64,
    pub minimum_stake: u128,
}
