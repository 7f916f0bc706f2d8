//! In-memory token ledger.
//!
//! The real token lives outside this workspace; this implementation backs
//! tests and single-process deployments. Voting power equals balance.

use poline_staking::TokenLedger;
use poline_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryTokenLedger {
    balances: HashMap<Address, u128>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u128 {
        self.balances.values().sum()
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn mint(&mut self, to: &Address, amount: u128, reason: &str) {
        *self.balances.entry(to.clone()).or_default() += amount;
        debug!(to = %to, amount, reason, "tokens minted");
    }

    fn slash(&mut self, account: &Address, amount: u128, reason: &str) {
        let balance = self.balances.entry(account.clone()).or_default();
        *balance = balance.saturating_sub(amount);
        debug!(account = %account, amount, reason, "tokens burned");
    }

    fn get_votes(&self, account: &Address) -> u128 {
        self.balance_of(account)
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
