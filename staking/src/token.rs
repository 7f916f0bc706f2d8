//! Token ledger capability interface.
//!
//! The token itself (transfer/balance mechanics) lives outside this
//! workspace; the engines consume it through this narrow capability.
//! Implementations are expected to clamp internally and never call back
//! into the engines — every call through this trait is a leaf operation.

use poline_types::Address;

/// Mint/burn/voting-power capability consumed by the engines.
pub trait TokenLedger {
    /// Credit `amount` to `to`, recording `reason` in the token's own audit log.
    fn mint(&mut self, to: &Address, amount: u128, reason: &str);

    /// Burn up to `amount` from `account` (clamping to its balance).
    fn slash(&mut self, account: &Address, amount: u128, reason: &str);

    /// Current token-derived voting power of `account`.
    fn get_votes(&self, account: &Address) -> u128;

    /// Current token balance of `account`.
    fn balance_of(&self, account: &Address) -> u128;
}
