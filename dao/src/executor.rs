//! Execution capability for queued proposals.

use poline_types::Address;

/// Performs the encoded call a passed proposal carries.
///
/// Implementations live outside the governance engine (the node wires one
/// in); a returned error leaves the proposal retry-eligible rather than
/// terminally failed.
pub trait ProposalExecutor {
    fn execute(&mut self, target: &Address, payload: &[u8]) -> Result<(), String>;
}
