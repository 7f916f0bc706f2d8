//! Poline node — wires all protocol engines together.
//!
//! The node owns one instance of each engine, a token ledger, and the
//! cross-component authorization wiring: the oracle and appeals engines are
//! registered as slashers with the stake ledger, and the appeals engine as a
//! controller of the event resolution engine. It also merges the engines'
//! notification streams into a single audit log and snapshots the whole
//! protocol state for persistence.

pub mod error;
pub mod node;
pub mod token;

pub use error::NodeError;
pub use node::{AuditEvent, NodeSnapshot, PolineNode};
pub use token::InMemoryTokenLedger;
