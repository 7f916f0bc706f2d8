//! Fundamental types for the Poline protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: member addresses, timestamps, content-derived entity ids,
//! proposal scopes, and protocol parameters.

pub mod address;
pub mod id;
pub mod params;
pub mod scope;
pub mod time;

pub use address::Address;
pub use id::EntityId;
pub use params::ProtocolParams;
pub use scope::{ProposalScope, ScopeSet};
pub use time::Timestamp;
