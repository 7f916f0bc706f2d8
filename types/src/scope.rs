//! Proposal scopes and the per-circle scope bitmask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single proposal scope a circle can be authorized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ProposalScope {
    /// Creating and resolving oracle events.
    Oracle = 1,
    /// General governance (the fallback scope for unmapped proposal types).
    Governance = 1 << 1,
    /// Changes to protocol rules and parameters.
    ProtocolRules = 1 << 2,
    /// Dispute-system configuration.
    Dispute = 1 << 3,
    /// Community initiatives and funding.
    Community = 1 << 4,
}

impl ProposalScope {
    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Governance => "governance",
            Self::ProtocolRules => "protocol_rules",
            Self::Dispute => "dispute",
            Self::Community => "community",
        }
    }
}

/// A set of scopes, stored as a bitmask so circles can hold several at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet(u32);

impl ScopeSet {
    pub const EMPTY: Self = Self(0);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn single(scope: ProposalScope) -> Self {
        Self(scope.bit())
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, scope: ProposalScope) -> bool {
        self.0 & scope.bit() != 0
    }

    pub fn with(self, scope: ProposalScope) -> Self {
        Self(self.0 | scope.bit())
    }
}

impl From<ProposalScope> for ScopeSet {
    fn from(scope: ProposalScope) -> Self {
        Self::single(scope)
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scopes({:#07b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_scope_membership() {
        let set = ScopeSet::single(ProposalScope::Oracle).with(ProposalScope::Dispute);
        assert!(set.contains(ProposalScope::Oracle));
        assert!(set.contains(ProposalScope::Dispute));
        assert!(!set.contains(ProposalScope::Governance));
    }

    #[test]
    fn empty_set_contains_nothing() {
        assert!(ScopeSet::EMPTY.is_empty());
        assert!(!ScopeSet::EMPTY.contains(ProposalScope::Community));
    }

    #[test]
    fn scope_bits_are_distinct() {
        let all = [
            ProposalScope::Oracle,
            ProposalScope::Governance,
            ProposalScope::ProtocolRules,
            ProposalScope::Dispute,
            ProposalScope::Community,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_eq!(a.bit() & b.bit(), 0);
            }
        }
    }
}
