//! Member address type with `pln_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Poline member address, always prefixed with `pln_`.
///
/// Addresses identify both human participants and protocol components
/// (engines hold an identity address so privileged cross-component calls
/// can be authorized the same way member calls are).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all Poline addresses.
    pub const PREFIX: &'static str = "pln_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `pln_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with pln_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
