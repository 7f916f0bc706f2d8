//! Circle registry for the Poline protocol.
//!
//! Circles are named membership groups carrying a scope bitmask: a proposal
//! of a given type may only be submitted by members of a circle whose scopes
//! cover that type. Membership is either granted administratively or claimed
//! by a participant whose stake meets the circle's requirement.

pub mod error;
pub mod registry;

pub use error::CircleError;
pub use registry::{Circle, CircleEvent, CircleRegistry, CircleSnapshot};
