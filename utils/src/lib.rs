//! Shared utilities for the Poline protocol.

pub mod logging;
pub mod math;

pub use logging::init_tracing;
pub use math::bps_of;
