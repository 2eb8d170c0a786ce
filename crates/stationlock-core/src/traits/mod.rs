//! Capability traits defined in `stationlock-core` and implemented by the
//! engine crate.

pub mod identity;
pub mod process;

pub use identity::IdentityCodec;
pub use process::{LivenessOracle, ProcessSignaller};
