//! Assembly layer modules.
//!
//! This module groups the assembly status machine and the per-session
//! ingredient tracker.

pub mod session;
pub mod status;

pub use session::{AddOutcome, AssemblySession, SessionId};
pub use status::AssemblyStatus;
