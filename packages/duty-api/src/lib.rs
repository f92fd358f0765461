pub mod duty;
pub mod error;
pub mod heartbeat;
pub mod key;
pub mod msg;
pub mod penalty;
mod primitives;
pub mod proof;
pub mod sidecar;

pub use duty::{Duty, DutyId, DutyStatus};
pub use heartbeat::{Liveness, OriginHeights};
pub use key::{KeyType, PublicKey};
pub use primitives::*;
pub use sidecar::SidecarRegistration;
