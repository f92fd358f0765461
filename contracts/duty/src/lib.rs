pub mod contract;
mod enforcement;
pub mod error;
pub mod events;
mod heartbeat;
mod penalty;
mod proof;
mod scheduler;
pub mod selection;
mod state;

pub use crate::error::ContractError;
