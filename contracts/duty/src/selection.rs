//! Deterministic validator selection.
//!
//! Every strategy is a pure function of the route, the message id and the eligible validator set,
//! so all nodes executing the same block select the same validator.

use cosmwasm_std::Addr;
use duty_api::msg::SelectionPolicy;
use duty_api::Route;
use sha3::{Digest, Keccak256};

pub trait SelectionStrategy {
    /// `validators` must be sorted in ascending order. Returns `None` for an empty set.
    fn select<'a>(
        &self,
        route: &Route,
        message_id: u64,
        validators: &'a [Addr],
    ) -> Option<&'a Addr>;
}

pub struct RoundRobin;

impl SelectionStrategy for RoundRobin {
    fn select<'a>(
        &self,
        _route: &Route,
        message_id: u64,
        validators: &'a [Addr],
    ) -> Option<&'a Addr> {
        index(message_id, validators.len()).and_then(|i| validators.get(i))
    }
}

/// Spreads consecutive message ids of a route across the set instead of cycling through it.
pub struct Hashed;

impl Hashed {
    fn seed(route: &Route, message_id: u64) -> u64 {
        let digest = Keccak256::new()
            .chain_update(route.origin.as_ref())
            .chain_update([0u8])
            .chain_update(route.destination.as_ref())
            .chain_update([0u8])
            .chain_update(message_id.to_be_bytes())
            .finalize();

        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(seed)
    }
}

impl SelectionStrategy for Hashed {
    fn select<'a>(
        &self,
        route: &Route,
        message_id: u64,
        validators: &'a [Addr],
    ) -> Option<&'a Addr> {
        index(Self::seed(route, message_id), validators.len()).and_then(|i| validators.get(i))
    }
}

fn index(seed: u64, len: usize) -> Option<usize> {
    let len = u64::try_from(len).ok()?;
    seed.checked_rem(len).and_then(|i| usize::try_from(i).ok())
}

pub fn strategy(policy: SelectionPolicy) -> Box<dyn SelectionStrategy> {
    match policy {
        SelectionPolicy::RoundRobin => Box::new(RoundRobin),
        SelectionPolicy::Hashed => Box::new(Hashed),
    }
}
