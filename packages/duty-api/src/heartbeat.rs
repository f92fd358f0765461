use std::collections::BTreeMap;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Timestamp;

use crate::error::Error;
use crate::primitives::ChainId;

/// Snapshot of origin chain heights as observed by a sidecar.
///
/// The canonical form is compact json with keys in ascending byte order. Signatures are
/// always produced and checked over [OriginHeights::canonical_bytes], never over the raw
/// submitted string.
#[cw_serde]
#[derive(Default, Eq)]
pub struct OriginHeights(BTreeMap<ChainId, u64>);

impl OriginHeights {
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str::<BTreeMap<ChainId, u64>>(raw)
            .map(OriginHeights)
            .map_err(|err| Error::MalformedOriginHeights {
                reason: err.to_string(),
            })
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.0).map_err(|err| Error::MalformedOriginHeights {
            reason: err.to_string(),
        })
    }

    pub fn to_canonical_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.0).map_err(|err| Error::MalformedOriginHeights {
            reason: err.to_string(),
        })
    }

    pub fn get(&self, chain_id: &ChainId) -> Option<u64> {
        self.0.get(chain_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChainId, &u64)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no present chain regresses and at least one chain is new or strictly higher.
    pub fn advances_over(&self, previous: &OriginHeights) -> bool {
        let no_regression = self
            .iter()
            .all(|(chain, height)| previous.get(chain).map_or(true, |prev| *height >= prev));
        let some_progress = self
            .iter()
            .any(|(chain, height)| previous.get(chain).map_or(true, |prev| *height > prev));

        no_regression && some_progress
    }

    /// Union of both snapshots, keeping the highest height per chain.
    pub fn merge(&self, other: &OriginHeights) -> OriginHeights {
        let mut merged = self.0.clone();
        for (chain, height) in other.iter() {
            merged
                .entry(chain.clone())
                .and_modify(|h| *h = (*h).max(*height))
                .or_insert(*height);
        }

        OriginHeights(merged)
    }
}

impl From<BTreeMap<ChainId, u64>> for OriginHeights {
    fn from(heights: BTreeMap<ChainId, u64>) -> Self {
        OriginHeights(heights)
    }
}

impl FromIterator<(ChainId, u64)> for OriginHeights {
    fn from_iter<T: IntoIterator<Item = (ChainId, u64)>>(iter: T) -> Self {
        OriginHeights(iter.into_iter().collect())
    }
}

/// Last accepted heartbeat of a validator. Observability only, never used for enforcement.
#[cw_serde]
pub struct Liveness {
    pub last_heartbeat_height: u64,
    pub last_heartbeat_time: Timestamp,
    pub heartbeats_accepted: u64,
    pub origin_heights: OriginHeights,
}
