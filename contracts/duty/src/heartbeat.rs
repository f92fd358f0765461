use cosmwasm_std::{Addr, Api, BlockInfo, HexBinary, Storage};
use duty_api::{Liveness, OriginHeights, PublicKey};
use error_stack::{ensure, report, Result, ResultExt};
use sha2::{Digest, Sha256};

use crate::error::ContractError;
use crate::state::{LIVENESS, SIDECARS};

const ECDSA_SIGNATURE_LEN: usize = 64;
const ECDSA_RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Verifies a heartbeat and records it as the validator's latest liveness.
///
/// Nothing is written unless the heartbeat is accepted.
pub fn submit(
    storage: &mut dyn Storage,
    api: &dyn Api,
    block: &BlockInfo,
    validator: &Addr,
    origin_heights_json: &str,
    signature: &HexBinary,
) -> Result<Liveness, ContractError> {
    let registration = SIDECARS
        .may_load(storage, validator)
        .change_context(ContractError::UnknownValidator(validator.to_string()))?
        .ok_or_else(|| report!(ContractError::UnknownValidator(validator.to_string())))?;

    let origin_heights = OriginHeights::from_json(origin_heights_json)
        .change_context(ContractError::MalformedOriginHeights)?;
    let canonical = origin_heights
        .canonical_bytes()
        .change_context(ContractError::MalformedOriginHeights)?;

    verify_signature(api, &registration.relayer_pub_key, &canonical, signature)?;

    let previous = LIVENESS
        .may_load(storage, validator)
        .change_context(ContractError::StaleHeartbeat)?;
    let (last_heights, accepted) = previous
        .map(|liveness| (liveness.origin_heights, liveness.heartbeats_accepted))
        .unwrap_or_default();

    ensure!(
        origin_heights.advances_over(&last_heights),
        ContractError::StaleHeartbeat
    );

    let liveness = Liveness {
        last_heartbeat_height: block.height,
        last_heartbeat_time: block.time,
        heartbeats_accepted: accepted.saturating_add(1),
        origin_heights: last_heights.merge(&origin_heights),
    };
    LIVENESS
        .save(storage, validator, &liveness)
        .map_err(ContractError::from)?;

    Ok(liveness)
}

fn verify_signature(
    api: &dyn Api,
    pub_key: &PublicKey,
    msg: &[u8],
    signature: &HexBinary,
) -> Result<(), ContractError> {
    let is_valid = match pub_key {
        PublicKey::Ecdsa(pub_key) => {
            let sig = match signature.len() {
                ECDSA_SIGNATURE_LEN | ECDSA_RECOVERABLE_SIGNATURE_LEN => {
                    signature.get(..ECDSA_SIGNATURE_LEN)
                }
                _ => None,
            }
            .ok_or(ContractError::BadSignature)?;

            api.secp256k1_verify(Sha256::digest(msg).as_slice(), sig, pub_key)
        }
        PublicKey::Ed25519(pub_key) => api.ed25519_verify(msg, signature, pub_key),
    }
    .change_context(ContractError::BadSignature)?;

    ensure!(is_valid, ContractError::BadSignature);

    Ok(())
}
