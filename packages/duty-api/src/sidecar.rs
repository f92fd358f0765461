use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;

use crate::key::PublicKey;

/// Binds a validator's operator account to the keys of its sidecar.
///
/// `version` starts at 1 and is bumped on every explicit rotation.
#[cw_serde]
pub struct SidecarRegistration {
    pub validator: Addr,
    pub relayer_pub_key: PublicKey,
    pub validator_pub_key: PublicKey,
    pub registered_height: u64,
    pub version: u64,
}
