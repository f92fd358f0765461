use cosmrs::AccountId;
use cosmwasm_std::HexBinary;
use duty_api::msg::ExecuteMsg;
use duty_api::OriginHeights;
use error_stack::{Result, ResultExt};
use thiserror::Error;

use crate::key::RelayerKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to serialize origin heights")]
    Serialize,
    #[error("failed to sign the heartbeat")]
    Sign,
}

/// Heartbeat over the canonical form of `heights`, signed by the relayer key.
pub fn build(
    validator: &AccountId,
    heights: &OriginHeights,
    key: &RelayerKey,
) -> Result<ExecuteMsg, Error> {
    let origin_heights_json = heights.to_canonical_json().change_context(Error::Serialize)?;
    let signature = key
        .sign(origin_heights_json.as_bytes())
        .change_context(Error::Sign)?;

    Ok(ExecuteMsg::Heartbeat {
        validator: validator.to_string(),
        origin_heights_json,
        signature: HexBinary::from(signature),
    })
}
