use cosmwasm_std::{to_json_binary, Addr, StdResult, WasmMsg};
use duty_api::penalty::{ExecuteMsg, Severity};

/// Builds the penalty dispatch for `validator`. Slashing itself is up to the penalty contract.
pub fn penalize(
    penalty_contract: &Addr,
    validator: &Addr,
    severity: Severity,
) -> StdResult<WasmMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: penalty_contract.to_string(),
        msg: to_json_binary(&ExecuteMsg::Penalize {
            validator: validator.to_string(),
            severity,
        })?,
        funds: vec![],
    })
}
