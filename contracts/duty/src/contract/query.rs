use cosmwasm_std::{Addr, Deps};
use duty_api::msg::Params;
use duty_api::{Duty, DutyId, DutyStatus, Liveness, Route, SidecarRegistration};
use error_stack::Result;

use super::validate_address;
use crate::error::ContractError;
use crate::state::{self, LIVENESS, SIDECARS};

pub fn duty(deps: Deps, route: Route, message_id: u64) -> Result<Duty, ContractError> {
    state::load_duty(deps.storage, &route, message_id)
}

pub fn duties(
    deps: Deps,
    validator: String,
    status: Option<DutyStatus>,
    start_after: Option<DutyId>,
    limit: Option<u32>,
) -> Result<Vec<Duty>, ContractError> {
    let validator = validate_address(deps.api, &validator)?;

    state::duties_by_validator(
        deps.storage,
        &validator,
        status,
        start_after,
        limit.unwrap_or(u32::MAX),
    )
}

pub fn sidecar_registration(
    deps: Deps,
    validator: String,
) -> Result<Option<SidecarRegistration>, ContractError> {
    let validator = validate_address(deps.api, &validator)?;

    Ok(SIDECARS
        .may_load(deps.storage, &validator)
        .map_err(ContractError::from)?)
}

pub fn liveness(deps: Deps, validator: String) -> Result<Option<Liveness>, ContractError> {
    let validator = validate_address(deps.api, &validator)?;

    Ok(LIVENESS
        .may_load(deps.storage, &validator)
        .map_err(ContractError::from)?)
}

pub fn active_validators(deps: Deps, route: Route) -> Result<Vec<Addr>, ContractError> {
    Ok(state::eligible_validators(deps.storage, &route).map_err(ContractError::from)?)
}

pub fn params(deps: Deps) -> Result<Params, ContractError> {
    state::load_params(deps.storage)
}
