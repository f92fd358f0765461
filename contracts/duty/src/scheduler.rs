use cosmwasm_std::Storage;
use duty_api::msg::Params;
use duty_api::{Duty, DutyStatus, Route};
use error_stack::{ensure, report, Result, ResultExt};

use crate::error::ContractError;
use crate::selection;
use crate::state;

/// Creates a `Pending` duty for a freshly dispatched message.
///
/// Fails without touching storage if the route has no eligible validator or if a duty for the
/// message already exists.
pub fn assign_duty(
    storage: &mut dyn Storage,
    params: &Params,
    current_height: u64,
    route: Route,
    message_id: u64,
) -> Result<Duty, ContractError> {
    ensure!(route.validate().is_ok(), ContractError::InvalidRoute);

    let validators =
        state::eligible_validators(storage, &route).change_context(ContractError::LoadDuty)?;
    let assigned_validator = selection::strategy(params.selection_policy)
        .select(&route, message_id, &validators)
        .cloned()
        .ok_or_else(|| report!(ContractError::NoEligibleValidator(route.to_string())))?;

    let deadline_height = current_height
        .checked_add(params.deadline_window)
        .ok_or(ContractError::DeadlineOverflow)?;

    let duty = Duty {
        route,
        message_id,
        assigned_validator,
        created_height: current_height,
        deadline_height,
        status: DutyStatus::Pending,
    };
    state::upsert_duty(storage, &duty)?;

    Ok(duty)
}
