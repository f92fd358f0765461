use cosmwasm_std::{Addr, DepsMut, Env, HexBinary, Response};
use duty_api::msg::{DispatchedMessage, Params, SelectionPolicy};
use duty_api::{DutyStatus, PublicKey, Route, SidecarRegistration};
use error_stack::{bail, ensure, report, Result, ResultExt};

use crate::error::ContractError;
use crate::events::Event;
use crate::state::{self, LIVENESS, ROUTE_SUPPORT, SIDECARS};
use crate::{enforcement, heartbeat, penalty, proof, scheduler};

pub fn register_sidecars(
    deps: DepsMut,
    env: Env,
    validator: Addr,
    relayer_pub_key: PublicKey,
    validator_pub_key: PublicKey,
) -> Result<Response, ContractError> {
    ensure!(
        !SIDECARS.has(deps.storage, &validator),
        ContractError::SidecarsAlreadyRegistered(validator.to_string())
    );

    let registration = SidecarRegistration {
        validator: validator.clone(),
        relayer_pub_key,
        validator_pub_key,
        registered_height: env.block.height,
        version: 1,
    };
    SIDECARS
        .save(deps.storage, &validator, &registration)
        .map_err(ContractError::from)?;

    Ok(Response::new().add_event(Event::SidecarsRegistered {
        validator,
        relayer_key_type: registration.relayer_pub_key.key_type(),
        version: registration.version,
    }))
}

/// Replaces the keys of an existing registration. Heartbeats restart from an empty snapshot.
pub fn rotate_sidecars(
    deps: DepsMut,
    env: Env,
    validator: Addr,
    relayer_pub_key: PublicKey,
    validator_pub_key: PublicKey,
) -> Result<Response, ContractError> {
    let previous = SIDECARS
        .may_load(deps.storage, &validator)
        .map_err(ContractError::from)?
        .ok_or_else(|| report!(ContractError::UnknownValidator(validator.to_string())))?;

    let registration = SidecarRegistration {
        validator: validator.clone(),
        relayer_pub_key,
        validator_pub_key,
        registered_height: env.block.height,
        version: previous.version.saturating_add(1),
    };
    SIDECARS
        .save(deps.storage, &validator, &registration)
        .map_err(ContractError::from)?;
    LIVENESS.remove(deps.storage, &validator);

    Ok(Response::new().add_event(Event::SidecarsRotated {
        validator,
        relayer_key_type: registration.relayer_pub_key.key_type(),
        version: registration.version,
    }))
}

pub fn register_route_support(
    deps: DepsMut,
    validator: Addr,
    routes: Vec<Route>,
) -> Result<Response, ContractError> {
    ensure!(
        SIDECARS.has(deps.storage, &validator),
        ContractError::UnknownValidator(validator.to_string())
    );

    for route in &routes {
        ROUTE_SUPPORT
            .save(
                deps.storage,
                (&route.origin, &route.destination, &validator),
                &(),
            )
            .map_err(ContractError::from)?;
    }

    Ok(Response::new().add_event(Event::RouteSupportRegistered { validator, routes }))
}

pub fn deregister_route_support(
    deps: DepsMut,
    validator: Addr,
    routes: Vec<Route>,
) -> Result<Response, ContractError> {
    for route in &routes {
        ROUTE_SUPPORT.remove(deps.storage, (&route.origin, &route.destination, &validator));
    }

    Ok(Response::new().add_event(Event::RouteSupportDeregistered { validator, routes }))
}

pub fn heartbeat(
    deps: DepsMut,
    env: Env,
    validator: Addr,
    origin_heights_json: String,
    signature: HexBinary,
) -> Result<Response, ContractError> {
    let liveness = heartbeat::submit(
        deps.storage,
        deps.api,
        &env.block,
        &validator,
        &origin_heights_json,
        &signature,
    )?;

    Ok(Response::new().add_event(Event::HeartbeatAccepted {
        validator,
        liveness,
    }))
}

#[allow(clippy::too_many_arguments)]
pub fn report_missed(
    deps: DepsMut,
    env: Env,
    params: &Params,
    reporter: Addr,
    route: Route,
    message_id: u64,
    assigned_validator: Addr,
    origin_proof: HexBinary,
    dest_non_inclusion_proof: HexBinary,
) -> Result<Response, ContractError> {
    let verifier = proof::Client::new(deps.querier, params.proof_verifier.clone());

    let duty = enforcement::report_missed(
        deps.storage,
        &verifier,
        env.block.height,
        route,
        message_id,
        &assigned_validator,
        origin_proof,
        dest_non_inclusion_proof,
    )?;

    penalize(params, duty, reporter)
}

pub fn report_invalid(
    deps: DepsMut,
    params: &Params,
    reporter: Addr,
    route: Route,
    message_id: u64,
    assigned_validator: Addr,
    dest_failure_proof: HexBinary,
) -> Result<Response, ContractError> {
    let verifier = proof::Client::new(deps.querier, params.proof_verifier.clone());

    let duty = enforcement::report_invalid(
        deps.storage,
        &verifier,
        route,
        message_id,
        &assigned_validator,
        dest_failure_proof,
    )?;

    penalize(params, duty, reporter)
}

fn penalize(
    params: &Params,
    duty: duty_api::Duty,
    reporter: Addr,
) -> Result<Response, ContractError> {
    let Some(severity) = enforcement::severity(duty.status) else {
        bail!(ContractError::DutyAlreadyFinalized(duty.status.to_string()));
    };

    let msg = penalty::penalize(&params.penalty, &duty.assigned_validator, severity)
        .map_err(ContractError::from)?;
    let event = match duty.status {
        DutyStatus::Invalid => Event::DutyInvalid {
            duty,
            reporter,
            severity,
        },
        _ => Event::DutyMissed {
            duty,
            reporter,
            severity,
        },
    };

    Ok(Response::new().add_message(msg).add_event(event))
}

/// Assigns every dispatched message on its own. Messages that cannot be assigned are reported
/// through events and do not revert the assignments of the others.
pub fn dispatch_messages(
    deps: DepsMut,
    env: Env,
    params: &Params,
    messages: Vec<DispatchedMessage>,
) -> Result<Response, ContractError> {
    let mut events = Vec::with_capacity(messages.len());

    for DispatchedMessage { route, message_id } in messages {
        let event = match scheduler::assign_duty(
            deps.storage,
            params,
            env.block.height,
            route.clone(),
            message_id,
        ) {
            Ok(duty) => Event::DutyAssigned { duty },
            Err(err) if is_assignment_failure(err.current_context()) => {
                Event::DutyAssignmentFailed {
                    route,
                    message_id,
                    reason: err.current_context().to_string(),
                }
            }
            Err(err) => return Err(err),
        };
        events.push(event);
    }

    Ok(Response::new().add_events(events))
}

fn is_assignment_failure(err: &ContractError) -> bool {
    matches!(
        err,
        ContractError::NoEligibleValidator(_)
            | ContractError::DutyAlreadyExists { .. }
            | ContractError::DutyAlreadyFinalized(_)
            | ContractError::InvalidRoute
            | ContractError::DeadlineOverflow
    )
}

pub fn record_relay_completion(
    deps: DepsMut,
    route: Route,
    message_id: u64,
) -> Result<Response, ContractError> {
    let duty = enforcement::record_completion(deps.storage, route, message_id)?;

    Ok(Response::new().add_event(Event::DutyFulfilled { duty }))
}

pub fn update_params(
    deps: DepsMut,
    params: Params,
    deadline_window: Option<u64>,
    selection_policy: Option<SelectionPolicy>,
) -> Result<Response, ContractError> {
    ensure!(
        deadline_window != Some(0),
        ContractError::InvalidDeadlineWindow
    );

    let params = Params {
        deadline_window: deadline_window.unwrap_or(params.deadline_window),
        selection_policy: selection_policy.unwrap_or(params.selection_policy),
        ..params
    };
    state::save_params(deps.storage, &params).attach_printable("updating params")?;

    Ok(Response::new().add_event(Event::ParamsUpdated {
        deadline_window: params.deadline_window,
        selection_policy: params.selection_policy,
    }))
}
