use cosmwasm_std::{Addr, HexBinary, Storage};
use duty_api::penalty::Severity;
use duty_api::proof::QueryMsg;
use duty_api::{Duty, DutyStatus, Route};
use error_stack::{ensure, Result, ResultExt};

use crate::error::ContractError;
use crate::proof::ProofVerifier;
use crate::state;

/// Penalty severity for a duty that ended in `status`, if any.
pub fn severity(status: DutyStatus) -> Option<Severity> {
    match status {
        DutyStatus::Missed => Some(Severity::Minor),
        DutyStatus::Invalid => Some(Severity::Major),
        DutyStatus::Pending | DutyStatus::Fulfilled => None,
    }
}

/// Marks an overdue duty as `Missed` if the message provably reached the origin chain by the
/// deadline and provably has not been relayed to the destination chain yet.
///
/// A rejected report leaves the duty untouched and can be resubmitted with other proofs.
#[allow(clippy::too_many_arguments)]
pub fn report_missed(
    storage: &mut dyn Storage,
    verifier: &impl ProofVerifier,
    current_height: u64,
    route: Route,
    message_id: u64,
    assigned_validator: &Addr,
    origin_proof: HexBinary,
    dest_non_inclusion_proof: HexBinary,
) -> Result<Duty, ContractError> {
    let duty = load_pending_duty(storage, &route, message_id, assigned_validator)?;
    ensure!(
        duty.is_overdue(current_height),
        ContractError::DeadlineNotReached(duty.deadline_height)
    );

    verify(
        verifier,
        QueryMsg::VerifyOriginInclusion {
            route: route.clone(),
            message_id,
            height: duty.deadline_height,
            proof: origin_proof,
        },
    )?;
    verify(
        verifier,
        QueryMsg::VerifyDestinationNonInclusion {
            route: route.clone(),
            message_id,
            height: current_height,
            proof: dest_non_inclusion_proof,
        },
    )?;

    state::update_duty_status(storage, &route, message_id, DutyStatus::Missed)
}

/// Marks a pending duty as `Invalid` if its assigned validator provably attempted a relay that
/// failed or was malformed on the destination chain. The deadline does not need to have passed.
pub fn report_invalid(
    storage: &mut dyn Storage,
    verifier: &impl ProofVerifier,
    route: Route,
    message_id: u64,
    assigned_validator: &Addr,
    dest_failure_proof: HexBinary,
) -> Result<Duty, ContractError> {
    load_pending_duty(storage, &route, message_id, assigned_validator)?;

    verify(
        verifier,
        QueryMsg::VerifyDestinationFailure {
            route: route.clone(),
            message_id,
            assigned_validator: assigned_validator.to_string(),
            proof: dest_failure_proof,
        },
    )?;

    state::update_duty_status(storage, &route, message_id, DutyStatus::Invalid)
}

pub fn record_completion(
    storage: &mut dyn Storage,
    route: Route,
    message_id: u64,
) -> Result<Duty, ContractError> {
    state::update_duty_status(storage, &route, message_id, DutyStatus::Fulfilled)
}

fn load_pending_duty(
    storage: &dyn Storage,
    route: &Route,
    message_id: u64,
    assigned_validator: &Addr,
) -> Result<Duty, ContractError> {
    let duty = state::load_duty(storage, route, message_id)?;

    ensure!(
        !duty.status.is_terminal(),
        ContractError::DutyAlreadyFinalized(duty.status.to_string())
    );
    ensure!(
        duty.assigned_validator == *assigned_validator,
        ContractError::AssignedValidatorMismatch
    );

    Ok(duty)
}

fn verify(verifier: &impl ProofVerifier, query: QueryMsg) -> Result<(), ContractError> {
    let proof = match &query {
        QueryMsg::VerifyOriginInclusion { proof, .. }
        | QueryMsg::VerifyDestinationNonInclusion { proof, .. }
        | QueryMsg::VerifyDestinationFailure { proof, .. } => proof,
    };
    ensure!(!proof.is_empty(), ContractError::InvalidProof);

    let is_valid = verifier
        .verify(&query)
        .change_context(ContractError::InvalidProof)?;
    ensure!(is_valid, ContractError::InvalidProof);

    Ok(())
}
