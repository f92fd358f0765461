use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, HexBinary};

use crate::duty::{Duty, DutyId, DutyStatus};
use crate::error::Error;
use crate::heartbeat::Liveness;
use crate::key::PublicKey;
use crate::primitives::Route;
use crate::sidecar::SidecarRegistration;

#[cw_serde]
pub struct InstantiateMsg {
    /// Can update the parameters of the contract
    pub governance_address: String,
    /// Submits dispatched messages for duty assignment
    pub dispatcher_address: String,
    /// Records observed relay completions
    pub relay_observer_address: String,
    pub proof_verifier_address: String,
    pub penalty_address: String,
    /// Number of blocks a validator has to relay an assigned message
    pub deadline_window: u64,
    pub selection_policy: SelectionPolicy,
}

/// Deterministic strategy used to pick the responsible validator for a dispatched message.
#[cw_serde]
#[derive(Copy, Eq, Default)]
pub enum SelectionPolicy {
    /// `message_id mod n` over the eligible validators in ascending address order
    #[default]
    RoundRobin,
    /// keccak256 of the route and message id, reduced mod n
    Hashed,
}

#[cw_serde]
pub struct Params {
    pub governance: Addr,
    pub dispatcher: Addr,
    pub relay_observer: Addr,
    pub proof_verifier: Addr,
    pub penalty: Addr,
    pub deadline_window: u64,
    pub selection_policy: SelectionPolicy,
}

#[cw_serde]
pub struct DispatchedMessage {
    pub route: Route,
    pub message_id: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    RegisterSidecars {
        validator: String,
        relayer_pub_key: PublicKey,
        validator_pub_key: PublicKey,
    },
    /// Replaces the sidecar keys of an already registered validator.
    RotateSidecars {
        validator: String,
        relayer_pub_key: PublicKey,
        validator_pub_key: PublicKey,
    },
    RegisterRouteSupport {
        validator: String,
        routes: Vec<Route>,
    },
    DeregisterRouteSupport {
        validator: String,
        routes: Vec<Route>,
    },
    Heartbeat {
        validator: String,
        origin_heights_json: String,
        signature: HexBinary,
    },
    ReportMissed {
        route: Route,
        message_id: u64,
        assigned_validator: String,
        origin_proof: HexBinary,
        dest_non_inclusion_proof: HexBinary,
        signer: String,
    },
    ReportInvalid {
        route: Route,
        message_id: u64,
        assigned_validator: String,
        dest_failure_proof: HexBinary,
        signer: String,
    },
    /// Each message is assigned independently, a failed assignment does not fail the batch.
    DispatchMessages {
        messages: Vec<DispatchedMessage>,
    },
    RecordRelayCompletion {
        route: Route,
        message_id: u64,
    },
    UpdateParams {
        deadline_window: Option<u64>,
        selection_policy: Option<SelectionPolicy>,
    },
}

/// The account a message must be sent by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredSigner {
    Account(String),
    Governance,
    Dispatcher,
    RelayObserver,
}

fn non_empty_address(address: &str, name: &'static str) -> Result<(), Error> {
    if address.trim().is_empty() {
        return Err(Error::EmptyAddress(name));
    }

    Ok(())
}

fn validate_routes(routes: &[Route]) -> Result<(), Error> {
    if routes.is_empty() {
        return Err(Error::EmptyField("routes"));
    }

    routes.iter().try_for_each(Route::validate)
}

impl ExecuteMsg {
    /// Stateless checks, run before the message touches any storage.
    pub fn validate_basic(&self) -> Result<(), Error> {
        match self {
            ExecuteMsg::RegisterSidecars { validator, .. }
            | ExecuteMsg::RotateSidecars { validator, .. } => {
                non_empty_address(validator, "validator")
            }
            ExecuteMsg::RegisterRouteSupport { validator, routes }
            | ExecuteMsg::DeregisterRouteSupport { validator, routes } => {
                non_empty_address(validator, "validator")?;
                validate_routes(routes)
            }
            ExecuteMsg::Heartbeat {
                validator,
                origin_heights_json,
                signature,
            } => {
                non_empty_address(validator, "validator")?;
                if origin_heights_json.trim().is_empty() {
                    return Err(Error::EmptyField("origin heights"));
                }
                if signature.is_empty() {
                    return Err(Error::EmptyField("signature"));
                }
                Ok(())
            }
            ExecuteMsg::ReportMissed {
                route,
                assigned_validator,
                signer,
                ..
            }
            | ExecuteMsg::ReportInvalid {
                route,
                assigned_validator,
                signer,
                ..
            } => {
                route.validate()?;
                non_empty_address(assigned_validator, "assigned validator")?;
                non_empty_address(signer, "signer")
            }
            ExecuteMsg::DispatchMessages { messages } => {
                if messages.is_empty() {
                    return Err(Error::EmptyField("messages"));
                }
                Ok(())
            }
            ExecuteMsg::RecordRelayCompletion { route, .. } => route.validate(),
            ExecuteMsg::UpdateParams { .. } => Ok(()),
        }
    }

    pub fn required_signer(&self) -> RequiredSigner {
        match self {
            ExecuteMsg::RegisterSidecars { validator, .. }
            | ExecuteMsg::RotateSidecars { validator, .. }
            | ExecuteMsg::RegisterRouteSupport { validator, .. }
            | ExecuteMsg::DeregisterRouteSupport { validator, .. }
            | ExecuteMsg::Heartbeat { validator, .. } => RequiredSigner::Account(validator.clone()),
            ExecuteMsg::ReportMissed { signer, .. } | ExecuteMsg::ReportInvalid { signer, .. } => {
                RequiredSigner::Account(signer.clone())
            }
            ExecuteMsg::DispatchMessages { .. } => RequiredSigner::Dispatcher,
            ExecuteMsg::RecordRelayCompletion { .. } => RequiredSigner::RelayObserver,
            ExecuteMsg::UpdateParams { .. } => RequiredSigner::Governance,
        }
    }
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Duty)]
    Duty { route: Route, message_id: u64 },

    // Returns the duties assigned to `validator`, ordered by route and message id.
    // The list is paginated by:
    // - start_after: the duty after which the next page of results starts.
    // - limit: limit the number of duties returned, default is u32::MAX.
    // A status filter only visits duties in that status.
    #[returns(Vec<Duty>)]
    Duties {
        validator: String,
        status: Option<DutyStatus>,
        start_after: Option<DutyId>,
        limit: Option<u32>,
    },

    #[returns(Option<SidecarRegistration>)]
    SidecarRegistration { validator: String },

    #[returns(Option<Liveness>)]
    Liveness { validator: String },

    /// Validators eligible for assignment on `route`, in ascending address order
    #[returns(Vec<Addr>)]
    ActiveValidators { route: Route },

    #[returns(Params)]
    Params,
}
