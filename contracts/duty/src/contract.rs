#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Addr, Api, Binary, Deps, DepsMut, Env, MessageInfo, Response};
use duty_api::msg::{ExecuteMsg, InstantiateMsg, Params, QueryMsg, RequiredSigner};
use error_stack::{ensure, Result, ResultExt};

use crate::error::{ContractError, Error};
use crate::state;

mod execute;
mod query;

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> std::result::Result<Response, Error> {
    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.deadline_window == 0 {
        return Err(ContractError::InvalidDeadlineWindow.into());
    }

    let params = Params {
        governance: validate_address(deps.api, &msg.governance_address)?,
        dispatcher: validate_address(deps.api, &msg.dispatcher_address)?,
        relay_observer: validate_address(deps.api, &msg.relay_observer_address)?,
        proof_verifier: validate_address(deps.api, &msg.proof_verifier_address)?,
        penalty: validate_address(deps.api, &msg.penalty_address)?,
        deadline_window: msg.deadline_window,
        selection_policy: msg.selection_policy,
    };
    state::save_params(deps.storage, &params)?;

    Ok(Response::new())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> std::result::Result<Response, Error> {
    msg.validate_basic()
        .change_context(ContractError::InvalidMessage)?;

    let params = state::load_params(deps.storage)?;
    ensure_signer(deps.api, &params, &info.sender, msg.required_signer())?;

    match msg {
        ExecuteMsg::RegisterSidecars {
            validator: _,
            relayer_pub_key,
            validator_pub_key,
        } => execute::register_sidecars(deps, env, info.sender, relayer_pub_key, validator_pub_key),
        ExecuteMsg::RotateSidecars {
            validator: _,
            relayer_pub_key,
            validator_pub_key,
        } => execute::rotate_sidecars(deps, env, info.sender, relayer_pub_key, validator_pub_key),
        ExecuteMsg::RegisterRouteSupport {
            validator: _,
            routes,
        } => execute::register_route_support(deps, info.sender, routes),
        ExecuteMsg::DeregisterRouteSupport {
            validator: _,
            routes,
        } => execute::deregister_route_support(deps, info.sender, routes),
        ExecuteMsg::Heartbeat {
            validator: _,
            origin_heights_json,
            signature,
        } => execute::heartbeat(deps, env, info.sender, origin_heights_json, signature),
        ExecuteMsg::ReportMissed {
            route,
            message_id,
            assigned_validator,
            origin_proof,
            dest_non_inclusion_proof,
            signer: _,
        } => {
            let assigned_validator = validate_address(deps.api, &assigned_validator)?;
            execute::report_missed(
                deps,
                env,
                &params,
                info.sender,
                route,
                message_id,
                assigned_validator,
                origin_proof,
                dest_non_inclusion_proof,
            )
        }
        ExecuteMsg::ReportInvalid {
            route,
            message_id,
            assigned_validator,
            dest_failure_proof,
            signer: _,
        } => {
            let assigned_validator = validate_address(deps.api, &assigned_validator)?;
            execute::report_invalid(
                deps,
                &params,
                info.sender,
                route,
                message_id,
                assigned_validator,
                dest_failure_proof,
            )
        }
        ExecuteMsg::DispatchMessages { messages } => {
            execute::dispatch_messages(deps, env, &params, messages)
        }
        ExecuteMsg::RecordRelayCompletion { route, message_id } => {
            execute::record_relay_completion(deps, route, message_id)
        }
        ExecuteMsg::UpdateParams {
            deadline_window,
            selection_policy,
        } => execute::update_params(deps, params, deadline_window, selection_policy),
    }
    .map_err(Error::from)
}

fn validate_address(api: &dyn Api, address: &str) -> Result<Addr, ContractError> {
    api.addr_validate(address)
        .change_context(ContractError::InvalidAddress(address.to_string()))
}

fn ensure_signer(
    api: &dyn Api,
    params: &Params,
    sender: &Addr,
    required: RequiredSigner,
) -> Result<(), ContractError> {
    let expected = match required {
        RequiredSigner::Account(address) => validate_address(api, &address)?,
        RequiredSigner::Governance => params.governance.clone(),
        RequiredSigner::Dispatcher => params.dispatcher.clone(),
        RequiredSigner::RelayObserver => params.relay_observer.clone(),
    };
    ensure!(expected == *sender, ContractError::Unauthorized);

    Ok(())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> std::result::Result<Binary, Error> {
    match msg {
        QueryMsg::Duty { route, message_id } => {
            to_json_binary(&query::duty(deps, route, message_id)?)
        }
        QueryMsg::Duties {
            validator,
            status,
            start_after,
            limit,
        } => to_json_binary(&query::duties(
            deps,
            validator,
            status,
            start_after,
            limit,
        )?),
        QueryMsg::SidecarRegistration { validator } => {
            to_json_binary(&query::sidecar_registration(deps, validator)?)
        }
        QueryMsg::Liveness { validator } => to_json_binary(&query::liveness(deps, validator)?),
        QueryMsg::ActiveValidators { route } => {
            to_json_binary(&query::active_validators(deps, route)?)
        }
        QueryMsg::Params => to_json_binary(&query::params(deps)?),
    }
    .change_context(ContractError::SerializeResponse)
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use assert_ok::assert_ok;
    use cosmwasm_std::testing::{
        message_info, mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage,
    };
    use cosmwasm_std::{
        from_json, ContractResult, CosmosMsg, Empty, HexBinary, OwnedDeps, SystemResult,
        WasmMsg, WasmQuery,
    };
    use duty_api::msg::{DispatchedMessage, SelectionPolicy};
    use duty_api::penalty::{self, Severity};
    use duty_api::{
        proof, Duty, DutyId, DutyStatus, Liveness, OriginHeights, Route, SidecarRegistration,
    };

    use super::*;
    use crate::error::err_contains;
    use crate::heartbeat::test_keys::TestKey;

    const GOVERNANCE: &str = "governance";
    const DISPATCHER: &str = "dispatcher";
    const RELAY_OBSERVER: &str = "relay_observer";
    const PROOF_VERIFIER: &str = "proof_verifier";
    const PENALTY: &str = "penalty";
    const VALIDATOR: &str = "validator";
    const REPORTER: &str = "reporter";
    const VALID_PROOF: &[u8] = b"valid";

    fn addr(name: &str) -> Addr {
        MockApi::default().addr_make(name)
    }

    fn route() -> Route {
        "origin-1:dest-1".parse().unwrap()
    }

    fn instantiate_msg(deadline_window: u64) -> InstantiateMsg {
        InstantiateMsg {
            governance_address: addr(GOVERNANCE).to_string(),
            dispatcher_address: addr(DISPATCHER).to_string(),
            relay_observer_address: addr(RELAY_OBSERVER).to_string(),
            proof_verifier_address: addr(PROOF_VERIFIER).to_string(),
            penalty_address: addr(PENALTY).to_string(),
            deadline_window,
            selection_policy: SelectionPolicy::RoundRobin,
        }
    }

    fn setup() -> OwnedDeps<MockStorage, MockApi, MockQuerier, Empty> {
        let mut deps = mock_dependencies();

        assert_ok!(instantiate(
            deps.as_mut(),
            mock_env(),
            message_info(&addr("instantiator"), &[]),
            instantiate_msg(50),
        ));

        let verifier = addr(PROOF_VERIFIER).to_string();
        deps.querier.update_wasm(move |wq| match wq {
            WasmQuery::Smart { contract_addr, msg } if *contract_addr == verifier => {
                let proof = match from_json::<proof::QueryMsg>(msg).unwrap() {
                    proof::QueryMsg::VerifyOriginInclusion { proof, .. }
                    | proof::QueryMsg::VerifyDestinationNonInclusion { proof, .. }
                    | proof::QueryMsg::VerifyDestinationFailure { proof, .. } => proof,
                };
                let valid = proof.as_slice() == VALID_PROOF;
                SystemResult::Ok(ContractResult::Ok(to_json_binary(&valid).unwrap()))
            }
            _ => panic!("no mock for this query"),
        });

        deps
    }

    fn execute_as(
        deps: DepsMut,
        height: u64,
        sender: &str,
        msg: ExecuteMsg,
    ) -> std::result::Result<Response, Error> {
        let mut env = mock_env();
        env.block.height = height;
        execute(deps, env, message_info(&addr(sender), &[]), msg)
    }

    fn register_validator(deps: DepsMut, name: &str, key: &TestKey) {
        assert_ok!(execute_as(
            deps,
            10,
            name,
            ExecuteMsg::RegisterSidecars {
                validator: addr(name).to_string(),
                relayer_pub_key: key.public_key(),
                validator_pub_key: key.public_key(),
            },
        ));
    }

    fn support_route(deps: DepsMut, name: &str) {
        assert_ok!(execute_as(
            deps,
            10,
            name,
            ExecuteMsg::RegisterRouteSupport {
                validator: addr(name).to_string(),
                routes: vec![route()],
            },
        ));
    }

    fn dispatch(deps: DepsMut, height: u64, message_ids: &[u64]) -> Response {
        assert_ok!(execute_as(
            deps,
            height,
            DISPATCHER,
            ExecuteMsg::DispatchMessages {
                messages: message_ids
                    .iter()
                    .map(|id| DispatchedMessage {
                        route: route(),
                        message_id: *id,
                    })
                    .collect(),
            },
        ))
    }

    fn query_duty(deps: Deps, message_id: u64) -> Duty {
        from_json(assert_ok!(query(
            deps,
            mock_env(),
            QueryMsg::Duty {
                route: route(),
                message_id
            }
        )))
        .unwrap()
    }

    fn setup_with_duty() -> OwnedDeps<MockStorage, MockApi, MockQuerier, Empty> {
        let mut deps = setup();
        register_validator(deps.as_mut(), VALIDATOR, &TestKey::ed25519(1));
        support_route(deps.as_mut(), VALIDATOR);
        dispatch(deps.as_mut(), 100, &[1]);
        deps
    }

    fn report_missed_msg(origin_proof: &[u8], dest_proof: &[u8]) -> ExecuteMsg {
        ExecuteMsg::ReportMissed {
            route: route(),
            message_id: 1,
            assigned_validator: addr(VALIDATOR).to_string(),
            origin_proof: HexBinary::from(origin_proof),
            dest_non_inclusion_proof: HexBinary::from(dest_proof),
            signer: addr(REPORTER).to_string(),
        }
    }

    #[test]
    fn instantiate_rejects_zero_deadline_window() {
        let mut deps = mock_dependencies();

        let err = instantiate(
            deps.as_mut(),
            mock_env(),
            message_info(&addr("instantiator"), &[]),
            instantiate_msg(0),
        )
        .unwrap_err();

        assert!(err_contains(&err, &ContractError::InvalidDeadlineWindow));
    }

    #[test]
    fn instantiate_rejects_invalid_addresses() {
        let mut deps = mock_dependencies();

        let err = instantiate(
            deps.as_mut(),
            mock_env(),
            message_info(&addr("instantiator"), &[]),
            InstantiateMsg {
                penalty_address: "not a bech32 address".to_string(),
                ..instantiate_msg(50)
            },
        )
        .unwrap_err();

        assert!(err_contains(
            &err,
            &ContractError::InvalidAddress("not a bech32 address".to_string())
        ));
    }

    #[test]
    fn messages_must_be_sent_by_required_signer() {
        let mut deps = setup();
        let key = TestKey::ed25519(1);

        let msgs = [
            ExecuteMsg::RegisterSidecars {
                validator: addr(VALIDATOR).to_string(),
                relayer_pub_key: key.public_key(),
                validator_pub_key: key.public_key(),
            },
            ExecuteMsg::DispatchMessages {
                messages: vec![DispatchedMessage {
                    route: route(),
                    message_id: 1,
                }],
            },
            ExecuteMsg::RecordRelayCompletion {
                route: route(),
                message_id: 1,
            },
            ExecuteMsg::UpdateParams {
                deadline_window: Some(10),
                selection_policy: None,
            },
            report_missed_msg(VALID_PROOF, VALID_PROOF),
        ];

        for msg in msgs {
            let err = execute_as(deps.as_mut(), 10, "intruder", msg).unwrap_err();
            assert!(err_contains(&err, &ContractError::Unauthorized));
        }
    }

    #[test]
    fn messages_with_empty_addresses_fail_basic_validation() {
        let mut deps = setup();

        let err = execute_as(
            deps.as_mut(),
            10,
            VALIDATOR,
            ExecuteMsg::Heartbeat {
                validator: "".to_string(),
                origin_heights_json: "{}".to_string(),
                signature: HexBinary::from([1u8; 64]),
            },
        )
        .unwrap_err();

        assert!(err_contains(&err, &ContractError::InvalidMessage));
    }

    #[test]
    fn sidecars_cannot_be_overwritten_by_registration() {
        let mut deps = setup();
        register_validator(deps.as_mut(), VALIDATOR, &TestKey::ed25519(1));

        let other = TestKey::ed25519(2);
        let err = execute_as(
            deps.as_mut(),
            11,
            VALIDATOR,
            ExecuteMsg::RegisterSidecars {
                validator: addr(VALIDATOR).to_string(),
                relayer_pub_key: other.public_key(),
                validator_pub_key: other.public_key(),
            },
        )
        .unwrap_err();
        assert!(err_contains(
            &err,
            &ContractError::SidecarsAlreadyRegistered(addr(VALIDATOR).to_string())
        ));

        let registration: Option<SidecarRegistration> = from_json(assert_ok!(query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::SidecarRegistration {
                validator: addr(VALIDATOR).to_string()
            }
        )))
        .unwrap();
        assert_eq!(
            registration.unwrap().relayer_pub_key,
            TestKey::ed25519(1).public_key()
        );
    }

    #[test]
    fn rotation_replaces_keys_and_resets_heartbeat_baseline() {
        let mut deps = setup();
        let old_key = TestKey::ed25519(1);
        let new_key = TestKey::ecdsa(2);
        register_validator(deps.as_mut(), VALIDATOR, &old_key);

        let heights: OriginHeights = [("origin-1".parse().unwrap(), 10)].into_iter().collect();
        let heartbeat = |key: &TestKey| ExecuteMsg::Heartbeat {
            validator: addr(VALIDATOR).to_string(),
            origin_heights_json: heights.to_canonical_json().unwrap(),
            signature: key.sign(&heights),
        };
        assert_ok!(execute_as(deps.as_mut(), 20, VALIDATOR, heartbeat(&old_key)));

        let err = execute_as(
            deps.as_mut(),
            21,
            "intruder",
            ExecuteMsg::RotateSidecars {
                validator: addr("intruder").to_string(),
                relayer_pub_key: new_key.public_key(),
                validator_pub_key: new_key.public_key(),
            },
        )
        .unwrap_err();
        assert!(err_contains(
            &err,
            &ContractError::UnknownValidator(addr("intruder").to_string())
        ));

        assert_ok!(execute_as(
            deps.as_mut(),
            30,
            VALIDATOR,
            ExecuteMsg::RotateSidecars {
                validator: addr(VALIDATOR).to_string(),
                relayer_pub_key: new_key.public_key(),
                validator_pub_key: new_key.public_key(),
            },
        ));

        let registration: Option<SidecarRegistration> = from_json(assert_ok!(query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::SidecarRegistration {
                validator: addr(VALIDATOR).to_string()
            }
        )))
        .unwrap();
        let registration = registration.unwrap();
        assert_eq!(registration.version, 2);
        assert_eq!(registration.registered_height, 30);

        let err = execute_as(deps.as_mut(), 31, VALIDATOR, heartbeat(&old_key)).unwrap_err();
        assert!(err_contains(&err, &ContractError::BadSignature));

        // same heights as before rotation, accepted against the fresh baseline
        assert_ok!(execute_as(deps.as_mut(), 31, VALIDATOR, heartbeat(&new_key)));
    }

    #[test]
    fn route_support_requires_sidecars() {
        let mut deps = setup();

        let err = execute_as(
            deps.as_mut(),
            10,
            VALIDATOR,
            ExecuteMsg::RegisterRouteSupport {
                validator: addr(VALIDATOR).to_string(),
                routes: vec![route()],
            },
        )
        .unwrap_err();

        assert!(err_contains(
            &err,
            &ContractError::UnknownValidator(addr(VALIDATOR).to_string())
        ));
    }

    #[test]
    fn active_validators_follow_route_support() {
        let mut deps = setup();
        for name in ["b", "a", "c"] {
            register_validator(deps.as_mut(), name, &TestKey::ed25519(1));
            support_route(deps.as_mut(), name);
        }
        assert_ok!(execute_as(
            deps.as_mut(),
            10,
            "b",
            ExecuteMsg::DeregisterRouteSupport {
                validator: addr("b").to_string(),
                routes: vec![route()],
            },
        ));

        let active: Vec<Addr> = from_json(assert_ok!(query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::ActiveValidators { route: route() }
        )))
        .unwrap();

        let mut expected = vec![addr("a"), addr("c")];
        expected.sort();
        assert_eq!(active, expected);
    }

    #[test]
    fn dispatch_without_eligible_validator_does_not_fail() {
        let mut deps = setup();

        let res = dispatch(deps.as_mut(), 100, &[1]);

        assert_eq!(res.events.len(), 1);
        assert_eq!(res.events[0].ty, "duty_assignment_failed");
        assert!(res.events[0]
            .attributes
            .iter()
            .any(|attr| attr.key == "reason"
                && attr.value
                    == ContractError::NoEligibleValidator(route().to_string()).to_string()));

        let err = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Duty {
                route: route(),
                message_id: 1,
            },
        )
        .unwrap_err();
        assert!(err_contains(
            &err,
            &ContractError::DutyNotFound {
                route: route().to_string(),
                message_id: 1
            }
        ));
    }

    #[test]
    fn dispatch_batch_assigns_independently() {
        let mut deps = setup_with_duty();

        let res = dispatch(deps.as_mut(), 120, &[1, 2]);

        let kinds: Vec<_> = res.events.iter().map(|event| event.ty.as_str()).collect();
        assert_eq!(kinds, vec!["duty_assignment_failed", "duty_assigned"]);

        assert_eq!(query_duty(deps.as_ref(), 1).created_height, 100);
        let duty = query_duty(deps.as_ref(), 2);
        assert_eq!(duty.created_height, 120);
        assert_eq!(duty.deadline_height, 170);
        assert_eq!(duty.assigned_validator, addr(VALIDATOR));
    }

    #[test]
    fn missed_duty_is_penalized_after_deadline() {
        let mut deps = setup_with_duty();
        assert_eq!(query_duty(deps.as_ref(), 1).deadline_height, 150);

        let err = execute_as(
            deps.as_mut(),
            150,
            REPORTER,
            report_missed_msg(VALID_PROOF, VALID_PROOF),
        )
        .unwrap_err();
        assert!(err_contains(&err, &ContractError::DeadlineNotReached(150)));

        let res = assert_ok!(execute_as(
            deps.as_mut(),
            151,
            REPORTER,
            report_missed_msg(VALID_PROOF, VALID_PROOF),
        ));

        assert_eq!(query_duty(deps.as_ref(), 1).status, DutyStatus::Missed);
        assert_eq!(res.messages.len(), 1);
        assert_eq!(
            res.messages[0].msg,
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: addr(PENALTY).to_string(),
                msg: to_json_binary(&penalty::ExecuteMsg::Penalize {
                    validator: addr(VALIDATOR).to_string(),
                    severity: Severity::Minor,
                })
                .unwrap(),
                funds: vec![],
            })
        );
        assert_eq!(res.events[0].ty, "duty_missed");
    }

    #[test]
    fn invalid_proofs_return_error_and_keep_duty_pending() {
        let mut deps = setup_with_duty();

        let err = execute_as(
            deps.as_mut(),
            151,
            REPORTER,
            report_missed_msg(VALID_PROOF, b"forged"),
        )
        .unwrap_err();
        assert!(err_contains(&err, &ContractError::InvalidProof));

        let err = execute_as(
            deps.as_mut(),
            151,
            REPORTER,
            ExecuteMsg::ReportInvalid {
                route: route(),
                message_id: 1,
                assigned_validator: addr(VALIDATOR).to_string(),
                dest_failure_proof: HexBinary::from(&[] as &[u8]),
                signer: addr(REPORTER).to_string(),
            },
        )
        .unwrap_err();
        assert!(err_contains(&err, &ContractError::InvalidProof));

        assert_eq!(query_duty(deps.as_ref(), 1).status, DutyStatus::Pending);
    }

    #[test]
    fn invalid_relay_is_penalized_as_major() {
        let mut deps = setup_with_duty();

        let res = assert_ok!(execute_as(
            deps.as_mut(),
            120,
            REPORTER,
            ExecuteMsg::ReportInvalid {
                route: route(),
                message_id: 1,
                assigned_validator: addr(VALIDATOR).to_string(),
                dest_failure_proof: HexBinary::from(VALID_PROOF),
                signer: addr(REPORTER).to_string(),
            },
        ));

        assert_eq!(query_duty(deps.as_ref(), 1).status, DutyStatus::Invalid);
        assert_eq!(
            res.messages[0].msg,
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: addr(PENALTY).to_string(),
                msg: to_json_binary(&penalty::ExecuteMsg::Penalize {
                    validator: addr(VALIDATOR).to_string(),
                    severity: Severity::Major,
                })
                .unwrap(),
                funds: vec![],
            })
        );
    }

    #[test]
    fn completion_wins_over_later_report() {
        let mut deps = setup_with_duty();

        let res = assert_ok!(execute_as(
            deps.as_mut(),
            140,
            RELAY_OBSERVER,
            ExecuteMsg::RecordRelayCompletion {
                route: route(),
                message_id: 1,
            },
        ));
        assert_eq!(res.events[0].ty, "duty_fulfilled");

        let err = execute_as(
            deps.as_mut(),
            151,
            REPORTER,
            report_missed_msg(VALID_PROOF, VALID_PROOF),
        )
        .unwrap_err();
        assert!(err_contains(
            &err,
            &ContractError::DutyAlreadyFinalized("fulfilled".to_string())
        ));
        assert_eq!(query_duty(deps.as_ref(), 1).status, DutyStatus::Fulfilled);
    }

    #[test]
    fn duties_query_filters_by_status() {
        let mut deps = setup_with_duty();
        dispatch(deps.as_mut(), 101, &[2, 3]);
        assert_ok!(execute_as(
            deps.as_mut(),
            110,
            RELAY_OBSERVER,
            ExecuteMsg::RecordRelayCompletion {
                route: route(),
                message_id: 2,
            },
        ));

        let duties = |status: Option<DutyStatus>| -> Vec<u64> {
            let duties: Vec<Duty> = from_json(assert_ok!(query(
                deps.as_ref(),
                mock_env(),
                QueryMsg::Duties {
                    validator: addr(VALIDATOR).to_string(),
                    status,
                    start_after: None,
                    limit: None,
                }
            )))
            .unwrap();
            duties.into_iter().map(|duty| duty.message_id).collect()
        };

        assert_eq!(duties(None), vec![1, 2, 3]);
        assert_eq!(duties(Some(DutyStatus::Pending)), vec![1, 3]);
        assert_eq!(duties(Some(DutyStatus::Fulfilled)), vec![2]);
        assert!(duties(Some(DutyStatus::Missed)).is_empty());
    }

    #[test]
    fn duties_query_pages_through_pending_duties() {
        let mut deps = setup_with_duty();
        dispatch(deps.as_mut(), 101, &[2, 3, 4]);
        assert_ok!(execute_as(
            deps.as_mut(),
            110,
            RELAY_OBSERVER,
            ExecuteMsg::RecordRelayCompletion {
                route: route(),
                message_id: 2,
            },
        ));

        let page = |start_after: Option<DutyId>| -> Vec<Duty> {
            from_json(assert_ok!(query(
                deps.as_ref(),
                mock_env(),
                QueryMsg::Duties {
                    validator: addr(VALIDATOR).to_string(),
                    status: Some(DutyStatus::Pending),
                    start_after,
                    limit: Some(2),
                }
            )))
            .unwrap()
        };

        let first = page(None);
        assert_eq!(
            first.iter().map(|duty| duty.message_id).collect::<Vec<_>>(),
            vec![1, 3]
        );

        let second = page(first.last().map(Duty::id));
        assert_eq!(
            second.iter().map(|duty| duty.message_id).collect::<Vec<_>>(),
            vec![4]
        );
    }

    #[test]
    fn heartbeat_updates_liveness_and_rejects_replay() {
        let mut deps = setup();
        let key = TestKey::ecdsa(1);
        register_validator(deps.as_mut(), VALIDATOR, &key);

        let heights: OriginHeights = [("origin-1".parse().unwrap(), 10)].into_iter().collect();
        let msg = ExecuteMsg::Heartbeat {
            validator: addr(VALIDATOR).to_string(),
            origin_heights_json: heights.to_canonical_json().unwrap(),
            signature: key.sign(&heights),
        };

        let res = assert_ok!(execute_as(deps.as_mut(), 42, VALIDATOR, msg.clone()));
        assert_eq!(res.events[0].ty, "heartbeat_accepted");

        let liveness: Option<Liveness> = from_json(assert_ok!(query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Liveness {
                validator: addr(VALIDATOR).to_string()
            }
        )))
        .unwrap();
        assert_eq!(liveness.unwrap().last_heartbeat_height, 42);

        let err = execute_as(deps.as_mut(), 43, VALIDATOR, msg).unwrap_err();
        assert!(err_contains(&err, &ContractError::StaleHeartbeat));
    }

    #[test]
    fn params_update_applies_to_new_duties_only() {
        let mut deps = setup_with_duty();

        let err = execute_as(
            deps.as_mut(),
            100,
            GOVERNANCE,
            ExecuteMsg::UpdateParams {
                deadline_window: Some(0),
                selection_policy: None,
            },
        )
        .unwrap_err();
        assert!(err_contains(&err, &ContractError::InvalidDeadlineWindow));

        assert_ok!(execute_as(
            deps.as_mut(),
            100,
            GOVERNANCE,
            ExecuteMsg::UpdateParams {
                deadline_window: Some(10),
                selection_policy: Some(SelectionPolicy::Hashed),
            },
        ));
        dispatch(deps.as_mut(), 200, &[2]);

        assert_eq!(query_duty(deps.as_ref(), 1).deadline_height, 150);
        assert_eq!(query_duty(deps.as_ref(), 2).deadline_height, 210);

        let params: Params =
            from_json(assert_ok!(query(deps.as_ref(), mock_env(), QueryMsg::Params))).unwrap();
        assert_eq!(params.deadline_window, 10);
        assert_eq!(params.selection_policy, SelectionPolicy::Hashed);
    }
}
