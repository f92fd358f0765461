use cosmwasm_std::{Addr, Order, StdResult, Storage};
use cw_storage_plus::{index_list, Bound, IndexedMap, Item, Map, MultiIndex};
use duty_api::msg::Params;
use duty_api::{ChainId, Duty, DutyId, DutyStatus, Liveness, Route, SidecarRegistration};
use error_stack::{ensure, report, Result, ResultExt};

use crate::error::ContractError;

/// (origin, destination, message id)
type DutyKey = (ChainId, ChainId, u64);

fn duty_key(route: &Route, message_id: u64) -> DutyKey {
    (route.origin.clone(), route.destination.clone(), message_id)
}

#[index_list(Duty)]
struct DutyIndexes<'a> {
    by_validator: MultiIndex<'a, Addr, Duty, DutyKey>,
    /// Re-indexed on every status change, so a status scan never visits duties in other states
    by_validator_status: MultiIndex<'a, (Addr, String), Duty, DutyKey>,
}

const DUTIES: IndexedMap<DutyKey, Duty, DutyIndexes> = IndexedMap::new(
    "duties",
    DutyIndexes {
        by_validator: MultiIndex::new(
            |_pk, duty| duty.assigned_validator.clone(),
            "duties",
            "duties__by_validator",
        ),
        by_validator_status: MultiIndex::new(
            |_pk, duty| (duty.assigned_validator.clone(), duty.status.to_string()),
            "duties",
            "duties__by_validator_status",
        ),
    },
);

const PARAMS: Item<Params> = Item::new("params");

pub const SIDECARS: Map<&Addr, SidecarRegistration> = Map::new("sidecars");
pub const LIVENESS: Map<&Addr, Liveness> = Map::new("liveness");
/// Validators that registered support for a route, keyed by (origin, destination, validator)
pub const ROUTE_SUPPORT: Map<(&ChainId, &ChainId, &Addr), ()> = Map::new("route_support");

pub fn load_params(storage: &dyn Storage) -> Result<Params, ContractError> {
    PARAMS.load(storage).change_context(ContractError::LoadParams)
}

pub fn save_params(storage: &mut dyn Storage, params: &Params) -> Result<(), ContractError> {
    PARAMS
        .save(storage, params)
        .change_context(ContractError::SaveParams)
}

pub fn may_load_duty(
    storage: &dyn Storage,
    route: &Route,
    message_id: u64,
) -> Result<Option<Duty>, ContractError> {
    DUTIES
        .may_load(storage, duty_key(route, message_id))
        .change_context(ContractError::LoadDuty)
}

pub fn load_duty(
    storage: &dyn Storage,
    route: &Route,
    message_id: u64,
) -> Result<Duty, ContractError> {
    may_load_duty(storage, route, message_id)?.ok_or_else(|| {
        report!(ContractError::DutyNotFound {
            route: route.to_string(),
            message_id,
        })
    })
}

/// Duties of `validator` in primary key order, starting after `start_after`.
///
/// With a status filter only the duties currently in that status are read.
pub fn duties_by_validator(
    storage: &dyn Storage,
    validator: &Addr,
    status: Option<DutyStatus>,
    start_after: Option<DutyId>,
    limit: u32,
) -> Result<Vec<Duty>, ContractError> {
    let start = start_after.map(|id| Bound::exclusive(duty_key(&id.route, id.message_id)));
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    let duties = match status {
        Some(status) => DUTIES
            .idx
            .by_validator_status
            .prefix((validator.clone(), status.to_string()))
            .range(storage, start, None, Order::Ascending),
        None => DUTIES
            .idx
            .by_validator
            .prefix(validator.clone())
            .range(storage, start, None, Order::Ascending),
    };

    duties
        .take(limit)
        .map(|res| res.map(|(_, duty)| duty))
        .collect::<StdResult<Vec<_>>>()
        .change_context(ContractError::LoadDuty)
}

/// Inserts a new duty or moves an existing one to a new status.
///
/// A new duty must be `Pending`. A stored duty may only leave `Pending`, so terminal duties
/// are never overwritten or resurrected. All fields but the status of a stored duty are immutable.
pub fn upsert_duty(storage: &mut dyn Storage, duty: &Duty) -> Result<(), ContractError> {
    let key = duty_key(&duty.route, duty.message_id);

    match DUTIES
        .may_load(storage, key.clone())
        .change_context(ContractError::LoadDuty)?
    {
        None => ensure!(
            duty.is_pending(),
            ContractError::DutyNotFound {
                route: duty.route.to_string(),
                message_id: duty.message_id,
            }
        ),
        Some(stored) => {
            ensure!(
                !stored.status.is_terminal(),
                ContractError::DutyAlreadyFinalized(stored.status.to_string())
            );

            let same_duty = Duty {
                status: duty.status,
                ..stored.clone()
            } == *duty;
            ensure!(
                same_duty && stored.status.can_transition_to(duty.status),
                ContractError::DutyAlreadyExists {
                    route: duty.route.to_string(),
                    message_id: duty.message_id,
                }
            );
        }
    }

    DUTIES
        .save(storage, key, duty)
        .change_context(ContractError::SaveDuty)
}

/// Eligible validators of a route, in ascending address order.
///
/// A validator is eligible if it supports the route and has registered sidecars.
pub fn eligible_validators(storage: &dyn Storage, route: &Route) -> StdResult<Vec<Addr>> {
    ROUTE_SUPPORT
        .prefix((&route.origin, &route.destination))
        .keys(storage, None, None, Order::Ascending)
        .filter_map(|res| match res {
            Ok(validator) if SIDECARS.has(storage, &validator) => Some(Ok(validator)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect()
}

pub fn update_duty_status(
    storage: &mut dyn Storage,
    route: &Route,
    message_id: u64,
    status: DutyStatus,
) -> Result<Duty, ContractError> {
    let duty = Duty {
        status,
        ..load_duty(storage, route, message_id)?
    };
    upsert_duty(storage, &duty)?;

    Ok(duty)
}
