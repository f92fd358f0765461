use cosmwasm_std::Addr;
use duty_api::msg::SelectionPolicy;
use duty_api::penalty::Severity;
use duty_api::{Duty, KeyType, Liveness, Route};

pub enum Event {
    DutyAssigned {
        duty: Duty,
    },
    DutyAssignmentFailed {
        route: Route,
        message_id: u64,
        reason: String,
    },
    DutyFulfilled {
        duty: Duty,
    },
    DutyMissed {
        duty: Duty,
        reporter: Addr,
        severity: Severity,
    },
    DutyInvalid {
        duty: Duty,
        reporter: Addr,
        severity: Severity,
    },
    HeartbeatAccepted {
        validator: Addr,
        liveness: Liveness,
    },
    SidecarsRegistered {
        validator: Addr,
        relayer_key_type: KeyType,
        version: u64,
    },
    SidecarsRotated {
        validator: Addr,
        relayer_key_type: KeyType,
        version: u64,
    },
    RouteSupportRegistered {
        validator: Addr,
        routes: Vec<Route>,
    },
    RouteSupportDeregistered {
        validator: Addr,
        routes: Vec<Route>,
    },
    ParamsUpdated {
        deadline_window: u64,
        selection_policy: SelectionPolicy,
    },
}

fn duty_event(name: &str, duty: &Duty) -> cosmwasm_std::Event {
    cosmwasm_std::Event::new(name)
        .add_attribute("route", duty.route.to_string())
        .add_attribute("message_id", duty.message_id.to_string())
        .add_attribute("assigned_validator", duty.assigned_validator.as_str())
}

fn routes_attribute(routes: &[Route]) -> String {
    routes
        .iter()
        .map(Route::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl From<Event> for cosmwasm_std::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::DutyAssigned { duty } => duty_event("duty_assigned", &duty)
                .add_attribute("created_height", duty.created_height.to_string())
                .add_attribute("deadline_height", duty.deadline_height.to_string()),
            Event::DutyAssignmentFailed {
                route,
                message_id,
                reason,
            } => cosmwasm_std::Event::new("duty_assignment_failed")
                .add_attribute("route", route.to_string())
                .add_attribute("message_id", message_id.to_string())
                .add_attribute("reason", reason),
            Event::DutyFulfilled { duty } => duty_event("duty_fulfilled", &duty),
            Event::DutyMissed {
                duty,
                reporter,
                severity,
            } => duty_event("duty_missed", &duty)
                .add_attribute("reporter", reporter)
                .add_attribute("severity", severity.to_string()),
            Event::DutyInvalid {
                duty,
                reporter,
                severity,
            } => duty_event("duty_invalid", &duty)
                .add_attribute("reporter", reporter)
                .add_attribute("severity", severity.to_string()),
            Event::HeartbeatAccepted {
                validator,
                liveness,
            } => cosmwasm_std::Event::new("heartbeat_accepted")
                .add_attribute("validator", validator)
                .add_attribute("height", liveness.last_heartbeat_height.to_string())
                .add_attribute(
                    "origin_heights",
                    liveness
                        .origin_heights
                        .to_canonical_json()
                        .unwrap_or_default(),
                ),
            Event::SidecarsRegistered {
                validator,
                relayer_key_type,
                version,
            } => cosmwasm_std::Event::new("sidecars_registered")
                .add_attribute("validator", validator)
                .add_attribute("relayer_key_type", format!("{relayer_key_type:?}"))
                .add_attribute("version", version.to_string()),
            Event::SidecarsRotated {
                validator,
                relayer_key_type,
                version,
            } => cosmwasm_std::Event::new("sidecars_rotated")
                .add_attribute("validator", validator)
                .add_attribute("relayer_key_type", format!("{relayer_key_type:?}"))
                .add_attribute("version", version.to_string()),
            Event::RouteSupportRegistered { validator, routes } => {
                cosmwasm_std::Event::new("route_support_registered")
                    .add_attribute("validator", validator)
                    .add_attribute("routes", routes_attribute(&routes))
            }
            Event::RouteSupportDeregistered { validator, routes } => {
                cosmwasm_std::Event::new("route_support_deregistered")
                    .add_attribute("validator", validator)
                    .add_attribute("routes", routes_attribute(&routes))
            }
            Event::ParamsUpdated {
                deadline_window,
                selection_policy,
            } => cosmwasm_std::Event::new("params_updated")
                .add_attribute("deadline_window", deadline_window.to_string())
                .add_attribute("selection_policy", format!("{selection_policy:?}")),
        }
    }
}
