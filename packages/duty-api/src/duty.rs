use std::fmt::{self, Display};

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;

use crate::primitives::Route;

#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum DutyStatus {
    Pending,
    Fulfilled,
    Missed,
    Invalid,
}

impl DutyStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DutyStatus::Pending)
    }

    /// Status only ever moves out of `Pending`, and only once.
    pub fn can_transition_to(&self, next: DutyStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

impl Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyStatus::Pending => write!(f, "pending"),
            DutyStatus::Fulfilled => write!(f, "fulfilled"),
            DutyStatus::Missed => write!(f, "missed"),
            DutyStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// One relay obligation of `assigned_validator` for `message_id` on `route`.
#[cw_serde]
#[derive(Eq)]
pub struct Duty {
    pub route: Route,
    pub message_id: u64,
    pub assigned_validator: Addr,
    pub created_height: u64,
    pub deadline_height: u64,
    pub status: DutyStatus,
}

/// Identifies a duty. At most one duty exists per message of a route.
#[cw_serde]
#[derive(Eq)]
pub struct DutyId {
    pub route: Route,
    pub message_id: u64,
}

impl Duty {
    pub fn id(&self) -> DutyId {
        DutyId {
            route: self.route.clone(),
            message_id: self.message_id,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DutyStatus::Pending
    }

    /// The deadline height itself is still within the relay window.
    pub fn is_overdue(&self, current_height: u64) -> bool {
        current_height > self.deadline_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotonic() {
        use DutyStatus::*;

        for next in [Fulfilled, Missed, Invalid] {
            assert!(Pending.can_transition_to(next));
        }
        assert!(!Pending.can_transition_to(Pending));

        for terminal in [Fulfilled, Missed, Invalid] {
            for next in [Pending, Fulfilled, Missed, Invalid] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn duty_is_overdue_only_after_deadline() {
        let duty = Duty {
            route: "a-1:b-1".parse().unwrap(),
            message_id: 1,
            assigned_validator: Addr::unchecked("validator"),
            created_height: 100,
            deadline_height: 150,
            status: DutyStatus::Pending,
        };

        assert!(!duty.is_overdue(149));
        assert!(!duty.is_overdue(150));
        assert!(duty.is_overdue(151));
    }
}
