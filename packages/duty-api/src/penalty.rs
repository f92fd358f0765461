//! Interface of the external penalty contract. Slashing and jailing mechanics live behind it.

use std::fmt::{self, Display};

use cosmwasm_schema::cw_serde;

#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum Severity {
    /// The validator did not relay an assigned message before its deadline.
    Minor,
    /// The validator relayed a malformed message or one that failed on the destination chain.
    Major,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
        }
    }
}

#[cw_serde]
pub enum ExecuteMsg {
    Penalize { validator: String, severity: Severity },
}
