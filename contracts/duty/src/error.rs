use cosmwasm_std::StdError;
use error_stack::{report, Context, Report};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("caller is not authorized")]
    Unauthorized,

    #[error("message failed basic validation")]
    InvalidMessage,

    #[error("invalid address {0}")]
    InvalidAddress(String),

    #[error("deadline window must be greater than zero")]
    InvalidDeadlineWindow,

    #[error("route must connect two different chains")]
    InvalidRoute,

    #[error("sidecars are already registered for validator {0}")]
    SidecarsAlreadyRegistered(String),

    #[error("validator {0} has no sidecar registration")]
    UnknownValidator(String),

    #[error("heartbeat signature does not match the registered relayer key")]
    BadSignature,

    #[error("heartbeat does not advance the last accepted origin heights")]
    StaleHeartbeat,

    #[error("malformed origin heights")]
    MalformedOriginHeights,

    #[error("no eligible validator for route {0}")]
    NoEligibleValidator(String),

    #[error("duty for message {message_id} on route {route} already exists")]
    DutyAlreadyExists { route: String, message_id: u64 },

    #[error("duty for message {message_id} on route {route} not found")]
    DutyNotFound { route: String, message_id: u64 },

    #[error("duty is already {0}")]
    DutyAlreadyFinalized(String),

    #[error("deadline at height {0} has not passed yet")]
    DeadlineNotReached(u64),

    #[error("duty is assigned to a different validator")]
    AssignedValidatorMismatch,

    #[error("proof verification failed")]
    InvalidProof,

    #[error("deadline height overflows")]
    DeadlineOverflow,

    #[error("failed to load params")]
    LoadParams,

    #[error("failed to save params")]
    SaveParams,

    #[error("failed to load duty")]
    LoadDuty,

    #[error("failed to save duty")]
    SaveDuty,

    #[error("failed to serialize the response")]
    SerializeResponse,
}

/// Error returned by the entry points. It keeps the full context chain of the underlying report
/// so that it's visible to the submitter of the transaction.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("{0}")]
    Structured(String),
}

impl<T> From<Report<T>> for Error
where
    T: Context,
{
    fn from(report: Report<T>) -> Self {
        Error::Structured(format!("{report:#}"))
    }
}

impl From<ContractError> for Error {
    fn from(err: ContractError) -> Self {
        report!(err).into()
    }
}

#[cfg(test)]
pub(crate) fn err_contains(err: &impl ToString, expected: &impl ToString) -> bool {
    err.to_string().contains(&expected.to_string())
}
