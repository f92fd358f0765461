use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("chain id is invalid")]
    InvalidChainId,

    #[error("route must connect two different chains")]
    InvalidRoute,

    #[error("{0} address must not be empty")]
    EmptyAddress(&'static str),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid public key: {reason}")]
    InvalidPublicKey { reason: String },

    #[error("origin heights are not a valid chain id to height mapping: {reason}")]
    MalformedOriginHeights { reason: String },
}
