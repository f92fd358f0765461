//! Interface of the external proof verifier contract.
//!
//! Every query answers with a plain `bool`. The proof system itself is opaque to this crate,
//! a verifier only has to bind each proof to the message it is queried for.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::HexBinary;

use crate::primitives::Route;

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// The message was dispatched on the origin chain at or before `height`.
    #[returns(bool)]
    VerifyOriginInclusion {
        route: Route,
        message_id: u64,
        height: u64,
        proof: HexBinary,
    },

    /// No relay of the message exists on the destination chain as of `height`.
    #[returns(bool)]
    VerifyDestinationNonInclusion {
        route: Route,
        message_id: u64,
        height: u64,
        proof: HexBinary,
    },

    /// A relay by `assigned_validator` failed or was malformed on the destination chain.
    #[returns(bool)]
    VerifyDestinationFailure {
        route: Route,
        message_id: u64,
        assigned_validator: String,
        proof: HexBinary,
    },
}
