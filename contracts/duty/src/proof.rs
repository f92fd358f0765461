use cosmwasm_std::{to_json_binary, Addr, QuerierWrapper, QueryRequest, WasmQuery};
use duty_api::proof::QueryMsg;
use error_stack::{Report, Result};
#[cfg(test)]
use mockall::automock;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to query the proof verifier")]
    QueryFailed,
}

/// Answers whether a proof holds for the message it is bound to.
#[cfg_attr(test, automock)]
pub trait ProofVerifier {
    fn verify(&self, query: &QueryMsg) -> Result<bool, Error>;
}

/// Delegates verification to the external proof verifier contract.
pub struct Client<'a> {
    querier: QuerierWrapper<'a>,
    address: Addr,
}

impl<'a> Client<'a> {
    pub fn new(querier: QuerierWrapper<'a>, address: Addr) -> Self {
        Client { querier, address }
    }
}

impl<'a> ProofVerifier for Client<'a> {
    fn verify(&self, query: &QueryMsg) -> Result<bool, Error> {
        let msg = to_json_binary(query)
            .map_err(|err| Report::new(err).change_context(Error::QueryFailed))?;

        self.querier
            .query(&QueryRequest::Wasm(WasmQuery::Smart {
                contract_addr: self.address.to_string(),
                msg,
            }))
            .map_err(|err| Report::new(err).change_context(Error::QueryFailed))
    }
}
