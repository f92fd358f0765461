use async_trait::async_trait;
use cosmrs::proto::cosmwasm::wasm::v1::query_client::QueryClient;
use cosmrs::proto::cosmwasm::wasm::v1::QuerySmartContractStateRequest;
use cosmrs::AccountId;
use duty_api::msg::QueryMsg;
use duty_api::{Duty, DutyId, DutyStatus};
use error_stack::{Result, ResultExt};
use mockall::automock;
use thiserror::Error;
use tonic::transport::Channel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to encode the duty query")]
    Encode,
    #[error("failed to query the duty contract")]
    Query,
    #[error("failed to decode the duty query response")]
    Decode,
}

#[automock]
#[async_trait]
pub trait DutyQuerier: Send + Sync {
    /// Duties assigned to `validator` that are still pending, ordered by route and message id.
    async fn pending_duties(&self, validator: &AccountId) -> Result<Vec<Duty>, Error>;
}

pub struct DutyClient {
    wasm: QueryClient<Channel>,
    contract: AccountId,
}

impl DutyClient {
    pub fn new(channel: Channel, contract: AccountId) -> Self {
        Self {
            wasm: QueryClient::new(channel),
            contract,
        }
    }
}

const PAGE_LIMIT: u32 = 100;

fn pending_duties_query(
    validator: &AccountId,
    start_after: Option<DutyId>,
) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(&QueryMsg::Duties {
        validator: validator.to_string(),
        status: Some(DutyStatus::Pending),
        start_after,
        limit: Some(PAGE_LIMIT),
    })
    .change_context(Error::Encode)
}

impl DutyClient {
    async fn pending_duties_page(
        &self,
        validator: &AccountId,
        start_after: Option<DutyId>,
    ) -> Result<Vec<Duty>, Error> {
        let request = QuerySmartContractStateRequest {
            address: self.contract.to_string(),
            query_data: pending_duties_query(validator, start_after)?,
        };

        let response = self
            .wasm
            .clone()
            .smart_contract_state(request)
            .await
            .change_context(Error::Query)?
            .into_inner();

        serde_json::from_slice(&response.data).change_context(Error::Decode)
    }
}

#[async_trait]
impl DutyQuerier for DutyClient {
    async fn pending_duties(&self, validator: &AccountId) -> Result<Vec<Duty>, Error> {
        let mut duties: Vec<Duty> = Vec::new();

        loop {
            let page = self
                .pending_duties_page(validator, duties.last().map(Duty::id))
                .await?;
            let last_page = page.len() < usize::try_from(PAGE_LIMIT).unwrap_or(usize::MAX);
            duties.extend(page);

            if last_page {
                return Ok(duties);
            }
        }
    }
}
