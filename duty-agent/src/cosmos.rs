use async_trait::async_trait;
use cosmrs::proto::cosmos::auth::v1beta1::query_client::QueryClient as AuthQueryClient;
use cosmrs::proto::cosmos::auth::v1beta1::{BaseAccount, QueryAccountRequest};
use cosmrs::AccountId;
use error_stack::{report, Result, ResultExt};
use mockall::automock;
use prost::Message;
use thiserror::Error;
use tonic::transport::Channel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to make the grpc request")]
    GrpcRequest,
    #[error("account is missing in the query response")]
    AccountMissing,
    #[error("failed to decode the query response")]
    MalformedResponse,
}

/// Account number and sequence needed to sign a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub account_number: u64,
    pub sequence: u64,
}

impl From<BaseAccount> for Account {
    fn from(account: BaseAccount) -> Self {
        Self {
            account_number: account.account_number,
            sequence: account.sequence,
        }
    }
}

#[automock]
#[async_trait]
pub trait CosmosClient: Send + Sync {
    async fn account(&self, address: &AccountId) -> Result<Account, Error>;
}

#[derive(Clone)]
pub struct CosmosGrpcClient {
    auth: AuthQueryClient<Channel>,
}

impl CosmosGrpcClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            auth: AuthQueryClient::new(channel),
        }
    }
}

#[async_trait]
impl CosmosClient for CosmosGrpcClient {
    async fn account(&self, address: &AccountId) -> Result<Account, Error> {
        let account = self
            .auth
            .clone()
            .account(QueryAccountRequest {
                address: address.to_string(),
            })
            .await
            .change_context(Error::GrpcRequest)?
            .into_inner()
            .account
            .ok_or_else(|| report!(Error::AccountMissing))?;

        BaseAccount::decode(&account.value[..])
            .map(Account::from)
            .change_context(Error::MalformedResponse)
    }
}
