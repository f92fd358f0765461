use std::time::Duration;

use async_trait::async_trait;
use cosmrs::rpc::{Client, HttpClient};
use error_stack::{report, Result, ResultExt};
use mockall::automock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to broadcast the tx")]
    Broadcast,
    #[error("broadcast timed out after {0:?}")]
    Timeout(Duration),
    #[error("tx was rejected with code {code}: {log}")]
    Rejected { code: u32, log: String },
}

#[automock]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submits signed tx bytes and returns the tx hash.
    async fn broadcast(&self, tx: Vec<u8>) -> Result<String, Error>;
}

pub struct RpcBroadcaster {
    client: HttpClient,
    timeout: Duration,
}

impl RpcBroadcaster {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Broadcaster for RpcBroadcaster {
    async fn broadcast(&self, tx: Vec<u8>) -> Result<String, Error> {
        let response = tokio::time::timeout(self.timeout, self.client.broadcast_tx_sync(tx))
            .await
            .map_err(|_| report!(Error::Timeout(self.timeout)))?
            .change_context(Error::Broadcast)?;

        if response.code.is_err() {
            return Err(report!(Error::Rejected {
                code: response.code.value(),
                log: response.log,
            }));
        }

        Ok(response.hash.to_string())
    }
}
