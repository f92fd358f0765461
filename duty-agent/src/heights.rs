use std::time::Duration;

use async_trait::async_trait;
use cosmrs::rpc::{Client, HttpClient};
use duty_api::{ChainId, OriginHeights};
use error_stack::{report, Result, ResultExt};
use futures::future::join_all;
use mockall::automock;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to query the latest block")]
    LatestBlock,
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

#[automock]
#[async_trait]
pub trait HeightSource: Send + Sync {
    async fn latest_height(&self) -> Result<u64, Error>;
}

#[async_trait]
impl HeightSource for HttpClient {
    async fn latest_height(&self) -> Result<u64, Error> {
        Client::latest_block(self)
            .await
            .map(|res| res.block.header.height.value())
            .change_context(Error::LatestBlock)
    }
}

/// Latest heights of all origin chains, queried concurrently.
///
/// Chains that fail or exceed `timeout` are left out of the snapshot.
pub async fn snapshot<H>(sources: &[(ChainId, H)], timeout: Duration) -> OriginHeights
where
    H: HeightSource,
{
    let heights = join_all(sources.iter().map(|(chain_id, source)| async move {
        let height = tokio::time::timeout(timeout, source.latest_height())
            .await
            .map_err(|_| report!(Error::Timeout(timeout)))
            .and_then(|res| res);

        match height {
            Ok(height) => Some((chain_id.clone(), height)),
            Err(err) => {
                warn!(chain_id = chain_id.as_ref(), err = ?err, "failed to observe origin chain height");
                None
            }
        }
    }))
    .await;

    heights.into_iter().flatten().collect()
}
