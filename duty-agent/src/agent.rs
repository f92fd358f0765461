use std::fmt::{self, Display};
use std::time::Duration;

use cosmrs::tendermint::chain::Id;
use cosmrs::{AccountId, Coin};
use duty_api::{ChainId, Duty};
use error_stack::{report, Result, ResultExt};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::cosmos::CosmosClient;
use crate::duties::DutyQuerier;
use crate::heartbeat;
use crate::heights::{self, HeightSource};
use crate::key::RelayerKey;
use crate::relay::RelayExecutor;
use crate::tx::{SignedTx, TxSigner};

#[derive(Error, Debug)]
pub enum Error {
    #[error("no origin chain height could be observed")]
    NoOriginHeights,
    #[error("failed to build the heartbeat")]
    BuildHeartbeat,
    #[error("failed to query the relayer account")]
    QueryAccount,
    #[error("failed to sign the heartbeat tx")]
    SignTx,
    #[error("failed to broadcast the heartbeat tx")]
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    QueryingAssignments,
    ExecutingRelays,
    EmittingHeartbeat,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::QueryingAssignments => write!(f, "querying_assignments"),
            Phase::ExecutingRelays => write!(f, "executing_relays"),
            Phase::EmittingHeartbeat => write!(f, "emitting_heartbeat"),
        }
    }
}

/// Settings of the agent loop, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub validator: AccountId,
    pub duty_contract: AccountId,
    pub chain_id: Id,
    pub heartbeat_period: Duration,
    pub rpc_timeout: Duration,
    pub max_concurrent_relays: usize,
    pub fee: Coin,
    pub gas_limit: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub pending_duties: usize,
    pub relays_succeeded: usize,
    pub relays_failed: usize,
    /// Hash of the broadcast heartbeat tx
    pub heartbeat_tx_hash: Option<String>,
}

pub struct Agent<Q, R, H, C, B> {
    settings: Settings,
    key: RelayerKey,
    duties: Q,
    relayer: R,
    origin_chains: Vec<(ChainId, H)>,
    cosmos: C,
    broadcaster: B,
    phase: Phase,
}

impl<Q, R, H, C, B> Agent<Q, R, H, C, B>
where
    Q: DutyQuerier,
    R: RelayExecutor,
    H: HeightSource,
    C: CosmosClient,
    B: Broadcaster,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        key: RelayerKey,
        duties: Q,
        relayer: R,
        origin_chains: Vec<(ChainId, H)>,
        cosmos: C,
        broadcaster: B,
    ) -> Self {
        Self {
            settings,
            key,
            duties,
            relayer,
            origin_chains,
            cosmos,
            broadcaster,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        info!(validator = %self.settings.validator, phase = %phase, "entering phase");
        self.phase = phase;
    }

    /// Ticks every heartbeat period until the token is cancelled.
    ///
    /// Cancellation is only observed between ticks, so a heartbeat is either fully signed and
    /// broadcast or never built.
    pub async fn run(mut self, token: CancellationToken) {
        let mut interval = time::interval(self.settings.heartbeat_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("agent loop exiting");
                    return;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Runs one full tick. Failures of individual phases are logged and never abort the loop.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        self.enter(Phase::QueryingAssignments);
        let duties = self.pending_duties().await;
        report.pending_duties = duties.len();

        self.enter(Phase::ExecutingRelays);
        let (succeeded, failed) = self.execute_relays(duties).await;
        report.relays_succeeded = succeeded;
        report.relays_failed = failed;

        self.enter(Phase::EmittingHeartbeat);
        match self.emit_heartbeat().await {
            Ok(tx_hash) => {
                info!(tx_hash = %tx_hash, "heartbeat broadcast");
                report.heartbeat_tx_hash = Some(tx_hash);
            }
            Err(err) => warn!(err = ?err, "failed to emit heartbeat"),
        }

        self.enter(Phase::Idle);
        report
    }

    /// Queries assignments and builds the signed heartbeat without executing relays or
    /// broadcasting anything.
    pub async fn dry_run(&mut self) -> Result<Value, Error> {
        self.enter(Phase::QueryingAssignments);
        for duty in self.pending_duties().await {
            info!(
                route = %duty.route,
                message_id = duty.message_id,
                "dry run, skipping relay"
            );
        }

        self.enter(Phase::EmittingHeartbeat);
        let tx = self.signed_heartbeat().await;

        self.enter(Phase::Idle);
        tx.map(|tx| tx.to_json().clone())
    }

    async fn pending_duties(&self) -> Vec<Duty> {
        let query = time::timeout(
            self.settings.rpc_timeout,
            self.duties.pending_duties(&self.settings.validator),
        )
        .await;

        match query {
            Ok(Ok(duties)) => {
                let queried = duties.len();
                let duties: Vec<_> = duties.into_iter().filter(Duty::is_pending).collect();
                if duties.len() < queried {
                    debug!(
                        skipped = queried.saturating_sub(duties.len()),
                        "skipping duties that are no longer pending"
                    );
                }
                info!(count = duties.len(), "queried pending duties");
                duties
            }
            Ok(Err(err)) => {
                warn!(err = ?err, "failed to query assigned duties");
                vec![]
            }
            Err(_) => {
                warn!(timeout = ?self.settings.rpc_timeout, "duty query timed out");
                vec![]
            }
        }
    }

    /// Relays all duties with at most `max_concurrent_relays` in flight.
    /// Returns the number of succeeded and failed relays.
    async fn execute_relays(&self, duties: Vec<Duty>) -> (usize, usize) {
        let results = stream::iter(duties)
            .map(|duty| async move {
                let result = self.relayer.relay(&duty.route, duty.message_id).await;
                match &result {
                    Ok(output) => info!(
                        route = %duty.route,
                        message_id = duty.message_id,
                        output = %output.0,
                        "relay succeeded"
                    ),
                    Err(err) => warn!(
                        route = %duty.route,
                        message_id = duty.message_id,
                        err = ?err,
                        "relay failed, retrying next tick if still pending"
                    ),
                }
                result.is_ok()
            })
            .buffer_unordered(self.settings.max_concurrent_relays)
            .collect::<Vec<_>>()
            .await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        (succeeded, results.len().saturating_sub(succeeded))
    }

    async fn emit_heartbeat(&self) -> Result<String, Error> {
        let tx = self.signed_heartbeat().await?;

        self.broadcaster
            .broadcast(tx.bytes)
            .await
            .change_context(Error::Broadcast)
    }

    async fn signed_heartbeat(&self) -> Result<SignedTx, Error> {
        let heights = heights::snapshot(&self.origin_chains, self.settings.rpc_timeout).await;
        if heights.is_empty() {
            return Err(report!(Error::NoOriginHeights));
        }

        let msg = heartbeat::build(&self.settings.validator, &heights, &self.key)
            .change_context(Error::BuildHeartbeat)?;

        let account = time::timeout(
            self.settings.rpc_timeout,
            self.cosmos.account(&self.settings.validator),
        )
        .await
        .map_err(|_| report!(Error::QueryAccount))?
        .change_context(Error::QueryAccount)?;

        TxSigner {
            key: &self.key,
            chain_id: &self.settings.chain_id,
            sender: &self.settings.validator,
            contract: &self.settings.duty_contract,
            fee: self.settings.fee.clone(),
            gas_limit: self.settings.gas_limit,
        }
        .sign(&msg, account)
        .change_context(Error::SignTx)
    }
}
