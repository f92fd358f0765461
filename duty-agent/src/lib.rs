use cosmrs::rpc::HttpClient;
use cosmrs::Coin;
use error_stack::{ensure, report, Result, ResultExt};
use serde_json::Value;
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

use crate::agent::{Agent, Settings};
use crate::broadcaster::RpcBroadcaster;
use crate::config::Config;
use crate::cosmos::CosmosGrpcClient;
use crate::duties::DutyClient;
use crate::key::RelayerKey;
use crate::relay::Process;

pub mod agent;
pub mod broadcaster;
pub mod config;
pub mod cosmos;
pub mod duties;
pub mod heartbeat;
pub mod heights;
pub mod key;
pub mod relay;
mod tx;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load config")]
    LoadConfig,
    #[error("invalid relayer key")]
    Key,
    #[error("relayer key does not control the validator address")]
    KeyMismatch,
    #[error("connection failed")]
    Connection,
    #[error("agent loop failed")]
    AgentLoop,
    #[error("dry run failed")]
    DryRun,
}

type DaemonAgent = Agent<DutyClient, Process, HttpClient, CosmosGrpcClient, RpcBroadcaster>;

pub enum Mode {
    Daemon,
    DryRun,
}

/// Runs the agent. In dry run mode returns the signed heartbeat tx after a single tick.
pub async fn run(cfg: Config, mode: Mode) -> Result<Option<Value>, Error> {
    let mut agent = prepare_agent(cfg).await?;

    match mode {
        Mode::DryRun => agent.dry_run().await.change_context(Error::DryRun).map(Some),
        Mode::Daemon => {
            let token = CancellationToken::new();
            let exit_token = token.clone();
            let mut sigint = signal(SignalKind::interrupt()).change_context(Error::AgentLoop)?;
            let mut sigterm = signal(SignalKind::terminate()).change_context(Error::AgentLoop)?;

            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => {},
                    _ = sigterm.recv() => {},
                }

                info!("signal received, finishing the current tick before exiting");

                exit_token.cancel();
            });

            agent.run(token).await;

            Ok(None)
        }
    }
}

async fn prepare_agent(cfg: Config) -> Result<DaemonAgent, Error> {
    let key = RelayerKey::from_file(&cfg.relayer_key_path).change_context(Error::Key)?;
    let relayer_address = key
        .account_id(cfg.validator_address.prefix())
        .change_context(Error::Key)?;
    ensure!(relayer_address == cfg.validator_address, Error::KeyMismatch);

    let fee = Coin {
        denom: cfg.fee_denom().change_context(Error::LoadConfig)?,
        amount: cfg.fee_amount,
    };

    let channel = connect_grpc(&cfg).await?;
    let tm_client = HttpClient::new(cfg.rpc_url.as_str())
        .change_context(Error::Connection)
        .attach_printable(cfg.rpc_url.clone())?;

    let origin_chains = cfg
        .origin_chains
        .iter()
        .map(|chain| {
            HttpClient::new(chain.rpc_url.as_str())
                .map(|client| (chain.chain_id.clone(), client))
                .change_context(Error::Connection)
                .attach_printable(chain.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        validator = %cfg.validator_address,
        duty_contract = %cfg.duty_contract,
        origin_chains = origin_chains.len(),
        "agent prepared"
    );

    let settings = Settings {
        validator: cfg.validator_address.clone(),
        duty_contract: cfg.duty_contract.clone(),
        chain_id: cfg.chain_id.clone(),
        heartbeat_period: cfg.heartbeat_period,
        rpc_timeout: cfg.rpc_timeout,
        max_concurrent_relays: cfg.max_concurrent_relays,
        fee,
        gas_limit: cfg.gas_limit,
    };

    Ok(Agent::new(
        settings,
        key,
        DutyClient::new(channel.clone(), cfg.duty_contract),
        Process::new(cfg.relayer_bin, cfg.relay_timeout),
        origin_chains,
        CosmosGrpcClient::new(channel),
        RpcBroadcaster::new(tm_client, cfg.rpc_timeout),
    ))
}

async fn connect_grpc(cfg: &Config) -> Result<Channel, Error> {
    Endpoint::from_shared(cfg.grpc_url.to_string())
        .map_err(|err| report!(Error::Connection).attach_printable(err.to_string()))?
        .connect_timeout(cfg.rpc_timeout)
        .timeout(cfg.rpc_timeout)
        .connect()
        .await
        .change_context(Error::Connection)
        .attach_printable(cfg.grpc_url.clone())
}
