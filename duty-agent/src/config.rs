use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ::config::{Config as Cfg, Environment};
use cosmrs::tendermint::chain::Id;
use cosmrs::{AccountId, Denom};
use duty_api::ChainId;
use error_stack::{ensure, report, Report, Result, ResultExt};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const ENV_PREFIX: &str = "DUTY_AGENT";

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("failed to read configuration from the environment")]
    Read,
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("origin chain entry {0} is not of the form chain_id=rpc_url")]
    MalformedOriginChain(String),
}

/// An origin chain the agent observes heights of, given as `chain_id=rpc_url`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct OriginChain {
    pub chain_id: ChainId,
    pub rpc_url: Url,
}

impl FromStr for OriginChain {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || Error::MalformedOriginChain(s.to_string());

        let (chain_id, rpc_url) = s.trim().split_once('=').ok_or_else(malformed)?;

        Ok(OriginChain {
            chain_id: chain_id.parse().map_err(|_| malformed())?,
            rpc_url: rpc_url.parse().map_err(|_| malformed())?,
        })
    }
}

impl TryFrom<String> for OriginChain {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for OriginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.chain_id, self.rpc_url)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub rpc_url: Url,
    pub grpc_url: Url,
    pub chain_id: Id,
    pub validator_address: AccountId,
    pub relayer_key_path: PathBuf,
    pub relayer_bin: PathBuf,
    #[serde(with = "humantime_serde")]
    pub heartbeat_period: Duration,
    pub duty_contract: AccountId,
    pub origin_chains: Vec<OriginChain>,
    #[serde(with = "humantime_serde", default = "default_relay_timeout")]
    pub relay_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_rpc_timeout")]
    pub rpc_timeout: Duration,
    #[serde(default = "default_max_concurrent_relays")]
    pub max_concurrent_relays: usize,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_fee_amount")]
    pub fee_amount: u128,
    #[serde(default = "default_fee_denom")]
    pub fee_denom: String,
}

fn default_relay_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_rpc_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_concurrent_relays() -> usize {
    4
}

fn default_gas_limit() -> u64 {
    200_000
}

fn default_fee_amount() -> u128 {
    200
}

fn default_fee_denom() -> String {
    "usov".to_string()
}

/// The process environment, restricted to variables prefixed with `DUTY_AGENT_`.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("origin_chains")
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::load(environment())
    }

    pub fn load(source: Environment) -> Result<Self, Error> {
        let config = Cfg::builder()
            .add_source(source)
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Config>())
            .map_err(Report::from)
            .change_context(Error::Read)?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        ensure!(
            !self.heartbeat_period.is_zero(),
            Error::Invalid("heartbeat period must be positive")
        );
        ensure!(
            !self.relay_timeout.is_zero() && !self.rpc_timeout.is_zero(),
            Error::Invalid("timeouts must be positive")
        );
        ensure!(
            self.max_concurrent_relays > 0,
            Error::Invalid("at least one relay must be allowed in flight")
        );
        ensure!(
            !self.origin_chains.is_empty(),
            Error::Invalid("at least one origin chain is required")
        );
        self.fee_denom()?;

        Ok(())
    }

    pub fn fee_denom(&self) -> Result<Denom, Error> {
        self.fee_denom
            .parse()
            .map_err(|_| report!(Error::Invalid("fee denom is malformed")))
    }
}
