use std::fmt::{self, Display};
use std::str::FromStr;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::StdResult;
use cw_storage_plus::{Key, KeyDeserialize, Prefixer, PrimaryKey};
use valuable::Valuable;

use crate::error::Error;

/// Separates origin and destination when a route is rendered as a single string.
pub const ROUTE_DELIMITER: char = ':';

/// Identifier of a chain taking part in message relay.
///
/// - Must not be empty
/// - Must not exceed [ChainId::MAX_LEN] bytes
/// - Must be printable ascii without whitespace
/// - Must not contain the [ROUTE_DELIMITER] or `=` characters
/// - Case-sensitivity is preserved
#[cw_serde]
#[serde(try_from = "String")]
#[derive(Eq, Hash, PartialOrd, Ord, Valuable)]
pub struct ChainId(String);

impl ChainId {
    pub const MAX_LEN: usize = 64;
}

impl FromStr for ChainId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty()
            || s.len() > Self::MAX_LEN
            || !s.chars().all(|c| c.is_ascii_graphic())
            || s.contains(ROUTE_DELIMITER)
            || s.contains('=')
        {
            return Err(Error::InvalidChainId);
        }

        Ok(ChainId(s.to_owned()))
    }
}

impl TryFrom<String> for ChainId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for ChainId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainId> for String {
    fn from(d: ChainId) -> Self {
        d.0
    }
}

impl AsRef<str> for ChainId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> PrimaryKey<'a> for ChainId {
    type Prefix = ();
    type SubPrefix = ();
    type Suffix = Self;
    type SuperSuffix = Self;

    fn key(&self) -> Vec<Key> {
        vec![Key::Ref(self.0.as_bytes())]
    }
}

impl<'a> Prefixer<'a> for ChainId {
    fn prefix(&self) -> Vec<Key> {
        vec![Key::Ref(self.0.as_bytes())]
    }
}

impl KeyDeserialize for ChainId {
    type Output = Self;
    const KEY_ELEMS: u16 = 1;

    #[inline(always)]
    fn from_vec(value: Vec<u8>) -> StdResult<Self::Output> {
        let chain_id = String::from_vec(value)?;
        Ok(ChainId(chain_id))
    }
}

impl KeyDeserialize for &ChainId {
    type Output = ChainId;
    const KEY_ELEMS: u16 = 1;

    #[inline(always)]
    fn from_vec(value: Vec<u8>) -> StdResult<Self::Output> {
        ChainId::from_vec(value)
    }
}

/// An ordered (origin, destination) pair. Every duty belongs to exactly one route.
#[cw_serde]
#[derive(Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    pub origin: ChainId,
    pub destination: ChainId,
}

impl Route {
    pub fn new(origin: ChainId, destination: ChainId) -> Result<Self, Error> {
        let route = Route {
            origin,
            destination,
        };
        route.validate()?;

        Ok(route)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.origin == self.destination {
            return Err(Error::InvalidRoute);
        }

        Ok(())
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.origin, ROUTE_DELIMITER, self.destination)
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, destination) = s.split_once(ROUTE_DELIMITER).ok_or(Error::InvalidRoute)?;

        Route::new(origin.parse()?, destination.parse()?)
    }
}
