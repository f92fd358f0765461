use std::fmt::{self, Debug};
use std::fs;
use std::path::Path;

use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::AccountId;
use error_stack::{report, Result, ResultExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read the relayer key file")]
    Read,
    #[error("relayer key is not a hex encoded secp256k1 private key")]
    Malformed,
    #[error("failed to derive the account address of the relayer key")]
    Address,
    #[error("failed to sign with the relayer key")]
    Sign,
}

/// The secp256k1 key signing both heartbeat payloads and the transactions carrying them.
pub struct RelayerKey {
    signing_key: SigningKey,
}

impl Debug for RelayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayerKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl RelayerKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .change_context(Error::Read)
            .attach_printable_lazy(|| path.display().to_string())?;

        Self::from_hex(content.trim())
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex_key.trim_start_matches("0x")).change_context(Error::Malformed)?;

        SigningKey::from_slice(&bytes)
            .map(|signing_key| Self { signing_key })
            .map_err(|_| report!(Error::Malformed))
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }

    pub fn account_id(&self, prefix: &str) -> Result<AccountId, Error> {
        self.public_key()
            .account_id(prefix)
            .map_err(|_| report!(Error::Address))
    }

    /// 64 byte r || s secp256k1 signature over sha256(msg).
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, Error> {
        self.signing_key
            .sign(msg)
            .map(|signature| signature.to_bytes().to_vec())
            .map_err(|_| report!(Error::Sign))
    }
}
