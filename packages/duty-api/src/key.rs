use cosmwasm_schema::cw_serde;
use cosmwasm_std::HexBinary;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::Error;

#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum KeyType {
    Ecdsa,
    Ed25519,
}

/// A sidecar public key. Ecdsa keys are secp256k1 in compressed or uncompressed SEC1 form.
#[cw_serde]
#[derive(Eq)]
pub enum PublicKey {
    #[serde(deserialize_with = "deserialize_ecdsa_key")]
    Ecdsa(HexBinary),

    #[serde(deserialize_with = "deserialize_ed25519_key")]
    Ed25519(HexBinary),
}

fn deserialize_ecdsa_key<'de, D>(deserializer: D) -> Result<HexBinary, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_key(deserializer, KeyType::Ecdsa)
}

fn deserialize_ed25519_key<'de, D>(deserializer: D) -> Result<HexBinary, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_key(deserializer, KeyType::Ed25519)
}

fn deserialize_key<'de, D>(deserializer: D, key_type: KeyType) -> Result<HexBinary, D::Error>
where
    D: Deserializer<'de>,
{
    let pk: HexBinary = Deserialize::deserialize(deserializer)?;
    PublicKey::try_from((key_type, pk.clone()))
        .map_err(|err| D::Error::custom(format!("failed to deserialize public key: {}", err)))?;
    Ok(pk)
}

impl PublicKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Ecdsa(_) => KeyType::Ecdsa,
            PublicKey::Ed25519(_) => KeyType::Ed25519,
        }
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        match self {
            PublicKey::Ecdsa(pk) | PublicKey::Ed25519(pk) => pk.as_ref(),
        }
    }
}

const ECDSA_COMPRESSED_PUBKEY_LEN: usize = 33;
const ECDSA_UNCOMPRESSED_PUBKEY_LEN: usize = 65;
const ED25519_PUBKEY_LEN: usize = 32;

impl TryFrom<(KeyType, HexBinary)> for PublicKey {
    type Error = Error;

    fn try_from((key_type, pub_key): (KeyType, HexBinary)) -> Result<Self, Self::Error> {
        match key_type {
            KeyType::Ecdsa => {
                if pub_key.len() != ECDSA_COMPRESSED_PUBKEY_LEN
                    && pub_key.len() != ECDSA_UNCOMPRESSED_PUBKEY_LEN
                {
                    return Err(Error::InvalidPublicKey {
                        reason: format!("ecdsa key has invalid length {}", pub_key.len()),
                    });
                }

                Ok(PublicKey::Ecdsa(pub_key))
            }
            KeyType::Ed25519 => {
                if pub_key.len() != ED25519_PUBKEY_LEN {
                    return Err(Error::InvalidPublicKey {
                        reason: format!("ed25519 key has invalid length {}", pub_key.len()),
                    });
                }

                Ok(PublicKey::Ed25519(pub_key))
            }
        }
    }
}
