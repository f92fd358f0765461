use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cosmrs::cosmwasm::MsgExecuteContract;
use cosmrs::proto::cosmos::tx::v1beta1::TxRaw;
use cosmrs::tendermint::chain::Id;
use cosmrs::tx::{BodyBuilder, Fee, Msg, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin};
use duty_api::msg::ExecuteMsg;
use error_stack::{report, Result, ResultExt};
use prost::Message;
use serde_json::{json, Value};
use thiserror::Error;

use crate::cosmos::Account;
use crate::key::RelayerKey;

const MSG_EXECUTE_CONTRACT_TYPE_URL: &str = "/cosmwasm.wasm.v1.MsgExecuteContract";

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to encode the contract message")]
    Encode,
    #[error("tx marshaling failed")]
    Marshaling,
    #[error("tx signing failed")]
    Sign,
}

/// A signed transaction executing a single message on the duty contract.
#[derive(Debug)]
pub struct SignedTx {
    pub bytes: Vec<u8>,
    json: Value,
}

impl SignedTx {
    /// Human readable form of the transaction, with the contract message decoded.
    pub fn to_json(&self) -> &Value {
        &self.json
    }
}

pub struct TxSigner<'a> {
    pub key: &'a RelayerKey,
    pub chain_id: &'a Id,
    pub sender: &'a AccountId,
    pub contract: &'a AccountId,
    pub fee: Coin,
    pub gas_limit: u64,
}

impl TxSigner<'_> {
    /// Signs in SIGN_MODE_DIRECT for the given account state.
    pub fn sign(&self, msg: &ExecuteMsg, account: Account) -> Result<SignedTx, Error> {
        let msg_json = serde_json::to_value(msg).change_context(Error::Encode)?;
        let any = MsgExecuteContract {
            sender: self.sender.clone(),
            contract: self.contract.clone(),
            msg: serde_json::to_vec(msg).change_context(Error::Encode)?,
            funds: vec![],
        }
        .to_any()
        .map_err(|err| report!(Error::Encode).attach_printable(err.to_string()))?;

        let pub_key = self.key.public_key();
        let fee = Fee::from_amount_and_gas(self.fee.clone(), self.gas_limit);
        let body = BodyBuilder::new().msg(any).finish();
        let auth_info = SignerInfo::single_direct(Some(pub_key), account.sequence).auth_info(fee);
        let sign_doc = SignDoc::new(&body, &auth_info, self.chain_id, account.account_number)
            .map_err(|err| report!(Error::Marshaling).attach_printable(err.to_string()))?;

        let signature = self.key.sign(
            &sign_doc
                .clone()
                .into_bytes()
                .map_err(|err| report!(Error::Marshaling).attach_printable(err.to_string()))?,
        )
        .change_context(Error::Sign)?;

        let json = json!({
            "body": {
                "messages": [{
                    "@type": MSG_EXECUTE_CONTRACT_TYPE_URL,
                    "sender": self.sender.to_string(),
                    "contract": self.contract.to_string(),
                    "msg": msg_json,
                    "funds": [],
                }],
                "memo": "",
            },
            "auth_info": {
                "signer_infos": [{
                    "public_key": {
                        "@type": pub_key.type_url(),
                        "key": STANDARD.encode(pub_key.to_bytes()),
                    },
                    "mode_info": { "single": { "mode": "SIGN_MODE_DIRECT" } },
                    "sequence": account.sequence.to_string(),
                }],
                "fee": {
                    "amount": [{
                        "denom": self.fee.denom.to_string(),
                        "amount": self.fee.amount.to_string(),
                    }],
                    "gas_limit": self.gas_limit.to_string(),
                },
            },
            "chain_id": self.chain_id.as_str(),
            "account_number": account.account_number.to_string(),
            "signatures": [STANDARD.encode(&signature)],
        });

        let bytes = TxRaw {
            body_bytes: sign_doc.body_bytes,
            auth_info_bytes: sign_doc.auth_info_bytes,
            signatures: vec![signature],
        }
        .encode_to_vec();

        Ok(SignedTx { bytes, json })
    }
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::HexBinary;

    use super::*;
    use crate::key::test_utils::relayer_key;

    #[test]
    fn signed_tx_json_carries_decoded_msg_and_signature() {
        let key = relayer_key();
        let sender = key.account_id("cosmos").unwrap();
        let contract: AccountId =
            "cosmos1v3jkvemgd94xkmrddehhqutjwd682anh0puh57mu04l8lqyps2psq7dk6g"
                .parse()
                .unwrap();
        let chain_id: Id = "duty-1".parse().unwrap();
        let signer = TxSigner {
            key: &key,
            chain_id: &chain_id,
            sender: &sender,
            contract: &contract,
            fee: Coin {
                denom: "usov".parse().unwrap(),
                amount: 200,
            },
            gas_limit: 200_000,
        };
        let msg = ExecuteMsg::Heartbeat {
            validator: sender.to_string(),
            origin_heights_json: r#"{"origin-1":10}"#.to_string(),
            signature: HexBinary::from([1u8; 64]),
        };

        let tx = signer
            .sign(
                &msg,
                Account {
                    account_number: 7,
                    sequence: 3,
                },
            )
            .unwrap();
        let json = tx.to_json();

        assert!(!tx.bytes.is_empty());
        assert_eq!(
            json["body"]["messages"][0]["@type"],
            MSG_EXECUTE_CONTRACT_TYPE_URL
        );
        assert_eq!(
            json["body"]["messages"][0]["msg"]["heartbeat"]["origin_heights_json"],
            r#"{"origin-1":10}"#
        );
        assert_eq!(json["auth_info"]["signer_infos"][0]["sequence"], "3");
        assert_eq!(json["auth_info"]["fee"]["gas_limit"], "200000");
        assert_eq!(json["account_number"], "7");

        let decoded = TxRaw::decode(tx.bytes.as_slice()).unwrap();
        assert_eq!(
            json["signatures"][0],
            STANDARD.encode(&decoded.signatures[0])
        );
    }
}
