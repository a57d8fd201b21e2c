//! Transaction building, signing, and broadcasting.
//!
//! # Responsibilities
//! - Build validated `send` messages
//! - Sign the canonical JSON sign document
//! - Encode the signed transaction and broadcast it through the provider

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::observability::metrics;
use crate::pocket::codec::{encode_send_tx, Coin, SignedSendTx};
use crate::pocket::keys::KeyManager;
use crate::pocket::provider::Provider;
use crate::pocket::types::{PocketError, PocketResult, RawTxRequest, TransactionResponse};

/// Flat fee attached to every transaction, in uPOKT.
pub const DEFAULT_FEE_UPOKT: &str = "10000";

/// Denomination of fees and transfers.
pub const FEE_DENOM: &str = "upokt";

/// Amino type of the send message.
pub const MSG_SEND_TYPE: &str = "pos/Send";

/// Entropy stays below 2^53 so every JSON consumer reads it exactly.
const MAX_ENTROPY: i64 = (1 << 53) - 1;

/// A token transfer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    /// Amount in uPOKT.
    pub amount: String,
}

/// Builds and submits token transfers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Build a validated send message.
    fn send(&self, from_address: &str, to_address: &str, amount: &str) -> PocketResult<MsgSend>;

    /// Sign and broadcast `msg` with `memo`.
    async fn submit(&self, memo: &str, msg: MsgSend) -> PocketResult<TransactionResponse>;
}

/// Transaction builder scoped to one signer and network.
pub struct TransactionBuilder {
    provider: Arc<dyn Provider>,
    signer: KeyManager,
    chain_id: String,
    fee: Vec<Coin>,
}

// Sign document fields are declared in lexicographic order; the network
// verifies signatures over key-sorted JSON.
#[derive(Serialize)]
struct StdSignDoc<'a> {
    chain_id: &'a str,
    entropy: String,
    fee: Vec<SignDocCoin<'a>>,
    memo: &'a str,
    msg: SignDocMsg<'a>,
}

#[derive(Serialize)]
struct SignDocCoin<'a> {
    amount: &'a str,
    denom: &'a str,
}

#[derive(Serialize)]
struct SignDocMsg<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: SignDocSend<'a>,
}

#[derive(Serialize)]
struct SignDocSend<'a> {
    amount: &'a str,
    from_address: &'a str,
    to_address: &'a str,
}

impl TransactionBuilder {
    /// Create a transaction builder.
    ///
    /// # Arguments
    /// * `provider` - Provider used to broadcast
    /// * `signer` - Key pair that signs and pays the fee
    /// * `chain_id` - Network identifier, e.g. `testnet`
    pub fn new(provider: Arc<dyn Provider>, signer: KeyManager, chain_id: &str) -> Self {
        Self {
            provider,
            signer,
            chain_id: chain_id.to_string(),
            fee: vec![Coin {
                denom: FEE_DENOM.to_string(),
                amount: DEFAULT_FEE_UPOKT.to_string(),
            }],
        }
    }

    /// The signer's address.
    pub fn address(&self) -> String {
        self.signer.address()
    }

    /// Canonical bytes the signer signs.
    pub fn sign_document(&self, memo: &str, msg: &MsgSend, entropy: i64) -> PocketResult<Vec<u8>> {
        let doc = StdSignDoc {
            chain_id: &self.chain_id,
            entropy: entropy.to_string(),
            fee: self
                .fee
                .iter()
                .map(|c| SignDocCoin {
                    amount: &c.amount,
                    denom: &c.denom,
                })
                .collect(),
            memo,
            msg: SignDocMsg {
                kind: MSG_SEND_TYPE,
                value: SignDocSend {
                    amount: &msg.amount,
                    from_address: &msg.from_address,
                    to_address: &msg.to_address,
                },
            },
        };
        Ok(serde_json::to_vec(&doc)?)
    }

    /// Sign and encode `msg`, returning the raw transaction bytes.
    pub fn sign_and_encode(&self, memo: &str, msg: &MsgSend, entropy: i64) -> PocketResult<Vec<u8>> {
        if msg.from_address != self.signer.address() {
            return Err(PocketError::InvalidAddress(format!(
                "sender {} does not match signer {}",
                msg.from_address,
                self.signer.address()
            )));
        }

        let sign_bytes = self.sign_document(memo, msg, entropy)?;
        let signature = self.signer.sign_bytes(&sign_bytes);
        let public_key = self.signer.public_key_bytes();

        encode_send_tx(&SignedSendTx {
            from_address: &msg.from_address,
            to_address: &msg.to_address,
            amount: &msg.amount,
            fee: &self.fee,
            public_key: &public_key,
            signature: &signature,
            memo,
            entropy,
        })
    }
}

#[async_trait]
impl TransactionSender for TransactionBuilder {
    fn send(&self, from_address: &str, to_address: &str, amount: &str) -> PocketResult<MsgSend> {
        validate_address(from_address)?;
        validate_address(to_address)?;
        match amount.parse::<u128>() {
            Ok(n) if n > 0 => {}
            _ => return Err(PocketError::InvalidAmount(amount.to_string())),
        }

        Ok(MsgSend {
            from_address: from_address.to_lowercase(),
            to_address: to_address.to_lowercase(),
            amount: amount.to_string(),
        })
    }

    async fn submit(&self, memo: &str, msg: MsgSend) -> PocketResult<TransactionResponse> {
        let entropy = rand::thread_rng().gen_range(1..=MAX_ENTROPY);
        let raw = self.sign_and_encode(memo, &msg, entropy)?;

        let request = RawTxRequest {
            address: self.signer.address(),
            raw_hex_bytes: hex::encode(raw),
        };
        let result = self.provider.send_transaction(&request).await;
        let response = match result {
            Ok(r) if r.code != 0 => Err(PocketError::TransactionRejected {
                code: r.code,
                log: r.raw_log,
            }),
            other => other,
        };

        metrics::record_transaction(response.is_ok());
        let response = response?;

        tracing::info!(
            tx_hash = %response.tx_hash,
            chain_id = %self.chain_id,
            to = %msg.to_address,
            amount = %msg.amount,
            "Transaction submitted"
        );
        Ok(response)
    }
}

fn validate_address(address: &str) -> PocketResult<()> {
    if address.len() == 40 && address.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(PocketError::InvalidAddress(address.to_string()))
    }
}
