//! Wire types and error definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// Re-export relay options from the config module to avoid duplication
pub use crate::config::schema::RelayOptions;

/// Errors that can occur during Pocket network operations.
#[derive(Debug, Error)]
pub enum PocketError {
    /// Connection-level failure talking to a node.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Node answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },

    /// Request did not complete before its deadline.
    #[error("Request to {target} timed out after {timeout_ms} ms")]
    Timeout { target: String, timeout_ms: u64 },

    /// RPC-level failure, such as an unusable node URL.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Malformed private or public key material.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Malformed account address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transfer amount is not a positive integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// AAT is malformed, badly signed, or bound to another client.
    #[error("Invalid AAT: {0}")]
    InvalidAat(String),

    /// Relay payload data is empty.
    #[error("Relay payload is empty")]
    EmptyPayload,

    /// Dispatched session has no serving nodes.
    #[error("Session for chain {0} has no serving nodes")]
    NoServingNodes(String),

    /// Node accepted the request but rejected the transaction.
    #[error("Transaction rejected with code {code}: {log}")]
    TransactionRejected { code: u32, log: String },

    /// Every relay attempt failed.
    #[error("Relay failed after {attempts} attempts: {last}")]
    RelayExhausted {
        attempts: u32,
        last: Box<PocketError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PocketError {
    /// Whether a relay attempt failing with this error may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            PocketError::Transport(_) | PocketError::Timeout { .. } => true,
            PocketError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PocketError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PocketError::InvalidResponse(err.to_string())
        } else {
            PocketError::Transport(err.to_string())
        }
    }
}

/// Result type for Pocket network operations.
pub type PocketResult<T> = Result<T, PocketError>;

/// Response of `/v1/query/height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightResponse {
    pub height: u64,
}

/// Identifies a session: application, relay chain and starting height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub app_public_key: String,
    pub chain: String,
    pub session_height: u64,
}

/// A serving node assigned to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub address: String,
    pub chains: Vec<String>,
    pub jailed: bool,
    pub public_key: String,
    pub service_url: String,
    pub status: i32,
    pub tokens: String,
    pub unstaking_time: String,
}

/// A session header bound to its serving nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub header: SessionHeader,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Session dispatch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub session_header: SessionHeader,
}

/// Response of `/v1/client/dispatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub block_height: u64,
    pub session: Session,
}

/// Body of `/v1/client/rawtx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTxRequest {
    pub address: String,
    pub raw_hex_bytes: String,
}

/// Response of `/v1/client/rawtx`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "txhash")]
    pub tx_hash: String,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
}

/// Application Authentication Token.
///
/// Field order matters: it is the order used when hashing for signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aat {
    pub version: String,
    pub app_pub_key: String,
    pub client_pub_key: String,
    pub signature: String,
}

/// Application-layer request carried by a relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub data: String,
    pub method: String,
    pub path: String,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMeta {
    pub block_height: u64,
}

/// Client-signed proof that a relay was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayProof {
    pub entropy: u64,
    pub session_block_height: u64,
    pub servicer_pub_key: String,
    pub blockchain: String,
    pub aat: Aat,
    pub signature: String,
    pub request_hash: String,
}

/// Body of `/v1/client/relay`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    pub payload: RelayPayload,
    pub meta: RelayMeta,
    pub proof: RelayProof,
}

/// Response of `/v1/client/relay`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub response: String,
    #[serde(default)]
    pub signature: String,
}

/// Everything the relayer needs to forward one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    /// Relay chain identifier.
    pub blockchain: String,
    /// Opaque payload, usually a JSON-RPC document.
    pub data: String,
    pub method: Option<String>,
    pub path: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub aat: Aat,
    pub session: Session,
    pub options: RelayOptions,
}
